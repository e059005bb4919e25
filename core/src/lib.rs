pub mod cli;
pub mod error;
pub mod extraction;
pub mod logging;
pub mod sorting;

pub use error::{DcmsortError, Result};
pub use extraction::TagSet;
pub use sorting::{
    decide, decide_file, run, Placement, PlacementDecision, RunConfig, RunSummary, SortConfig,
};
