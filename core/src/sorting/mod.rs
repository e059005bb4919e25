pub mod apply;
pub mod decision;
pub mod engine;
pub mod run;

pub use apply::ApplyConfig;
pub use decision::{Placement, PlacementDecision};
pub use engine::{decide, decide_file, files_identical, SortConfig};
pub use run::{run, RunConfig, RunSummary};
