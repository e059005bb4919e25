pub mod keys;
pub mod tags;

pub use keys::{
    file_basename, instance_number, modality_name, project_name, series_number, session_name,
    sop_instance_uid, UNKNOWN,
};
pub use tags::{get_string_value, read_header, TagSet};
