use std::sync::OnceLock;

use regex::Regex;

use crate::error::{DcmsortError, Result};
use crate::extraction::tags::TagSet;

/// Sentinel used when no descriptive tag is available
pub const UNKNOWN: &str = "UNKNOWN";

/// Collapses runs of whitespace to single underscores
///
/// Keys derived from free-form tag values become directory names, so they
/// must never contain raw whitespace runs.
fn collapse_whitespace(value: &str) -> String {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let re = REGEX.get_or_init(|| Regex::new(r"\s+").expect("Failed to compile regex"));
    re.replace_all(value, "_").into_owned()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Derives the project key from StudyDescription
///
/// Trimmed, whitespace collapsed to `_`, upper-cased. Falls back to
/// `default` when the tag is absent or empty.
pub fn project_name(tags: &TagSet, default: &str) -> String {
    let value = non_empty(tags.study_description.as_deref()).unwrap_or(default);
    collapse_whitespace(value).to_uppercase()
}

/// Derives the session key from PatientID, falling back to StudyInstanceUID
///
/// Whitespace is collapsed the same way as the project key but case is
/// preserved. Falls back to `default` when neither tag has a value.
pub fn session_name(tags: &TagSet, default: &str) -> String {
    let value = non_empty(tags.patient_id.as_deref())
        .or_else(|| non_empty(tags.study_instance_uid.as_deref()))
        .unwrap_or(default);
    collapse_whitespace(value)
}

/// Reads Modality with a default
pub fn modality_name(tags: &TagSet, default: &str) -> String {
    non_empty(tags.modality.as_deref())
        .unwrap_or(default)
        .to_string()
}

/// Reads SeriesNumber with a default
pub fn series_number(tags: &TagSet, default: &str) -> String {
    non_empty(tags.series_number.as_deref())
        .unwrap_or(default)
        .to_string()
}

/// Reads InstanceNumber with a default
pub fn instance_number(tags: &TagSet, default: &str) -> String {
    non_empty(tags.instance_number.as_deref())
        .unwrap_or(default)
        .to_string()
}

/// Reads SOPInstanceUID, the one mandatory field
///
/// # Errors
///
/// Returns `MissingIdentifier` when the tag is absent or empty. The UID is
/// the only component that guarantees destination-filename uniqueness, so
/// there is no fallback.
pub fn sop_instance_uid(tags: &TagSet) -> Result<String> {
    non_empty(tags.sop_instance_uid.as_deref())
        .map(str::to_string)
        .ok_or_else(|| DcmsortError::MissingIdentifier("SOPInstanceUID is absent or empty".into()))
}

/// Synthesizes a destination basename for rename mode
///
/// Joins the non-empty values among {session, modality, series number,
/// instance number} with `.`, appends SOPInstanceUID and a `.dcm` extension.
/// The session component is derived with an empty default here, so files
/// without a patient or study identifier are named without a session prefix.
///
/// # Errors
///
/// Returns `MissingIdentifier` when SOPInstanceUID is absent or empty.
pub fn file_basename(tags: &TagSet) -> Result<String> {
    let sop = sop_instance_uid(tags)?;
    let mut parts: Vec<String> = Vec::new();
    for value in [
        session_name(tags, ""),
        modality_name(tags, ""),
        series_number(tags, ""),
        instance_number(tags, ""),
    ] {
        if !value.is_empty() {
            parts.push(value);
        }
    }
    parts.push(sop);
    Ok(format!("{}.dcm", parts.join(".")))
}
