use std::path::Path;

use dicom_core::Tag;
use dicom_dictionary_std::tags::PIXEL_DATA;
use dicom_object::{DefaultDicomObject, InMemDicomObject, OpenFileOptions};

use crate::error::Result;

// Identification Tags
pub const SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x0018);
pub const STUDY_INSTANCE_UID: Tag = Tag(0x0020, 0x000D);
pub const PATIENT_ID: Tag = Tag(0x0010, 0x0020);

// Description Tags
pub const STUDY_DESCRIPTION: Tag = Tag(0x0008, 0x1030);
pub const MODALITY: Tag = Tag(0x0008, 0x0060);

// Numbering Tags
pub const SERIES_NUMBER: Tag = Tag(0x0020, 0x0011);
pub const INSTANCE_NUMBER: Tag = Tag(0x0020, 0x0013);

/// Helper to get string value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to string
pub fn get_string_value(dcm: &InMemDicomObject, tag: Tag) -> Option<String> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .map(|s| s.trim().to_string())
}

/// Opens a DICOM file, reading header tags only
///
/// Reading stops before PixelData so bulk image data is never loaded.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or is not valid DICOM.
pub fn read_header(path: &Path) -> Result<DefaultDicomObject> {
    let obj = OpenFileOptions::new()
        .read_until(PIXEL_DATA)
        .open_file(path)?;
    Ok(obj)
}

/// The subset of header fields the placement engine needs
///
/// All values come from an untrusted external file; none are guaranteed
/// present or well-formed. Values are trimmed on extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    pub study_description: Option<String>,
    pub patient_id: Option<String>,
    pub study_instance_uid: Option<String>,
    pub modality: Option<String>,
    pub series_number: Option<String>,
    pub instance_number: Option<String>,
    pub sop_instance_uid: Option<String>,
}

impl TagSet {
    /// Extracts the tag subset from an already-opened DICOM object
    pub fn from_dicom(dcm: &InMemDicomObject) -> Self {
        Self {
            study_description: get_string_value(dcm, STUDY_DESCRIPTION),
            patient_id: get_string_value(dcm, PATIENT_ID),
            study_instance_uid: get_string_value(dcm, STUDY_INSTANCE_UID),
            modality: get_string_value(dcm, MODALITY),
            series_number: get_string_value(dcm, SERIES_NUMBER),
            instance_number: get_string_value(dcm, INSTANCE_NUMBER),
            sop_instance_uid: get_string_value(dcm, SOP_INSTANCE_UID),
        }
    }

    /// Extracts the tag subset from a DICOM file path
    ///
    /// # Errors
    ///
    /// Returns `ParseFailure` if the file is not readable DICOM.
    pub fn from_file(path: &Path) -> Result<Self> {
        let dcm = read_header(path)?;
        Ok(Self::from_dicom(&dcm))
    }
}
