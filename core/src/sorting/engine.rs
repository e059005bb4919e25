use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use crate::extraction::{file_basename, project_name, session_name, TagSet, UNKNOWN};
use crate::sorting::decision::{Placement, PlacementDecision};

/// Configuration for the placement engine
#[derive(Debug, Clone)]
pub struct SortConfig {
    /// Directory being scanned; destinations are created beneath it
    pub base_dir: PathBuf,

    /// Synthesize destination basenames instead of keeping original names
    pub rename: bool,

    /// Session key used when a file has neither PatientID nor
    /// StudyInstanceUID. Captured once per run, so all unidentifiable files
    /// in one run land in the same session bucket.
    pub fallback_session: String,
}

/// Decides the placement for one candidate file
///
/// The classification gate: any failure to read the file as DICOM yields
/// `SkipUnparseable` so arbitrary non-conforming files in the scanned
/// directory never abort the run.
pub fn decide_file(source: &Path, config: &SortConfig) -> PlacementDecision {
    match TagSet::from_file(source) {
        Ok(tags) => {
            debug!("found dicom file {}", source.display());
            decide(source, &tags, config)
        }
        Err(e) => {
            debug!("skipping file {}: {}", source.display(), e);
            PlacementDecision::SkipUnparseable
        }
    }
}

/// Decides the placement for one file with already-extracted tags
///
/// Computes the project/session keys, the destination basename and the
/// conflict/idempotence check, in that order. The expensive move is left to
/// the caller; this function only reads.
pub fn decide(source: &Path, tags: &TagSet, config: &SortConfig) -> PlacementDecision {
    let project = project_name(tags, UNKNOWN);
    let session = session_name(tags, &config.fallback_session);

    let project_dir = config.base_dir.join(&project);
    let session_dir = project_dir.join(&session);

    let dest_file = if config.rename {
        match file_basename(tags) {
            Ok(name) => session_dir.join(name),
            Err(e) => {
                error!("cannot derive basename for {}: {}", source.display(), e);
                return PlacementDecision::SkipError(e.to_string());
            }
        }
    } else {
        match source.file_name() {
            Some(name) => session_dir.join(name),
            None => {
                error!("source path has no filename: {}", source.display());
                return PlacementDecision::SkipError("source path has no filename".into());
            }
        }
    };

    let placement = Placement {
        project_dir,
        session_dir,
        dest_file,
    };

    match files_identical(source, &placement.dest_file) {
        // Destination (or source) does not exist: nothing to collide with
        Ok(None) => PlacementDecision::Move(placement),
        Ok(Some(true)) => {
            info!("source and destination exist and are identical");
            PlacementDecision::SkipIdentical(placement)
        }
        Ok(Some(false)) => {
            warn!(
                "source and destination exist and are not identical: {}",
                placement.dest_file.display()
            );
            PlacementDecision::SkipConflict(placement)
        }
        Err(e) => {
            error!("cannot compare {}: {}", source.display(), e);
            PlacementDecision::SkipError(e.to_string())
        }
    }
}

/// Compares two files by content
///
/// Returns `Ok(None)` when either file does not exist, `Ok(Some(true))`
/// when both exist with identical bytes, `Ok(Some(false))` otherwise.
pub fn files_identical(a: &Path, b: &Path) -> io::Result<Option<bool>> {
    let fa = match File::open(a) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    let fb = match File::open(b) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    if fa.metadata()?.len() != fb.metadata()?.len() {
        return Ok(Some(false));
    }

    let mut ra = BufReader::new(fa);
    let mut rb = BufReader::new(fb);
    loop {
        let n;
        {
            let buf_a = ra.fill_buf()?;
            let buf_b = rb.fill_buf()?;
            if buf_a.is_empty() && buf_b.is_empty() {
                return Ok(Some(true));
            }
            n = buf_a.len().min(buf_b.len());
            if n == 0 || buf_a[..n] != buf_b[..n] {
                return Ok(Some(false));
            }
        }
        ra.consume(n);
        rb.consume(n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config(base: &Path, rename: bool) -> SortConfig {
        SortConfig {
            base_dir: base.to_path_buf(),
            rename,
            fallback_session: "2024-01-01T00:00:00".to_string(),
        }
    }

    fn tags(description: &str, patient: &str) -> TagSet {
        TagSet {
            study_description: Some(description.to_string()),
            patient_id: Some(patient.to_string()),
            ..TagSet::default()
        }
    }

    #[test]
    fn test_decide_move_when_destination_free() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("scan001");
        fs::write(&source, b"dicom-ish bytes").unwrap();

        let decision = decide(&source, &tags("Brain   Study", "PAT01"), &config(tmp.path(), false));

        let expected = Placement {
            project_dir: tmp.path().join("BRAIN_STUDY"),
            session_dir: tmp.path().join("BRAIN_STUDY").join("PAT01"),
            dest_file: tmp.path().join("BRAIN_STUDY").join("PAT01").join("scan001"),
        };
        assert_eq!(decision, PlacementDecision::Move(expected));
    }

    #[test]
    fn test_decide_identical_destination() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("scan001");
        fs::write(&source, &[1u8, 2, 3]).unwrap();

        let dest_dir = tmp.path().join("BRAIN_STUDY").join("PAT01");
        fs::create_dir_all(&dest_dir).unwrap();
        fs::write(dest_dir.join("scan001"), &[1u8, 2, 3]).unwrap();

        let decision = decide(&source, &tags("Brain Study", "PAT01"), &config(tmp.path(), false));
        assert!(matches!(decision, PlacementDecision::SkipIdentical(_)));
        // Source is untouched
        assert!(source.exists());
    }

    #[test]
    fn test_decide_conflicting_destination() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("scan001");
        fs::write(&source, &[1u8, 2, 3]).unwrap();

        let dest_dir = tmp.path().join("BRAIN_STUDY").join("PAT01");
        fs::create_dir_all(&dest_dir).unwrap();
        let dest = dest_dir.join("scan001");
        fs::write(&dest, &[4u8, 5, 6]).unwrap();

        let decision = decide(&source, &tags("Brain Study", "PAT01"), &config(tmp.path(), false));
        assert!(matches!(decision, PlacementDecision::SkipConflict(_)));
        // Neither file is modified
        assert_eq!(fs::read(&source).unwrap(), vec![1, 2, 3]);
        assert_eq!(fs::read(&dest).unwrap(), vec![4, 5, 6]);
    }

    #[test]
    fn test_decide_fallback_keys() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("scan001");
        fs::write(&source, b"bytes").unwrap();

        let decision = decide(&source, &TagSet::default(), &config(tmp.path(), false));
        let placement = decision.placement().unwrap();
        assert_eq!(placement.project_dir, tmp.path().join("UNKNOWN"));
        assert_eq!(
            placement.session_dir,
            tmp.path().join("UNKNOWN").join("2024-01-01T00:00:00")
        );
    }

    #[test]
    fn test_decide_rename_mode() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("scan001");
        fs::write(&source, b"bytes").unwrap();

        let tags = TagSet {
            patient_id: Some("PAT01".to_string()),
            modality: Some("MR".to_string()),
            series_number: Some("4".to_string()),
            instance_number: Some("5".to_string()),
            sop_instance_uid: Some("1.2.3".to_string()),
            ..TagSet::default()
        };
        let decision = decide(&source, &tags, &config(tmp.path(), true));
        let placement = decision.placement().unwrap();
        assert_eq!(
            placement.dest_file.file_name().unwrap(),
            "PAT01.MR.4.5.1.2.3.dcm"
        );
    }

    #[test]
    fn test_decide_rename_mode_missing_uid() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("scan001");
        fs::write(&source, b"bytes").unwrap();

        let decision = decide(&source, &tags("Brain", "PAT01"), &config(tmp.path(), true));
        assert!(matches!(decision, PlacementDecision::SkipError(_)));
    }

    #[test]
    fn test_decide_file_unparseable() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("notes.txt");
        fs::write(&source, b"this is not a dicom file").unwrap();

        let decision = decide_file(&source, &config(tmp.path(), false));
        assert_eq!(decision, PlacementDecision::SkipUnparseable);
    }

    #[test]
    fn test_files_identical_missing_destination() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        fs::write(&a, b"abc").unwrap();

        assert_eq!(
            files_identical(&a, &tmp.path().join("missing")).unwrap(),
            None
        );
        assert_eq!(
            files_identical(&tmp.path().join("missing"), &a).unwrap(),
            None
        );
    }

    #[test]
    fn test_files_identical_same_and_different() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        let c = tmp.path().join("c");
        fs::write(&a, b"same content").unwrap();
        fs::write(&b, b"same content").unwrap();
        fs::write(&c, b"diff content").unwrap();

        assert_eq!(files_identical(&a, &b).unwrap(), Some(true));
        assert_eq!(files_identical(&a, &c).unwrap(), Some(false));
    }

    #[test]
    fn test_files_identical_length_mismatch() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        fs::write(&a, b"short").unwrap();
        fs::write(&b, b"much longer content").unwrap();

        assert_eq!(files_identical(&a, &b).unwrap(), Some(false));
    }
}
