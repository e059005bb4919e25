use std::fs;
use std::io::{self, Write};
use std::path::Path;

use log::{debug, info};

use crate::error::Result;
use crate::sorting::decision::Placement;

/// Driver-side side effects applied to MOVE decisions
#[derive(Debug, Clone)]
pub struct ApplyConfig {
    /// Prompt on stdin before each move
    pub confirm: bool,

    /// Mode bits for newly created directories; 0 leaves the umask result
    pub chmod: u32,

    /// Group id applied to newly created directories
    pub group: Option<u32>,
}

/// Resolves a group name to a gid
///
/// # Errors
///
/// Returns `UnknownGroup` when no group with that name exists.
#[cfg(unix)]
pub fn resolve_group(name: &str) -> Result<u32> {
    use crate::error::DcmsortError;
    use nix::unistd::Group;

    match Group::from_name(name) {
        Ok(Some(group)) => Ok(group.gid.as_raw()),
        Ok(None) => Err(DcmsortError::UnknownGroup(name.to_string())),
        Err(e) => Err(io::Error::new(io::ErrorKind::Other, e).into()),
    }
}

/// Creates the project and session directories for one placement
///
/// Each directory is created at most once; a directory that already exists
/// is left entirely alone, so pre-existing directories keep whatever mode
/// and ownership they already have.
pub fn ensure_dirs(placement: &Placement, config: &ApplyConfig) -> Result<()> {
    ensure_dir(&placement.project_dir, config)?;
    ensure_dir(&placement.session_dir, config)?;
    Ok(())
}

fn ensure_dir(dir: &Path, config: &ApplyConfig) -> Result<()> {
    if dir.exists() {
        return Ok(());
    }
    fs::create_dir_all(dir)?;

    #[cfg(unix)]
    {
        if config.chmod != 0 {
            use std::os::unix::fs::PermissionsExt;
            debug!("setting mode on {} to {:o}", dir.display(), config.chmod);
            fs::set_permissions(dir, fs::Permissions::from_mode(config.chmod))?;
        }
        if let Some(gid) = config.group {
            debug!("setting group ownership on {} to gid {}", dir.display(), gid);
            std::os::unix::fs::chown(dir, None, Some(gid))?;
        }
    }

    Ok(())
}

/// Moves one file to its destination with an atomic rename
///
/// The rename is atomic within one filesystem; a cross-device or permission
/// failure surfaces as an error for this file only.
pub fn move_file(source: &Path, dest: &Path, config: &ApplyConfig) -> Result<()> {
    info!("renaming source to destination");
    if config.confirm {
        prompt()?;
    }
    fs::rename(source, dest)?;
    Ok(())
}

/// Blocks on stdin until the operator presses enter
fn prompt() -> io::Result<()> {
    print!("press enter to continue");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(())
}
