use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use env_logger::Target;
use log::LevelFilter;

/// Initializes logging for one run
///
/// Debug level with `verbose`, info otherwise. When `log_file` is set, log
/// output goes to a size-rotating file instead of stderr.
pub fn init(
    verbose: bool,
    log_file: Option<&Path>,
    max_bytes: u64,
    backup_count: u32,
) -> io::Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    if let Some(path) = log_file {
        let writer = RotatingFileWriter::open(path, max_bytes, backup_count)?;
        builder.target(Target::Pipe(Box::new(writer)));
    }
    builder.init();
    Ok(())
}

/// Log sink that rolls over on size
///
/// A write that would push the file past `max_bytes` first renames the
/// current file through `path.1` .. `path.N` (dropping the oldest), or
/// truncates in place when `backup_count` is 0. `max_bytes` 0 never rolls.
pub struct RotatingFileWriter {
    path: PathBuf,
    max_bytes: u64,
    backup_count: u32,
    file: File,
    len: u64,
}

impl RotatingFileWriter {
    /// Opens (or creates) the log file in append mode
    pub fn open(path: &Path, max_bytes: u64, backup_count: u32) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            path: path.to_path_buf(),
            max_bytes,
            backup_count,
            file,
            len,
        })
    }

    fn roll(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.backup_count > 0 {
            for index in (1..self.backup_count).rev() {
                let from = backup_path(&self.path, index);
                if from.exists() {
                    fs::rename(&from, backup_path(&self.path, index + 1))?;
                }
            }
            if self.path.exists() {
                fs::rename(&self.path, backup_path(&self.path, 1))?;
            }
        }
        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.len = 0;
        Ok(())
    }
}

fn backup_path(path: &Path, index: u32) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

impl Write for RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.max_bytes > 0 && self.len + buf.len() as u64 > self.max_bytes {
            self.roll()?;
        }
        let written = self.file.write(buf)?;
        self.len += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_no_rollover_when_unlimited() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("run.log");
        let mut writer = RotatingFileWriter::open(&path, 0, 3).unwrap();

        for _ in 0..100 {
            writer.write_all(b"0123456789\n").unwrap();
        }
        writer.flush().unwrap();

        assert_eq!(fs::metadata(&path).unwrap().len(), 1100);
        assert!(!backup_path(&path, 1).exists());
    }

    #[test]
    fn test_rollover_with_backups() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("run.log");
        let mut writer = RotatingFileWriter::open(&path, 25, 2).unwrap();

        // Each line is 11 bytes; the third line would pass 25 and rolls
        for _ in 0..5 {
            writer.write_all(b"0123456789\n").unwrap();
        }
        writer.flush().unwrap();

        assert!(path.exists());
        assert!(backup_path(&path, 1).exists());
        assert!(backup_path(&path, 2).exists());
        assert!(!backup_path(&path, 3).exists());
        assert!(fs::metadata(&path).unwrap().len() <= 25);
    }

    #[test]
    fn test_rollover_truncates_without_backups() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("run.log");
        let mut writer = RotatingFileWriter::open(&path, 25, 0).unwrap();

        for _ in 0..5 {
            writer.write_all(b"0123456789\n").unwrap();
        }
        writer.flush().unwrap();

        assert!(!backup_path(&path, 1).exists());
        assert!(fs::metadata(&path).unwrap().len() <= 25);
    }

    #[test]
    fn test_open_appends_to_existing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("run.log");
        fs::write(&path, b"existing\n").unwrap();

        let mut writer = RotatingFileWriter::open(&path, 0, 0).unwrap();
        writer.write_all(b"appended\n").unwrap();
        writer.flush().unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"existing\nappended\n");
    }
}
