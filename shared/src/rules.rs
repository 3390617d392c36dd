//! Rule-control file access.
//!
//! Operators tune the engine's ruleset through two plain-text files read by
//! the rule-update tool: `enable.conf` and `disable.conf`. Suriview exposes
//! them for editing but refuses any other name, so the HTTP surface can
//! never be used to read or write arbitrary files in the config directory.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

/// The only filenames the rule-control API may touch.
pub const CONTROL_FILES: [&str; 2] = ["enable.conf", "disable.conf"];

/// Errors from rule-control file access.
#[derive(Debug, Error)]
pub enum RulesError {
    /// The requested name is not an editable rule-control file.
    #[error("not an editable rule-control file: {0}")]
    InvalidFilename(String),

    /// Reading or writing the file failed.
    #[error("rule-control file I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Returns `true` if `name` is one of the editable rule-control files.
#[must_use]
pub fn is_control_file(name: &str) -> bool {
    CONTROL_FILES.contains(&name)
}

/// Reads a rule-control file from `dir`.
///
/// A file that does not exist yet reads as empty: both files are optional
/// and are created on first save.
///
/// # Errors
///
/// Returns [`RulesError::InvalidFilename`] for names outside the allowlist
/// and I/O errors other than absence.
pub fn read_control_file(dir: &Path, name: &str) -> Result<String, RulesError> {
    if !is_control_file(name) {
        return Err(RulesError::InvalidFilename(name.to_string()));
    }

    match fs::read_to_string(dir.join(name)) {
        Ok(content) => Ok(content),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(error) => Err(error.into()),
    }
}

/// Writes a rule-control file into `dir`, creating the directory if needed.
///
/// # Errors
///
/// Returns [`RulesError::InvalidFilename`] for names outside the allowlist
/// and any I/O error from the write.
pub fn write_control_file(dir: &Path, name: &str, content: &str) -> Result<(), RulesError> {
    if !is_control_file(name) {
        return Err(RulesError::InvalidFilename(name.to_string()));
    }

    fs::create_dir_all(dir)?;
    fs::write(dir.join(name), content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowlist() {
        assert!(is_control_file("enable.conf"));
        assert!(is_control_file("disable.conf"));
        assert!(!is_control_file("suricata.yaml"));
        assert!(!is_control_file("../etc/passwd"));
        assert!(!is_control_file(""));
    }

    #[test]
    fn test_read_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();

        let content = read_control_file(dir.path(), "enable.conf").unwrap();

        assert_eq!(content, "");
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();

        write_control_file(dir.path(), "disable.conf", "2019401\n2019402\n").unwrap();
        let content = read_control_file(dir.path(), "disable.conf").unwrap();

        assert_eq!(content, "2019401\n2019402\n");
    }

    #[test]
    fn test_write_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("suricata");

        write_control_file(&nested, "enable.conf", "re:trojan\n").unwrap();

        assert_eq!(
            read_control_file(&nested, "enable.conf").unwrap(),
            "re:trojan\n"
        );
    }

    #[test]
    fn test_invalid_names_rejected_for_read_and_write() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            read_control_file(dir.path(), "threshold.config"),
            Err(RulesError::InvalidFilename(_))
        ));
        assert!(matches!(
            write_control_file(dir.path(), "../enable.conf", ""),
            Err(RulesError::InvalidFilename(_))
        ));
    }
}
