//! Bounded tail-window reads over the EVE log.
//!
//! The engine's log grows without bound, so every aggregate request reads
//! only a bounded suffix of it: a fixed-capacity ring is filled during one
//! forward scan, evicting the oldest line whenever the cap is exceeded.
//! Memory use is proportional to the cap, never to the file size.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Reads the last `cap` lines of `path`, oldest-first.
///
/// Returns fewer than `cap` lines when the file is shorter. A missing file
/// yields an empty window rather than an error: for aggregation, "the
/// engine has not logged yet" is an ordinary state, and callers decide
/// whether to surface emptiness specially. Lines that are not valid UTF-8
/// are skipped without aborting the scan, and each retained line has
/// trailing whitespace stripped.
///
/// # Errors
///
/// Returns an error only for I/O failures other than the file being absent.
pub fn read_window(path: &Path, cap: usize) -> io::Result<Vec<String>> {
    if cap == 0 {
        return Ok(Vec::new());
    }

    let file = match File::open(path) {
        Ok(file) => file,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(error) => return Err(error),
    };

    let mut reader = BufReader::new(file);
    let mut ring: VecDeque<String> = VecDeque::with_capacity(cap);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let Ok(line) = std::str::from_utf8(&buf) else {
            continue;
        };
        if ring.len() == cap {
            ring.pop_front();
        }
        ring.push_back(line.trim_end().to_string());
    }

    Ok(ring.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn log_file(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_missing_file_yields_empty_window() {
        let window = read_window(Path::new("/nonexistent/eve.json"), 100).unwrap();

        assert!(window.is_empty());
    }

    #[test]
    fn test_short_file_returned_in_full() {
        let file = log_file(&["one", "two", "three"]);

        let window = read_window(file.path(), 100).unwrap();

        assert_eq!(window, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_window_is_the_file_suffix_oldest_first() {
        let lines: Vec<String> = (0..50).map(|i| format!("line-{i}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let file = log_file(&refs);

        let window = read_window(file.path(), 10).unwrap();

        let expected: Vec<String> = (40..50).map(|i| format!("line-{i}")).collect();
        assert_eq!(window, expected);
    }

    #[test]
    fn test_cap_zero_reads_nothing() {
        let file = log_file(&["one", "two"]);

        let window = read_window(file.path(), 0).unwrap();

        assert!(window.is_empty());
    }

    #[test]
    fn test_cap_equal_to_length() {
        let file = log_file(&["a", "b"]);

        let window = read_window(file.path(), 2).unwrap();

        assert_eq!(window, vec!["a", "b"]);
    }

    #[test]
    fn test_trailing_whitespace_stripped() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "padded   \r\nplain\n").unwrap();
        file.flush().unwrap();

        let window = read_window(file.path(), 10).unwrap();

        assert_eq!(window, vec!["padded", "plain"]);
    }

    #[test]
    fn test_invalid_utf8_lines_skipped() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"good\n\xff\xfe broken\nalso good\n").unwrap();
        file.flush().unwrap();

        let window = read_window(file.path(), 10).unwrap();

        assert_eq!(window, vec!["good", "also good"]);
    }

    #[test]
    fn test_empty_file() {
        let file = NamedTempFile::new().unwrap();

        let window = read_window(file.path(), 10).unwrap();

        assert!(window.is_empty());
    }

    #[test]
    fn test_final_line_without_newline_kept() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "first\nlast").unwrap();
        file.flush().unwrap();

        let window = read_window(file.path(), 10).unwrap();

        assert_eq!(window, vec!["first", "last"]);
    }
}
