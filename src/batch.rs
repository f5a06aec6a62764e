//! Decoding many shortcut files in one pass.

use crate::lnk::{Link, ParseOptions};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of a batch decode.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Decoded shortcuts in input order.
    pub successes: Vec<Link>,
    /// Paths that failed, with the error text.
    pub failures: Vec<(PathBuf, String)>,
}

/// Counts from a [`BatchReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Files attempted.
    pub total: usize,
    /// Files decoded.
    pub succeeded: usize,
    /// Files that could not be decoded.
    pub failed: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed {} file(s): {} succeeded, {} failed",
            self.total, self.succeeded, self.failed
        )
    }
}

impl BatchReport {
    /// Success and failure counts.
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            total: self.successes.len() + self.failures.len(),
            succeeded: self.successes.len(),
            failed: self.failures.len(),
        }
    }

    /// Returns true if every file decoded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Decodes each path with [`Link::open`]. A failing file is recorded and
/// the batch continues.
pub fn parse_files<I, P>(paths: I) -> BatchReport
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    parse_files_with_options(paths, &ParseOptions::default())
}

/// Like [`parse_files`] with explicit decoder options.
pub fn parse_files_with_options<I, P>(paths: I, options: &ParseOptions) -> BatchReport
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut report = BatchReport::default();

    for path in paths {
        let path = path.as_ref();
        match Link::open_with_options(path, options) {
            Ok(link) => {
                debug!(path = %path.display(), "Decoded shortcut");
                report.successes.push(link);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to decode shortcut");
                report.failures.push((path.to_path_buf(), e.to_string()));
            }
        }
    }

    info!("{}", report.summary());
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_files_are_failures() {
        let dir = std::env::temp_dir();
        let paths = [
            dir.join("lnk-parser-batch-missing-1.lnk"),
            dir.join("lnk-parser-batch-missing-2.lnk"),
        ];

        let report = parse_files(&paths);
        assert!(report.successes.is_empty());
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].0, paths[0]);
        assert!(!report.is_clean());
        assert_eq!(
            report.summary().to_string(),
            "Processed 2 file(s): 0 succeeded, 2 failed"
        );
    }

    #[test]
    fn test_empty_batch() {
        let report = parse_files(Vec::<PathBuf>::new());
        assert!(report.is_clean());
        assert_eq!(
            report.summary(),
            BatchSummary {
                total: 0,
                succeeded: 0,
                failed: 0
            }
        );
    }
}
