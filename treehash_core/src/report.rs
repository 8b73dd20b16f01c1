//! Progress and change reporting.

use crate::changelog::ChangeLog;
use crate::diff::DiffReport;
use crate::error::{Error, Result};
use tracing::{info, warn};

/// Receives progress and change events from a scan.
pub trait Reporter {
    /// Called once per included file, before it is hashed.
    fn file_processing(&mut self, path: &str);

    /// Called when a file is left out of the manifest because it could not be read.
    fn file_skipped(&mut self, path: &str, error: &Error);

    /// Called once with the comparison result of a run.
    fn changes(&mut self, report: &DiffReport) -> Result<()>;
}

/// Reports through `tracing` INFO events, optionally appending change
/// summaries to a [`ChangeLog`].
#[derive(Debug, Default)]
pub struct TracingReporter {
    change_log: Option<ChangeLog>,
}

impl TracingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_change_log(change_log: ChangeLog) -> Self {
        Self {
            change_log: Some(change_log),
        }
    }
}

impl Reporter for TracingReporter {
    fn file_processing(&mut self, path: &str) {
        info!("Processing file: {}", path);
    }

    fn file_skipped(&mut self, path: &str, error: &Error) {
        warn!("Skipping {}: {}", path, error);
    }

    fn changes(&mut self, report: &DiffReport) -> Result<()> {
        if !report.added.is_empty() {
            info!("Added files:");
            for added in &report.added {
                info!("  {}: new hash: {}", added.path, added.digest);
            }
        }

        if !report.modified.is_empty() {
            info!("Modified files:");
            for modified in &report.modified {
                info!(
                    "  {}: old hash: {} -> new hash: {}",
                    modified.path, modified.old, modified.new
                );
            }
        }

        if let Some(log) = &self.change_log {
            log.append(report)?;
        }

        Ok(())
    }
}

/// Records every event, for assertions in tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    pub processed: Vec<String>,
    pub skipped: Vec<String>,
    pub reports: Vec<DiffReport>,
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn file_processing(&mut self, path: &str) {
        self.processed.push(path.to_string());
    }

    fn file_skipped(&mut self, path: &str, _error: &Error) {
        self.skipped.push(path.to_string());
    }

    fn changes(&mut self, report: &DiffReport) -> Result<()> {
        self.reports.push(report.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::Added;
    use crate::hash::{Algorithm, Digest};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_tracing_reporter_appends_change_log() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("treehash.log");
        let mut reporter = TracingReporter::with_change_log(ChangeLog::open(&log_path).unwrap());

        let report = DiffReport {
            added: vec![Added {
                path: "a.txt".to_string(),
                digest: Digest::hash_bytes(Algorithm::Sha1, b"hello"),
            }],
            modified: Vec::new(),
        };
        reporter.file_processing("a.txt");
        reporter.changes(&report).unwrap();

        let content = fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("a.txt: new hash: aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d"));
    }

    #[test]
    fn test_tracing_reporter_without_change_log() {
        let mut reporter = TracingReporter::new();
        reporter.changes(&DiffReport::default()).unwrap();
    }
}
