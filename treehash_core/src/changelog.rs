//! Append-only log of per-run change summaries.

use crate::diff::DiffReport;
use crate::error::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Change log file. Every write appends; nothing is ever truncated.
#[derive(Debug)]
pub struct ChangeLog {
    path: PathBuf,
}

impl ChangeLog {
    /// Open or create a change log at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Create the file if it doesn't exist
        OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append the summary blocks for a report. Writes nothing for an empty report.
    pub fn append(&self, report: &DiffReport) -> Result<()> {
        if report.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(render(report).as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

fn render(report: &DiffReport) -> String {
    let mut out = String::new();

    if !report.added.is_empty() {
        out.push_str("\nAdded files:\n");
        for added in &report.added {
            out.push_str(&format!("  {}: new hash: {}\n", added.path, added.digest));
        }
    }

    if !report.modified.is_empty() {
        out.push_str("\nModified files:\n");
        for modified in &report.modified {
            out.push_str(&format!(
                "  {}: old hash: {} -> new hash: {}\n",
                modified.path, modified.old, modified.new
            ));
        }
    }

    out
}
