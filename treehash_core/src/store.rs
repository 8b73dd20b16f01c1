//! Manifest persistence and the scan pipeline.

use crate::diff::{DiffReport, compare};
use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::report::Reporter;
use crate::walk::ManifestBuilder;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Result of one [`ManifestStore::update`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    /// The manifest that was saved.
    pub manifest: Manifest,
    /// Changes relative to the previously saved manifest.
    pub diff: DiffReport,
}

/// A manifest file on disk.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the manifest. A missing file loads as an empty manifest.
    pub fn load(&self) -> Result<Manifest> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No manifest at {}, starting empty", self.path.display());
                return Ok(Manifest::new());
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(Error::format(&self.path, "not valid UTF-8"));
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content).map_err(|e| Error::format(&self.path, e.to_string()))
    }

    /// Save the manifest, replacing any existing file.
    ///
    /// Writes pretty JSON with 2-space indentation, sorted keys and literal
    /// non-ASCII characters. The file is replaced atomically.
    pub fn save(&self, manifest: &Manifest) -> Result<()> {
        let json = serde_json::to_string_pretty(manifest)
            .map_err(|e| Error::format(&self.path, e.to_string()))?;

        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        // Write atomically using tempfile
        let mut builder = tempfile::Builder::new();
        if let Some(permissions) = new_file_permissions() {
            builder.permissions(permissions);
        }
        let mut temp_file = builder.tempfile_in(parent)?;
        temp_file.write_all(json.as_bytes())?;
        temp_file.flush()?;

        // Replacing the manifest keeps its mode
        match fs::metadata(&self.path) {
            Ok(meta) => temp_file.as_file().set_permissions(meta.permissions())?,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        temp_file.persist(&self.path)?;

        Ok(())
    }

    /// Run the full pipeline against `root`: load the previous manifest,
    /// build a new one, report the differences, then save the new manifest.
    ///
    /// Nothing is saved if any step before saving fails.
    pub fn update(
        &self,
        root: &Path,
        builder: &ManifestBuilder,
        reporter: &mut dyn Reporter,
    ) -> Result<ScanOutcome> {
        let old = self.load()?;
        let manifest = builder.build(root, reporter)?;
        let diff = compare(&old, &manifest);
        reporter.changes(&diff)?;
        self.save(&manifest)?;

        debug!(
            "Saved {} entries to {} ({} added, {} modified)",
            manifest.len(),
            self.path.display(),
            diff.added.len(),
            diff.modified.len()
        );

        Ok(ScanOutcome { manifest, diff })
    }
}

/// Mode for a manifest that does not exist yet: the same as a plain file
/// create, i.e. 0o666 less the umask, instead of tempfile's private 0o600.
#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}
