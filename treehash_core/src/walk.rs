//! Filesystem walking and manifest building.

use crate::error::{Error, Result};
use crate::exclude::Excluder;
use crate::hash::{Algorithm, Digest};
use crate::manifest::Manifest;
use crate::report::Reporter;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};

/// A file found by the [`Walker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    /// Path relative to the walk root, `/`-separated.
    pub relative: String,
    /// Path on disk.
    pub path: PathBuf,
}

/// Recursively lists the non-excluded files below a root directory.
///
/// Hidden files and files matched by `.gitignore` are included; only the
/// [`Excluder`] decides what is left out. Entries come out sorted by name
/// within each directory. Symlinks are listed like files unless they point at
/// a directory, and symlinked directories are never descended.
pub struct Walker {
    inner: ignore::Walk,
    root: PathBuf,
    excluder: Excluder,
}

impl Walker {
    pub fn new(root: &Path, excluder: &Excluder) -> Self {
        let prune_root = root.to_path_buf();
        let prune = excluder.clone();

        let inner = ignore::WalkBuilder::new(root)
            .standard_filters(false) // No hidden/.gitignore filtering
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                if entry.depth() == 0 || !entry.file_type().is_some_and(|t| t.is_dir()) {
                    return true;
                }
                match relative_path(&prune_root, entry.path()) {
                    Some(rel) => !prune.prunes_dir(&rel),
                    None => true,
                }
            })
            .build();

        Self {
            inner,
            root: root.to_path_buf(),
            excluder: excluder.clone(),
        }
    }
}

impl Iterator for Walker {
    type Item = Result<WalkedFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(walk_error(err))),
            };

            // Skip the root itself
            if entry.depth() == 0 {
                continue;
            }

            let is_file = match entry.file_type() {
                Some(t) if t.is_file() => true,
                Some(t) if t.is_symlink() => !entry.path().is_dir(),
                _ => false,
            };
            if !is_file {
                continue;
            }

            let Some(relative) = relative_path(&self.root, entry.path()) else {
                return Some(Err(Error::invalid_path(entry.path())));
            };

            if self.excluder.is_excluded(&relative) {
                trace!("Excluded {}", relative);
                continue;
            }

            return Some(Ok(WalkedFile {
                relative,
                path: entry.into_path(),
            }));
        }
    }
}

/// Path of `path` relative to `root`, joined with `/`.
///
/// Returns None when `path` is not below `root` or a segment is not UTF-8.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let segments = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_str()),
            _ => None,
        })
        .collect::<Option<Vec<&str>>>()?;
    Some(segments.join("/"))
}

/// Convert a walk error, keeping the offending path when there is one.
fn walk_error(err: ignore::Error) -> Error {
    fn find_path(err: &ignore::Error) -> Option<&Path> {
        match err {
            ignore::Error::WithPath { path, .. } => Some(path),
            ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
                find_path(err)
            }
            _ => None,
        }
    }

    match find_path(&err) {
        Some(path) => {
            let kind = err
                .io_error()
                .map(|e| e.kind())
                .unwrap_or(std::io::ErrorKind::Other);
            Error::unreadable(path, std::io::Error::new(kind, err.to_string()))
        }
        None => err.into(),
    }
}

/// Walks a directory and hashes every included file into a [`Manifest`].
#[derive(Debug, Clone, Default)]
pub struct ManifestBuilder {
    excluder: Excluder,
    algorithm: Algorithm,
    skip_unreadable: bool,
}

impl ManifestBuilder {
    pub fn new(excluder: Excluder) -> Self {
        Self {
            excluder,
            ..Self::default()
        }
    }

    /// Set the digest algorithm (SHA-1 by default).
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Leave unreadable files out of the manifest instead of failing the build.
    pub fn skip_unreadable(mut self, skip: bool) -> Self {
        self.skip_unreadable = skip;
        self
    }

    pub fn excluder(&self) -> &Excluder {
        &self.excluder
    }

    pub fn digest_algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Build a manifest of everything below `root`.
    ///
    /// Reports each file before hashing it. The first walk or read error
    /// aborts the build unless `skip_unreadable` is set.
    pub fn build(&self, root: &Path, reporter: &mut dyn Reporter) -> Result<Manifest> {
        if !root.is_dir() {
            return Err(Error::Io {
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("Not a directory: {}", root.display()),
                ),
            });
        }

        let mut manifest = Manifest::new();

        for item in Walker::new(root, &self.excluder) {
            let file = match item {
                Ok(file) => file,
                Err(err) if self.skip_unreadable => {
                    let path = err.path().map(|p| p.display().to_string());
                    reporter.file_skipped(path.as_deref().unwrap_or(""), &err);
                    continue;
                }
                Err(err) => return Err(err),
            };

            reporter.file_processing(&file.relative);

            match Digest::hash_file(self.algorithm, &file.path) {
                Ok(digest) => {
                    manifest.insert(file.relative, digest);
                }
                Err(err) if self.skip_unreadable => reporter.file_skipped(&file.relative, &err),
                Err(err) => return Err(err),
            }
        }

        debug!(
            "Built manifest of {} files under {}",
            manifest.len(),
            root.display()
        );
        Ok(manifest)
    }
}
