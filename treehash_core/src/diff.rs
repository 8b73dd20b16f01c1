//! Manifest-to-manifest comparison.
//!
//! Only entries of the newer manifest are classified. A path that exists in
//! the older manifest but not in the newer one is not reported at all.

use crate::hash::Digest;
use crate::manifest::Manifest;
use serde::Serialize;

/// A path present in the new manifest but not in the old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Added {
    pub path: String,
    pub digest: Digest,
}

/// A path whose digest changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modified {
    pub path: String,
    pub old: Digest,
    pub new: Digest,
}

/// Added and modified entries, in the new manifest's path order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    pub added: Vec<Added>,
    pub modified: Vec<Modified>,
}

impl DiffReport {
    /// True when nothing was added or modified.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty()
    }
}

/// Classify every entry of `new` against `old`.
pub fn compare(old: &Manifest, new: &Manifest) -> DiffReport {
    let mut report = DiffReport::default();

    for (path, new_digest) in new {
        match old.get(path) {
            None => report.added.push(Added {
                path: path.clone(),
                digest: new_digest.clone(),
            }),
            Some(old_digest) if old_digest != new_digest => report.modified.push(Modified {
                path: path.clone(),
                old: old_digest.clone(),
                new: new_digest.clone(),
            }),
            Some(_) => {}
        }
    }

    report
}
