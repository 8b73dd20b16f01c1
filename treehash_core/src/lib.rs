//! # Treehash Core
//!
//! Fingerprints a directory tree into a manifest of relative path to content
//! digest, and reports which files were added or modified since the previous
//! manifest.
//!
//! ## Features
//!
//! - Streaming SHA-1 (default) or BLAKE3 file digests
//! - Literal name and directory-marker exclusion rules
//! - Pretty, key-sorted JSON manifests written atomically
//! - Added/modified reporting through an injected [`Reporter`]
//! - Append-only change log of per-run summaries
//!
//! Deleted files are not reported: a path that disappears from the tree is
//! simply absent from the next manifest.
//!
//! ## Example
//!
//! ```no_run
//! use treehash_core::{Excluder, ManifestBuilder, ManifestStore, TracingReporter};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let excluder = Excluder::with_defaults().extend(["manifest.json"]);
//! let builder = ManifestBuilder::new(excluder);
//! let store = ManifestStore::new("manifest.json");
//!
//! let outcome = store.update(Path::new("."), &builder, &mut TracingReporter::new())?;
//! println!(
//!     "{} added, {} modified",
//!     outcome.diff.added.len(),
//!     outcome.diff.modified.len()
//! );
//! # Ok(())
//! # }
//! ```

mod changelog;
mod diff;
mod error;
mod exclude;
mod hash;
mod manifest;
mod report;
mod store;
mod walk;

pub use changelog::ChangeLog;
pub use diff::{Added, DiffReport, Modified, compare};
pub use error::{Error, Result};
pub use exclude::{DEFAULT_EXCLUSIONS, Excluder, Exclusion};
pub use hash::{Algorithm, CHUNK_SIZE, Digest};
pub use manifest::Manifest;
pub use report::{Reporter, TracingReporter};
pub use store::{ManifestStore, ScanOutcome};
pub use walk::{ManifestBuilder, WalkedFile, Walker};
