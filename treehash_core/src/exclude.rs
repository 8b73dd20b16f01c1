//! Path exclusion rules.
//!
//! An entry ending in `/` is a directory marker and excludes every path that
//! contains it as a substring, so `screen/` matches `screen/a.png` as well as
//! `old_screen/a.png`. Any other entry excludes paths whose final segment is
//! exactly equal to it. Matching is case-sensitive and has no glob syntax.

use std::collections::BTreeSet;

/// Entries excluded unless the caller opts out.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[".git/", ".gitignore", ".gitattributes"];

/// A single exclusion rule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Exclusion {
    /// Directory marker, stored with its trailing `/`.
    Directory(String),
    /// Exact file or directory basename.
    Name(String),
}

impl Exclusion {
    /// Parse an entry. A trailing `/` makes it a directory marker.
    pub fn parse(entry: &str) -> Self {
        if entry.ends_with('/') {
            Exclusion::Directory(entry.to_string())
        } else {
            Exclusion::Name(entry.to_string())
        }
    }

    /// The entry text as written.
    pub fn as_str(&self) -> &str {
        match self {
            Exclusion::Directory(s) | Exclusion::Name(s) => s,
        }
    }
}

/// An immutable set of exclusion rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Excluder {
    entries: BTreeSet<Exclusion>,
}

impl Excluder {
    /// Build an excluder from entry strings.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .filter(|e| !e.as_ref().is_empty())
                .map(|e| Exclusion::parse(e.as_ref()))
                .collect(),
        }
    }

    /// The built-in set, see [`DEFAULT_EXCLUSIONS`].
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_EXCLUSIONS)
    }

    /// Return a copy with additional entries.
    pub fn extend<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.entries.extend(
            entries
                .into_iter()
                .filter(|e| !e.as_ref().is_empty())
                .map(|e| Exclusion::parse(e.as_ref())),
        );
        self
    }

    /// Iterate the rules in sorted order.
    pub fn entries(&self) -> impl Iterator<Item = &Exclusion> {
        self.entries.iter()
    }

    /// Whether a forward-slash relative file path is excluded.
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        let basename = relative_path.rsplit('/').next().unwrap_or(relative_path);
        self.entries.iter().any(|entry| match entry {
            Exclusion::Directory(marker) => relative_path.contains(marker.as_str()),
            Exclusion::Name(name) => basename == name,
        })
    }

    /// Whether everything below a directory is excluded.
    ///
    /// True when some directory marker occurs in `relative_dir + "/"`. Any
    /// file below such a directory contains the same substring, so the walker
    /// can skip descending into it.
    pub fn prunes_dir(&self, relative_dir: &str) -> bool {
        let with_slash = format!("{}/", relative_dir);
        self.entries.iter().any(|entry| match entry {
            Exclusion::Directory(marker) => with_slash.contains(marker.as_str()),
            Exclusion::Name(_) => false,
        })
    }
}
