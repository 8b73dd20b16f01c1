//! Scan configuration resolution.
//!
//! Priority: command-line flag, then environment, then defaults relative to
//! the scan root.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use treehash_core::{Algorithm, Excluder, ManifestBuilder};

/// Environment variable naming the scan root.
pub const ROOT_ENV: &str = "TREEHASH_ROOT";

pub const DEFAULT_MANIFEST: &str = "manifest.json";
pub const DEFAULT_LOG_FILE: &str = "treehash.log";

/// Options of the `scan` command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanArgs {
    /// Directory to scan (defaults to TREEHASH_ROOT env var or the current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Manifest file to read and write (defaults to <root>/manifest.json)
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Log file to append to (defaults to <root>/treehash.log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Extra exclusion entry; a trailing '/' marks a directory (repeatable)
    #[arg(long = "exclude", value_name = "ENTRY")]
    pub excludes: Vec<String>,

    /// Do not exclude .git/, .gitignore and .gitattributes
    #[arg(long)]
    pub no_default_excludes: bool,

    /// Hash algorithm: sha1 or blake3 [default: sha1]
    #[arg(long)]
    pub algo: Option<String>,

    /// Leave unreadable files out instead of failing
    #[arg(long)]
    pub skip_unreadable: bool,

    /// Exit without waiting for Enter
    #[arg(long)]
    pub no_pause: bool,
}

/// Fully resolved settings for one scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub root: PathBuf,
    pub manifest: PathBuf,
    pub log_file: PathBuf,
    pub excluder: Excluder,
    pub algorithm: Algorithm,
    pub skip_unreadable: bool,
}

impl ScanConfig {
    /// Resolve settings from the scan options and the root environment
    /// variable value.
    pub fn resolve(env_root: Option<String>, args: &ScanArgs) -> Result<Self> {
        let root = args
            .root
            .clone()
            .or_else(|| env_root.filter(|r| !r.is_empty()).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));

        let manifest = args
            .manifest
            .clone()
            .unwrap_or_else(|| root.join(DEFAULT_MANIFEST));
        let log_file = args
            .log_file
            .clone()
            .unwrap_or_else(|| root.join(DEFAULT_LOG_FILE));

        let algorithm = match &args.algo {
            Some(algo) => Algorithm::parse(algo).with_context(|| format!("Invalid --algo {}", algo))?,
            None => Algorithm::default(),
        };

        let base = if args.no_default_excludes {
            Excluder::default()
        } else {
            Excluder::with_defaults()
        };
        // Never fingerprint our own outputs
        let excluder = base
            .extend([basename(&manifest), basename(&log_file)].into_iter().flatten())
            .extend(&args.excludes);

        Ok(Self {
            root,
            manifest,
            log_file,
            excluder,
            algorithm,
            skip_unreadable: args.skip_unreadable,
        })
    }

    pub fn builder(&self) -> ManifestBuilder {
        ManifestBuilder::new(self.excluder.clone())
            .algorithm(self.algorithm)
            .skip_unreadable(self.skip_unreadable)
    }
}

fn basename(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScanConfig::resolve(None, &ScanArgs::default()).unwrap();

        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.manifest, PathBuf::from("./manifest.json"));
        assert_eq!(config.log_file, PathBuf::from("./treehash.log"));
        assert_eq!(config.algorithm, Algorithm::Sha1);
        assert!(!config.skip_unreadable);

        assert!(config.excluder.is_excluded("manifest.json"));
        assert!(config.excluder.is_excluded("treehash.log"));
        assert!(config.excluder.is_excluded(".git/HEAD"));
        assert!(config.excluder.is_excluded(".gitignore"));
        assert!(!config.excluder.is_excluded("src/main.rs"));
    }

    #[test]
    fn test_root_priority() {
        let args = ScanArgs::default();

        let config = ScanConfig::resolve(Some("/from/env".to_string()), &args).unwrap();
        assert_eq!(config.root, PathBuf::from("/from/env"));
        assert_eq!(config.manifest, PathBuf::from("/from/env/manifest.json"));

        let flagged = ScanArgs {
            root: Some(PathBuf::from("/from/flag")),
            ..ScanArgs::default()
        };
        let config = ScanConfig::resolve(Some("/from/env".to_string()), &flagged).unwrap();
        assert_eq!(config.root, PathBuf::from("/from/flag"));

        let config = ScanConfig::resolve(Some(String::new()), &args).unwrap();
        assert_eq!(config.root, PathBuf::from("."));
    }

    #[test]
    fn test_custom_paths_are_excluded_by_basename() {
        let args = ScanArgs {
            manifest: Some(PathBuf::from("out/snapshot.json")),
            log_file: Some(PathBuf::from("logs/run.log")),
            ..ScanArgs::default()
        };
        let config = ScanConfig::resolve(None, &args).unwrap();

        assert!(config.excluder.is_excluded("snapshot.json"));
        assert!(config.excluder.is_excluded("logs/run.log"));
        assert!(!config.excluder.is_excluded("manifest.json"));
    }

    #[test]
    fn test_extra_and_disabled_excludes() {
        let args = ScanArgs {
            excludes: vec!["screen/".to_string(), "Start_Api.bat".to_string()],
            no_default_excludes: true,
            ..ScanArgs::default()
        };
        let config = ScanConfig::resolve(None, &args).unwrap();

        assert!(config.excluder.is_excluded("screen/a.png"));
        assert!(config.excluder.is_excluded("Start_Api.bat"));
        assert!(!config.excluder.is_excluded(".gitignore"));
    }

    #[test]
    fn test_algorithm() {
        let args = ScanArgs {
            algo: Some("blake3".to_string()),
            ..ScanArgs::default()
        };
        let config = ScanConfig::resolve(None, &args).unwrap();
        assert_eq!(config.algorithm, Algorithm::Blake3);
        assert_eq!(config.builder().digest_algorithm(), Algorithm::Blake3);

        let args = ScanArgs {
            algo: Some("md5".to_string()),
            ..ScanArgs::default()
        };
        assert!(ScanConfig::resolve(None, &args).is_err());
    }
}
