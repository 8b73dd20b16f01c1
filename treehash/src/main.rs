mod config;
mod logging;
mod output;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use config::{ROOT_ENV, ScanArgs, ScanConfig};
use logging::{Console, LogConfig};
use output::{DiffOutput, HashOutput, HashedFile, OutputWriter, ScanOutput};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use treehash_core::{
    Algorithm, ChangeLog, Digest, ManifestStore, Reporter, TracingReporter, compare,
};

/// Treehash - fingerprint a directory tree and report what changed
#[derive(Parser)]
#[command(name = "treehash")]
#[command(about = "Fingerprint a directory tree into a JSON manifest", long_about = None)]
#[command(version)]
struct Cli {
    /// Scan options for the bare invocation
    #[command(flatten)]
    scan: ScanArgs,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log filter, overridden by the TREEHASH_LOG env var
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Disable colored console logs
    #[arg(long, global = true)]
    no_color: bool,

    /// Defaults to `scan`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash the tree, report added and modified files, save the manifest
    Scan(ScanArgs),

    /// Compare two manifest files
    Diff {
        /// Older manifest
        old: PathBuf,

        /// Newer manifest
        new: PathBuf,
    },

    /// Print file digests
    Hash {
        /// Files to hash
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Hash algorithm: sha1 or blake3
        #[arg(long, default_value = "sha1")]
        algo: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let out = OutputWriter::new(cli.json);
    let pause = should_pause(&cli);

    let code = match run(cli, &out) {
        Ok(()) => 0,
        Err(e) => {
            out.write_error(&e, 1);
            1
        }
    };

    if pause {
        wait_for_enter();
    }

    std::process::exit(code);
}

fn run(cli: Cli, out: &OutputWriter) -> Result<()> {
    let mut log_config = LogConfig {
        level: cli.log_level,
        console: if cli.json {
            Console::Stderr
        } else {
            Console::Stdout
        },
        color: !cli.no_color,
        file: None,
    };

    let command = match cli.command {
        None => Commands::Scan(cli.scan),
        Some(command) if cli.scan == ScanArgs::default() => command,
        Some(_) => bail!("Scan options such as --root go after `scan` or are used without a subcommand"),
    };

    match command {
        Commands::Scan(args) => {
            let config = ScanConfig::resolve(std::env::var(ROOT_ENV).ok(), &args)?;
            log_config.file = Some(config.log_file.clone());
            logging::init_logging(&log_config)?;
            cmd_scan(&config, out)
        }
        Commands::Diff { old, new } => {
            logging::init_logging(&log_config)?;
            cmd_diff(&old, &new, out)
        }
        Commands::Hash { paths, algo } => {
            logging::init_logging(&log_config)?;
            cmd_hash(&paths, &algo, out)
        }
    }
}

fn cmd_scan(config: &ScanConfig, out: &OutputWriter) -> Result<()> {
    let change_log = ChangeLog::open(&config.log_file).with_context(|| {
        format!("Failed to open log file {}", config.log_file.display())
    })?;
    let mut reporter = TracingReporter::with_change_log(change_log);
    let store = ManifestStore::new(&config.manifest);

    let outcome = store
        .update(&config.root, &config.builder(), &mut reporter)
        .with_context(|| format!("Failed to scan {}", config.root.display()))?;

    info!("Manifest saved to {}", config.manifest.display());

    let data = ScanOutput {
        success: true,
        result_code: 0,
        manifest: config.manifest.display().to_string(),
        algorithm: config.algorithm.to_string(),
        files: outcome.manifest.len(),
        added: outcome.diff.added.clone(),
        modified: outcome.diff.modified.clone(),
        finished_at: chrono::Local::now().to_rfc3339(),
    };

    out.write(&data, || {
        format!(
            "Manifest written to {} ({} files, {} added, {} modified)\n",
            config.manifest.display(),
            outcome.manifest.len(),
            outcome.diff.added.len(),
            outcome.diff.modified.len()
        )
    })
}

fn cmd_diff(old_path: &Path, new_path: &Path, out: &OutputWriter) -> Result<()> {
    let old = ManifestStore::new(old_path)
        .load()
        .with_context(|| format!("Failed to load {}", old_path.display()))?;
    let new = ManifestStore::new(new_path)
        .load()
        .with_context(|| format!("Failed to load {}", new_path.display()))?;

    let diff = compare(&old, &new);
    TracingReporter::new().changes(&diff)?;

    let data = DiffOutput {
        success: true,
        result_code: 0,
        old: old_path.display().to_string(),
        new: new_path.display().to_string(),
        added: diff.added.clone(),
        modified: diff.modified.clone(),
    };

    out.write(&data, || {
        format!("{} added, {} modified\n", diff.added.len(), diff.modified.len())
    })
}

fn cmd_hash(paths: &[PathBuf], algo: &str, out: &OutputWriter) -> Result<()> {
    let algorithm = Algorithm::parse(algo).with_context(|| format!("Invalid --algo {}", algo))?;

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let digest = Digest::hash_file(algorithm, path)
            .with_context(|| format!("Failed to hash {}", path.display()))?;
        files.push(HashedFile {
            path: path.display().to_string(),
            digest,
        });
    }

    let data = HashOutput {
        success: true,
        result_code: 0,
        algorithm: algorithm.to_string(),
        files,
    };

    out.write(&data, || {
        data.files
            .iter()
            .map(|f| format!("{}  {}\n", f.digest, f.path))
            .collect()
    })
}

/// Keep the console open after a scan when run interactively.
fn should_pause(cli: &Cli) -> bool {
    let no_pause = match &cli.command {
        None => cli.scan.no_pause,
        Some(Commands::Scan(args)) => args.no_pause,
        Some(_) => return false,
    };
    !no_pause && !cli.json && atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stdout)
}

fn wait_for_enter() {
    print!("Press Enter to exit...");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_means_scan() {
        let cli = Cli::try_parse_from(["treehash"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_parse_scan_options() {
        let cli = Cli::try_parse_from([
            "treehash",
            "scan",
            "--root",
            "/data",
            "--exclude",
            "screen/",
            "--exclude",
            "Start_Api.bat",
            "--algo",
            "blake3",
            "--no-pause",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Scan(args)) => {
                assert_eq!(args.root, Some(PathBuf::from("/data")));
                assert_eq!(args.excludes, vec!["screen/", "Start_Api.bat"]);
                assert_eq!(args.algo.as_deref(), Some("blake3"));
                assert!(args.no_pause);
            }
            _ => panic!("expected scan"),
        }
    }

    #[test]
    fn test_json_disables_pause() {
        let cli = Cli::try_parse_from(["treehash", "--json"]).unwrap();
        assert!(!should_pause(&cli));

        let cli = Cli::try_parse_from(["treehash", "scan", "--no-pause"]).unwrap();
        assert!(!should_pause(&cli));

        let cli = Cli::try_parse_from(["treehash", "--no-pause"]).unwrap();
        assert!(cli.scan.no_pause);
        assert!(!should_pause(&cli));

        let cli = Cli::try_parse_from(["treehash", "hash", "a.txt"]).unwrap();
        assert!(!should_pause(&cli));
    }

    #[test]
    fn test_bare_invocation_takes_scan_options() {
        let cli = Cli::try_parse_from(["treehash", "-r", "/data", "--exclude", "screen/"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.scan.root, Some(PathBuf::from("/data")));
        assert_eq!(cli.scan.excludes, vec!["screen/"]);
    }

    #[test]
    fn test_root_is_rejected_outside_scan() {
        assert!(Cli::try_parse_from(["treehash", "hash", "a.txt", "--root", "/data"]).is_err());
        assert!(Cli::try_parse_from(["treehash", "diff", "a.json", "b.json", "--root", "/data"]).is_err());

        let cli = Cli::try_parse_from(["treehash", "--root", "/data", "hash", "a.txt"]).unwrap();
        let err = run(cli, &OutputWriter::new(true)).unwrap_err();
        assert!(err.to_string().contains("--root"));
    }

    #[test]
    fn test_scan_end_to_end() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), b"hello").unwrap();

        let args = ScanArgs {
            root: Some(temp_dir.path().to_path_buf()),
            ..ScanArgs::default()
        };
        let config = ScanConfig::resolve(None, &args).unwrap();
        cmd_scan(&config, &OutputWriter::new(true)).unwrap();
        cmd_scan(&config, &OutputWriter::new(true)).unwrap();

        let manifest = ManifestStore::new(&config.manifest).load().unwrap();
        assert_eq!(manifest.paths().collect::<Vec<_>>(), vec!["a.txt"]);

        let log = std::fs::read_to_string(&config.log_file).unwrap();
        assert_eq!(log.matches("Added files:").count(), 1);
        assert!(log.contains("a.txt: new hash: aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d"));
    }

    #[test]
    fn test_scan_logs_append_to_log_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), b"hello").unwrap();

        let args = ScanArgs {
            root: Some(temp_dir.path().to_path_buf()),
            ..ScanArgs::default()
        };
        let config = ScanConfig::resolve(None, &args).unwrap();
        let log_config = LogConfig {
            level: "info".to_string(),
            console: Console::Stderr,
            color: false,
            file: Some(config.log_file.clone()),
        };

        for _ in 0..2 {
            let subscriber = logging::build_subscriber(&log_config).unwrap();
            tracing::subscriber::with_default(subscriber, || {
                cmd_scan(&config, &OutputWriter::new(true)).unwrap();
            });
        }

        let log = std::fs::read_to_string(&config.log_file).unwrap();
        assert_eq!(log.matches("Processing file: a.txt").count(), 2);
        assert!(log.contains("\nAdded files:\n  a.txt: new hash: aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d\n"));
        assert!(!log.contains("\x1b["));
    }
}
