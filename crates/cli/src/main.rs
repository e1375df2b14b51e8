//! remerge command-line tool.
//!
//! Resolves diff3-style conflict markers in the given files, or in every
//! file the surrounding Jujutsu or Git repository reports as conflicted.

mod report;
mod style;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::task::JoinSet;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use remerge_core::config::{AppConfig, ResolutionOptions};
use remerge_core::{resolve_file, VcsClient};

use report::{FileEntry, RunReport};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Resolve merge conflict markers that have an unambiguous resolution.
#[derive(Parser, Debug)]
#[command(
    name = "remerge",
    version,
    about = "Resolve diff3-style merge conflicts automatically"
)]
struct Cli {
    /// Files to process. Without files, conflicted files are listed by jj or git.
    files: Vec<PathBuf>,

    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not resolve conflicts where only one side changed.
    #[arg(long)]
    no_trivial: bool,

    /// Do not pull shared leading and trailing lines out of conflicts.
    #[arg(long)]
    no_reduce: bool,

    /// Do not resolve indentation separately from content.
    #[arg(long)]
    no_indentation: bool,

    /// Do not combine lines added at opposite ends of the base.
    #[arg(long)]
    no_added_lines: bool,

    /// Do not normalise a side's line endings to match the others.
    #[arg(long)]
    no_line_endings: bool,

    /// Do not split conflicts on `~~~~~~~` lines.
    #[arg(long)]
    no_split: bool,

    /// Expand tabs to this many columns before resolving.
    #[arg(long, value_name = "WIDTH")]
    untabify: Option<usize>,

    /// Print nothing except errors.
    #[arg(short, long)]
    quiet: bool,

    /// Report what would change without writing any file.
    #[arg(long)]
    dry_run: bool,

    /// Print a JSON report instead of human-readable output.
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Apply the `--no-*` and `--untabify` flags on top of `options`.
    fn apply_overrides(&self, options: &mut ResolutionOptions) {
        if self.no_trivial {
            options.trivial = false;
        }
        if self.no_reduce {
            options.reduce = false;
        }
        if self.no_indentation {
            options.indentation = false;
        }
        if self.no_added_lines {
            options.added_lines = false;
        }
        if self.no_line_endings {
            options.line_endings = false;
        }
        if self.no_split {
            options.split_on_markers = false;
        }
        if self.untabify.is_some() {
            options.untabify_width = self.untabify;
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", style::failed(&format!("Error: {:#}", e)));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Returns whether every conflict seen was fully resolved.
async fn run(cli: Cli) -> Result<bool> {
    let mut config =
        AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply_overrides(&mut config.resolution);
    config.validate().context("invalid options")?;

    init_tracing(&config.output.log_level);
    let quiet = cli.quiet || config.output.quiet;

    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let files = if cli.files.is_empty() {
        discover_files(&cwd, &config).await?
    } else {
        for path in &cli.files {
            if !path.exists() {
                bail!("file not found: {}", path.display());
            }
        }
        cli.files.clone()
    };

    if files.is_empty() && !cli.json {
        if !quiet {
            println!("No conflicted files found");
        }
        return Ok(true);
    }

    let entries = process_files(files, &config.resolution, !cli.dry_run).await?;
    let report = RunReport::new(entries);
    info!(
        resolved = report.total.resolved,
        reduced = report.total.reduced,
        failed = report.total.failed,
        "run finished"
    );

    if cli.json {
        println!("{}", report.to_json().context("failed to encode report")?);
    } else if !quiet {
        for entry in &report.files {
            println!("{}", entry.render_line());
        }
        if let Some(table) = report.summary_table() {
            println!();
            println!("{table}");
        }
    }

    Ok(report.is_success())
}

/// Ask the repository around `cwd` which files are conflicted.
async fn discover_files(cwd: &Path, config: &AppConfig) -> Result<Vec<PathBuf>> {
    let client = VcsClient::detect(cwd, config.vcs.backend)
        .await
        .context("no files given and no repository found")?;
    let files = client
        .conflicted_files()
        .await
        .context("failed to list conflicted files")?;

    debug!(count = files.len(), "discovered conflicted files");
    Ok(files
        .into_iter()
        .map(|path| match path.strip_prefix(cwd) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => path,
        })
        .collect())
}

/// Resolve every file on the blocking pool, returning entries in input order.
async fn process_files(
    files: Vec<PathBuf>,
    options: &ResolutionOptions,
    write: bool,
) -> Result<Vec<FileEntry>> {
    let mut tasks = JoinSet::new();
    for (index, path) in files.into_iter().enumerate() {
        let options = options.clone();
        tasks.spawn_blocking(move || {
            let result = resolve_file(&path, &options, write);
            (index, FileEntry::from_result(path, result))
        });
    }

    let mut entries = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        entries.push(joined.context("file task panicked")?);
    }
    entries.sort_by_key(|(index, _)| *index);
    Ok(entries.into_iter().map(|(_, entry)| entry).collect())
}
