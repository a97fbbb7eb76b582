//! Command-line interface module for foldersort.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing (via `clap`)
//! - The confirmation prompt before files are moved
//! - Organization orchestration, progress display and activity logging
//! - Configuration bootstrapping and editing

use crate::activity_log::{ActivityLog, DEFAULT_LOG_FILE, RECENT_LINES};
use crate::config::{ConfigError, FolderConfig, LOCAL_CONFIG_JSON};
use crate::extension_index::ExtensionIndex;
use crate::file_organizer::{FileOrganizer, OrganizeError, OrganizeSummary, PlannedMove};
use crate::output::OutputFormatter;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::Command as Process;
use thiserror::Error;

/// Sort the files of a folder into sub-folders by extension.
#[derive(Debug, Parser)]
#[command(name = "foldersort", version, about)]
pub struct Cli {
    /// Configuration file (JSON, or TOML when it ends in .toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Activity log file
    #[arg(long, global = true, value_name = "PATH", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Print diagnostic messages (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Move the files of FOLDER into sub-folders by extension
    Organize {
        /// Folder whose files are sorted
        folder: PathBuf,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
        /// Show where files would go without moving anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Write the default configuration file
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },
    /// Open the configuration file in an editor
    EditConfig,
    /// Show the most recent activity log entries
    History {
        /// Number of lines to show
        #[arg(short = 'n', long, default_value_t = RECENT_LINES)]
        lines: usize,
    },
}

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Organize(#[from] OrganizeError),

    #[error("Could not read activity log {}: {source}", .path.display())]
    ActivityLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not read confirmation: {0}")]
    Prompt(#[source] io::Error),

    #[error("Could not open {} in an editor: {source}", .path.display())]
    EditorLaunch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Runs the CLI, reading confirmations from stdin.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use foldersort::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from(["foldersort", "organize", "/path/to/folder", "--yes"]);
/// if let Err(e) = run_cli(&cli) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(cli: &Cli) -> Result<(), CliError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    run_cli_with_input(cli, &mut input)
}

/// Runs the CLI, reading confirmations from `input`.
pub fn run_cli_with_input(cli: &Cli, input: &mut dyn BufRead) -> Result<(), CliError> {
    let activity_log = ActivityLog::new(&cli.log_file);

    match &cli.command {
        Command::Organize {
            folder,
            yes,
            dry_run,
        } => {
            let config = FolderConfig::load(cli.config.as_deref())?;
            let index = ExtensionIndex::from_config(&config);
            if *dry_run {
                organize_directory_dry_run(folder, &index)
            } else {
                organize_directory(folder, &index, &activity_log, *yes, input)
            }
        }
        Command::Init { force } => init_config(cli.config.as_deref(), *force),
        Command::EditConfig => edit_config(cli.config.as_deref()),
        Command::History { lines } => show_history(&activity_log, *lines),
    }
}

/// Organizes `folder` after showing recent activity and asking for
/// confirmation (unless `assume_yes`).
///
/// Every outcome is printed and appended to the activity log. Failing to
/// write the log only produces a warning.
pub fn organize_directory(
    folder: &Path,
    index: &ExtensionIndex,
    activity_log: &ActivityLog,
    assume_yes: bool,
    input: &mut dyn BufRead,
) -> Result<(), CliError> {
    match activity_log.tail(RECENT_LINES) {
        Ok(lines) => OutputFormatter::recent_activity(&lines),
        Err(e) => log::warn!(
            "Could not read activity log {}: {}",
            activity_log.path().display(),
            e
        ),
    }

    let planned = FileOrganizer::plan(folder, index)?;
    if planned.is_empty() {
        OutputFormatter::info(&format!("No files to organize in {}", folder.display()));
        return Ok(());
    }

    OutputFormatter::header(&format!("Organizing contents of: {}", folder.display()));
    let planned_counts = count_by_folder(&planned);
    OutputFormatter::summary_table(&planned_counts, planned.len());

    if !assume_yes {
        let prompt = format!(
            "Organize {} {} in {}?",
            planned.len(),
            if planned.len() == 1 { "file" } else { "files" },
            folder.display()
        );
        let mut stdout = io::stdout();
        if !confirm(&prompt, input, &mut stdout).map_err(CliError::Prompt)? {
            OutputFormatter::warning("Cancelled. No files were moved.");
            return Ok(());
        }
    }

    let mut log_failed = false;
    let mut record = |message: &str| {
        if let Err(e) = activity_log.append(message)
            && !log_failed
        {
            log_failed = true;
            OutputFormatter::warning(&format!(
                "Could not write activity log {}: {}",
                activity_log.path().display(),
                e
            ));
        }
    };

    record(&format!("Started organizing: {}", folder.display()));

    let mut run = match FileOrganizer::organize(folder, index) {
        Ok(run) => run,
        Err(e) => {
            record(&format!("Error: {}", e));
            return Err(e.into());
        }
    };
    let total = run.remaining_files();
    let pb = OutputFormatter::create_progress_bar(total as u64);
    let mut summary = OrganizeSummary::default();

    while let Some(outcome) = run.next() {
        pb.suspend(|| OutputFormatter::outcome(&outcome));
        record(&outcome.to_string());
        summary.record(&outcome);
        pb.set_position((total - run.remaining_files()) as u64);
    }
    pb.finish_and_clear();

    record(&format!(
        "Done organizing: {} moved, {} failed",
        summary.moved(),
        summary.failures()
    ));

    OutputFormatter::summary_table(&summary.moved_by_folder, summary.moved());
    if summary.failures() > 0 {
        OutputFormatter::warning(&format!(
            "{} {} could not be organized. Please review errors above.",
            summary.failures(),
            if summary.failures() == 1 { "step" } else { "steps" }
        ));
    }

    Ok(())
}

/// Shows where every file would go without touching anything.
pub fn organize_directory_dry_run(folder: &Path, index: &ExtensionIndex) -> Result<(), CliError> {
    OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", folder.display()));

    let planned = FileOrganizer::plan(folder, index)?;
    if planned.is_empty() {
        OutputFormatter::info("No files found to organize.");
        return Ok(());
    }

    OutputFormatter::header("Files would be organized as follows:");
    OutputFormatter::planned_moves(&planned);
    OutputFormatter::summary_table(&count_by_folder(&planned), planned.len());
    OutputFormatter::dry_run_notice("No files were modified.");
    Ok(())
}

/// Asks a yes/no question; anything but `y` or `yes` (including end of
/// input) means no.
pub fn confirm(prompt: &str, input: &mut dyn BufRead, output: &mut dyn Write) -> io::Result<bool> {
    write!(output, "{} [y/N] ", prompt)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn init_config(explicit: Option<&Path>, force: bool) -> Result<(), CliError> {
    let path = explicit.unwrap_or(Path::new(LOCAL_CONFIG_JSON));
    FolderConfig::write_default(path, force)?;
    OutputFormatter::success(&format!("Wrote default configuration to {}", path.display()));
    Ok(())
}

fn edit_config(explicit: Option<&Path>) -> Result<(), CliError> {
    let path = FolderConfig::locate(explicit)?;
    OutputFormatter::info(&format!("Opening {}", path.display()));

    let launch = match editor_command(|name| std::env::var(name).ok()) {
        Some((program, args)) => Process::new(&program)
            .args(&args)
            .arg(&path)
            .status()
            .and_then(|status| {
                if status.success() {
                    Ok(())
                } else {
                    Err(io::Error::other(format!("{} exited with {}", program, status)))
                }
            }),
        None => system_opener(&path).spawn().map(|_| ()),
    };

    launch.map_err(|e| CliError::EditorLaunch { path, source: e })
}

/// Picks the editor from `$VISUAL`, then `$EDITOR`, skipping blank values.
///
/// The value is split on whitespace into a program and its leading
/// arguments, so `code -w` works.
fn editor_command(lookup: impl Fn(&str) -> Option<String>) -> Option<(String, Vec<String>)> {
    ["VISUAL", "EDITOR"].into_iter().find_map(|name| {
        let value = lookup(name)?;
        let mut parts = value.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some((program, parts.collect()))
    })
}

/// The platform's "open with default application" command for `path`.
fn system_opener(path: &Path) -> Process {
    if cfg!(target_os = "windows") {
        let mut cmd = Process::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    } else if cfg!(target_os = "macos") {
        let mut cmd = Process::new("open");
        cmd.arg(path);
        cmd
    } else {
        let mut cmd = Process::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}

fn show_history(activity_log: &ActivityLog, lines: usize) -> Result<(), CliError> {
    let recent = activity_log
        .tail(lines)
        .map_err(|e| CliError::ActivityLog {
            path: activity_log.path().to_path_buf(),
            source: e,
        })?;

    if recent.is_empty() {
        OutputFormatter::info("No activity recorded yet.");
    }
    for line in &recent {
        OutputFormatter::plain(line);
    }
    Ok(())
}

fn count_by_folder(planned: &[PlannedMove]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for planned_move in planned {
        *counts.entry(planned_move.folder.clone()).or_insert(0) += 1;
    }
    counts
}
