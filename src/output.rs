//! Output formatting and styling module.
//!
//! All user-facing terminal output goes through [`OutputFormatter`], so the
//! colours and symbols stay consistent between commands. Diagnostic messages
//! use the `log` macros instead and end up on stderr.

use crate::file_organizer::{MoveOutcome, PlannedMove};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Progress bars for operations
/// - Summary tables with statistics
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use foldersort::output::OutputFormatter;
    /// OutputFormatter::success("Moved: a.txt -> Documents/a.txt");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints one organize outcome with the symbol matching its kind.
    pub fn outcome(outcome: &MoveOutcome) {
        match outcome {
            MoveOutcome::Moved { .. } => Self::success(&outcome.to_string()),
            MoveOutcome::PermissionDenied { .. } | MoveOutcome::OtherError { .. } => {
                Self::error(&outcome.to_string())
            }
        }
    }

    /// Prints the tail of the activity log, dimmed.
    pub fn recent_activity(lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        Self::header("Recent activity");
        for line in lines {
            println!("  {}", line.dimmed());
        }
    }

    /// Prints the moves a dry run predicts, one per line.
    pub fn planned_moves(planned: &[PlannedMove]) {
        for planned_move in planned {
            let final_name = planned_move
                .destination
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default();
            println!(
                " - {} {} {}/{}",
                planned_move.file_name,
                "→".cyan(),
                planned_move.folder,
                final_name
            );
        }
    }

    /// Creates a progress bar for `total` files.
    ///
    /// The bar hides itself when stderr is not a terminal.
    ///
    /// ```no_run
    /// use foldersort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints a summary table with file counts by destination folder.
    ///
    /// # Arguments
    ///
    /// * `folder_counts` - Destination folder names mapped to file counts
    /// * `total_files` - Total number of files in the table
    ///
    /// # Example
    ///
    /// ```no_run
    /// use foldersort::output::OutputFormatter;
    /// use std::collections::HashMap;
    ///
    /// let mut counts = HashMap::new();
    /// counts.insert("Documents".to_string(), 15);
    /// counts.insert("Images".to_string(), 8);
    /// OutputFormatter::summary_table(&counts, 23);
    /// ```
    pub fn summary_table(folder_counts: &HashMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let mut folders: Vec<_> = folder_counts.iter().collect();
        folders.sort_by_key(|&(name, _)| name);

        let max_folder_len = folders
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(6); // "Folder"

        println!(
            "{:<width$} | {}",
            "Folder".bold(),
            "Files".bold(),
            width = max_folder_len
        );
        println!("{}", "-".repeat(max_folder_len + 10));

        for (folder, count) in &folders {
            println!(
                "{:<width$} | {} {}",
                folder,
                count.to_string().green(),
                file_word(**count),
                width = max_folder_len
            );
        }

        println!("{}", "-".repeat(max_folder_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            file_word(total_files),
            width = max_folder_len
        );
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

fn file_word(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
