/// Persistent activity log.
///
/// Every organize run appends one line per file outcome (plus start and end
/// markers) to a plain text file, so past runs can be reviewed later. Lines
/// look like `[2025-11-09 14:30] Moved: a.txt -> Documents/a.txt`.
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Default log file, relative to the current directory.
pub const DEFAULT_LOG_FILE: &str = "foldersort.log";

/// Number of lines shown before a run.
pub const RECENT_LINES: usize = 10;

/// Append-only, line-oriented log file.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: PathBuf,
}

impl ActivityLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a timestamped line, creating the file if needed.
    pub fn append(&self, message: &str) -> io::Result<()> {
        self.append_at(Local::now(), message)
    }

    /// Appends a line stamped with the given time.
    pub fn append_at(&self, when: DateTime<Local>, message: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", format_line(when, message))
    }

    /// Returns the last `count` lines, oldest first.
    ///
    /// A log that does not exist yet is simply empty.
    pub fn tail(&self, count: usize) -> io::Result<Vec<String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let lines: Vec<&str> = content.lines().collect();
        let start = lines.len().saturating_sub(count);
        Ok(lines[start..].iter().map(|line| line.to_string()).collect())
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_FILE)
    }
}

/// Formats a log line as `[YYYY-MM-DD HH:MM] message`.
///
/// Control characters in `message` (file names may contain newlines) are
/// escaped, so every record stays on a single line.
pub fn format_line(when: DateTime<Local>, message: &str) -> String {
    let mut line = format!("[{}] ", when.format("%Y-%m-%d %H:%M"));
    for c in message.chars() {
        if c.is_control() {
            line.extend(c.escape_default());
        } else {
            line.push(c);
        }
    }
    line
}
