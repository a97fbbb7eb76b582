//! foldersort - sort the files of a folder into sub-folders by extension
//!
//! This library loads a folder-to-extensions mapping, builds an extension
//! index from it, and moves every regular, non-hidden file of a folder into
//! its destination sub-folder (`Others` when nothing matches). Name conflicts
//! are resolved with numbered suffixes and every outcome can be recorded in
//! an append-only activity log.

pub mod activity_log;
pub mod cli;
pub mod config;
pub mod extension_index;
pub mod file_organizer;
pub mod output;

pub use activity_log::ActivityLog;
pub use config::{ConfigError, FolderConfig, FolderRule};
pub use extension_index::{ExtensionIndex, FALLBACK_FOLDER};
pub use file_organizer::{FileOrganizer, MoveOutcome, OrganizeError, OrganizeRun, OrganizeSummary};

pub use cli::{Cli, run_cli};
