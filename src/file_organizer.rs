/// File organization: moving the files of a folder into destination sub-folders.
///
/// This module routes each regular, non-hidden file of a source folder to the
/// sub-folder its extension maps to (or to `Others`), picks a free name when
/// the destination is taken, and moves it. Every file produces exactly one
/// [`MoveOutcome`]; a failure on one file never stops the run.
use crate::extension_index::{ExtensionIndex, FALLBACK_FOLDER};
use std::collections::{HashMap, HashSet, VecDeque};
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// The result of organizing a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The file now lives at `destination`, inside `folder`.
    Moved {
        file_name: String,
        folder: String,
        destination: PathBuf,
    },
    /// The file system refused the operation.
    PermissionDenied { file_name: String },
    /// Any other failure, with a human-readable reason.
    OtherError { file_name: String, message: String },
}

impl MoveOutcome {
    /// Name of the source file this outcome is about.
    pub fn file_name(&self) -> &str {
        match self {
            Self::Moved { file_name, .. }
            | Self::PermissionDenied { file_name }
            | Self::OtherError { file_name, .. } => file_name,
        }
    }

    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }

    /// Builds the outcome for a finished move attempt.
    fn from_move_result(
        file_name: String,
        folder: &str,
        destination: PathBuf,
        result: io::Result<()>,
    ) -> Self {
        match result {
            Ok(()) => Self::Moved {
                file_name,
                folder: folder.to_string(),
                destination,
            },
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                Self::PermissionDenied { file_name }
            }
            Err(e) => Self::OtherError {
                file_name,
                message: e.to_string(),
            },
        }
    }
}

impl fmt::Display for MoveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Moved {
                file_name,
                folder,
                destination,
            } => {
                let final_name = destination
                    .file_name()
                    .map(|n| n.to_string_lossy())
                    .unwrap_or_default();
                write!(f, "Moved: {} -> {}/{}", file_name, folder, final_name)
            }
            Self::PermissionDenied { file_name } => {
                write!(f, "Permission denied: {}", file_name)
            }
            Self::OtherError { file_name, message } => {
                write!(f, "Failed to move {}: {}", file_name, message)
            }
        }
    }
}

/// Errors that abort a run before any file is touched.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The source folder is missing or is not a directory.
    #[error("Invalid source folder {}: {source}", .path.display())]
    InvalidBasePath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The `Others` folder could not be created.
    #[error("Failed to create fallback folder {}: {source}", .path.display())]
    FallbackFolderCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The source folder could not be listed.
    #[error("Failed to read directory {}: {source}", .path.display())]
    ReadDirFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// A move that [`FileOrganizer::plan`] predicts without performing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub file_name: String,
    pub folder: String,
    pub destination: PathBuf,
}

/// Counts of outcomes for a finished run.
#[derive(Debug, Clone, Default)]
pub struct OrganizeSummary {
    /// Files moved, keyed by destination folder.
    pub moved_by_folder: HashMap<String, usize>,
    pub permission_denied: usize,
    pub errors: usize,
}

impl OrganizeSummary {
    pub fn record(&mut self, outcome: &MoveOutcome) {
        match outcome {
            MoveOutcome::Moved { folder, .. } => {
                *self.moved_by_folder.entry(folder.clone()).or_insert(0) += 1;
            }
            MoveOutcome::PermissionDenied { .. } => self.permission_denied += 1,
            MoveOutcome::OtherError { .. } => self.errors += 1,
        }
    }

    pub fn moved(&self) -> usize {
        self.moved_by_folder.values().sum()
    }

    pub fn failures(&self) -> usize {
        self.permission_denied + self.errors
    }
}

/// An eligible directory entry waiting to be processed.
#[derive(Debug)]
struct PendingFile {
    name: String,
    os_name: OsString,
    path: PathBuf,
}

/// A run in progress; yields one [`MoveOutcome`] per eligible file, in
/// directory listing order.
///
/// Files are moved lazily as the iterator advances, so the caller can report
/// each outcome before the next file is touched.
pub struct OrganizeRun<'a> {
    source: PathBuf,
    index: &'a ExtensionIndex,
    pending: std::vec::IntoIter<PendingFile>,
    queued: VecDeque<MoveOutcome>,
}

impl OrganizeRun<'_> {
    /// Number of eligible files not yet processed.
    pub fn remaining_files(&self) -> usize {
        self.pending.len()
    }

    /// Runs to completion and returns every outcome.
    pub fn collect_outcomes(self) -> Vec<MoveOutcome> {
        self.collect()
    }

    fn process(&mut self, file: PendingFile) {
        let mut folder = self.index.destination_for(&file.name).to_string();

        let folder_path = match prepare_folder(&self.source, &folder) {
            Ok(path) => path,
            Err(e) => {
                log::warn!(
                    "Could not create folder '{}' for {}: {}",
                    folder,
                    file.name,
                    e
                );
                self.queued.push_back(MoveOutcome::OtherError {
                    file_name: file.name.clone(),
                    message: format!(
                        "could not create folder '{}' ({}), using {} instead",
                        folder, e, FALLBACK_FOLDER
                    ),
                });
                folder = FALLBACK_FOLDER.to_string();
                self.source.join(FALLBACK_FOLDER)
            }
        };

        let destination = FileOrganizer::unique_destination(&folder_path, &file.os_name);
        log::debug!("{} -> {}", file.path.display(), destination.display());

        let result = FileOrganizer::move_file(&file.path, &destination);
        self.queued.push_back(MoveOutcome::from_move_result(
            file.name,
            &folder,
            destination,
            result,
        ));
    }
}

impl Iterator for OrganizeRun<'_> {
    type Item = MoveOutcome;

    fn next(&mut self) -> Option<MoveOutcome> {
        if let Some(outcome) = self.queued.pop_front() {
            return Some(outcome);
        }
        let file = self.pending.next()?;
        self.process(file);
        self.queued.pop_front()
    }
}

/// Organizes files by moving them into destination sub-folders.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Starts organizing `source` according to `index`.
    ///
    /// Before returning, the `Others` folder is created if needed and the
    /// folder is listed once; the returned [`OrganizeRun`] then moves one file
    /// per call to `next`.
    ///
    /// # Errors
    ///
    /// Fails without touching any file when the source folder is invalid,
    /// when `Others` cannot be created, or when the folder cannot be listed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use foldersort::config::FolderConfig;
    /// use foldersort::extension_index::ExtensionIndex;
    /// use foldersort::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let index = ExtensionIndex::from_config(&FolderConfig::default());
    /// let run = FileOrganizer::organize(Path::new("/home/me/Downloads"), &index)?;
    /// for outcome in run {
    ///     println!("{}", outcome);
    /// }
    /// # Ok::<(), foldersort::file_organizer::OrganizeError>(())
    /// ```
    pub fn organize<'a>(source: &Path, index: &'a ExtensionIndex) -> OrganizeResult<OrganizeRun<'a>> {
        validate_source(source)?;

        let fallback = source.join(FALLBACK_FOLDER);
        if !fallback.is_dir() {
            fs::create_dir_all(&fallback).map_err(|e| OrganizeError::FallbackFolderCreation {
                path: fallback.clone(),
                source: e,
            })?;
            log::info!("Created fallback folder {}", fallback.display());
        }

        let pending = list_eligible(source)?;
        log::info!(
            "Organizing {} files in {}",
            pending.len(),
            source.display()
        );

        Ok(OrganizeRun {
            source: source.to_path_buf(),
            index,
            pending: pending.into_iter(),
            queued: VecDeque::new(),
        })
    }

    /// Predicts where each eligible file would go, without creating folders
    /// or moving anything.
    pub fn plan(source: &Path, index: &ExtensionIndex) -> OrganizeResult<Vec<PlannedMove>> {
        validate_source(source)?;

        let mut claimed: HashSet<PathBuf> = HashSet::new();
        let planned = list_eligible(source)?
            .into_iter()
            .map(|file| {
                let mut folder = index.destination_for(&file.name).to_string();
                let usable = folder_path(source, &folder)
                    .map(|path| !path.exists() || path.is_dir())
                    .unwrap_or(false);
                if !usable {
                    folder = FALLBACK_FOLDER.to_string();
                }

                let folder_dir = source.join(&folder);
                let destination = resolve_free_name(&folder_dir, &file.os_name, |candidate| {
                    is_occupied(candidate) || claimed.contains(candidate)
                });
                claimed.insert(destination.clone());

                PlannedMove {
                    file_name: file.name,
                    folder,
                    destination,
                }
            })
            .collect();

        Ok(planned)
    }

    /// Returns `folder/file_name`, or the first free `stem (N).ext` variant
    /// when that path is already taken.
    ///
    /// Anything present at a path counts as taken, including directories and
    /// dangling symbolic links, so no existing entry is ever overwritten.
    pub fn unique_destination(folder: &Path, file_name: impl AsRef<std::ffi::OsStr>) -> PathBuf {
        resolve_free_name(folder, file_name.as_ref(), is_occupied)
    }

    /// Moves a file, falling back to copy-then-delete when a plain rename
    /// cannot cross file systems.
    ///
    /// On failure the source file is left in place.
    pub fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
        match fs::rename(source, destination) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                log::debug!(
                    "Rename across devices, copying {} instead",
                    source.display()
                );
                copy_then_remove(source, destination)
            }
            Err(e) => Err(e),
        }
    }
}

fn validate_source(source: &Path) -> OrganizeResult<()> {
    let metadata = fs::metadata(source).map_err(|e| OrganizeError::InvalidBasePath {
        path: source.to_path_buf(),
        source: e,
    })?;
    if !metadata.is_dir() {
        return Err(OrganizeError::InvalidBasePath {
            path: source.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
        });
    }
    Ok(())
}

/// Lists regular, non-hidden files directly under `source`, in listing order.
fn list_eligible(source: &Path) -> OrganizeResult<Vec<PendingFile>> {
    let entries = fs::read_dir(source).map_err(|e| OrganizeError::ReadDirFailed {
        path: source.to_path_buf(),
        source: e,
    })?;

    let mut pending = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {}", source.display(), e);
                continue;
            }
        };

        let os_name = entry.file_name();
        let name = os_name.to_string_lossy().into_owned();
        let path = entry.path();
        if name.starts_with('.') || !path.is_file() {
            log::debug!("Skipping {}", path.display());
            continue;
        }

        pending.push(PendingFile {
            name,
            os_name,
            path,
        });
    }
    Ok(pending)
}

/// Joins a configured folder name onto `source`, rejecting names that would
/// leave it.
fn folder_path(source: &Path, folder: &str) -> io::Result<PathBuf> {
    let relative = Path::new(folder);
    let contained = !folder.is_empty()
        && relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if !contained {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "folder name must be a relative path inside the organized folder",
        ));
    }
    Ok(source.join(relative))
}

/// Makes sure the destination folder exists and is a directory.
fn prepare_folder(source: &Path, folder: &str) -> io::Result<PathBuf> {
    let path = folder_path(source, folder)?;
    if !path.is_dir() {
        fs::create_dir_all(&path)?;
        log::info!("Created folder {}", path.display());
    }
    Ok(path)
}

fn is_occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn resolve_free_name(
    folder: &Path,
    file_name: &std::ffi::OsStr,
    is_taken: impl Fn(&Path) -> bool,
) -> PathBuf {
    let candidate = folder.join(file_name);
    if !is_taken(&candidate) {
        return candidate;
    }

    let name = file_name.to_string_lossy();
    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
        _ => (&name[..], ""),
    };

    let mut counter: u64 = 1;
    loop {
        let candidate = folder.join(format!("{} ({}){}", stem, counter, ext));
        if !is_taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

fn copy_then_remove(source: &Path, destination: &Path) -> io::Result<()> {
    if let Err(e) = fs::copy(source, destination) {
        discard_partial_copy(destination);
        return Err(e);
    }
    if let Err(e) = fs::remove_file(source) {
        discard_partial_copy(destination);
        return Err(e);
    }
    Ok(())
}

fn discard_partial_copy(destination: &Path) {
    if is_occupied(destination)
        && let Err(e) = fs::remove_file(destination)
    {
        log::warn!(
            "Could not remove incomplete copy {}: {}",
            destination.display(),
            e
        );
    }
}
