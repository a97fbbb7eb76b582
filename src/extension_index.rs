//! Extension lookup for routing files into destination folders.
//!
//! The index is derived from a [`FolderConfig`] and maps a normalized
//! extension (lowercase, with its leading dot) to the folder that receives
//! files carrying it. Files without an extension use the empty string.
//!
//! # Examples
//!
//! ```
//! use foldersort::config::{FolderConfig, FolderRule};
//! use foldersort::extension_index::ExtensionIndex;
//!
//! let config = FolderConfig::new(vec![
//!     FolderRule::new("Documents", &[".txt"]),
//!     FolderRule::new("Images", &[".PNG"]),
//! ]);
//! let index = ExtensionIndex::from_config(&config);
//! assert_eq!(index.destination_for("photo.png"), "Images");
//! assert_eq!(index.destination_for("notes.TXT"), "Documents");
//! assert_eq!(index.destination_for("setup.exe"), "Others");
//! ```

use crate::config::FolderConfig;
use std::collections::HashMap;

/// Folder that receives every file whose extension has no mapping.
pub const FALLBACK_FOLDER: &str = "Others";

/// Maps normalized extensions to destination folder names.
#[derive(Debug, Clone, Default)]
pub struct ExtensionIndex {
    extension_map: HashMap<String, String>,
}

impl ExtensionIndex {
    /// Creates an empty index; every file routes to [`FALLBACK_FOLDER`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the index from a configuration.
    ///
    /// Folders are visited in configuration order and later entries overwrite
    /// earlier ones, so an extension listed under several folders belongs to
    /// the last of them. Entries are not validated: one without a leading dot
    /// is indexed as written and simply never matches.
    pub fn from_config(config: &FolderConfig) -> Self {
        let mut index = Self::new();
        for folder in config.folders() {
            for ext in &folder.extensions {
                index.add_mapping(ext, &folder.name);
            }
        }
        index
    }

    /// Adds an extension to folder mapping, replacing any previous one.
    pub fn add_mapping(&mut self, ext: &str, folder: &str) {
        if let Some(previous) = self
            .extension_map
            .insert(ext.to_lowercase(), folder.to_string())
            && previous != folder
        {
            log::debug!(
                "Extension '{}' reassigned from {} to {}",
                ext.to_lowercase(),
                previous,
                folder
            );
        }
    }

    /// Looks up the folder for an extension, ignoring case.
    ///
    /// ```
    /// use foldersort::extension_index::ExtensionIndex;
    ///
    /// let mut index = ExtensionIndex::new();
    /// index.add_mapping(".pdf", "Documents");
    /// assert_eq!(index.folder_for_extension(".PDF"), Some("Documents"));
    /// assert_eq!(index.folder_for_extension(".xyz"), None);
    /// ```
    pub fn folder_for_extension(&self, ext: &str) -> Option<&str> {
        self.extension_map
            .get(&ext.to_lowercase())
            .map(String::as_str)
    }

    /// Returns the destination folder for a file name, falling back to
    /// [`FALLBACK_FOLDER`].
    pub fn destination_for(&self, file_name: &str) -> &str {
        self.folder_for_extension(&extension_of(file_name))
            .unwrap_or(FALLBACK_FOLDER)
    }

    pub fn len(&self) -> usize {
        self.extension_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extension_map.is_empty()
    }
}

/// Extracts the lowercase extension of a file name, leading dot included.
///
/// The name is split at its last `.`; a name without one yields `""`.
///
/// ```
/// use foldersort::extension_index::extension_of;
///
/// assert_eq!(extension_of("archive.tar.GZ"), ".gz");
/// assert_eq!(extension_of("README"), "");
/// ```
pub fn extension_of(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(dot) => file_name[dot..].to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FolderRule;

    fn index_for(rules: Vec<FolderRule>) -> ExtensionIndex {
        ExtensionIndex::from_config(&FolderConfig::new(rules))
    }

    #[test]
    fn test_each_extension_maps_to_its_folder() {
        let index = index_for(vec![
            FolderRule::new("Documents", &[".pdf", ".docx", ".txt"]),
            FolderRule::new("Images", &[".jpg", ".png"]),
            FolderRule::new("Audio", &[".mp3", ".wav"]),
        ]);

        assert_eq!(index.len(), 7);
        assert_eq!(index.folder_for_extension(".pdf"), Some("Documents"));
        assert_eq!(index.folder_for_extension(".txt"), Some("Documents"));
        assert_eq!(index.folder_for_extension(".png"), Some("Images"));
        assert_eq!(index.folder_for_extension(".wav"), Some("Audio"));
    }

    #[test]
    fn test_last_writer_wins() {
        let index = index_for(vec![
            FolderRule::new("A", &[".x"]),
            FolderRule::new("B", &[".x"]),
        ]);
        assert_eq!(index.folder_for_extension(".x"), Some("B"));

        let reversed = index_for(vec![
            FolderRule::new("B", &[".x"]),
            FolderRule::new("A", &[".x"]),
        ]);
        assert_eq!(reversed.folder_for_extension(".x"), Some("A"));
    }

    #[test]
    fn test_configured_extensions_are_lowercased() {
        let index = index_for(vec![FolderRule::new("Images", &[".JPG"])]);
        assert_eq!(index.folder_for_extension(".jpg"), Some("Images"));
        assert_eq!(index.destination_for("holiday.Jpg"), "Images");
    }

    #[test]
    fn test_entry_without_dot_never_matches() {
        let index = index_for(vec![FolderRule::new("Documents", &["pdf"])]);
        assert_eq!(index.destination_for("report.pdf"), FALLBACK_FOLDER);
    }

    #[test]
    fn test_unmapped_extension_goes_to_others() {
        let index = index_for(vec![FolderRule::new("Documents", &[".txt"])]);
        assert_eq!(index.destination_for("data.xyz"), "Others");
        assert_eq!(index.destination_for("Makefile"), "Others");
    }

    #[test]
    fn test_empty_extension_can_be_mapped() {
        let index = index_for(vec![FolderRule::new("NoExtension", &[""])]);
        assert_eq!(index.destination_for("LICENSE"), "NoExtension");
        assert_eq!(index.destination_for("LICENSE.md"), "Others");
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("a.txt"), ".txt");
        assert_eq!(extension_of("b.PNG"), ".png");
        assert_eq!(extension_of("photo.backup.png"), ".png");
        assert_eq!(extension_of("trailing."), ".");
        assert_eq!(extension_of("noext"), "");
    }
}
