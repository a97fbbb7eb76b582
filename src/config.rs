//! Folder mapping configuration.
//!
//! The configuration maps a destination folder name to the list of file
//! extensions that belong in it. JSON and TOML documents are both accepted,
//! and key order is preserved: when an extension is listed under several
//! folders, the folder that comes last in the file wins.
//!
//! # Configuration File Format
//!
//! ```json
//! {
//!   "Documents": [".pdf", ".docx", ".txt"],
//!   "Images": [".jpg", ".png"],
//!   "Audio": [".mp3", ".wav"]
//! }
//! ```
//!
//! or, in TOML:
//!
//! ```toml
//! Documents = [".pdf", ".docx", ".txt"]
//! Images = [".jpg", ".png"]
//! ```
//!
//! A missing configuration is always an error. Use [`FolderConfig::write_default`]
//! (the `init` command) to create one.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration file looked up in the current directory.
pub const LOCAL_CONFIG_JSON: &str = "foldersort.json";

/// TOML variant of the local configuration file.
pub const LOCAL_CONFIG_TOML: &str = "foldersort.toml";

/// Errors that can occur while locating, reading or writing the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file exists at the given (or default) location.
    #[error(
        "Configuration file not found: {} (run `foldersort init` to create one)",
        .0.display()
    )]
    ConfigNotFound(PathBuf),

    /// The file exists but is not a valid folder mapping.
    #[error("Invalid configuration in {}: {reason}", .path.display())]
    ConfigInvalid { path: PathBuf, reason: String },

    /// The file could not be read or written.
    #[error("IO error on configuration {}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Refused to overwrite an existing configuration.
    #[error("Configuration file already exists: {} (use --force to overwrite)", .0.display())]
    AlreadyExists(PathBuf),
}

/// One destination folder and the extensions routed into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRule {
    /// Name of the sub-folder created under the organized folder.
    pub name: String,
    /// Extensions as written in the configuration (e.g. `".pdf"`).
    pub extensions: Vec<String>,
}

impl FolderRule {
    pub fn new(name: impl Into<String>, extensions: &[&str]) -> Self {
        Self {
            name: name.into(),
            extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

/// Ordered mapping from destination folder name to extensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct FolderConfig {
    folders: Vec<FolderRule>,
}

impl FolderConfig {
    /// Builds a configuration from rules, keeping their order.
    pub fn new(folders: Vec<FolderRule>) -> Self {
        Self { folders }
    }

    /// The folder rules in document order.
    pub fn folders(&self) -> &[FolderRule] {
        &self.folders
    }

    /// Locates the configuration file without reading it.
    ///
    /// Lookup order:
    /// 1. `explicit`, if given (it must exist)
    /// 2. `foldersort.json` in the current directory
    /// 3. `foldersort.toml` in the current directory
    /// 4. `~/.config/foldersort/config.json`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` when no candidate exists.
    pub fn locate(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
            }
            return Ok(path.to_path_buf());
        }

        let mut candidates = vec![
            PathBuf::from(LOCAL_CONFIG_JSON),
            PathBuf::from(LOCAL_CONFIG_TOML),
        ];
        if let Ok(home) = std::env::var("HOME") {
            candidates.push(
                PathBuf::from(home)
                    .join(".config")
                    .join("foldersort")
                    .join("config.json"),
            );
        }

        candidates
            .into_iter()
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| ConfigError::ConfigNotFound(PathBuf::from(LOCAL_CONFIG_JSON)))
    }

    /// Locates and loads the configuration.
    ///
    /// # Errors
    ///
    /// Fails when no file is found, when it cannot be read, or when it is not a
    /// mapping of folder names to extension arrays.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = Self::locate(explicit)?;
        Self::load_from_file(&path)
    }

    /// Loads a configuration from a specific file.
    ///
    /// Files ending in `.toml` are parsed as TOML, everything else as JSON.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::ConfigNotFound(path.to_path_buf())
            } else {
                ConfigError::IoError {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let parsed = if is_toml(path) {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        };

        let config = parsed.map_err(|reason| ConfigError::ConfigInvalid {
            path: path.to_path_buf(),
            reason,
        })?;
        log::info!(
            "Loaded {} folder rules from {}",
            config.folders.len(),
            path.display()
        );
        Ok(config)
    }

    /// Parses a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self, String> {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }

    /// Parses a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Writes this configuration to `path`, as TOML for `.toml` files and
    /// pretty JSON otherwise.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::AlreadyExists` if the file exists and `force` is false.
    pub fn write_to(&self, path: &Path, force: bool) -> Result<(), ConfigError> {
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }

        let rendered = if is_toml(path) {
            toml::to_string_pretty(self).map_err(|e| e.to_string())
        } else {
            serde_json::to_string_pretty(self).map_err(|e| e.to_string())
        }
        .map_err(|reason| ConfigError::ConfigInvalid {
            path: path.to_path_buf(),
            reason,
        })?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| ConfigError::IoError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(path, rendered + "\n").map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Writes the stock configuration to `path`.
    pub fn write_default(path: &Path, force: bool) -> Result<(), ConfigError> {
        Self::default().write_to(path, force)
    }
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self::new(vec![
            FolderRule::new("Documents", &[".pdf", ".docx", ".txt"]),
            FolderRule::new("Images", &[".jpg", ".png"]),
            FolderRule::new("Audio", &[".mp3", ".wav"]),
        ])
    }
}

impl TryFrom<Map<String, Value>> for FolderConfig {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let folders = map
            .into_iter()
            .map(|(name, value)| match value {
                Value::Array(items) => Ok(FolderRule {
                    name,
                    // Non-string entries become literal keys that never match.
                    extensions: items
                        .into_iter()
                        .map(|item| match item {
                            Value::String(ext) => ext,
                            other => other.to_string(),
                        })
                        .collect(),
                }),
                other => Err(format!(
                    "folder '{}' must map to an array of extensions, found {}",
                    name,
                    json_kind(&other)
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { folders })
    }
}

impl From<FolderConfig> for Map<String, Value> {
    fn from(config: FolderConfig) -> Self {
        config
            .folders
            .into_iter()
            .map(|rule| {
                let extensions = rule.extensions.into_iter().map(Value::String).collect();
                (rule.name, Value::Array(extensions))
            })
            .collect()
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
