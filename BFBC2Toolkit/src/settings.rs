//! Persisted toolkit configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Maximum number of recent files to track
const MAX_RECENT_FILES: usize = 10;

/// File name of the windowed interpreter the toolkit launches
#[cfg(windows)]
pub const WINDOWED_INTERPRETER: &str = "pythonw.exe";
#[cfg(not(windows))]
pub const WINDOWED_INTERPRETER: &str = "python3";

/// Script that unpacks and repacks FBRB archives
pub const FBRB_SCRIPT: &str = "fbrb.py";
/// Script that converts DBX documents
pub const DBX_SCRIPT: &str = "dbx.py";

/// Which implementation performs the archive and document work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Built-in codecs from `frostpak`
    #[default]
    Native,
    /// External interpreter running `fbrb.py` / `dbx.py`
    Python,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Python => write!(f, "python"),
        }
    }
}

// Default value functions for serde
fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_default()
}
fn default_python_path() -> PathBuf {
    executable_dir().join("python").join(WINDOWED_INTERPRETER)
}
fn default_script_dir() -> PathBuf {
    executable_dir().join("Scripts")
}
fn default_compression_level() -> u32 {
    frostpak::fbrb::DEFAULT_COMPRESSION_LEVEL
}
fn default_true() -> bool {
    true
}
fn default_required_python_version() -> String {
    "Python 3.11".to_string()
}

/// Toolkit settings, saved as JSON in the user's config directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolkitConfig {
    /// Interpreter used by the python backend
    #[serde(default = "default_python_path")]
    pub python_path: PathBuf,
    /// Directory holding `fbrb.py` and `dbx.py`
    #[serde(default = "default_script_dir")]
    pub script_dir: PathBuf,
    #[serde(default)]
    pub backend: Backend,
    /// Payload gzip level, 0 stores the payload uncompressed
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
    #[serde(default = "default_true")]
    pub pack_temp_file: bool,
    #[serde(default)]
    pub unpack_temp_file: bool,
    /// Delete `*.dbxdeleted` / `*.resdeleted` markers during cleanup
    #[serde(default)]
    pub remove_deleted_placeholders: bool,
    /// Text `--version` output must contain
    #[serde(default = "default_required_python_version")]
    pub required_python_version: String,
    /// Recently opened archives (most recent first)
    #[serde(default)]
    pub recent_files: Vec<String>,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            python_path: default_python_path(),
            script_dir: default_script_dir(),
            backend: Backend::default(),
            compression_level: default_compression_level(),
            pack_temp_file: true,
            unpack_temp_file: false,
            remove_deleted_placeholders: false,
            required_python_version: default_required_python_version(),
            recent_files: Vec::new(),
        }
    }
}

impl ToolkitConfig {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("BFBC2Toolkit").join("config.json"))
    }

    /// Load config from disk, or return default
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Load config from a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save config to the user's config directory
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be created or written.
    pub fn save(&self) -> Result<()> {
        match Self::config_path() {
            Some(path) => self.save_to(path),
            None => {
                tracing::warn!("No config directory on this platform, settings not saved");
                Ok(())
            }
        }
    }

    /// Save config to a specific file
    ///
    /// # Errors
    /// Returns an error if the parent directory cannot be created or the file written.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Put a file at the top of the recent list
    pub fn add_recent_file(&mut self, path: &str) {
        self.recent_files.retain(|p| p != path);
        self.recent_files.insert(0, path.to_string());
        self.recent_files.truncate(MAX_RECENT_FILES);
    }

    pub fn fbrb_script(&self) -> PathBuf {
        self.script_dir.join(FBRB_SCRIPT)
    }

    pub fn dbx_script(&self) -> PathBuf {
        self.script_dir.join(DBX_SCRIPT)
    }
}
