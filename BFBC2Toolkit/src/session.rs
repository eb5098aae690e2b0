//! State shared between operations in one run

use std::path::PathBuf;

/// Which data folder is loaded and how it got there
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Folder holding the extracted archive (`<stem> FbRB`)
    pub files_path_data: Option<PathBuf>,
    /// Set once an archive has been unpacked and cleaned up
    pub is_data_available: bool,
    /// Loaded data belongs to a game profile; its folder is never deleted on re-extract
    pub is_game_profile: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an existing extracted folder without unpacking anything
    pub fn with_data_folder(folder: impl Into<PathBuf>) -> Self {
        Self {
            files_path_data: Some(folder.into()),
            is_data_available: true,
            is_game_profile: false,
        }
    }
}
