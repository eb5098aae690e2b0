//! Error types for the toolkit

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("FrostPak error: {0}")]
    FrostPak(#[from] frostpak::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File path is null or empty!")]
    EmptyPath,

    #[error("No extracted data is loaded")]
    NoDataLoaded,

    #[error("Failed to launch {}: {source}", .interpreter.display())]
    PythonLaunch {
        interpreter: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "{} exited with {}",
        .script.display(),
        .code.map_or_else(|| String::from("a signal"), |c| format!("code {c}"))
    )]
    ProcessFailed { script: PathBuf, code: Option<i32> },

    #[error("Walk error: {0}")]
    WalkDir(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
