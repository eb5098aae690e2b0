//! Extract and archive orchestration around the configured backend

use std::path::{Path, PathBuf};

use frostpak::fbrb::{
    CreateOptions, ExtractOptions, FbrbOperations, ProgressCallback, default_archive_path,
    default_extraction_folder,
};

use super::cleanup::cleanup;
use crate::error::{Error, Result};
use crate::python::execute_script;
use crate::session::Session;
use crate::settings::{Backend, ToolkitConfig};
use crate::tree::DataTree;

/// Unpack an archive next to itself and load it into the session.
///
/// See [`extract_with_progress`].
///
/// # Errors
/// Returns an error if the path is empty, the old folder cannot be removed,
/// or the backend fails to unpack the archive.
pub fn extract(archive: &Path, session: &mut Session, config: &ToolkitConfig) -> Result<Option<DataTree>> {
    extract_with_progress(archive, session, config, &|_| {})
}

/// Unpack an archive into `<dir>/<stem> FbRB`, clean the result up and
/// return its data tree (`None` if the backend left no folder behind).
///
/// An existing folder is replaced unless the session holds a game profile.
/// On success the session has data available and is no longer a game profile.
///
/// # Errors
/// Same as [`extract`].
pub fn extract_with_progress(
    archive: &Path,
    session: &mut Session,
    config: &ToolkitConfig,
    progress: ProgressCallback,
) -> Result<Option<DataTree>> {
    let result = run_extract(archive, session, config, progress);
    if let Err(e) = &result {
        tracing::error!("{e}");
        tracing::error!("Unable to extract fbrb file!");
    }
    result
}

fn run_extract(
    archive: &Path,
    session: &mut Session,
    config: &ToolkitConfig,
    progress: ProgressCallback,
) -> Result<Option<DataTree>> {
    if archive.as_os_str().is_empty() {
        return Err(Error::EmptyPath);
    }

    let folder = default_extraction_folder(archive);
    session.files_path_data = Some(folder.clone());

    if folder.is_dir() && !session.is_game_profile {
        tracing::debug!("Removing previous extraction {}", folder.display());
        std::fs::remove_dir_all(&folder)?;
    }

    match config.backend {
        Backend::Native => {
            let options = ExtractOptions {
                destination: Some(folder.clone()),
                use_temp_file: config.unpack_temp_file,
            };
            FbrbOperations::extract_with_options(archive, &options, progress)?;
        }
        Backend::Python => {
            execute_script(&config.python_path, &config.fbrb_script(), &[archive])?;
        }
    }

    tracing::info!("Cleaning up files, please wait...");
    let tree = if folder.is_dir() {
        cleanup(&folder, config.remove_deleted_placeholders)?;
        Some(DataTree::populate(&folder)?)
    } else {
        tracing::warn!(
            "Extraction folder '{}' not found after unpacking!",
            folder.display()
        );
        None
    };

    session.is_data_available = true;
    session.is_game_profile = false;
    Ok(tree)
}

/// Repack the session's data folder into an archive next to it.
///
/// # Errors
/// Returns [`Error::NoDataLoaded`] if nothing is loaded, or the backend's error.
pub fn archive(session: &Session, config: &ToolkitConfig) -> Result<PathBuf> {
    archive_with_progress(session, config, &|_| {})
}

/// [`archive`] with a progress callback (native backend only)
///
/// # Errors
/// Same as [`archive`].
pub fn archive_with_progress(
    session: &Session,
    config: &ToolkitConfig,
    progress: ProgressCallback,
) -> Result<PathBuf> {
    let result = run_archive(session, config, progress);
    if let Err(e) = &result {
        tracing::error!("{e}");
        tracing::error!("Unable to archive fbrb file!");
    }
    result
}

fn run_archive(session: &Session, config: &ToolkitConfig, progress: ProgressCallback) -> Result<PathBuf> {
    let folder = session
        .files_path_data
        .as_deref()
        .filter(|_| session.is_data_available)
        .ok_or(Error::NoDataLoaded)?;

    match config.backend {
        Backend::Native => {
            let options = CreateOptions {
                output: None,
                compression_level: config.compression_level,
                use_temp_file: config.pack_temp_file,
            };
            Ok(FbrbOperations::create_with_options(folder, &options, progress)?)
        }
        Backend::Python => {
            execute_script(&config.python_path, &config.fbrb_script(), &[folder])?;
            default_archive_path(folder)
                .ok_or_else(|| frostpak::Error::NotAnArchiveFolder(folder.to_path_buf()).into())
        }
    }
}
