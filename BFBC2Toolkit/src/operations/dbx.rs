//! DBX conversion through the configured backend

use std::path::{Path, PathBuf};

use frostpak::dbx::{ConvertMode, ConvertResult, convert_paths, find_convertible_files};

use crate::error::Result;
use crate::python::execute_script;
use crate::settings::{Backend, ToolkitConfig};

/// Convert files and folders between binary DBX and XML.
///
/// Files convert by their extension, folders are walked in the direction of
/// `mode`. The python backend gets every file as its own argument in one run.
///
/// # Errors
/// With the python backend, returns an error if the script cannot run or
/// fails. The native backend reports per-file failures in the result instead.
pub fn convert_dbx<F>(
    paths: &[PathBuf],
    mode: ConvertMode,
    config: &ToolkitConfig,
    progress: F,
) -> Result<ConvertResult>
where
    F: Fn(usize, usize, &Path) + Send + Sync,
{
    match config.backend {
        Backend::Native => Ok(convert_paths(paths, mode, progress)),
        Backend::Python => {
            let files: Vec<PathBuf> = paths
                .iter()
                .flat_map(|path| {
                    if path.is_dir() {
                        find_convertible_files(path, mode)
                    } else {
                        vec![path.clone()]
                    }
                })
                .collect();

            if files.is_empty() {
                return Ok(ConvertResult::default());
            }

            progress(files.len(), files.len(), &config.dbx_script());
            execute_script(&config.python_path, &config.dbx_script(), &files)?;
            Ok(ConvertResult {
                success_count: files.len(),
                results: files
                    .iter()
                    .map(|f| format!("Converted: {}", f.display()))
                    .collect(),
                ..ConvertResult::default()
            })
        }
    }
}
