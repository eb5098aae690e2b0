//! Tidy an extracted folder before it is shown

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;

/// Files the OS drops into folders it has browsed
pub const JUNK_FILES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

/// Extensions of the empty markers left for deleted archive entries
const PLACEHOLDER_EXTENSIONS: &[&str] = &["dbxdeleted", "resdeleted"];

/// What [`cleanup`] removed
#[derive(Debug, Clone, Default)]
pub struct CleanupReport {
    pub removed_files: Vec<PathBuf>,
    pub removed_dirs: Vec<PathBuf>,
}

impl CleanupReport {
    pub fn is_empty(&self) -> bool {
        self.removed_files.is_empty() && self.removed_dirs.is_empty()
    }
}

/// Remove junk files, optionally deleted-entry placeholders, then empty
/// directories bottom-up. The folder itself is kept even when empty.
///
/// # Errors
/// Returns an error if the folder cannot be walked or an entry cannot be removed.
pub fn cleanup<P: AsRef<Path>>(folder: P, remove_placeholders: bool) -> Result<CleanupReport> {
    let folder = folder.as_ref();
    let mut report = CleanupReport::default();

    for entry in WalkDir::new(folder).min_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_removable(entry.path(), remove_placeholders) {
            continue;
        }
        std::fs::remove_file(entry.path())?;
        report.removed_files.push(entry.into_path());
    }

    // Children are visited before their parent, so emptied parents go too
    for entry in WalkDir::new(folder).min_depth(1).contents_first(true) {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if std::fs::read_dir(entry.path())?.next().is_none() {
            std::fs::remove_dir(entry.path())?;
            report.removed_dirs.push(entry.into_path());
        }
    }

    tracing::info!(
        "Cleanup removed {} files and {} directories",
        report.removed_files.len(),
        report.removed_dirs.len()
    );
    Ok(report)
}

fn is_removable(path: &Path, remove_placeholders: bool) -> bool {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };
    if JUNK_FILES.iter().any(|junk| name.eq_ignore_ascii_case(junk)) {
        return true;
    }
    remove_placeholders
        && path.extension().is_some_and(|ext| {
            PLACEHOLDER_EXTENSIONS
                .iter()
                .any(|p| ext.eq_ignore_ascii_case(p))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_folder() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("levels/empty/deeper")).unwrap();
        std::fs::create_dir_all(root.join("only_junk")).unwrap();
        std::fs::create_dir_all(root.join("kept")).unwrap();
        std::fs::write(root.join("only_junk/Thumbs.db"), b"x").unwrap();
        std::fs::write(root.join("kept/sky.itexture"), b"sky").unwrap();
        std::fs::write(root.join("kept/gone.dbxdeleted"), b"").unwrap();
        std::fs::write(root.join("DESKTOP.INI"), b"x").unwrap();
        dir
    }

    #[test]
    fn test_cleanup_keeps_placeholders_by_default() {
        let dir = sample_folder();
        let report = cleanup(dir.path(), false).unwrap();

        assert_eq!(report.removed_files.len(), 2);
        assert!(!dir.path().join("levels").exists());
        assert!(!dir.path().join("only_junk").exists());
        assert!(dir.path().join("kept/gone.dbxdeleted").is_file());
        assert!(dir.path().join("kept/sky.itexture").is_file());
        assert!(dir.path().is_dir());
    }

    #[test]
    fn test_cleanup_removes_placeholders() {
        let dir = sample_folder();
        let report = cleanup(dir.path(), true).unwrap();

        assert_eq!(report.removed_files.len(), 3);
        assert!(!dir.path().join("kept/gone.dbxdeleted").exists());
        assert!(dir.path().join("kept/sky.itexture").is_file());
    }

    #[test]
    fn test_cleanup_of_clean_folder() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.dbx"), b"").unwrap();
        assert!(cleanup(dir.path(), true).unwrap().is_empty());
    }
}
