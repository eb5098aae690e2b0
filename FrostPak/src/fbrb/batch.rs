//! Batch FBRB operations
//!
//! Mirrors the drag-and-drop behavior of the archive tool: an extracted
//! ` FbRB` folder is packed, a file is unpacked, and any other folder is
//! walked and processed according to a [`BatchMode`].

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use walkdir::WalkDir;

use super::{
    CreateOptions, DEFAULT_COMPRESSION_LEVEL, ExtractOptions, FOLDER_SUFFIX, FbrbOperations,
    FbrbPhase, FbrbProgress, is_archive_folder, is_archive_path,
};

/// What to do with plain folders found in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    /// Unpack every `.fbrb` file below the folder
    Unpack,
    /// Pack every ` FbRB` folder below the folder
    Pack,
}

/// Options for [`process_paths`]
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// How plain folders are processed
    pub mode: BatchMode,
    /// Payload gzip level for packing
    pub compression_level: u32,
    /// Stage packed payloads in a temp file
    pub pack_temp_file: bool,
    /// Stage unpacked payloads in a temp file
    pub unpack_temp_file: bool,
}

impl BatchOptions {
    /// Options with the archive tool's defaults for the given mode
    #[must_use]
    pub fn new(mode: BatchMode) -> Self {
        Self {
            mode,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            pack_temp_file: true,
            unpack_temp_file: false,
        }
    }
}

/// Result of a batch FBRB operation
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Number of successful operations
    pub success_count: usize,
    /// Number of failed operations
    pub fail_count: usize,
    /// Number of inputs that were not archives or archive folders
    pub skipped_count: usize,
    /// Messages for each item processed
    pub results: Vec<String>,
}

#[derive(Debug, Clone)]
enum Job {
    Unpack(PathBuf),
    Pack(PathBuf),
    Skip(PathBuf),
    Missing(PathBuf),
}

/// Find all .fbrb files in a directory recursively
pub fn find_fbrb_files<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    let mut files: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file() && is_archive_path(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();

    files.sort();
    files
}

/// Find all ` FbRB` folders in a directory recursively
///
/// Does not descend into a folder once it matched, so an archive folder that
/// happens to contain another ` FbRB` folder is packed once.
pub fn find_archive_folders<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    let mut folders = Vec::new();
    let mut walker = WalkDir::new(dir).into_iter();

    while let Some(entry) = walker.next() {
        let Ok(entry) = entry else { continue };
        if entry.file_type().is_dir()
            && entry.file_name().to_string_lossy().ends_with(FOLDER_SUFFIX)
        {
            folders.push(entry.path().to_path_buf());
            walker.skip_current_dir();
        }
    }

    folders.sort();
    folders
}

/// Process a list of dropped paths in parallel
///
/// Failures are collected per item; one bad archive does not stop the batch.
pub fn process_paths<F>(paths: &[PathBuf], options: &BatchOptions, progress: F) -> BatchResult
where
    F: Fn(&FbrbProgress) + Send + Sync,
{
    let jobs: Vec<Job> = paths.iter().flat_map(|path| plan(path, options.mode)).collect();

    let success_counter = AtomicUsize::new(0);
    let fail_counter = AtomicUsize::new(0);
    let skip_counter = AtomicUsize::new(0);
    let processed = AtomicUsize::new(0);
    let total = jobs.len();

    let results: Vec<String> = jobs
        .par_iter()
        .map(|job| {
            let current = processed.fetch_add(1, Ordering::SeqCst) + 1;

            match job {
                Job::Unpack(archive) => {
                    progress(&FbrbProgress::with_file(
                        FbrbPhase::WritingFiles,
                        current,
                        total,
                        archive.to_string_lossy(),
                    ));
                    let extract = ExtractOptions {
                        destination: None,
                        use_temp_file: options.unpack_temp_file,
                    };
                    match FbrbOperations::extract_with_options(archive, &extract, &|_| {}) {
                        Ok(folder) => {
                            success_counter.fetch_add(1, Ordering::SeqCst);
                            format!("Unpacked: {} -> {}", archive.display(), folder.display())
                        }
                        Err(e) => {
                            fail_counter.fetch_add(1, Ordering::SeqCst);
                            format!("Failed {}: {e}", archive.display())
                        }
                    }
                }
                Job::Pack(folder) => {
                    progress(&FbrbProgress::with_file(
                        FbrbPhase::WritingArchive,
                        current,
                        total,
                        folder.to_string_lossy(),
                    ));
                    let create = CreateOptions {
                        output: None,
                        compression_level: options.compression_level,
                        use_temp_file: options.pack_temp_file,
                    };
                    match FbrbOperations::create_with_options(folder, &create, &|_| {}) {
                        Ok(archive) => {
                            success_counter.fetch_add(1, Ordering::SeqCst);
                            format!("Packed: {} -> {}", folder.display(), archive.display())
                        }
                        Err(e) => {
                            fail_counter.fetch_add(1, Ordering::SeqCst);
                            format!("Failed {}: {e}", folder.display())
                        }
                    }
                }
                Job::Skip(path) => {
                    skip_counter.fetch_add(1, Ordering::SeqCst);
                    format!("Skipped: {}", path.display())
                }
                Job::Missing(path) => {
                    fail_counter.fetch_add(1, Ordering::SeqCst);
                    format!("Not found: {}", path.display())
                }
            }
        })
        .collect();

    progress(&FbrbProgress::new(FbrbPhase::Complete, total, total));

    BatchResult {
        success_count: success_counter.load(Ordering::SeqCst),
        fail_count: fail_counter.load(Ordering::SeqCst),
        skipped_count: skip_counter.load(Ordering::SeqCst),
        results,
    }
}

/// Decide what to do with one input path
fn plan(path: &Path, mode: BatchMode) -> Vec<Job> {
    if is_archive_folder(path) {
        vec![Job::Pack(path.to_path_buf())]
    } else if path.is_file() {
        if is_archive_path(path) {
            vec![Job::Unpack(path.to_path_buf())]
        } else {
            vec![Job::Skip(path.to_path_buf())]
        }
    } else if path.is_dir() {
        match mode {
            BatchMode::Unpack => find_fbrb_files(path).into_iter().map(Job::Unpack).collect(),
            BatchMode::Pack => find_archive_folders(path).into_iter().map(Job::Pack).collect(),
        }
    } else {
        vec![Job::Missing(path.to_path_buf())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_folder(root: &Path, name: &str) -> PathBuf {
        let folder = root.join(name);
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join("a.dbx"), b"{binary}").unwrap();
        folder
    }

    #[test]
    fn test_find_archive_folders_does_not_descend() {
        let dir = tempfile::tempdir().unwrap();
        let outer = make_folder(dir.path(), "outer FbRB");
        make_folder(&outer, "inner FbRB");
        make_folder(&dir.path().join("levels"), "mp_001 FbRB");

        let found = find_archive_folders(dir.path());
        assert_eq!(
            found,
            vec![dir.path().join("levels/mp_001 FbRB"), outer]
        );
    }

    #[test]
    fn test_batch_pack_then_unpack() {
        let dir = tempfile::tempdir().unwrap();
        let levels = dir.path().join("levels");
        make_folder(&levels, "mp_001 FbRB");
        make_folder(&levels, "mp_002 FbRB");
        std::fs::write(levels.join("notes.txt"), b"ignore me").unwrap();

        let packed = process_paths(&[levels.clone()], &BatchOptions::new(BatchMode::Pack), |_| {});
        assert_eq!(packed.success_count, 2);
        assert_eq!(packed.fail_count, 0);
        assert_eq!(find_fbrb_files(&levels).len(), 2);

        std::fs::remove_dir_all(levels.join("mp_001 FbRB")).unwrap();
        std::fs::remove_dir_all(levels.join("mp_002 FbRB")).unwrap();

        let unpacked =
            process_paths(&[levels.clone()], &BatchOptions::new(BatchMode::Unpack), |_| {});
        assert_eq!(unpacked.success_count, 2);
        assert!(levels.join("mp_001 FbRB/a.dbx").is_file());
        assert!(levels.join("mp_002 FbRB/a.dbx").is_file());
    }

    #[test]
    fn test_batch_reports_missing_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("readme.txt");
        std::fs::write(&text, b"hi").unwrap();

        let result = process_paths(
            &[text, dir.path().join("missing.fbrb")],
            &BatchOptions::new(BatchMode::Unpack),
            |_| {},
        );
        assert_eq!(result.success_count, 0);
        assert_eq!(result.skipped_count, 1);
        assert_eq!(result.fail_count, 1);
    }
}
