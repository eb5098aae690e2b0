//! Core FBRB archive operations

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use super::{
    ARCHIVE_EXTENSION, DEFAULT_COMPRESSION_LEVEL, FOLDER_SUFFIX, FbrbEntry, FbrbPhase,
    FbrbProgress, FbrbReader, FbrbWriter, ProgressCallback,
};
use crate::error::{Error, Result};
use crate::utils::long_path;

/// Options for unpacking an archive
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Target folder; defaults to `<archive stem> FbRB` next to the archive
    pub destination: Option<PathBuf>,
    /// Stage the decompressed payload in a temp file instead of memory
    pub use_temp_file: bool,
}

/// Options for packing a folder
#[derive(Debug, Clone)]
pub struct CreateOptions {
    /// Output archive; defaults to the folder name without ` FbRB` plus `.fbrb`
    pub output: Option<PathBuf>,
    /// Payload gzip level (0 = stored)
    pub compression_level: u32,
    /// Stage the payload in a temp file instead of memory
    pub use_temp_file: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            output: None,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            use_temp_file: true,
        }
    }
}

/// High-level FBRB archive operations.
pub struct FbrbOperations;

impl FbrbOperations {
    /// Unpack an archive next to itself into `<stem> FbRB`
    ///
    /// Returns the folder the files were written to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAnArchive`] if the path does not end with `.fbrb`.
    /// Returns [`Error::InvalidFbrbMagic`] if the file is not an FBRB archive.
    /// Returns [`Error::ExtractionPartialFailure`] if some entries could not be written.
    ///
    /// [`Error::NotAnArchive`]: crate::Error::NotAnArchive
    /// [`Error::InvalidFbrbMagic`]: crate::Error::InvalidFbrbMagic
    /// [`Error::ExtractionPartialFailure`]: crate::Error::ExtractionPartialFailure
    pub fn extract<P: AsRef<Path>>(archive: P) -> Result<PathBuf> {
        Self::extract_with_options(archive, &ExtractOptions::default(), &|_| {})
    }

    /// Unpack an archive with options and progress callback
    ///
    /// # Errors
    ///
    /// Same as [`FbrbOperations::extract`].
    pub fn extract_with_options<P: AsRef<Path>>(
        archive: P,
        options: &ExtractOptions,
        progress: ProgressCallback,
    ) -> Result<PathBuf> {
        let archive = archive.as_ref();
        if !is_archive_path(archive) {
            return Err(Error::NotAnArchive(archive.to_path_buf()));
        }

        let destination = options
            .destination
            .clone()
            .unwrap_or_else(|| default_extraction_folder(archive));

        progress(&FbrbProgress::with_file(
            FbrbPhase::ReadingHeader,
            1,
            1,
            archive.to_string_lossy(),
        ));
        let reader = FbrbReader::open(long_path(archive))?;
        tracing::info!(
            "Unpacking {} ({} files) to {}",
            archive.display(),
            reader.entries().len(),
            destination.display()
        );

        progress(&FbrbProgress::new(FbrbPhase::StagingPayload, 1, 1));
        let (header, mut payload) = reader.stage_payload(options.use_temp_file)?;

        std::fs::create_dir_all(long_path(&destination))?;

        let total = header.entries.len();
        let mut failed = 0;
        let mut first_error: Option<String> = None;

        for (i, entry) in header.entries.iter().enumerate() {
            progress(&FbrbProgress::with_file(
                FbrbPhase::WritingFiles,
                i + 1,
                total,
                entry.name.as_str(),
            ));

            let result = entry_destination(&destination, entry).and_then(|out_path| {
                if let Some(parent) = out_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let mut out = BufWriter::new(File::create(&out_path)?);
                payload.copy_entry(entry, &mut out)?;
                out.flush()?;
                Ok(())
            });

            if let Err(e) = result {
                tracing::warn!("Failed to extract {}: {e}", entry.name);
                failed += 1;
                if first_error.is_none() {
                    first_error = Some(format!("{}: {e}", entry.name));
                }
            }
        }

        progress(&FbrbProgress::new(FbrbPhase::Complete, total, total));

        if let Some(first_error) = first_error {
            return Err(Error::ExtractionPartialFailure {
                total,
                failed,
                first_error,
            });
        }

        tracing::info!("Unpacked {total} files");
        Ok(destination)
    }

    /// Pack an extracted ` FbRB` folder back into an archive
    ///
    /// Returns the path of the written archive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAnArchiveFolder`] if the folder name does not end with ` FbRB`.
    /// Returns [`Error::FbrbTooLarge`] if the content exceeds the format's 32-bit limits.
    ///
    /// [`Error::NotAnArchiveFolder`]: crate::Error::NotAnArchiveFolder
    /// [`Error::FbrbTooLarge`]: crate::Error::FbrbTooLarge
    pub fn create<P: AsRef<Path>>(folder: P) -> Result<PathBuf> {
        Self::create_with_options(folder, &CreateOptions::default(), &|_| {})
    }

    /// Pack a folder with options and progress callback
    ///
    /// # Errors
    ///
    /// Same as [`FbrbOperations::create`].
    pub fn create_with_options<P: AsRef<Path>>(
        folder: P,
        options: &CreateOptions,
        progress: ProgressCallback,
    ) -> Result<PathBuf> {
        let folder = folder.as_ref();
        if !is_archive_folder(folder) {
            return Err(Error::NotAnArchiveFolder(folder.to_path_buf()));
        }

        let output = match &options.output {
            Some(output) if is_archive_path(output) => output.clone(),
            Some(output) => {
                let mut name = output.as_os_str().to_os_string();
                name.push(".");
                name.push(ARCHIVE_EXTENSION);
                PathBuf::from(name)
            }
            None => default_archive_path(folder)
                .ok_or_else(|| Error::NotAnArchiveFolder(folder.to_path_buf()))?,
        };

        progress(&FbrbProgress::with_file(
            FbrbPhase::ScanningFiles,
            0,
            0,
            folder.to_string_lossy(),
        ));
        let writer = FbrbWriter::new(long_path(folder))?
            .with_compression_level(options.compression_level)
            .with_temp_file(options.use_temp_file);

        if writer.skipped_count() > 0 {
            tracing::info!(
                "Skipping {} files with unknown extensions",
                writer.skipped_count()
            );
        }

        writer.write_with_progress(long_path(&output), progress)?;
        Ok(output)
    }

    /// List the file table of an archive without unpacking it
    ///
    /// # Errors
    /// Returns an error if the archive cannot be opened or its header is invalid.
    pub fn list<P: AsRef<Path>>(archive: P) -> Result<Vec<FbrbEntry>> {
        let reader = FbrbReader::open(long_path(archive))?;
        Ok(reader.entries().to_vec())
    }

    /// Read a single file out of an archive by its stored name
    ///
    /// # Errors
    /// Returns [`Error::InvalidPath`] if no entry has that name.
    ///
    /// [`Error::InvalidPath`]: crate::Error::InvalidPath
    pub fn read_file_bytes<P: AsRef<Path>>(archive: P, name: &str) -> Result<Vec<u8>> {
        let reader = FbrbReader::open(long_path(archive))?;
        let entry = reader
            .entries()
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| Error::InvalidPath(format!("{name} not found in archive")))?;

        let (_, mut payload) = reader.stage_payload(false)?;
        payload.read_entry(&entry)
    }
}

/// Resolve where an entry lands inside `destination`, rejecting paths that
/// would escape it.
fn entry_destination(destination: &Path, entry: &FbrbEntry) -> Result<PathBuf> {
    let relative = entry.extracted_path();
    let safe = relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)));
    if !safe || relative.as_os_str().is_empty() {
        return Err(Error::UnsafeEntryPath(entry.name.clone()));
    }
    Ok(long_path(destination.join(relative)))
}

/// Folder an archive unpacks to by default: `<dir>/<stem> FbRB`
pub fn default_extraction_folder<P: AsRef<Path>>(archive: P) -> PathBuf {
    let archive = archive.as_ref();
    let stem = archive
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    archive.with_file_name(format!("{stem}{FOLDER_SUFFIX}"))
}

/// Archive a ` FbRB` folder packs to by default, or `None` for other folders
pub fn default_archive_path<P: AsRef<Path>>(folder: P) -> Option<PathBuf> {
    let folder = folder.as_ref();
    let name = folder.file_name()?.to_string_lossy();
    let stem = name.strip_suffix(FOLDER_SUFFIX)?;
    Some(folder.with_file_name(format!("{stem}.{ARCHIVE_EXTENSION}")))
}

/// Returns true if the path carries the `.fbrb` extension (any case)
pub fn is_archive_path<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
}

/// Returns true if the path names a folder ending with ` FbRB`
pub fn is_archive_folder<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    path.is_dir()
        && path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().ends_with(FOLDER_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        assert_eq!(
            default_extraction_folder("/game/levels/mp_001.fbrb"),
            PathBuf::from("/game/levels/mp_001 FbRB")
        );
        assert_eq!(
            default_archive_path("/game/levels/mp_001 FbRB"),
            Some(PathBuf::from("/game/levels/mp_001.fbrb"))
        );
        assert_eq!(default_archive_path("/game/levels/mp_001"), None);
    }

    #[test]
    fn test_is_archive_path() {
        assert!(is_archive_path("a/b.fbrb"));
        assert!(is_archive_path("a/B.FBRB"));
        assert!(!is_archive_path("a/b.dbx"));
    }

    #[test]
    fn test_entry_destination_rejects_traversal() {
        let entry = FbrbEntry {
            name: "../../evil.dbx".to_string(),
            type_name: super::super::NON_RESOURCE.to_string(),
            flags: 0,
            payload_offset: 0,
            size: 0,
            stored_size: 0,
        };
        assert!(matches!(
            entry_destination(Path::new("/tmp/out FbRB"), &entry),
            Err(Error::UnsafeEntryPath(_))
        ));
    }

    #[test]
    fn test_extract_rejects_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.zip");
        std::fs::write(&path, b"FbRB").unwrap();
        assert!(matches!(
            FbrbOperations::extract(&path),
            Err(Error::NotAnArchive(_))
        ));
    }

    #[test]
    fn test_create_and_extract_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("ui FbRB");
        std::fs::create_dir_all(folder.join("menu")).unwrap();
        std::fs::write(folder.join("menu/logo.itexture"), b"texture bytes").unwrap();
        std::fs::write(folder.join("menu/screen.dbx"), b"{binary}...").unwrap();
        std::fs::write(folder.join("menu/old.dbxdeleted"), b"").unwrap();

        for level in [0, 1, 6] {
            let options = CreateOptions {
                compression_level: level,
                use_temp_file: level == 6,
                ..CreateOptions::default()
            };
            let archive =
                FbrbOperations::create_with_options(&folder, &options, &|_| {}).unwrap();
            assert_eq!(archive, dir.path().join("ui.fbrb"));

            let entries = FbrbOperations::list(&archive).unwrap();
            let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
            assert_eq!(names, ["menu/logo.res", "menu/old.dbx", "menu/screen.dbx"]);
            assert!(entries[1].is_deleted());
            assert_eq!(entries[1].flags, 0);

            let out = dir.path().join(format!("out{level} FbRB"));
            let options = ExtractOptions {
                destination: Some(out.clone()),
                use_temp_file: level == 1,
            };
            FbrbOperations::extract_with_options(&archive, &options, &|_| {}).unwrap();

            assert_eq!(
                std::fs::read(out.join("menu/logo.itexture")).unwrap(),
                b"texture bytes"
            );
            assert_eq!(std::fs::read(out.join("menu/screen.dbx")).unwrap(), b"{binary}...");
            assert!(out.join("menu/old.dbxdeleted").is_file());
        }
    }

    #[test]
    fn test_read_file_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("common FbRB");
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join("a.bin"), b"first").unwrap();
        std::fs::write(folder.join("b.wave"), b"second").unwrap();

        let archive = FbrbOperations::create(&folder).unwrap();
        assert_eq!(FbrbOperations::read_file_bytes(&archive, "b.res").unwrap(), b"second");
        assert!(matches!(
            FbrbOperations::read_file_bytes(&archive, "missing.res"),
            Err(Error::InvalidPath(_))
        ));
    }
}
