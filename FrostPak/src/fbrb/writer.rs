//! FBRB archive writer with progress callbacks

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, WriteBytesExt};
use flate2::Compression;
use flate2::write::GzEncoder;
use walkdir::WalkDir;

use super::staging::Staging;
use super::{
    DEFAULT_COMPRESSION_LEVEL, FLAG_HAS_DATA, FbrbPhase, FbrbProgress, HEADER_COMPRESSION_LEVEL,
    HEADER_VERSION, MAGIC, ProgressCallback, split_extension, type_for_extension,
};
use crate::error::{Error, Result};
use crate::utils::relative_path;

/// File queued for packing
#[derive(Debug, Clone)]
struct PendingFile {
    /// Path on disk
    source: PathBuf,
    /// Stored archive name
    name: String,
    /// Resource type name
    type_name: &'static str,
}

/// Payload sink, optionally gzip-compressed
enum PayloadSink {
    Stored(Staging),
    Gzip(GzEncoder<Staging>),
}

impl PayloadSink {
    fn new(staging: Staging, level: u32) -> Self {
        if level == 0 {
            Self::Stored(staging)
        } else {
            Self::Gzip(GzEncoder::new(staging, Compression::new(level)))
        }
    }

    fn finish(self) -> io::Result<Staging> {
        match self {
            Self::Stored(staging) => Ok(staging),
            Self::Gzip(encoder) => encoder.finish(),
        }
    }
}

impl Write for PayloadSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stored(staging) => staging.write(buf),
            Self::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stored(staging) => staging.flush(),
            Self::Gzip(encoder) => encoder.flush(),
        }
    }
}

/// FBRB archive writer
pub struct FbrbWriter {
    /// Root of the extracted folder
    root_path: PathBuf,
    /// Files to include, in walk order
    files: Vec<PendingFile>,
    /// Number of files skipped for unknown extensions
    skipped: usize,
    /// Payload gzip level (0 = stored)
    compression_level: u32,
    /// Stage the payload in a temp file instead of memory
    temp_file: bool,
}

impl FbrbWriter {
    /// Create a new writer for the given directory
    ///
    /// # Errors
    /// Returns an error if the directory cannot be walked.
    pub fn new(root_path: impl Into<PathBuf>) -> Result<Self> {
        let root_path = root_path.into();
        let (files, skipped) = Self::collect_files(&root_path)?;

        Ok(Self {
            root_path,
            files,
            skipped,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            temp_file: true,
        })
    }

    /// Set the payload compression level (0-9, 0 stores the payload raw)
    #[must_use]
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level.min(9);
        self
    }

    /// Stage the payload in a temp file (true) or in memory (false)
    #[must_use]
    pub fn with_temp_file(mut self, temp_file: bool) -> Self {
        self.temp_file = temp_file;
        self
    }

    /// Collect packable files from a directory recursively
    fn collect_files(root: &Path) -> Result<(Vec<PendingFile>, usize)> {
        let mut files = Vec::new();
        let mut skipped = 0;

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().to_string();
            let (_, ending) = split_extension(&file_name);
            let extension = ending.trim_start_matches('.').to_ascii_lowercase();

            let Some(type_name) = type_for_extension(&extension) else {
                tracing::debug!("Skipping {} (unknown extension)", entry.path().display());
                skipped += 1;
                continue;
            };

            let folder = entry
                .path()
                .parent()
                .and_then(|parent| relative_path(parent, root))
                .unwrap_or_default();

            files.push(PendingFile {
                source: entry.path().to_path_buf(),
                name: stored_name(&folder, &file_name, &extension),
                type_name,
            });
        }

        Ok((files, skipped))
    }

    /// Write the archive
    ///
    /// # Errors
    /// Returns an error if a file cannot be read or the archive cannot be written.
    pub fn write(self, output_path: impl AsRef<Path>) -> Result<()> {
        self.write_with_progress(output_path, &|_| {})
    }

    /// Write the archive with progress callback
    ///
    /// # Errors
    /// Returns an error if a file cannot be read, exceeds the format's 32-bit
    /// limits, or the archive cannot be written.
    pub fn write_with_progress(
        self,
        output_path: impl AsRef<Path>,
        progress: ProgressCallback,
    ) -> Result<()> {
        let output_path = output_path.as_ref();
        let total_files = self.files.len();

        let mut strings = Vec::new();
        let mut type_offsets: HashMap<&str, u32> = HashMap::new();
        let mut table = Vec::with_capacity(total_files * super::ENTRY_SIZE);
        let mut payload_offset: u64 = 0;
        let mut sink = PayloadSink::new(Staging::new(self.temp_file)?, self.compression_level);

        for (i, file) in self.files.iter().enumerate() {
            progress(&FbrbProgress::with_file(
                FbrbPhase::CompressingFiles,
                i + 1,
                total_files,
                file.name.as_str(),
            ));

            let name_offset = checked_u32(strings.len() as u64, "string table")?;
            strings.extend_from_slice(file.name.as_bytes());
            strings.push(0);

            let type_offset = if let Some(&offset) = type_offsets.get(file.type_name) {
                offset
            } else {
                let offset = checked_u32(strings.len() as u64, "string table")?;
                type_offsets.insert(file.type_name, offset);
                strings.extend_from_slice(file.type_name.as_bytes());
                strings.push(0);
                offset
            };

            let mut source = File::open(&file.source)?;
            let size = io::copy(&mut source, &mut sink)?;
            let size = checked_u32(size, &file.name)?;
            let flags = if size == 0 { 0 } else { FLAG_HAS_DATA };

            table.write_u32::<BigEndian>(name_offset)?;
            table.write_u32::<BigEndian>(flags)?;
            table.write_u32::<BigEndian>(checked_u32(payload_offset, "payload")?)?;
            table.write_u32::<BigEndian>(size)?;
            table.write_u32::<BigEndian>(size)?;
            table.write_u32::<BigEndian>(type_offset)?;

            payload_offset += u64::from(size);
        }

        let staging = sink.finish()?;
        let zipped = self.compression_level > 0;

        progress(&FbrbProgress::new(FbrbPhase::WritingArchive, total_files, total_files));

        let mut header = Vec::with_capacity(strings.len() + table.len() + 17);
        header.write_u32::<BigEndian>(HEADER_VERSION)?;
        header.write_u32::<BigEndian>(checked_u32(strings.len() as u64, "string table")?)?;
        header.extend_from_slice(&strings);
        header.write_u32::<BigEndian>(checked_u32(total_files as u64, "file count")?)?;
        header.extend_from_slice(&table);
        header.write_u8(u8::from(zipped))?;
        header.write_u32::<BigEndian>(checked_u32(payload_offset, "payload")?)?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::new(HEADER_COMPRESSION_LEVEL));
        encoder.write_all(&header)?;
        let header_gz = encoder.finish()?;

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut output = BufWriter::new(File::create(output_path)?);
        output.write_all(&MAGIC)?;
        output.write_u32::<BigEndian>(checked_u32(header_gz.len() as u64, "header")?)?;
        output.write_all(&header_gz)?;
        staging.copy_into(&mut output)?;
        output.flush()?;

        tracing::info!(
            "Packed {} files ({} bytes) into {}",
            total_files,
            payload_offset,
            output_path.display()
        );
        progress(&FbrbProgress::new(FbrbPhase::Complete, total_files, total_files));

        Ok(())
    }

    /// Get the number of files that will be written
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Get the number of files skipped for unknown extensions
    pub fn skipped_count(&self) -> usize {
        self.skipped
    }

    /// Get the root path
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

/// Name stored in the archive for a file found on disk.
///
/// Resource files go back to their `.res` ending (the type lives in the type
/// string), deleted `.dbx` placeholders lose the `deleted` suffix.
fn stored_name(folder: &str, file_name: &str, extension: &str) -> String {
    let name = match extension {
        "dbxdeleted" => file_name[..file_name.len() - "deleted".len()].to_string(),
        "dbx" | "bin" | "dbmanifest" => file_name.to_string(),
        _ => format!("{}.res", split_extension(file_name).0),
    };

    if folder.is_empty() {
        name
    } else {
        format!("{folder}/{name}")
    }
}

fn checked_u32(value: u64, what: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::FbrbTooLarge {
        what: what.to_string(),
        size: value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_name() {
        assert_eq!(stored_name("", "terrain.itexture", "itexture"), "terrain.res");
        assert_eq!(stored_name("a/b", "x.nonres", "nonres"), "a/b/x.res");
        assert_eq!(stored_name("a", "y.resdeleted", "resdeleted"), "a/y.res");
        assert_eq!(stored_name("a", "z.dbxdeleted", "dbxdeleted"), "a/z.dbx");
        assert_eq!(stored_name("a", "Z.DBX", "dbx"), "a/Z.DBX");
        assert_eq!(stored_name("", "m.dbmanifest", "dbmanifest"), "m.dbmanifest");
    }

    #[test]
    fn test_collect_skips_unknown_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("test FbRB");
        std::fs::create_dir_all(root.join("sub")).unwrap();
        std::fs::write(root.join("sub/a.itexture"), b"tex").unwrap();
        std::fs::write(root.join("readme.txt"), b"nope").unwrap();

        let writer = FbrbWriter::new(&root).unwrap();
        assert_eq!(writer.file_count(), 1);
        assert_eq!(writer.skipped_count(), 1);
        assert_eq!(writer.files[0].name, "sub/a.res");
        assert_eq!(writer.files[0].type_name, "ITexture");
    }
}
