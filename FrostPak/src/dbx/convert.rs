//! DBX <-> XML file conversion, single files and folder walks

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use walkdir::WalkDir;

use super::binary::{read_dbx, write_dbx};
use super::xml::{from_xml, to_xml};
use super::{MAGIC, XML_HEADER};
use crate::error::Result;
use crate::utils::long_path;

/// Direction of a folder conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertMode {
    /// Binary `.dbx` files to `.xml`
    ToXml,
    /// `.xml` files back to binary `.dbx`
    ToDbx,
}

impl ConvertMode {
    /// Extension of the files this mode reads (without dot)
    #[must_use]
    pub fn source_extension(self) -> &'static str {
        match self {
            Self::ToXml => "dbx",
            Self::ToDbx => "xml",
        }
    }
}

/// Result of converting a batch of files
#[derive(Debug, Clone, Default)]
pub struct ConvertResult {
    /// Number of converted files
    pub success_count: usize,
    /// Number of failed conversions
    pub fail_count: usize,
    /// Number of files that were not convertible (text DBX, non-XML, ...)
    pub skipped_count: usize,
    /// Messages for each file processed
    pub results: Vec<String>,
}

/// Convert a binary DBX file to XML
///
/// # Errors
/// Returns an error if reading, parsing, or writing fails.
pub fn convert_dbx_to_xml<P: AsRef<Path>>(source: P, dest: P) -> Result<()> {
    tracing::info!("Converting DBX→XML: {:?} → {:?}", source.as_ref(), dest.as_ref());
    let data = std::fs::read(long_path(&source))?;
    let doc = read_dbx(&data)?;
    std::fs::write(long_path(&dest), to_xml(&doc)?)?;
    Ok(())
}

/// Convert an XML file to binary DBX
///
/// # Errors
/// Returns an error if reading, parsing, or writing fails.
pub fn convert_xml_to_dbx<P: AsRef<Path>>(source: P, dest: P) -> Result<()> {
    tracing::info!("Converting XML→DBX: {:?} → {:?}", source.as_ref(), dest.as_ref());
    let text = std::fs::read_to_string(long_path(&source))?;
    let doc = from_xml(&text)?;
    std::fs::write(long_path(&dest), write_dbx(&doc)?)?;
    Ok(())
}

/// Convert one file next to itself, choosing the direction by extension
///
/// `.dbx` files that are not binary (already text) and `.xml` files without
/// a declaration are left alone. Returns the written file, or `None` when the
/// file was skipped.
///
/// # Errors
/// Returns an error if a convertible file fails to convert.
pub fn convert_file<P: AsRef<Path>>(path: P) -> Result<Option<PathBuf>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "dbx" => {
            let data = std::fs::read(long_path(path))?;
            if !data.starts_with(MAGIC) {
                tracing::debug!("Skipping non-binary DBX {}", path.display());
                return Ok(None);
            }
            let dest = path.with_extension("xml");
            std::fs::write(long_path(&dest), to_xml(&read_dbx(&data)?)?)?;
            Ok(Some(dest))
        }
        "xml" => {
            let text = std::fs::read_to_string(long_path(path))?;
            if !text.trim_start_matches('\u{feff}').starts_with(&XML_HEADER[..5]) {
                tracing::debug!("Skipping XML without declaration {}", path.display());
                return Ok(None);
            }
            let dest = path.with_extension("dbx");
            std::fs::write(long_path(&dest), write_dbx(&from_xml(&text)?)?)?;
            Ok(Some(dest))
        }
        _ => Ok(None),
    }
}

/// Find files a folder conversion would read, recursively
pub fn find_convertible_files<P: AsRef<Path>>(dir: P, mode: ConvertMode) -> Vec<PathBuf> {
    let wanted = mode.source_extension();
    let mut files: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| {
            e.file_type().is_file()
                && e.path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    files.sort();
    files
}

/// Convert dropped paths in parallel
///
/// Files convert by their extension; folders are walked and converted in the
/// direction given by `mode`. Failures are collected per file.
pub fn convert_paths<F>(paths: &[PathBuf], mode: ConvertMode, progress: F) -> ConvertResult
where
    F: Fn(usize, usize, &Path) + Send + Sync,
{
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

    let success_counter = AtomicUsize::new(0);
    let fail_counter = AtomicUsize::new(0);
    let skip_counter = AtomicUsize::new(0);
    let processed = AtomicUsize::new(0);
    let total = files.len();

    let results: Vec<String> = files
        .par_iter()
        .map(|file| {
            let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(current, total, file);

            match convert_file(file) {
                Ok(Some(dest)) => {
                    success_counter.fetch_add(1, Ordering::SeqCst);
                    format!("Converted: {} -> {}", file.display(), dest.display())
                }
                Ok(None) => {
                    skip_counter.fetch_add(1, Ordering::SeqCst);
                    format!("Skipped: {}", file.display())
                }
                Err(e) => {
                    fail_counter.fetch_add(1, Ordering::SeqCst);
                    tracing::warn!("Failed to convert {}: {e}", file.display());
                    format!("Failed {}: {e}", file.display())
                }
            }
        })
        .collect();

    ConvertResult {
        success_count: success_counter.load(Ordering::SeqCst),
        fail_count: fail_counter.load(Ordering::SeqCst),
        skipped_count: skip_counter.load(Ordering::SeqCst),
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbx::{DbxDocument, DbxElement, DbxValue};

    fn write_sample(path: &Path) -> DbxDocument {
        let doc = DbxDocument::new(DbxElement::new(
            "instance",
            DbxValue::Container(vec![
                DbxElement::new("field", DbxValue::Flag(0)).with_attribute("name", "Visible"),
            ]),
        ));
        std::fs::write(path, write_dbx(&doc).unwrap()).unwrap();
        doc
    }

    #[test]
    fn test_convert_file_both_ways() {
        let dir = tempfile::tempdir().unwrap();
        let dbx = dir.path().join("soldier.dbx");
        let doc = write_sample(&dbx);

        let xml = convert_file(&dbx).unwrap().unwrap();
        assert_eq!(xml, dir.path().join("soldier.xml"));
        let text = std::fs::read_to_string(&xml).unwrap();
        assert!(text.contains("<field name=\"Visible\">false</field>"));

        std::fs::remove_file(&dbx).unwrap();
        assert_eq!(convert_file(&xml).unwrap(), Some(dbx.clone()));
        assert_eq!(read_dbx(&std::fs::read(&dbx).unwrap()).unwrap(), doc);
    }

    #[test]
    fn test_convert_file_skips_text_dbx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.dbx");
        std::fs::write(&path, "<?xml version=\"1.0\"?>").unwrap();
        assert_eq!(convert_file(&path).unwrap(), None);
    }

    #[test]
    fn test_convert_paths_walks_folders() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        write_sample(&dir.path().join("a/one.dbx"));
        write_sample(&dir.path().join("a/b/two.dbx"));
        std::fs::write(dir.path().join("a/b/broken.dbx"), b"{binary}\0\0").unwrap();

        let result = convert_paths(&[dir.path().to_path_buf()], ConvertMode::ToXml, |_, _, _| {});
        assert_eq!(result.success_count, 2);
        assert_eq!(result.fail_count, 1);
        assert!(dir.path().join("a/b/two.xml").is_file());
    }
}
