//! Error types for `FrostPak`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `FrostPak` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== FBRB Archive Errors ====================
    /// The file is not a valid FBRB archive (missing `FbRB` magic).
    #[error("invalid FBRB magic: expected FbRB, found {0:?}")]
    InvalidFbrbMagic([u8; 4]),

    /// The archive path does not carry the `.fbrb` extension.
    #[error("not an FBRB archive: {}", .0.display())]
    NotAnArchive(PathBuf),

    /// The folder to pack does not end with the ` FbRB` suffix.
    #[error("not an extracted FBRB folder (expected ' FbRB' suffix): {}", .0.display())]
    NotAnArchiveFolder(PathBuf),

    /// A header offset points outside the decompressed header.
    #[error("FBRB header offset out of bounds: {offset} (header is {len} bytes)")]
    FbrbOffsetOutOfBounds {
        /// The offending offset.
        offset: usize,
        /// Length of the decompressed header.
        len: usize,
    },

    /// A file or the payload exceeds the 32-bit limits of the format.
    #[error("{what} too large for FBRB: {size} bytes")]
    FbrbTooLarge {
        /// What overflowed (file name, payload, string table).
        what: String,
        /// The size that did not fit.
        size: u64,
    },

    /// An entry's payload range lies outside the payload.
    #[error("payload for {path} out of range (offset {offset}, size {size})")]
    PayloadOutOfRange {
        /// Archive path of the entry.
        path: String,
        /// Payload offset of the entry.
        offset: u64,
        /// Size of the entry.
        size: u64,
    },

    /// An entry path tries to escape the extraction folder.
    #[error("unsafe entry path in archive: {0}")]
    UnsafeEntryPath(String),

    /// FBRB extraction completed but some files failed.
    #[error("extraction failed for {failed} of {total} files: {first_error}")]
    ExtractionPartialFailure {
        /// Number of entries in the archive.
        total: usize,
        /// Number of failed files.
        failed: usize,
        /// The first error message encountered.
        first_error: String,
    },

    // ==================== DBX Format Errors ====================
    /// The file is not a binary DBX document (missing `{binary}` magic).
    #[error("invalid DBX magic: expected {{binary}}")]
    InvalidDbxMagic,

    /// The XML document does not start with an XML declaration.
    #[error("missing XML declaration")]
    MissingXmlDeclaration,

    /// Invalid string table index in a DBX payload.
    #[error("invalid DBX string index: {0}")]
    InvalidStringIndex(u64),

    /// A close record appeared with no open container.
    #[error("unbalanced DBX payload: close record at offset {0} with no open element")]
    UnbalancedDbx(u64),

    /// Element carries more attributes than the format can encode.
    #[error("element <{name}> has {count} attributes (at most 15 supported)")]
    TooManyAttributes {
        /// Element name.
        name: String,
        /// Attribute count.
        count: usize,
    },

    /// A value could not be encoded as a DBX number.
    #[error("invalid {kind}: {name} = {value}")]
    InvalidNumber {
        /// Kind of number expected (short int, double float, ...).
        kind: &'static str,
        /// The `name` attribute of the element.
        name: String,
        /// The offending text.
        value: String,
    },

    // ==================== Parsing Errors ====================
    /// XML parsing error.
    #[error("XML parse error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// XML attribute error.
    #[error("XML attribute error: {0}")]
    XmlAttrError(String),

    /// UTF-8 conversion error.
    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    // ==================== File System Errors ====================
    /// Invalid file path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),

    /// Unexpected end of data.
    #[error("unexpected end of file")]
    UnexpectedEof,
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlAttrError(err.to_string())
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

/// A specialized Result type for `FrostPak` operations.
pub type Result<T> = std::result::Result<T, Error>;
