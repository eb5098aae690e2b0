//! FBRB archive operations module
//!
//! Frostbite 1.5 resource bundles as shipped with Bad Company 2. An archive is
//! the `FbRB` magic, a gzip-compressed header holding the string and file
//! tables, then the payload (one gzip stream over every file, or raw bytes).

mod batch;
mod operations;
mod reader;
mod staging;
mod types;
mod writer;

// Primary public API
pub use operations::{
    CreateOptions, ExtractOptions, FbrbOperations, default_archive_path,
    default_extraction_folder, is_archive_folder, is_archive_path,
};

// Low-level reader/writer
pub use reader::{FbrbHeader, FbrbPayload, FbrbReader};
pub use writer::FbrbWriter;

pub use types::{
    DELETED, FbrbEntry, FbrbPhase, FbrbProgress, NON_RESOURCE, ProgressCallback, RESOURCE_TYPES,
    split_extension, type_for_extension,
};

// Batch operations
pub use batch::{
    BatchMode, BatchOptions, BatchResult, find_archive_folders, find_fbrb_files, process_paths,
};

/// Archive magic
pub const MAGIC: [u8; 4] = *b"FbRB";

/// Header version written by the game tools
pub const HEADER_VERSION: u32 = 2;

/// Size of one file table entry in bytes
pub const ENTRY_SIZE: usize = 24;

/// Suffix of a folder holding an extracted archive
pub const FOLDER_SUFFIX: &str = " FbRB";

/// Archive file extension (without dot)
pub const ARCHIVE_EXTENSION: &str = "fbrb";

/// Default gzip level for the payload
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 1;

/// Gzip level for the header; always 1 regardless of the payload level
pub const HEADER_COMPRESSION_LEVEL: u32 = 1;

/// Entry flags for files with content
pub const FLAG_HAS_DATA: u32 = 0x0001_0000;

/// Chunk size for copying staged payloads
pub(crate) const COPY_BUFFER_SIZE: usize = 1_000_000;
