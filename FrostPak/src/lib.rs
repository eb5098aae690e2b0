//! # FrostPak
//!
//! A pure-Rust library for Battlefield: Bad Company 2 (Frostbite 1.5) file formats.
//!
//! ## Supported Formats
//!
//! - **FBRB archives** - Unpack, repack, and list resource bundles
//! - **DBX** - Binary XML documents, converted to and from indented XML
//!
//! ## Quick Start
//!
//! ### Working with FBRB Archives
//!
//! ```no_run
//! use frostpak::fbrb::FbrbOperations;
//!
//! // List contents of an archive
//! let files = FbrbOperations::list("mp_001.fbrb")?;
//! println!("Found {} files", files.len());
//!
//! // Unpack next to the archive, into "mp_001 FbRB"
//! let folder = FbrbOperations::extract("mp_001.fbrb")?;
//!
//! // Pack the folder back into "mp_001.fbrb"
//! FbrbOperations::create(&folder)?;
//! # Ok::<(), frostpak::Error>(())
//! ```
//!
//! ### Converting DBX Documents
//!
//! ```no_run
//! use frostpak::dbx::{convert_dbx_to_xml, convert_xml_to_dbx};
//!
//! convert_dbx_to_xml("soldier.dbx", "soldier.xml")?;
//! convert_xml_to_dbx("soldier.xml", "soldier.dbx")?;
//! # Ok::<(), frostpak::Error>(())
//! ```

pub mod dbx;
pub mod error;
pub mod fbrb;
pub mod utils;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};

    // FBRB operations
    pub use crate::fbrb::{
        BatchMode, BatchOptions, BatchResult, CreateOptions, ExtractOptions, FbrbEntry,
        FbrbOperations, FbrbPhase, FbrbProgress, find_archive_folders, find_fbrb_files,
        process_paths,
    };

    // DBX documents
    pub use crate::dbx::{
        ConvertMode, ConvertResult, DbxDocument, DbxElement, DbxNumbers, DbxValue,
        convert_file, convert_paths, from_xml, read_dbx, to_xml, write_dbx,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
