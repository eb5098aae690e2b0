//! High-level toolkit operations
//!
//! These tie the file format engine, the external interpreter and the
//! session state together the way the toolkit's commands use them.

pub mod cleanup;
pub mod dbx;
pub mod fbrb;

pub use cleanup::{CleanupReport, JUNK_FILES, cleanup};
pub use dbx::convert_dbx;
pub use fbrb::{archive, archive_with_progress, extract, extract_with_progress};
