//! Utility functions

pub mod path;

pub use path::{long_path, normalize_path, relative_path};
