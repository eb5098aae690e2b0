//! BFBC2 Toolkit - Battlefield: Bad Company 2 modding toolkit
//!
//! Unpacks FBRB archives next to themselves, tidies and presents the
//! extracted data, repacks it, and converts DBX documents. The work is done
//! by the built-in `frostpak` codecs or, when configured, by an external
//! Python interpreter running `fbrb.py` / `dbx.py`.
//!
//! ```no_run
//! use bfbc2_toolkit::{Session, ToolkitConfig, operations};
//!
//! let config = ToolkitConfig::load();
//! let mut session = Session::new();
//! if let Some(tree) = operations::extract("mp_001.fbrb".as_ref(), &mut session, &config)? {
//!     print!("{}", tree.render());
//! }
//! operations::archive(&session, &config)?;
//! # Ok::<(), bfbc2_toolkit::Error>(())
//! ```

pub mod error;
pub mod operations;
pub mod python;
pub mod session;
pub mod settings;
pub mod tree;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export the engine crate
pub use frostpak;

pub use error::{Error, Result};
pub use session::Session;
pub use settings::{Backend, ToolkitConfig};
pub use tree::DataTree;
