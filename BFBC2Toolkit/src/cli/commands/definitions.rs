//! Subcommand enum definitions for CLI

use clap::{Subcommand, ValueEnum};
use std::path::PathBuf;

use frostpak::dbx::ConvertMode;
use frostpak::fbrb::BatchMode;

/// How plain folders given to `fbrb batch` are processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BatchModeArg {
    /// Unpack every .fbrb below the folder
    Unpack,
    /// Pack every " FbRB" folder below the folder
    Pack,
}

impl From<BatchModeArg> for BatchMode {
    fn from(mode: BatchModeArg) -> Self {
        match mode {
            BatchModeArg::Unpack => BatchMode::Unpack,
            BatchModeArg::Pack => BatchMode::Pack,
        }
    }
}

/// Target format of a folder conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DbxTarget {
    Xml,
    Dbx,
}

impl From<DbxTarget> for ConvertMode {
    fn from(target: DbxTarget) -> Self {
        match target {
            DbxTarget::Xml => ConvertMode::ToXml,
            DbxTarget::Dbx => ConvertMode::ToDbx,
        }
    }
}

/// FBRB archive commands
#[derive(Subcommand)]
pub enum FbrbCommands {
    /// Unpack archive(s) next to themselves into "<name> FbRB" folders
    Extract {
        /// Source .fbrb file(s)
        #[arg(required = true)]
        source: Vec<PathBuf>,

        /// Print the extracted data tree
        #[arg(short, long)]
        tree: bool,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Pack " FbRB" folder(s) into archives next to them
    Create {
        /// Source folder(s), named "<name> FbRB"
        #[arg(required = true)]
        source: Vec<PathBuf>,

        /// Payload gzip level 0-9 (0 stores uncompressed); config value if omitted
        #[arg(short = 'l', long)]
        compression_level: Option<u32>,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// List contents of an archive
    List {
        /// Archive file
        source: PathBuf,

        /// Show type and size of every entry
        #[arg(short, long)]
        detailed: bool,

        /// Only show count of entries
        #[arg(short, long)]
        count: bool,
    },

    /// Unpack archives and pack folders in bulk
    Batch {
        /// Archives, " FbRB" folders, or folders to search
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// What to do inside plain folders
        #[arg(short, long, value_enum, default_value = "unpack")]
        mode: BatchModeArg,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },
}

/// DBX document commands
#[derive(Subcommand)]
pub enum DbxCommands {
    /// Convert DBX files to XML and back (direction by extension)
    Convert {
        /// Source file(s) or folder(s)
        #[arg(required = true)]
        source: Vec<PathBuf>,

        /// Target format for files found in folders
        #[arg(short, long, value_enum, default_value = "xml")]
        to: DbxTarget,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },
}

/// External interpreter commands
#[derive(Subcommand)]
pub enum PythonCommands {
    /// Select the interpreter (pythonw.exe or any executable next to it)
    Set {
        /// Selected executable
        path: PathBuf,
    },

    /// Check the configured interpreter's version
    Check,

    /// Run a script with the configured interpreter
    Run {
        /// Script to run
        script: PathBuf,

        /// Path arguments passed to the script
        args: Vec<PathBuf>,
    },
}

/// Configuration commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the active configuration
    Show,

    /// Print where the configuration is stored
    Path,
}
