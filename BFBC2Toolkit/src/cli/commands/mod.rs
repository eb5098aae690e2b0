use clap::Subcommand;
use std::path::PathBuf;

use crate::settings::ToolkitConfig;

pub mod config;
pub mod dbx;
pub mod definitions;
pub mod execute;
pub mod fbrb;
pub mod python;
pub mod tree;

pub use definitions::{
    BatchModeArg, ConfigCommands, DbxCommands, DbxTarget, FbrbCommands, PythonCommands,
};

#[derive(Subcommand)]
pub enum Commands {
    /// FBRB archive operations
    Fbrb {
        #[command(subcommand)]
        command: FbrbCommands,
    },

    /// DBX document conversion
    Dbx {
        #[command(subcommand)]
        command: DbxCommands,
    },

    /// External Python interpreter
    Python {
        #[command(subcommand)]
        command: PythonCommands,
    },

    /// Show the data tree of an extracted folder
    Tree {
        /// Extracted " FbRB" folder
        folder: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Toolkit configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Where the configuration comes from: `--config <file>` or the user's config dir
#[derive(Debug, Clone, Default)]
pub struct ConfigFile(pub Option<PathBuf>);

impl ConfigFile {
    /// Load the configuration; an explicit file that exists must parse.
    pub fn load(&self) -> anyhow::Result<ToolkitConfig> {
        match &self.0 {
            Some(path) if path.exists() => Ok(ToolkitConfig::load_from(path)?),
            Some(_) => Ok(ToolkitConfig::default()),
            None => Ok(ToolkitConfig::load()),
        }
    }

    pub fn save(&self, config: &ToolkitConfig) -> anyhow::Result<()> {
        match &self.0 {
            Some(path) => config.save_to(path)?,
            None => config.save()?,
        }
        Ok(())
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.0.clone().or_else(ToolkitConfig::config_path)
    }
}
