//! Command execution implementations

use super::definitions::{ConfigCommands, DbxCommands, FbrbCommands, PythonCommands};
use super::{Commands, ConfigFile};
use super::{config, dbx, fbrb, python, tree};

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self, config_file: &ConfigFile) -> anyhow::Result<()> {
        match self {
            Commands::Fbrb { command } => command.execute(config_file),
            Commands::Dbx { command } => command.execute(config_file),
            Commands::Python { command } => command.execute(config_file),
            Commands::Tree { folder, json } => tree::show(folder, *json),
            Commands::Config { command } => command.execute(config_file),
        }
    }
}

impl FbrbCommands {
    /// Execute the selected FBRB command.
    ///
    /// # Errors
    /// Returns an error if the underlying FBRB operation fails.
    pub fn execute(&self, config_file: &ConfigFile) -> anyhow::Result<()> {
        match self {
            FbrbCommands::Extract {
                source,
                tree,
                quiet,
            } => fbrb::extract(source, config_file, *tree, *quiet),
            FbrbCommands::Create {
                source,
                compression_level,
                quiet,
            } => fbrb::create(source, &config_file.load()?, *compression_level, *quiet),
            FbrbCommands::List {
                source,
                detailed,
                count,
            } => fbrb::list(source, *detailed, *count),
            FbrbCommands::Batch { paths, mode, quiet } => {
                fbrb::batch(paths, (*mode).into(), &config_file.load()?, *quiet)
            }
        }
    }
}

impl DbxCommands {
    /// Execute the selected DBX command.
    ///
    /// # Errors
    /// Returns an error if the conversion cannot run.
    pub fn execute(&self, config_file: &ConfigFile) -> anyhow::Result<()> {
        match self {
            DbxCommands::Convert { source, to, quiet } => {
                dbx::convert(source, (*to).into(), &config_file.load()?, *quiet)
            }
        }
    }
}

impl PythonCommands {
    /// Execute the selected interpreter command.
    ///
    /// # Errors
    /// Returns an error if the interpreter cannot be used or the config not saved.
    pub fn execute(&self, config_file: &ConfigFile) -> anyhow::Result<()> {
        match self {
            PythonCommands::Set { path } => python::set(path, config_file),
            PythonCommands::Check => python::check(&config_file.load()?),
            PythonCommands::Run { script, args } => python::run(script, args, &config_file.load()?),
        }
    }
}

impl ConfigCommands {
    /// Execute the selected configuration command.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be loaded.
    pub fn execute(&self, config_file: &ConfigFile) -> anyhow::Result<()> {
        match self {
            ConfigCommands::Show => config::show(&config_file.load()?),
            ConfigCommands::Path => config::path(config_file),
        }
    }
}
