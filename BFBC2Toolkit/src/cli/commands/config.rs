//! CLI commands for the configuration

use super::ConfigFile;
use crate::settings::ToolkitConfig;

pub fn show(config: &ToolkitConfig) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

pub fn path(config_file: &ConfigFile) -> anyhow::Result<()> {
    match config_file.path() {
        Some(path) => println!("{}", path.display()),
        None => println!("No config directory on this platform"),
    }
    Ok(())
}
