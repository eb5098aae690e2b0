//! CLI commands for the external interpreter

use std::path::{Path, PathBuf};

use console::style;

use super::ConfigFile;
use crate::cli::progress::{SNAKE, simple_spinner};
use crate::python::{change_path, check_version, execute_script};
use crate::settings::{WINDOWED_INTERPRETER, ToolkitConfig};

/// Select the interpreter and save it to the config
pub fn set(selected: &Path, config_file: &ConfigFile) -> anyhow::Result<()> {
    let mut config = config_file.load()?;
    let Some(accepted) = change_path(&mut config, selected) else {
        anyhow::bail!(
            "{} is not {WINDOWED_INTERPRETER} and there is none next to it",
            selected.display()
        );
    };

    config_file.save(&config)?;
    println!("{SNAKE}Python path set to {}", accepted.display());
    Ok(())
}

/// Report whether the configured interpreter has the required version
pub fn check(config: &ToolkitConfig) -> anyhow::Result<()> {
    let spinner = simple_spinner("Checking Python version...");
    let ok = check_version(&config.python_path, &config.required_python_version);
    spinner.finish_and_clear();

    if ok {
        println!(
            "{SNAKE}{} {} ({})",
            style("OK").green().bold(),
            config.required_python_version,
            config.python_path.display()
        );
        Ok(())
    } else {
        anyhow::bail!(
            "{} is not {}",
            config.python_path.display(),
            config.required_python_version
        )
    }
}

/// Run any script with the configured interpreter and wait for it
pub fn run(script: &Path, args: &[PathBuf], config: &ToolkitConfig) -> anyhow::Result<()> {
    println!("{SNAKE}Running {}", script.display());
    execute_script(&config.python_path, script, args)?;
    Ok(())
}
