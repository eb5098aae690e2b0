//! CLI commands for DBX conversion

use std::path::PathBuf;
use std::time::Instant;

use frostpak::dbx::ConvertMode;

use crate::cli::progress::{GEAR, print_done, print_step, simple_bar};
use crate::operations::convert_dbx;
use crate::settings::ToolkitConfig;

/// Convert files and folders between DBX and XML
pub fn convert(
    sources: &[PathBuf],
    mode: ConvertMode,
    config: &ToolkitConfig,
    quiet: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();
    print_step(
        1,
        1,
        GEAR,
        &format!("Converting with the {} backend...", config.backend),
    );

    let pb = if quiet {
        indicatif::ProgressBar::hidden()
    } else {
        simple_bar(0, "Converting")
    };

    let result = convert_dbx(sources, mode, config, |current, total, file| {
        pb.set_length(total as u64);
        pb.set_position(current as u64);
        if let Some(name) = file.file_name() {
            pb.set_message(name.to_string_lossy().into_owned());
        }
    })?;

    pb.finish_and_clear();

    println!("Conversion complete:");
    println!("  Success: {}", result.success_count);
    println!("  Failed: {}", result.fail_count);
    println!("  Skipped: {}", result.skipped_count);

    if result.fail_count > 0 {
        println!();
        println!("Failures:");
        for msg in result.results.iter().filter(|m| m.starts_with("Failed")) {
            println!("  {msg}");
        }
    }

    print_done(started.elapsed());
    Ok(())
}
