//! CLI commands for FBRB operations

use std::path::{Path, PathBuf};
use std::time::Instant;

use frostpak::fbrb::{BatchMode, BatchOptions, FbrbOperations, FbrbProgress, process_paths};

use super::ConfigFile;
use crate::cli::progress::{
    BROOM, PACKAGE, fbrb_bar, print_done, print_step, update_fbrb_bar,
};
use crate::operations;
use crate::session::Session;
use crate::settings::ToolkitConfig;

/// Unpack archives next to themselves, clean up and show what came out
pub fn extract(
    sources: &[PathBuf],
    config_file: &ConfigFile,
    show_tree: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();
    let config = config_file.load()?;
    let mut recent = config.clone();
    let mut failures = Vec::new();

    for (i, archive) in sources.iter().enumerate() {
        print_step(
            i + 1,
            sources.len(),
            PACKAGE,
            &format!("Unpacking {}...", archive.display()),
        );

        let mut session = Session::new();
        let pb = fbrb_bar(quiet);
        let result = operations::extract_with_progress(
            archive,
            &mut session,
            &config,
            &|p: &FbrbProgress| update_fbrb_bar(&pb, p),
        );
        pb.finish_and_clear();

        match result {
            Ok(tree) => {
                recent.add_recent_file(&archive.to_string_lossy());
                if let Some(folder) = &session.files_path_data {
                    println!("  {BROOM}Extracted to {}", folder.display());
                }
                if let Some(tree) = tree {
                    println!(
                        "  {} files in {} folders",
                        tree.file_count(),
                        tree.dir_count()
                    );
                    if show_tree {
                        print!("{}", tree.render());
                    }
                }
            }
            Err(e) => failures.push(format!("Failed {}: {e}", archive.display())),
        }
    }

    if recent.recent_files != config.recent_files {
        if let Err(e) = config_file.save(&recent) {
            tracing::warn!("Could not save recent files: {e}");
        }
    }

    report_failures(&failures)?;
    print_done(started.elapsed());
    Ok(())
}

/// Pack extracted folders back into archives
pub fn create(
    sources: &[PathBuf],
    config: &ToolkitConfig,
    compression_level: Option<u32>,
    quiet: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();
    let mut config = config.clone();
    if let Some(level) = compression_level {
        config.compression_level = level;
    }

    let mut failures = Vec::new();
    for (i, folder) in sources.iter().enumerate() {
        print_step(
            i + 1,
            sources.len(),
            PACKAGE,
            &format!("Packing {}...", folder.display()),
        );

        let session = Session::with_data_folder(folder);
        let pb = fbrb_bar(quiet);
        let result = operations::archive_with_progress(&session, &config, &|p: &FbrbProgress| {
            update_fbrb_bar(&pb, p);
        });
        pb.finish_and_clear();

        match result {
            Ok(archive) => println!("  Created {}", archive.display()),
            Err(e) => failures.push(format!("Failed {}: {e}", folder.display())),
        }
    }

    report_failures(&failures)?;
    print_done(started.elapsed());
    Ok(())
}

/// List the file table of an archive
pub fn list(source: &Path, detailed: bool, count: bool) -> anyhow::Result<()> {
    let entries = FbrbOperations::list(source)?;

    if count {
        println!("{}", entries.len());
        return Ok(());
    }

    for entry in &entries {
        if detailed {
            println!(
                "{:<22} {:>10}  {}",
                entry.type_name,
                entry.size,
                entry.extracted_path().display()
            );
        } else {
            println!("{}", entry.name);
        }
    }

    if detailed {
        let total: u64 = entries.iter().map(|e| u64::from(e.size)).sum();
        println!();
        println!("{} entries, {}", entries.len(), format_size(total));
    }
    Ok(())
}

/// Unpack archives and pack folders in parallel
pub fn batch(
    paths: &[PathBuf],
    mode: BatchMode,
    config: &ToolkitConfig,
    quiet: bool,
) -> anyhow::Result<()> {
    let options = BatchOptions {
        mode,
        compression_level: config.compression_level,
        pack_temp_file: config.pack_temp_file,
        unpack_temp_file: config.unpack_temp_file,
    };

    let pb = fbrb_bar(quiet);
    let result = process_paths(paths, &options, |progress| update_fbrb_bar(&pb, progress));

    pb.finish_and_clear();

    println!();
    println!("Batch complete:");
    println!("  Success: {}", result.success_count);
    println!("  Failed: {}", result.fail_count);
    println!("  Skipped: {}", result.skipped_count);

    if result.fail_count > 0 {
        println!();
        println!("Failures:");
        for msg in result
            .results
            .iter()
            .filter(|m| m.starts_with("Failed") || m.starts_with("Not found"))
        {
            println!("  {msg}");
        }
    }

    Ok(())
}

fn report_failures(failures: &[String]) -> anyhow::Result<()> {
    if failures.is_empty() {
        return Ok(());
    }
    println!();
    println!("Failures:");
    for msg in failures {
        println!("  {msg}");
    }
    anyhow::bail!("{} of the inputs failed", failures.len())
}

/// Format byte size for display
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} bytes")
    }
}
