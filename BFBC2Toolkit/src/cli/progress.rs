//! CLI progress display utilities
//!
//! Step indicators with emojis plus the bar and spinner styles shared by the
//! archive and conversion commands.

use std::time::Duration;

use console::{Emoji, style};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};

use frostpak::fbrb::FbrbProgress;

// Emoji with ASCII fallbacks for terminals without emoji support

/// Package - for unpacking/packing operations
pub static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "");
/// Broom - for cleanup
pub static BROOM: Emoji<'_, '_> = Emoji("🧹 ", "");
/// Gear - for conversion operations
pub static GEAR: Emoji<'_, '_> = Emoji("⚙️  ", "");
/// Snake - for interpreter operations
pub static SNAKE: Emoji<'_, '_> = Emoji("🐍 ", "");
/// Sparkles - for completion
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");

/// Print a step indicator: `[1/3] 📦 Message...`
pub fn print_step(current: usize, total: usize, emoji: Emoji, msg: &str) {
    println!(
        "{} {}{}",
        style(format!("[{current}/{total}]")).bold().dim(),
        emoji,
        msg
    );
}

/// Print completion message: `✨ Done in 2s`
pub fn print_done(elapsed: Duration) {
    println!("{} Done in {}", SPARKLE, HumanDuration(elapsed));
}

/// Progress bar style with percentage
///
/// Format: `Extracting [########--------] 50/100 (50%)`
///
/// # Panics
/// Panics if the template string is invalid (this is a compile-time constant).
#[must_use]
pub fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
        .expect("valid template")
        .progress_chars("##-")
}

/// Create a simple spinner
///
/// # Panics
/// Panics if the template string is invalid (this is a compile-time constant).
#[must_use]
pub fn simple_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("valid template"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a simple progress bar
#[must_use]
pub fn simple_bar(total: u64, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(bar_style());
    pb.set_message(msg.to_string());
    pb
}

/// Bar driven by FBRB progress events; hidden when `quiet`
#[must_use]
pub fn fbrb_bar(quiet: bool) -> ProgressBar {
    if quiet {
        ProgressBar::hidden()
    } else {
        simple_bar(0, "")
    }
}

/// Apply an FBRB progress event to a bar
pub fn update_fbrb_bar(pb: &ProgressBar, progress: &FbrbProgress) {
    pb.set_length(progress.total as u64);
    pb.set_position(progress.current as u64);
    match &progress.current_file {
        Some(name) => pb.set_message(format!("{}: {name}", progress.phase.as_str())),
        None => pb.set_message(progress.phase.as_str()),
    }
}
