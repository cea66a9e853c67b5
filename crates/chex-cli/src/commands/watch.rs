//! Watch command implementation
//!
//! Runs the rebuild loop until interrupted.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chex_config::CONFIG_FILE_NAME;

use crate::pipeline::watch::watch_and_rebuild;

/// Run the watch command
///
/// Installs a Ctrl-C handler that flips a cancellation token, then hands
/// control to the rebuild loop. Individual rebuild failures keep the loop
/// alive; only watcher setup errors end the command.
///
/// # Returns
/// Exit code: 0 after a clean cancellation.
pub fn run(root: &str, config: Option<&str>) -> Result<ExitCode> {
    let root = Path::new(root);
    let config_path = config
        .map(PathBuf::from)
        .unwrap_or_else(|| root.join(CONFIG_FILE_NAME));

    if !config_path.is_file() {
        anyhow::bail!("no configuration found at {}", config_path.display());
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let handler_token = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        handler_token.store(true, Ordering::SeqCst);
    })
    .context("failed to install interrupt handler")?;

    println!("{} {}", "Watching:".cyan().bold(), root.display());
    println!("{}", "Press Ctrl-C to stop.".dimmed());

    watch_and_rebuild(root, &config_path, cancel)?;

    println!("\n{}", "Watch stopped.".dimmed());
    Ok(ExitCode::SUCCESS)
}
