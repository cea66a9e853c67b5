//! Watch mode: rebuild whenever sources change.
//!
//! Every rebuild is a full, stateless run of [`build_extension`]; the
//! loop carries nothing between runs and stops when the cancellation
//! token flips. Rebuild failures are printed and watching continues --
//! an interactive loop must survive a broken intermediate state.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use colored::Colorize;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use chex_config::{BuildConfig, MANIFEST_FILE_NAME};

use super::build_extension;

/// How often the loop wakes to check the cancellation token.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Builds once, then rebuilds on every relevant filesystem event until
/// the token is cancelled.
///
/// The configuration is re-read before each rebuild, so edits to the
/// config file itself take effect without restarting the watcher.
pub fn watch_and_rebuild(
    root: &Path,
    config_path: &Path,
    cancel: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    rebuild_once(root, config_path);

    let (tx, rx) = mpsc::channel();
    let mut watcher: RecommendedWatcher = notify::recommended_watcher(move |event| {
        let _ = tx.send(event);
    })
    .context("failed to create filesystem watcher")?;

    for path in watch_roots(root, config_path) {
        let mode = if path.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(&path, mode)
            .with_context(|| format!("failed to watch {}", path.display()))?;
    }

    pump_events(&rx, &cancel, || rebuild_once(root, config_path));
    Ok(())
}

/// Paths the watcher subscribes to: the source tree plus the root files
/// a rebuild reads. The output directory is not watched, so builds do
/// not retrigger themselves.
fn watch_roots(root: &Path, config_path: &Path) -> Vec<PathBuf> {
    let mut roots = vec![
        root.join("src"),
        root.join(MANIFEST_FILE_NAME),
        config_path.to_path_buf(),
    ];
    roots.retain(|p| p.exists());
    roots
}

/// Drives rebuilds from watcher events until cancelled.
///
/// Events arriving while a rebuild runs pile up in the channel; they are
/// drained in one gulp afterwards so an editor's save burst triggers a
/// single rebuild, not one per event.
fn pump_events(
    rx: &Receiver<notify::Result<Event>>,
    cancel: &AtomicBool,
    mut on_change: impl FnMut(),
) {
    loop {
        if cancel.load(Ordering::SeqCst) {
            return;
        }
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(Ok(event)) if is_relevant(&event) => {
                while rx.try_recv().is_ok() {}
                if cancel.load(Ordering::SeqCst) {
                    return;
                }
                on_change();
            }
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                eprintln!("{}: {}", "watch error".yellow(), e);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

/// Whether an event can change what a build reads. Pure access
/// notifications cannot; everything else is treated as a change.
fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Any | EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// One watch-triggered build. Failures are printed, never propagated.
fn rebuild_once(root: &Path, config_path: &Path) {
    println!("\n{} {}", "Building:".cyan().bold(), root.display());

    let config = match BuildConfig::from_path(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("{} {}", "FAILED".red().bold(), e);
            println!("{}", "Waiting for changes...".dimmed());
            return;
        }
    };

    match build_extension(root, &config) {
        Ok(report) => {
            println!(
                "{} {} entrypoint(s) in {}ms",
                "SUCCESS".green().bold(),
                report.entries.len(),
                report.duration.as_millis()
            );
        }
        Err(e) => {
            println!("{} {}", "FAILED".red().bold(), e);
        }
    }
    println!("{}", "Waiting for changes...".dimmed());
}
