//! Sync-manifest command implementation
//!
//! Copies each extension package's version into its manifest, so bumping
//! `package.json` is the only release step that touches version numbers.

use anyhow::{Context, Result};
use colored::Colorize;
use glob::glob;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use chex_config::MANIFEST_FILE_NAME;

/// Run the sync-manifest command
///
/// Scans `<root>/extensions/*/package.json` and rewrites each sibling
/// `manifest.json` whose `version` disagrees with the package's. The
/// manifest is rewritten through a JSON value, so fields this tool knows
/// nothing about survive untouched.
///
/// # Returns
/// Exit code: 0 on success (including "nothing to update").
pub fn run(root: &str) -> Result<ExitCode> {
    let root = Path::new(root);
    let pattern = root.join("extensions/*/package.json");
    let pattern = pattern.to_string_lossy().into_owned();

    println!("{} {}", "Syncing manifests:".cyan().bold(), pattern);

    let mut checked = 0usize;
    let mut updated = 0usize;
    for entry in glob(&pattern).context("invalid package glob pattern")? {
        let package_path = entry.context("failed to read glob entry")?;
        checked += 1;
        match sync_one(&package_path)? {
            SyncOutcome::Updated { name, version } => {
                println!("  {} {} -> {}", "ok".green(), name, version);
                updated += 1;
            }
            SyncOutcome::UpToDate { name, version } => {
                println!(
                    "  {} {} {}",
                    "ok".green(),
                    name,
                    format!("(already {})", version).dimmed()
                );
            }
            SyncOutcome::NoManifest { name } => {
                println!(
                    "  {} {} {}",
                    "!".yellow(),
                    name,
                    format!("(no {})", MANIFEST_FILE_NAME).dimmed()
                );
            }
            SyncOutcome::NoVersion { name } => {
                println!(
                    "  {} {} {}",
                    "!".yellow(),
                    name,
                    "(package has no version)".dimmed()
                );
            }
        }
    }

    if checked == 0 {
        println!("  {} no packages matched", "!".yellow());
    }
    println!(
        "\n{} Updated {} of {} manifest(s)",
        "SUCCESS".green().bold(),
        updated,
        checked
    );
    Ok(ExitCode::SUCCESS)
}

enum SyncOutcome {
    Updated { name: String, version: String },
    UpToDate { name: String, version: String },
    NoManifest { name: String },
    NoVersion { name: String },
}

/// Syncs one package directory. Returns what happened so the caller can
/// log it; parse failures are real errors, not skips.
fn sync_one(package_path: &Path) -> Result<SyncOutcome> {
    let package: Value = serde_json::from_str(&fs::read_to_string(package_path)?)
        .with_context(|| format!("failed to parse {}", package_path.display()))?;

    let dir = package_path.parent().unwrap_or(Path::new("."));
    let name = package
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| dir.display().to_string());

    let Some(version) = package.get("version").and_then(Value::as_str) else {
        return Ok(SyncOutcome::NoVersion { name });
    };
    let version = version.to_string();

    let manifest_path = dir.join(MANIFEST_FILE_NAME);
    if !manifest_path.is_file() {
        return Ok(SyncOutcome::NoManifest { name });
    }

    let mut manifest: Value = serde_json::from_str(&fs::read_to_string(&manifest_path)?)
        .with_context(|| format!("failed to parse {}", manifest_path.display()))?;
    if manifest.get("version").and_then(Value::as_str) == Some(version.as_str()) {
        return Ok(SyncOutcome::UpToDate { name, version });
    }

    match manifest.as_object_mut() {
        Some(map) => {
            map.insert("version".to_string(), Value::String(version.clone()));
        }
        None => anyhow::bail!("{} is not a JSON object", manifest_path.display()),
    }

    let mut body = serde_json::to_string_pretty(&manifest)?;
    body.push('\n');
    fs::write(&manifest_path, body)?;

    Ok(SyncOutcome::Updated { name, version })
}
