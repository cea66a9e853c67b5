//! Validate command implementation
//!
//! Checks the configuration shape and the built output without building.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use chex_config::{
    validate_config, validate_dist, BuildConfig, ValidationResult, CONFIG_FILE_NAME,
    DIST_DIR_NAME, MANIFEST_FILE_NAME,
};

use super::reporting::print_validation_results;

/// Run the validate command
///
/// Validates the configuration when `<root>/chex.json` exists, and the
/// output manifest when the output directory exists (or was named
/// explicitly). Every error is collected before anything is reported.
///
/// # Returns
/// Exit code: 0 when no errors were found, 1 otherwise.
pub fn run(root: &str, dist: Option<&str>) -> Result<ExitCode> {
    let start = Instant::now();
    let root = Path::new(root);

    let mut combined = ValidationResult::success();

    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.is_file() {
        println!("{} {}", "Validating:".cyan().bold(), config_path.display());
        let config = BuildConfig::from_path(&config_path)
            .with_context(|| format!("failed to load {}", config_path.display()))?;
        combined.merge(validate_config(root, &config));
    } else {
        println!("{} {}", "Validating:".cyan().bold(), root.display());
        println!(
            "  {} no {} found, skipping configuration checks",
            "!".yellow(),
            CONFIG_FILE_NAME
        );
    }

    let dist_path = dist
        .map(PathBuf::from)
        .unwrap_or_else(|| root.join(DIST_DIR_NAME));
    if dist_path.is_dir() || dist.is_some() {
        // An explicitly named output directory is always checked, even if
        // absent; the default one is only checked once a build produced it.
        println!(
            "{} {}",
            "Validating:".cyan().bold(),
            dist_path.join(MANIFEST_FILE_NAME).display()
        );
        combined.merge(validate_dist(&dist_path));
    } else {
        println!(
            "  {} {}/ not built yet, skipping output checks",
            "!".yellow(),
            DIST_DIR_NAME
        );
    }

    print_validation_results(&combined);

    let duration_ms = start.elapsed().as_millis();
    if combined.is_ok() {
        println!(
            "\n{} Extension is valid ({}ms)",
            "SUCCESS".green().bold(),
            duration_ms
        );
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "\n{} Validation failed with {} error(s), {} warning(s) ({}ms)",
            "FAILED".red().bold(),
            combined.errors.len(),
            combined.warnings.len(),
            duration_ms
        );
        Ok(ExitCode::from(1))
    }
}
