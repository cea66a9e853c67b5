//! Build command implementation
//!
//! Loads the configuration, checks it, and runs the full pipeline.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use walkdir::WalkDir;

use chex_config::{validate_config, BuildConfig, ErrorCode, CONFIG_FILE_NAME};

use super::reporting::print_validation_results;
use crate::pipeline::{self, PipelineError};

/// Run the build command
///
/// # Arguments
/// * `root` - Extension root directory
/// * `config` - Configuration file path (default: `<root>/chex.json`)
///
/// # Returns
/// Exit code: 0 on success, 1 on any configuration, bundling, CSS, or
/// validation failure.
pub fn run(root: &str, config: Option<&str>) -> Result<ExitCode> {
    let start = Instant::now();
    let root = Path::new(root);
    let config_path = config
        .map(PathBuf::from)
        .unwrap_or_else(|| root.join(CONFIG_FILE_NAME));

    println!("{} {}", "Building:".cyan().bold(), root.display());
    println!("{} {}", "Config:".dimmed(), config_path.display());

    let config = BuildConfig::from_path(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    // Refuse to build from a broken configuration; warnings are advisory.
    let check = validate_config(root, &config);
    print_validation_results(&check);
    if !check.is_ok() {
        println!(
            "\n{} Configuration is invalid ({} error(s))",
            "FAILED".red().bold(),
            check.errors.len()
        );
        return Ok(ExitCode::from(1));
    }

    match pipeline::build_extension(root, &config) {
        Ok(report) => {
            let duration_ms = start.elapsed().as_millis();
            let file_count = WalkDir::new(&report.dist)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .count();

            if !report.skipped.is_empty() {
                println!(
                    "\n{} {} entrypoint(s) skipped; see log above",
                    "!".yellow(),
                    report.skipped.len()
                );
            }
            println!(
                "\n{} Built {} entrypoint(s), {} file(s) in {}ms",
                "SUCCESS".green().bold(),
                report.entries.len(),
                file_count,
                duration_ms
            );
            println!("{} {}", "Output:".dimmed(), report.dist.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(PipelineError::Validation(result)) => {
            let missing: Vec<&str> = result
                .errors
                .iter()
                .filter(|e| e.code == ErrorCode::MissingReferencedFile)
                .filter_map(|e| e.path.as_deref())
                .collect();
            if missing.is_empty() {
                print_validation_results(&result);
            } else {
                println!("\n{}", "Missing files referenced in manifest.json:".red().bold());
                for path in &missing {
                    println!("  {} {}", "x".red(), path);
                }
            }
            println!(
                "\n{} Output validation failed with {} error(s)",
                "FAILED".red().bold(),
                result.errors.len()
            );
            Ok(ExitCode::from(1))
        }
        Err(e) => {
            println!("\n{} {}", "BUILD FAILED".red().bold(), e);
            Ok(ExitCode::from(1))
        }
    }
}
