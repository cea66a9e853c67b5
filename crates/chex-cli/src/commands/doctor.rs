//! Doctor command implementation
//!
//! Checks the external tools and permissions a build depends on.

use anyhow::Result;
use colored::Colorize;
use std::env;
use std::path::Path;
use std::process::{Command, ExitCode};

use chex_bundler::{Bundler, BundlerConfig, BUNDLER_ENV_VAR};

use crate::pipeline::css::find_tailwind;

/// Run the doctor command
///
/// Checks:
/// - chex and rustc versions
/// - esbuild and tailwindcss availability
/// - Current-directory write permissions
///
/// # Returns
/// Exit code: 0 if all hard requirements pass, 1 otherwise. A missing
/// tailwindcss is only a note, since most configs never invoke it.
pub fn run() -> Result<ExitCode> {
    println!("{}", "chex doctor".cyan().bold());
    println!("{}", "===========".cyan());
    println!();

    let mut all_ok = true;

    println!("{}", "Versions:".bold());
    println!("  {} chex v{}", "->".green(), env!("CARGO_PKG_VERSION"));
    match rustc_version() {
        Some(version) => println!("  {} rustc {}", "->".green(), version),
        None => println!("  {} rustc (not found)", "->".yellow()),
    }
    println!();

    println!("{}", "Dependencies:".bold());
    let bundler = Bundler::with_config(BundlerConfig::default().search_dir("."));
    match bundler.find_bundler() {
        Ok(path) => {
            let version = tool_version(&path).unwrap_or_else(|| "unknown".to_string());
            println!("  {} esbuild {} ({})", "ok".green(), version, path.display());
        }
        Err(_) => {
            println!("  {} esbuild not found", "!!".red());
            println!("     {}", "The bundler is required for every build.".dimmed());
            println!(
                "     {}",
                format!("Install it (npm install -g esbuild) or set {}.", BUNDLER_ENV_VAR)
                    .dimmed()
            );
            all_ok = false;
        }
    }
    match find_tailwind(Path::new(".")) {
        Ok(path) => {
            let version = tool_version(&path).unwrap_or_else(|| "unknown".to_string());
            println!(
                "  {} tailwindcss {} ({})",
                "ok".green(),
                version,
                path.display()
            );
        }
        Err(_) => {
            println!("  {} tailwindcss not found", "!!".yellow());
            println!(
                "     {}",
                "Only needed when css.type is \"tailwind\".".dimmed()
            );
        }
    }
    println!();

    println!("{}", "Permissions:".bold());
    match env::current_dir() {
        Ok(dir) => {
            let test_file = dir.join(".chex_write_test");
            match std::fs::write(&test_file, "test") {
                Ok(_) => {
                    let _ = std::fs::remove_file(&test_file);
                    println!(
                        "  {} current directory is writable ({})",
                        "ok".green(),
                        dir.display()
                    );
                }
                Err(e) => {
                    println!("  {} cannot write to current directory: {}", "!!".red(), e);
                    all_ok = false;
                }
            }
        }
        Err(e) => {
            println!("  {} cannot determine current directory: {}", "!!".red(), e);
            all_ok = false;
        }
    }
    println!();

    if all_ok {
        println!("{} All checks passed!", "SUCCESS".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{} Some checks failed. See above for details.",
            "WARNING".yellow().bold()
        );
        Ok(ExitCode::from(1))
    }
}

/// Runs `<binary> --version` and returns the first line of output.
fn tool_version(binary: &Path) -> Option<String> {
    let output = Command::new(binary).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_tool_version(&stdout)
}

fn parse_tool_version(output: &str) -> Option<String> {
    let line = output.lines().next()?.trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

/// Get the rustc version
fn rustc_version() -> Option<String> {
    let output = Command::new("rustc").arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_rustc_version(&stdout)
}

fn parse_rustc_version(output: &str) -> Option<String> {
    // Parse "rustc 1.75.0 (..."
    output.split_whitespace().nth(1).map(|s| s.to_string())
}
