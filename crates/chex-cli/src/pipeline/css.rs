//! CSS stage: verbatim copies or a Tailwind compile.
//!
//! The Tailwind path drives the `tailwindcss` CLI as a subprocess the same
//! way the bundle stage drives esbuild, reusing its timeout handling.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use colored::Colorize;
use thiserror::Error;

use chex_bundler::{wait_with_timeout, BundleError};
use chex_config::{CopyFile, CssSpec};

/// Environment variable overriding the tailwindcss executable path.
pub const TAILWIND_ENV_VAR: &str = "CHEX_TAILWIND";

/// Timeout for one Tailwind compile (2 minutes).
pub const TAILWIND_TIMEOUT_SECS: u64 = 120;

/// Error from the CSS stage.
#[derive(Debug, Error)]
pub enum CssError {
    /// The tailwindcss executable could not be located.
    #[error(
        "tailwindcss executable not found. Install it, or set {} to its path",
        TAILWIND_ENV_VAR
    )]
    CompilerNotFound,

    /// The compiler process could not be started.
    #[error("failed to start tailwindcss: {0}")]
    SpawnFailed(std::io::Error),

    /// The compiler ran past its timeout and was killed.
    #[error("tailwindcss timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout that expired, in seconds.
        timeout_secs: u64,
    },

    /// The compiler exited non-zero.
    #[error("tailwindcss exited with status {exit_code}:\n{stderr}")]
    CompilerFailed {
        /// Process exit code.
        exit_code: i32,
        /// Captured stderr output.
        stderr: String,
    },

    /// I/O error while copying or preparing directories.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Runs the CSS stage for the configured spec.
///
/// Returns the paths written under the output directory.
pub fn process_css(root: &Path, dist: &Path, spec: &CssSpec) -> Result<Vec<PathBuf>, CssError> {
    match spec {
        CssSpec::None => Ok(Vec::new()),
        CssSpec::Copy { files } => copy_files(root, dist, files),
        CssSpec::Tailwind {
            input,
            output,
            minify,
        } => compile_tailwind(root, dist, input, output, *minify).map(|path| vec![path]),
    }
}

/// Copies each declared stylesheet byte-for-byte. Missing sources are
/// skipped with a log line.
fn copy_files(root: &Path, dist: &Path, files: &[CopyFile]) -> Result<Vec<PathBuf>, CssError> {
    let mut copied = Vec::new();

    for file in files {
        let src = root.join(&file.src);
        if !src.is_file() {
            println!(
                "  {} skipping {} {}",
                "!".yellow(),
                file.src,
                "(not found)".dimmed()
            );
            continue;
        }

        let dest = dist.join(&file.dest);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&src, &dest)?;
        println!("  {} {}", "ok".green(), file.dest);
        copied.push(dest);
    }

    Ok(copied)
}

/// Compiles one stylesheet through the Tailwind CLI.
fn compile_tailwind(
    root: &Path,
    dist: &Path,
    input: &str,
    output: &str,
    minify: bool,
) -> Result<PathBuf, CssError> {
    let binary = find_tailwind(root)?;
    let input_path = root.join(input);
    let output_path = dist.join(output);

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut cmd = Command::new(&binary);
    cmd.arg("-i").arg(&input_path).arg("-o").arg(&output_path);
    if minify {
        cmd.arg("--minify");
    }
    cmd.stdout(Stdio::null()).stderr(Stdio::piped());

    let child = cmd.spawn().map_err(CssError::SpawnFailed)?;
    let timeout = Duration::from_secs(TAILWIND_TIMEOUT_SECS);
    let (status, stderr) = wait_with_timeout(child, timeout, true).map_err(|e| match e {
        BundleError::Timeout { timeout_secs } => CssError::Timeout { timeout_secs },
        other => CssError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            other.to_string(),
        )),
    })?;

    if !status.success() {
        return Err(CssError::CompilerFailed {
            exit_code: status.code().unwrap_or(-1),
            stderr,
        });
    }

    println!("  {} {}", "ok".green(), output);
    Ok(output_path)
}

/// Finds the tailwindcss executable.
///
/// Resolution order: `CHEX_TAILWIND` environment variable, the root's
/// `node_modules/.bin`, the `PATH`, then common install locations.
pub fn find_tailwind(root: &Path) -> Result<PathBuf, CssError> {
    if let Ok(path) = std::env::var(TAILWIND_ENV_VAR) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(path);
        }
    }

    let names = if cfg!(windows) {
        vec!["tailwindcss.cmd", "tailwindcss.exe", "tailwindcss"]
    } else {
        vec!["tailwindcss"]
    };

    for name in &names {
        let path = root.join("node_modules").join(".bin").join(name);
        if path.exists() {
            return Ok(path);
        }
    }

    for name in &names {
        if let Ok(path) = which::which(name) {
            return Ok(path);
        }
    }

    let common_paths = if cfg!(target_os = "macos") {
        vec!["/opt/homebrew/bin/tailwindcss", "/usr/local/bin/tailwindcss"]
    } else if cfg!(windows) {
        vec![]
    } else {
        vec!["/usr/local/bin/tailwindcss", "/usr/bin/tailwindcss"]
    };

    for path_str in common_paths {
        let path = PathBuf::from(path_str);
        if path.exists() {
            return Ok(path);
        }
    }

    Err(CssError::CompilerNotFound)
}
