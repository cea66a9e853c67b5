//! Error types for bundler invocation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for bundler operations.
pub type BundleResult<T> = Result<T, BundleError>;

/// Errors that can occur while invoking the external bundler.
#[derive(Debug, Error)]
pub enum BundleError {
    /// Bundler executable not found.
    #[error("esbuild executable not found. Ensure esbuild is installed (npm install -g esbuild) and in PATH, or set the CHEX_ESBUILD environment variable")]
    BundlerNotFound,

    /// Failed to spawn the bundler process.
    #[error("failed to spawn bundler process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// Bundler process timed out.
    #[error("bundler process timed out after {timeout_secs} seconds")]
    Timeout {
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },

    /// Bundler exited with non-zero status.
    ///
    /// `stderr` carries the bundler's full diagnostic log so callers can
    /// print every reported problem.
    #[error("bundler exited with status {exit_code}:\n{stderr}")]
    BuildFailed {
        /// Process exit code.
        exit_code: i32,
        /// Captured bundler diagnostics.
        stderr: String,
    },

    /// Expected output file not found after a successful exit.
    #[error("expected bundler output not found: {path}")]
    OutputMissing {
        /// Path that was expected to exist.
        path: PathBuf,
    },

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BundleError {
    /// Creates a new build failed error.
    pub fn build_failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::BuildFailed {
            exit_code,
            stderr: stderr.into(),
        }
    }
}
