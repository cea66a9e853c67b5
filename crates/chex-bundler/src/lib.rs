//! chex Bundler Backend
//!
//! This crate drives the external JavaScript/TypeScript bundler (esbuild) as
//! a subprocess for chex extension builds.
//!
//! # Overview
//!
//! Each entrypoint becomes one bundler invocation:
//!
//! 1. The orchestrator locates the esbuild executable
//! 2. It builds a command line from the [`BundleRequest`]
//! 3. The subprocess runs under a timeout with stderr captured
//! 4. On success the output lands at `<outdir>/index.js`, renamed when the
//!    request asks for a different file name
//!
//! A failed build surfaces the bundler's complete diagnostic log through
//! [`BundleError::BuildFailed`]; this crate never terminates the process on
//! its own.
//!
//! # Example
//!
//! ```no_run
//! use chex_bundler::{Bundler, BundleRequest};
//!
//! let bundler = Bundler::new();
//! let request = BundleRequest::new("src/popup/index.ts", "dist/popup");
//! let output = bundler.bundle(&request)?;
//! println!("wrote {}", output.path.display());
//! # Ok::<(), chex_bundler::BundleError>(())
//! ```
//!
//! # Bundler Requirements
//!
//! esbuild must be installed. The orchestrator searches, in order:
//!
//! 1. An explicit path from [`BundlerConfig`]
//! 2. The `CHEX_ESBUILD` environment variable
//! 3. `node_modules/.bin` under the configured search directory
//! 4. System PATH
//! 5. Common installation locations (platform-specific)
//!
//! # Crate Structure
//!
//! - [`orchestrator`] - Subprocess management and argument construction
//! - [`error`] - Error types

pub mod error;
pub mod orchestrator;

// Re-export main types at crate root
pub use error::{BundleError, BundleResult};
pub use orchestrator::{
    wait_with_timeout, BundleOutput, BundleRequest, Bundler, BundlerConfig, BUNDLER_ENV_VAR,
    DEFAULT_OUTPUT_NAME, DEFAULT_TIMEOUT_SECS,
};
