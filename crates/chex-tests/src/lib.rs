//! End-to-end test infrastructure for chex.
//!
//! This crate drives the real CLI commands against synthetic extension
//! projects laid out in temporary directories:
//!
//! - Build: config -> bundled entrypoints, static files, stylesheets, icons
//! - Validation: every manifest-referenced path exists in the output
//!
//! Bundler-dependent tests install stub `esbuild`/`tailwindcss` scripts
//! under the project's `node_modules/.bin`, which the pipeline prefers over
//! anything on `PATH`, so no JavaScript toolchain is required to run them.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p chex-tests
//! ```

pub mod fixtures;
pub mod harness;

pub use fixtures::ExtensionFixture;
