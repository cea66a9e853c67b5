//! The build pipeline.
//!
//! One build is a fixed sequence of stages over a clean output directory:
//!
//! 1. delete and recreate `dist/`
//! 2. resolve entrypoints and bundle each one
//! 3. copy `manifest.json` and declared HTML files
//! 4. process CSS
//! 5. rasterize icons
//! 6. check that every path the output manifest references exists
//!
//! Stages run strictly in order, never retry, and share no state beyond
//! the filesystem. Each stage reports failure as a typed error; turning
//! that into a process exit code is the caller's business.

pub mod assets;
pub mod bundle;
pub mod css;
pub mod entrypoints;
pub mod icons;
pub mod watch;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use colored::Colorize;
use thiserror::Error;

use chex_bundler::{BundleError, Bundler, BundlerConfig};
use chex_config::{
    validate_dist, BuildConfig, CssSpec, EntrypointSpec, ValidationResult, DIST_DIR_NAME,
};

pub use css::CssError;
pub use icons::IconError;

/// Error from a pipeline stage. The first failure aborts the build.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The bundler failed on one entry.
    #[error("failed to bundle {entry}: {source}")]
    Bundle {
        /// The entry source path.
        entry: String,
        /// The underlying bundler error.
        source: BundleError,
    },

    /// The CSS stage failed.
    #[error(transparent)]
    Css(#[from] CssError),

    /// The icon stage failed.
    #[error(transparent)]
    Icons(#[from] IconError),

    /// The extension root has no manifest.json to ship.
    #[error("manifest not found at {path}")]
    ManifestMissing {
        /// Path that was checked.
        path: String,
    },

    /// The output manifest references files that do not exist.
    #[error("output validation failed with {} error(s)", .0.errors.len())]
    Validation(ValidationResult),

    /// I/O error between stages.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result alias for pipeline stages.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// One bundled entry in a finished build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltEntry {
    /// The entry source path.
    pub entry: PathBuf,
    /// The written bundle path.
    pub output: PathBuf,
}

/// What one successful build produced.
#[derive(Debug)]
pub struct BuildReport {
    /// The output directory.
    pub dist: PathBuf,
    /// Bundled entries, in resolution order.
    pub entries: Vec<BuiltEntry>,
    /// Entry sources skipped because they did not exist.
    pub skipped: Vec<PathBuf>,
    /// Stylesheets written by the CSS stage.
    pub css: Vec<PathBuf>,
    /// Icon rasters written by the icon stage.
    pub icons: Vec<PathBuf>,
    /// Wall-clock duration of the whole build.
    pub duration: Duration,
}

/// Runs one full build of the extension at `root`.
pub fn build_extension(root: &Path, config: &BuildConfig) -> PipelineResult<BuildReport> {
    let start = Instant::now();
    let dist = root.join(DIST_DIR_NAME);

    clean_dist(&dist)?;

    println!("{}", "Bundling entrypoints".bold());
    let entries = entrypoints::resolve_entrypoints(root, &config.entrypoints)?;
    if entries.is_empty() {
        if let EntrypointSpec::Dynamic { scan_dir, .. } = &config.entrypoints {
            println!("  {} no entrypoints found in {}", "!".yellow(), scan_dir);
        }
    }

    let bundler = Bundler::with_config(BundlerConfig::default().search_dir(root));
    let summary = bundle::bundle_entries(&bundler, root, &dist, &entries, &config.bundler)?;

    println!("{}", "Copying static files".bold());
    assets::copy_manifest(root, &dist)?;
    assets::copy_html_files(root, &dist, &config.html_files)?;

    let css = match &config.css {
        CssSpec::None => Vec::new(),
        spec => {
            println!("{}", "Processing CSS".bold());
            css::process_css(root, &dist, spec)?
        }
    };

    let icons = if config.icons.generate {
        println!("{}", "Generating icons".bold());
        icons::generate_icons(root, &dist, &config.icons)?
    } else {
        Vec::new()
    };

    if config.validate_manifest {
        println!("{}", "Validating manifest".bold());
        let result = validate_dist(&dist);
        if !result.is_ok() {
            return Err(PipelineError::Validation(result));
        }
        println!("  {} all referenced paths exist", "ok".green());
    }

    Ok(BuildReport {
        dist,
        entries: summary.built,
        skipped: summary.skipped,
        css,
        icons,
        duration: start.elapsed(),
    })
}

/// Deletes and recreates the output directory. Every build starts clean;
/// nothing is carried over from the previous one.
pub fn clean_dist(dist: &Path) -> io::Result<()> {
    if dist.exists() {
        fs::remove_dir_all(dist)?;
    }
    fs::create_dir_all(dist)
}
