//! Test harness utilities for driving chex commands and checking outputs.
//!
//! Commands are invoked as library calls rather than subprocesses, so a
//! test failure points at real Rust frames and the exit code is the same
//! value `main` would turn into a process status.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use chex_config::DIST_DIR_NAME;
use walkdir::WalkDir;

/// Run the build command against a project root.
pub fn run_build(root: &Path) -> Result<ExitCode> {
    chex_cli::commands::build::run(root.to_str().unwrap(), None)
}

/// Run the validate command against a project root, defaulting the
/// output directory.
pub fn run_validate(root: &Path) -> Result<ExitCode> {
    chex_cli::commands::validate::run(root.to_str().unwrap(), None)
}

/// Run the validate command with an explicit output directory.
pub fn run_validate_dist(root: &Path, dist: &Path) -> Result<ExitCode> {
    chex_cli::commands::validate::run(root.to_str().unwrap(), Some(dist.to_str().unwrap()))
}

/// Run the icons command with the project-default source and layout.
pub fn run_icons(root: &Path, sizes: &[u32]) -> Result<ExitCode> {
    chex_cli::commands::icons::run(root.to_str().unwrap(), None, None, sizes)
}

/// Run the sync-manifest command against a project root.
pub fn run_sync_manifest(root: &Path) -> Result<ExitCode> {
    chex_cli::commands::sync_manifest::run(root.to_str().unwrap())
}

/// Path of a file inside the project's output directory.
pub fn dist_path(root: &Path, rel: &str) -> PathBuf {
    root.join(DIST_DIR_NAME).join(rel)
}

/// True when `rel` names an existing file in the output directory.
pub fn dist_file_exists(root: &Path, rel: &str) -> bool {
    dist_path(root, rel).is_file()
}

/// Every file under the output directory, as sorted relative paths.
pub fn list_dist_files(root: &Path) -> Vec<String> {
    let dist = root.join(DIST_DIR_NAME);
    let mut files: Vec<String> = WalkDir::new(&dist)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            entry
                .path()
                .strip_prefix(&dist)
                .ok()
                .map(|rel| rel.to_string_lossy().into_owned())
        })
        .collect();
    files.sort();
    files
}

/// Parse a JSON file from the output directory.
pub fn read_dist_json(root: &Path, rel: &str) -> serde_json::Value {
    let path = dist_path(root, rel);
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("failed to parse {}: {}", path.display(), e))
}

/// Decode a PNG and return its pixel dimensions.
pub fn png_dimensions(path: &Path) -> (u32, u32) {
    let img = image::open(path)
        .unwrap_or_else(|e| panic!("failed to decode {}: {}", path.display(), e));
    (img.width(), img.height())
}
