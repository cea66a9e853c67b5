//! Static asset copies: the manifest and declared HTML files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use colored::Colorize;

use chex_config::{CopyFile, MANIFEST_FILE_NAME};

use super::{PipelineError, PipelineResult};

/// Copies `manifest.json` from the extension root into the output
/// directory.
///
/// Unlike every other source file, the manifest is not optional: an
/// extension without one cannot be loaded, so its absence fails the build.
pub fn copy_manifest(root: &Path, dist: &Path) -> PipelineResult<PathBuf> {
    let src = root.join(MANIFEST_FILE_NAME);
    if !src.is_file() {
        return Err(PipelineError::ManifestMissing {
            path: src.display().to_string(),
        });
    }

    let dest = dist.join(MANIFEST_FILE_NAME);
    fs::copy(&src, &dest)?;
    println!("  {} {}", "ok".green(), MANIFEST_FILE_NAME);
    Ok(dest)
}

/// Copies each declared HTML file into the output directory, creating
/// destination parents as needed. Missing sources are skipped with a log
/// line.
pub fn copy_html_files(root: &Path, dist: &Path, files: &[CopyFile]) -> io::Result<Vec<PathBuf>> {
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
