//! Icons command implementation
//!
//! Standalone icon rasterization, outside a full build. Useful for
//! checking in pre-rendered icons or regenerating them after editing the
//! source SVG.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use chex_config::DEFAULT_ICON_SIZES;

use crate::pipeline::icons::{rasterize_svg, ICON_SOURCE_REL};

/// Run the icons command
///
/// # Arguments
/// * `root` - Extension root directory
/// * `svg` - Source SVG (default: `<root>/icons/icon.svg`)
/// * `out` - Output directory (default: the SVG's own directory)
/// * `sizes` - Pixel sizes; empty means the 16/48/128 defaults
///
/// # Returns
/// Exit code: 0 on success. A missing SVG is an error here, unlike in a
/// build, because the command was asked for exactly this file.
pub fn run(root: &str, svg: Option<&str>, out: Option<&str>, sizes: &[u32]) -> Result<ExitCode> {
    let start = Instant::now();
    let root = Path::new(root);

    let svg_path = svg
        .map(PathBuf::from)
        .unwrap_or_else(|| root.join(ICON_SOURCE_REL));
    if !svg_path.is_file() {
        anyhow::bail!("icon source not found: {}", svg_path.display());
    }

    let out_dir = match out {
        Some(dir) => PathBuf::from(dir),
        None => svg_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    let sizes: Vec<u32> = if sizes.is_empty() {
        DEFAULT_ICON_SIZES.to_vec()
    } else {
        sizes.to_vec()
    };

    println!("{} {}", "Rasterizing:".cyan().bold(), svg_path.display());
    println!("{} {}", "Output:".dimmed(), out_dir.display());

    let written = rasterize_svg(&svg_path, &out_dir, &sizes)
        .with_context(|| format!("failed to rasterize {}", svg_path.display()))?;

    println!(
        "\n{} Wrote {} icon(s) in {}ms",
        "SUCCESS".green().bold(),
        written.len(),
        start.elapsed().as_millis()
    );
    Ok(ExitCode::SUCCESS)
}
