//! Icon generation: rasterizes the extension's SVG icon to PNGs.
//!
//! The SVG is parsed once and rendered at each configured size with a
//! scale-to-fill transform, so non-square art stretches rather than crops.

use std::fs;
use std::path::{Path, PathBuf};

use colored::Colorize;
use image::{DynamicImage, ImageFormat, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};
use thiserror::Error;

use chex_config::IconSpec;

/// Icon source location, relative to the extension root.
pub const ICON_SOURCE_REL: &str = "icons/icon.svg";

/// Directory the rasters are written into, under the output directory.
pub const ICON_DIR_NAME: &str = "icons";

/// Error from the icon stage.
#[derive(Debug, Error)]
pub enum IconError {
    /// The SVG source could not be parsed.
    #[error("failed to parse icon SVG: {0}")]
    Svg(String),

    /// A raster target could not be rendered.
    #[error("failed to render icon: {0}")]
    Render(String),

    /// A rendered raster could not be encoded as PNG.
    #[error("failed to encode icon PNG: {0}")]
    Encode(String),

    /// I/O error reading the source or writing a raster.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// File name for one raster size, e.g. `icon-48.png`.
pub fn icon_file_name(size: u32) -> String {
    format!("icon-{}.png", size)
}

/// Runs the icon stage: rasterizes `icons/icon.svg` into the output
/// directory's `icons/` at every configured size.
///
/// A missing source SVG skips the stage with a log line; extensions
/// without vector art ship no generated icons.
pub fn generate_icons(root: &Path, dist: &Path, spec: &IconSpec) -> Result<Vec<PathBuf>, IconError> {
    let source = root.join(ICON_SOURCE_REL);
    if !source.is_file() {
        println!(
            "  {} skipping icons {}",
            "!".yellow(),
            format!("({} not found)", ICON_SOURCE_REL).dimmed()
        );
        return Ok(Vec::new());
    }

    rasterize_svg(&source, &dist.join(ICON_DIR_NAME), &spec.sizes)
}

/// Rasterizes one SVG file to `icon-<size>.png` for each size.
///
/// The parse happens once; each size gets its own pixmap and render pass.
pub fn rasterize_svg(
    svg_path: &Path,
    out_dir: &Path,
    sizes: &[u32],
) -> Result<Vec<PathBuf>, IconError> {
    let svg_data = fs::read_to_string(svg_path)?;
    let options = Options::default();
    let tree = Tree::from_str(&svg_data, &options).map_err(|e| IconError::Svg(e.to_string()))?;

    fs::create_dir_all(out_dir)?;

    let mut written = Vec::new();
    for &size in sizes {
        let path = out_dir.join(icon_file_name(size));
        render_png(&tree, size, &path)?;
        println!(
            "  {} {} {}",
            "ok".green(),
            icon_file_name(size),
            format!("({}x{})", size, size).dimmed()
        );
        written.push(path);
    }

    Ok(written)
}

/// Renders the parsed tree into a square pixmap and writes it as PNG.
fn render_png(tree: &Tree, size: u32, path: &Path) -> Result<(), IconError> {
    let mut pixmap = Pixmap::new(size, size).ok_or_else(|| {
        IconError::Render(format!("could not allocate a {}x{} pixmap", size, size))
    })?;

    let svg_size = tree.size;
    let transform = Transform::from_scale(
        size as f32 / svg_size.width(),
        size as f32 / svg_size.height(),
    );
    resvg::render(tree, transform, &mut pixmap.as_mut());

    let img = RgbaImage::from_raw(size, size, pixmap.take())
        .ok_or_else(|| IconError::Encode("pixmap length does not match dimensions".to_string()))?;
    DynamicImage::ImageRgba8(img)
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| IconError::Encode(e.to_string()))?;

    Ok(())
}
