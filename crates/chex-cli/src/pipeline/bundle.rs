//! Bundle stage: drives the external bundler over each resolved entry.

use std::path::{Path, PathBuf};

use colored::Colorize;

use chex_bundler::{BundleRequest, Bundler};
use chex_config::{BundlerOptions, ResolvedEntry};

use super::{BuiltEntry, PipelineError, PipelineResult};

/// What the bundle stage produced.
#[derive(Debug, Default)]
pub struct BundleSummary {
    /// Entries bundled, in resolution order.
    pub built: Vec<BuiltEntry>,
    /// Entry sources that did not exist and were skipped.
    pub skipped: Vec<PathBuf>,
}

/// Bundles every resolved entry into the output directory.
///
/// A missing source file is skipped with a log line; the first bundler
/// failure aborts the stage, since a partial output tree must never look
/// shippable.
pub fn bundle_entries(
    bundler: &Bundler,
    root: &Path,
    dist: &Path,
    entries: &[ResolvedEntry],
    options: &BundlerOptions,
) -> PipelineResult<BundleSummary> {
    let mut summary = BundleSummary::default();

    for entry in entries {
        if !entry.entry.is_file() {
            println!(
                "  {} skipping {} {}",
                "!".yellow(),
                entry.entry.display(),
                "(not found)".dimmed()
            );
            summary.skipped.push(entry.entry.clone());
            continue;
        }

        let mut request = BundleRequest::new(&entry.entry, dist.join(&entry.outdir))
            .minify(options.minify)
            .sourcemap(options.sourcemap)
            .splitting(options.splitting);
        if let Some(ref outfile) = entry.outfile {
            request = request.outfile(outfile.clone());
        }
        if let Some(ref base) = options.root {
            request = request.outbase(root.join(base));
        }

        let output = bundler
            .bundle(&request)
            .map_err(|source| PipelineError::Bundle {
                entry: entry.entry.display().to_string(),
                source,
            })?;

        let shown = output.path.strip_prefix(dist).unwrap_or(&output.path);
        println!("  {} {}", "ok".green(), shown.display());
        summary.built.push(BuiltEntry {
            entry: entry.entry.clone(),
            output: output.path,
        });
    }

    Ok(summary)
}
