//! Entrypoint resolution.
//!
//! Turns an [`EntrypointSpec`] into the ordered list of entries the bundle
//! stage works through. Static specs map 1:1 in declaration order; dynamic
//! specs scan a directory for subdirectories containing the pattern file.

use std::fs;
use std::io;
use std::path::Path;

use chex_bundler::DEFAULT_OUTPUT_NAME;
use chex_config::{EntrypointSpec, ResolvedEntry};

/// Resolves an entrypoint spec against the extension root.
///
/// A missing scan directory yields an empty list, not an error; the caller
/// decides how loudly to report that.
pub fn resolve_entrypoints(root: &Path, spec: &EntrypointSpec) -> io::Result<Vec<ResolvedEntry>> {
    match spec {
        EntrypointSpec::Static { entries } => Ok(entries
            .iter()
            .map(|e| {
                let resolved = ResolvedEntry::new(root.join(&e.entry), e.outdir.clone());
                match &e.outfile {
                    Some(outfile) => resolved.with_outfile(outfile.clone()),
                    None => resolved,
                }
            })
            .collect()),
        EntrypointSpec::Dynamic { scan_dir, pattern } => scan_for_entries(root, scan_dir, pattern),
    }
}

/// Lists immediate subdirectories of `scan_dir` that contain the pattern
/// file, sorted by name so resolution order does not depend on the
/// filesystem's directory order.
fn scan_for_entries(root: &Path, scan_dir: &str, pattern: &str) -> io::Result<Vec<ResolvedEntry>> {
    let scan_path = root.join(scan_dir);
    if !scan_path.is_dir() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for dirent in fs::read_dir(&scan_path)? {
        let dirent = dirent?;
        let name = dirent.file_name().to_string_lossy().into_owned();
        // Hidden directories never hold entrypoints.
        if name.starts_with('.') {
            continue;
        }
        if !dirent.file_type()?.is_dir() {
            continue;
        }
        names.push(name);
    }
    names.sort();

    let base = outdir_base(scan_dir);
    let mut entries = Vec::new();
    for name in names {
        let entry = scan_path.join(&name).join(pattern);
        if !entry.is_file() {
            continue;
        }
        let outdir = if base.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", base, name)
        };
        entries.push(ResolvedEntry::new(entry, outdir).with_outfile(DEFAULT_OUTPUT_NAME));
    }

    Ok(entries)
}

/// Output directory prefix for a scanned entry: the scan directory with a
/// leading `src/` stripped, since `src/` never appears in the output tree.
fn outdir_base(scan_dir: &str) -> &str {
    let base = scan_dir.strip_prefix("src/").unwrap_or(scan_dir);
    base.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use chex_config::StaticEntry;
    use pretty_assertions::assert_eq;
    use std::fs::File;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        File::create(path).unwrap();
    }

    #[test]
    fn test_static_entries_resolve_in_declaration_order() {
        let root = Path::new("/ext");
        let spec = EntrypointSpec::Static {
            entries: vec![
                StaticEntry::new("src/background.ts", "background"),
                StaticEntry::new("src/popup/main.tsx", "popup").with_outfile("popup.js"),
            ],
        };

        let resolved = resolve_entrypoints(root, &spec).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].entry, root.join("src/background.ts"));
        assert_eq!(resolved[0].outdir, "background");
        assert_eq!(resolved[0].outfile, None);
        assert_eq!(resolved[1].outdir, "popup");
        assert_eq!(resolved[1].outfile.as_deref(), Some("popup.js"));
    }

    #[test]
    fn test_dynamic_scan_finds_matching_subdirectories() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("src/slides/alpha/index.ts"));
        touch(&root.join("src/slides/beta/index.ts"));
        // No pattern file, so this one is not an entrypoint.
        fs::create_dir_all(root.join("src/slides/empty")).unwrap();

        let spec = EntrypointSpec::Dynamic {
            scan_dir: "src/slides".to_string(),
            pattern: "index.ts".to_string(),
        };

        let resolved = resolve_entrypoints(root, &spec).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].entry, root.join("src/slides/alpha/index.ts"));
        assert_eq!(resolved[0].outdir, "slides/alpha");
        assert_eq!(resolved[0].outfile.as_deref(), Some("index.js"));
        assert_eq!(resolved[1].outdir, "slides/beta");
    }

    #[test]
    fn test_dynamic_scan_skips_hidden_directories() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("src/pages/a/index.ts"));
        touch(&root.join("src/pages/b/index.ts"));
        touch(&root.join("src/pages/.hidden/index.ts"));

        let spec = EntrypointSpec::Dynamic {
            scan_dir: "src/pages".to_string(),
            pattern: "index.ts".to_string(),
        };

        let resolved = resolve_entrypoints(root, &spec).unwrap();
        let outdirs: Vec<&str> = resolved.iter().map(|e| e.outdir.as_str()).collect();
        assert_eq!(outdirs, vec!["pages/a", "pages/b"]);
    }

    #[test]
    fn test_dynamic_scan_skips_plain_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("src/pages/a/index.ts"));
        touch(&root.join("src/pages/stray.ts"));

        let spec = EntrypointSpec::Dynamic {
            scan_dir: "src/pages".to_string(),
            pattern: "index.ts".to_string(),
        };

        let resolved = resolve_entrypoints(root, &spec).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].outdir, "pages/a");
    }

    #[test]
    fn test_dynamic_scan_is_sorted_by_name() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("src/pages/zeta/index.ts"));
        touch(&root.join("src/pages/alpha/index.ts"));
        touch(&root.join("src/pages/mid/index.ts"));

        let spec = EntrypointSpec::Dynamic {
            scan_dir: "src/pages".to_string(),
            pattern: "index.ts".to_string(),
        };

        let resolved = resolve_entrypoints(root, &spec).unwrap();
        let outdirs: Vec<&str> = resolved.iter().map(|e| e.outdir.as_str()).collect();
        assert_eq!(outdirs, vec!["pages/alpha", "pages/mid", "pages/zeta"]);
    }

    #[test]
    fn test_missing_scan_dir_yields_empty_list() {
        let dir = TempDir::new().unwrap();
        let spec = EntrypointSpec::Dynamic {
            scan_dir: "src/nowhere".to_string(),
            pattern: "index.ts".to_string(),
        };

        let resolved = resolve_entrypoints(dir.path(), &spec).unwrap();
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_outdir_base_strips_src_prefix() {
        assert_eq!(outdir_base("src/slides"), "slides");
        assert_eq!(outdir_base("src/slides/"), "slides");
        assert_eq!(outdir_base("extensions"), "extensions");
        // A bare "src" has no "src/" prefix to strip.
        assert_eq!(outdir_base("src"), "src");
    }

    #[test]
    fn test_custom_pattern() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("src/tools/one/main.ts"));
        touch(&root.join("src/tools/two/index.ts"));

        let spec = EntrypointSpec::Dynamic {
            scan_dir: "src/tools".to_string(),
            pattern: "main.ts".to_string(),
        };

        let resolved = resolve_entrypoints(root, &spec).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].outdir, "tools/one");
    }
}
