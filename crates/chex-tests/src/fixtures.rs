//! Test fixture utilities for building synthetic extension projects.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A small, valid SVG used as the icon source in tests.
pub const TEST_ICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="64" viewBox="0 0 64 64">
  <rect width="64" height="64" fill="#336699"/>
  <circle cx="32" cy="32" r="20" fill="#ffffff"/>
</svg>
"##;

/// A synthetic extension project rooted in a temporary directory.
///
/// Methods lay out the on-disk tree a real extension project would have:
/// `chex.json`, `manifest.json`, entry sources, the icon source, and (on
/// unix) stub tool scripts under `node_modules/.bin` so the pipeline finds
/// them ahead of anything on `PATH`.
pub struct ExtensionFixture {
    pub root: TempDir,
}

impl ExtensionFixture {
    /// Create a new empty extension project.
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("failed to create temp dir"),
        }
    }

    /// Get the project root path.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Write a file relative to the project root, creating parent dirs.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        fs::write(&path, content).expect("failed to write fixture file");
        path
    }

    /// Write `chex.json` at the project root.
    pub fn write_config(&self, json: &str) -> PathBuf {
        self.write("chex.json", json)
    }

    /// Write `manifest.json` at the project root.
    pub fn write_manifest(&self, json: &str) -> PathBuf {
        self.write("manifest.json", json)
    }

    /// Add a TypeScript entry source file.
    pub fn add_entry(&self, rel: &str) -> PathBuf {
        self.write(rel, "export {};\n")
    }

    /// Add the default icon source at `icons/icon.svg`.
    pub fn add_icon_source(&self) -> PathBuf {
        self.write("icons/icon.svg", TEST_ICON_SVG)
    }

    /// Scaffold a complete single-entry project: one static background
    /// entry, the icon source, and a manifest referencing the bundle and
    /// the three default icon sizes.
    pub fn scaffold_background_extension(&self) {
        self.add_entry("src/background/index.ts");
        self.add_icon_source();
        self.write_config(
            r#"{
  "entrypoints": {
    "type": "static",
    "entries": [
      { "entry": "src/background/index.ts", "outdir": "background" }
    ]
  }
}"#,
        );
        self.write_manifest(
            r#"{
  "manifest_version": 3,
  "name": "Fixture Extension",
  "version": "1.0.0",
  "background": { "service_worker": "background/index.js" },
  "icons": {
    "16": "icons/icon-16.png",
    "48": "icons/icon-48.png",
    "128": "icons/icon-128.png"
  }
}"#,
        );
    }
}

#[cfg(unix)]
impl ExtensionFixture {
    /// Install a stub bundler under `node_modules/.bin/esbuild`.
    ///
    /// The stub understands enough of the real bundler's command line to
    /// write an `index.js` into the requested outdir.
    pub fn install_stub_bundler(&self) -> PathBuf {
        self.install_tool_script(
            "esbuild",
            r#"for arg in "$@"; do
  case "$arg" in
    --outdir=*) outdir="${arg#--outdir=}" ;;
  esac
done
mkdir -p "$outdir"
echo "// bundled" > "$outdir/index.js"
"#,
        )
    }

    /// Install a bundler stub that fails with a resolve error.
    pub fn install_failing_bundler(&self) -> PathBuf {
        self.install_tool_script(
            "esbuild",
            r#"echo "error: Could not resolve import" >&2
exit 1
"#,
        )
    }

    /// Install a stub Tailwind compiler under `node_modules/.bin/tailwindcss`.
    ///
    /// The stub writes a fixed stylesheet to the path after `-o`.
    pub fn install_stub_tailwind(&self) -> PathBuf {
        self.install_tool_script(
            "tailwindcss",
            r#"out=""
while [ $# -gt 0 ]; do
    case "$1" in
        -o)
            shift
            out="$1"
            ;;
    esac
    shift
done
mkdir -p "$(dirname "$out")"
printf '/* compiled */\n' > "$out"
"#,
        )
    }

    fn install_tool_script(&self, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let bin_dir = self.path().join("node_modules/.bin");
        fs::create_dir_all(&bin_dir).expect("failed to create node_modules/.bin");
        let path = bin_dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}", body)).expect("failed to write stub script");
        let mut perms = fs::metadata(&path)
            .expect("failed to stat stub script")
            .permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("failed to mark stub executable");
        path
    }
}

impl Default for ExtensionFixture {
    fn default() -> Self {
        Self::new()
    }
}
