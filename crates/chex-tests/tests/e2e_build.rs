//! End-to-end build tests.
//!
//! Tests verify:
//! - Full builds from `chex.json` to a complete output tree (stub bundler)
//! - Entrypoint resolution, static file copying, CSS handling, icons
//! - Output replacement across rebuilds
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p chex-tests --test e2e_build
//! ```

use std::fs;
use std::process::ExitCode;

use pretty_assertions::assert_eq;

use chex_tests::harness::{
    dist_file_exists, dist_path, list_dist_files, png_dimensions, run_build,
};
use chex_tests::ExtensionFixture;

// ============================================================================
// Full Builds (stub bundler)
// ============================================================================

/// Test a complete static build: bundle, manifest, icons, validation.
#[cfg(unix)]
#[test]
fn test_full_static_build() {
    let fixture = ExtensionFixture::new();
    fixture.scaffold_background_extension();
    fixture.install_stub_bundler();

    let code = run_build(fixture.path()).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);

    assert_eq!(
        list_dist_files(fixture.path()),
        vec![
            "background/index.js",
            "icons/icon-128.png",
            "icons/icon-16.png",
            "icons/icon-48.png",
            "manifest.json",
        ]
    );
}

/// Test that dynamic resolution bundles one entry per matching subdirectory.
#[cfg(unix)]
#[test]
fn test_dynamic_entries_bundled_per_subdirectory() {
    let fixture = ExtensionFixture::new();
    fixture.add_entry("src/sites/alpha/index.ts");
    fixture.add_entry("src/sites/beta/index.ts");
    // Neither of these is an entrypoint: hidden dir, plain file.
    fixture.write("src/sites/.cache/index.ts", "export {};\n");
    fixture.write("src/sites/README.md", "site scripts\n");
    fixture.install_stub_bundler();
    fixture.write_config(
        r#"{
  "entrypoints": { "type": "dynamic", "scan_dir": "src/sites" },
  "icons": { "generate": false }
}"#,
    );
    fixture.write_manifest(
        r#"{
  "manifest_version": 3,
  "name": "Sites Extension",
  "version": "0.1.0",
  "content_scripts": [
    { "matches": ["https://alpha.example/*"], "js": ["sites/alpha/index.js"] },
    { "matches": ["https://beta.example/*"], "js": ["sites/beta/index.js"] }
  ]
}"#,
    );

    let code = run_build(fixture.path()).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);

    assert!(dist_file_exists(fixture.path(), "sites/alpha/index.js"));
    assert!(dist_file_exists(fixture.path(), "sites/beta/index.js"));
    assert!(!dist_path(fixture.path(), "sites/.cache").exists());
}

/// Test that a static entry's `outfile` renames the bundler output.
#[cfg(unix)]
#[test]
fn test_static_outfile_renamed() {
    let fixture = ExtensionFixture::new();
    fixture.add_entry("src/background/index.ts");
    fixture.install_stub_bundler();
    fixture.write_config(
        r#"{
  "entrypoints": {
    "type": "static",
    "entries": [
      {
        "entry": "src/background/index.ts",
        "outdir": "background",
        "outfile": "service-worker.js"
      }
    ]
  },
  "icons": { "generate": false }
}"#,
    );
    fixture.write_manifest(
        r#"{ "background": { "service_worker": "background/service-worker.js" } }"#,
    );

    let code = run_build(fixture.path()).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);

    assert!(dist_file_exists(fixture.path(), "background/service-worker.js"));
    assert!(!dist_file_exists(fixture.path(), "background/index.js"));
}

/// Test that rebuilding starts from a clean output directory.
#[cfg(unix)]
#[test]
fn test_rebuild_replaces_previous_output() {
    let fixture = ExtensionFixture::new();
    fixture.scaffold_background_extension();
    fixture.install_stub_bundler();

    let code = run_build(fixture.path()).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);

    fs::write(dist_path(fixture.path(), "stale.txt"), "left over").unwrap();

    let code = run_build(fixture.path()).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(!dist_file_exists(fixture.path(), "stale.txt"));
    assert!(dist_file_exists(fixture.path(), "background/index.js"));
}

/// Test that a bundler failure fails the whole build.
#[cfg(unix)]
#[test]
fn test_bundler_failure_fails_build() {
    let fixture = ExtensionFixture::new();
    fixture.scaffold_background_extension();
    fixture.install_failing_bundler();

    let code = run_build(fixture.path()).unwrap();
    assert_eq!(code, ExitCode::from(1));
}

// ============================================================================
// Bundler-free Stages
// ============================================================================

/// Test that `css.type = "copy"` lands stylesheets in the output unchanged.
#[test]
fn test_css_copy_into_dist() {
    let fixture = ExtensionFixture::new();
    let body = ".popup { margin: 0; }\n";
    fixture.write("styles/popup.css", body);
    // The entry source is deliberately absent, so no bundler is needed.
    fixture.write_config(
        r#"{
  "entrypoints": {
    "type": "static",
    "entries": [
      { "entry": "src/popup/index.ts", "outdir": "popup" }
    ]
  },
  "css": {
    "type": "copy",
    "files": [
      { "src": "styles/popup.css", "dest": "popup/styles.css" }
    ]
  },
  "icons": { "generate": false }
}"#,
    );
    fixture.write_manifest("{}");

    let code = run_build(fixture.path()).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);

    let copied = fs::read(dist_path(fixture.path(), "popup/styles.css")).unwrap();
    assert_eq!(copied, body.as_bytes());
}

/// Test that `css.type = "tailwind"` drives the compiler stub.
#[cfg(unix)]
#[test]
fn test_tailwind_stub_compiles_css() {
    let fixture = ExtensionFixture::new();
    fixture.write("styles/tailwind.css", "@tailwind base;\n");
    fixture.install_stub_tailwind();
    fixture.write_config(
        r#"{
  "entrypoints": {
    "type": "static",
    "entries": [
      { "entry": "src/popup/index.ts", "outdir": "popup" }
    ]
  },
  "css": {
    "type": "tailwind",
    "input": "styles/tailwind.css",
    "output": "assets/styles.css"
  },
  "icons": { "generate": false }
}"#,
    );
    fixture.write_manifest("{}");

    let code = run_build(fixture.path()).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);

    let compiled = fs::read_to_string(dist_path(fixture.path(), "assets/styles.css")).unwrap();
    assert!(compiled.contains("compiled"));
}

/// Test that declared HTML files are copied and satisfy the manifest.
#[test]
fn test_html_files_copied() {
    let fixture = ExtensionFixture::new();
    fixture.write("src/popup/index.html", "<html><body>popup</body></html>\n");
    fixture.write_config(
        r#"{
  "entrypoints": {
    "type": "static",
    "entries": [
      { "entry": "src/popup/index.ts", "outdir": "popup" }
    ]
  },
  "html_files": [
    { "src": "src/popup/index.html", "dest": "popup/index.html" }
  ],
  "icons": { "generate": false }
}"#,
    );
    fixture.write_manifest(r#"{ "action": { "default_popup": "popup/index.html" } }"#);

    let code = run_build(fixture.path()).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(dist_file_exists(fixture.path(), "popup/index.html"));
}

/// Test that icons are rasterized at every configured size.
#[test]
fn test_icons_generated_from_svg() {
    let fixture = ExtensionFixture::new();
    fixture.add_icon_source();
    fixture.write_config(
        r#"{
  "entrypoints": {
    "type": "static",
    "entries": [
      { "entry": "src/popup/index.ts", "outdir": "popup" }
    ]
  }
}"#,
    );
    fixture.write_manifest(
        r#"{
  "icons": {
    "16": "icons/icon-16.png",
    "48": "icons/icon-48.png",
    "128": "icons/icon-128.png"
  }
}"#,
    );

    let code = run_build(fixture.path()).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);

    for size in [16u32, 48, 128] {
        let icon = dist_path(fixture.path(), &format!("icons/icon-{}.png", size));
        assert_eq!(png_dimensions(&icon), (size, size));
    }
}

/// Test that a dynamic scan with no matches still produces a usable build.
#[test]
fn test_dynamic_scan_without_matches_builds() {
    let fixture = ExtensionFixture::new();
    fixture.write_config(
        r#"{
  "entrypoints": { "type": "dynamic", "scan_dir": "src/sites" },
  "icons": { "generate": false }
}"#,
    );
    fixture.write_manifest("{}");

    let code = run_build(fixture.path()).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(list_dist_files(fixture.path()), vec!["manifest.json"]);
}

// ============================================================================
// Bundler Discovery
// ============================================================================

/// Test that the pipeline's bundler discovery prefers the project-local
/// install the fixture provides.
#[cfg(unix)]
#[test]
fn test_find_bundler_prefers_project_stub() {
    use chex_bundler::{Bundler, BundlerConfig};

    let fixture = ExtensionFixture::new();
    let stub = fixture.install_stub_bundler();

    let bundler = Bundler::with_config(BundlerConfig::default().search_dir(fixture.path()));
    assert_eq!(bundler.find_bundler().unwrap(), stub);
}
