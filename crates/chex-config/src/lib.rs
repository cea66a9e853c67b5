//! chex Build Configuration Library
//!
//! This crate provides the types and validation behind `chex.json`, the
//! declarative build configuration for browser extensions, plus a typed view
//! of the extension manifest for post-build checks.
//!
//! # Overview
//!
//! A build config describes everything the pipeline needs:
//!
//! - **Entrypoints**: an explicit list, or a directory scan that discovers one
//!   entry per subdirectory
//! - **Assets**: HTML files to copy, CSS handling (none, copy, or Tailwind),
//!   and icon rasterization settings
//! - **Bundler options**: minify/sourcemap/splitting flags forwarded to the
//!   external bundler
//!
//! # Example
//!
//! ```
//! use chex_config::{BuildConfig, EntrypointSpec, StaticEntry};
//! use chex_config::validation::validate_config;
//!
//! let config = BuildConfig::builder(EntrypointSpec::static_entries(vec![
//!     StaticEntry::new("src/popup/index.ts", "popup"),
//! ]))
//! .html_file("src/popup/index.html", "popup/index.html")
//! .build();
//!
//! let result = validate_config(std::path::Path::new("."), &config);
//! assert!(result.is_ok());
//! ```
//!
//! # Modules
//!
//! - [`config`]: Build config types and builder
//! - [`manifest`]: Typed view of `manifest.json`
//! - [`error`]: Error and warning types for validation
//! - [`validation`]: Config and output-directory validation

pub mod config;
pub mod error;
pub mod manifest;
pub mod validation;

// Re-export commonly used types at the crate root
pub use config::{
    BuildConfig, BundlerOptions, ConfigBuilder, CopyFile, CssSpec, EntrypointSpec, IconSpec,
    ResolvedEntry, SourcemapMode, StaticEntry, CONFIG_FILE_NAME, CONFIG_VERSION,
    DEFAULT_ENTRY_PATTERN, DEFAULT_ICON_SIZES, DIST_DIR_NAME,
};
pub use error::{
    ConfigError, ErrorCode, ValidationError, ValidationResult, ValidationWarning, WarningCode,
};
pub use manifest::{Manifest, MANIFEST_FILE_NAME};
pub use validation::{is_safe_rel_path, validate_config, validate_dist};

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// A full config exercising every section, as a real extension would
    /// write it.
    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "config_version": 1,
            "entrypoints": {
                "type": "static",
                "entries": [
                    { "entry": "src/background/index.ts", "outdir": "background" },
                    { "entry": "src/popup/index.ts", "outdir": "popup" },
                    { "entry": "src/content/index.ts", "outdir": "content", "outfile": "content.js" }
                ]
            },
            "css": {
                "type": "copy",
                "files": [
                    { "src": "src/popup/popup.css", "dest": "popup/popup.css" }
                ]
            },
            "html_files": [
                { "src": "src/popup/index.html", "dest": "popup/index.html" }
            ],
            "icons": { "generate": true, "sizes": [16, 48, 128] },
            "bundler": { "minify": true, "sourcemap": "none", "splitting": false },
            "validate_manifest": true
        }"#;

        let config = BuildConfig::from_json(json).expect("should parse");
        assert_eq!(config.config_version, 1);
        assert_eq!(config.html_files.len(), 1);
        assert!(config.validate_manifest);

        match &config.entrypoints {
            EntrypointSpec::Static { entries } => {
                assert_eq!(entries.len(), 3);
                assert_eq!(entries[2].outfile.as_deref(), Some("content.js"));
            }
            other => panic!("expected static entrypoints, got {:?}", other),
        }

        let dir = tempfile::tempdir().unwrap();
        let result = validate_config(dir.path(), &config);
        // Shape is fine; only missing-file warnings are expected.
        assert!(result.is_ok(), "errors: {:?}", result.errors);
        assert!(!result.warnings.is_empty());
    }

    /// A dynamic config in the shape a multi-site content-script extension
    /// uses.
    #[test]
    fn test_parse_dynamic_config() {
        let json = r#"{
            "entrypoints": { "type": "dynamic", "scan_dir": "src/sites" },
            "bundler": { "minify": false, "root": "src" }
        }"#;

        let config = BuildConfig::from_json(json).expect("should parse");
        assert!(config.entrypoints.is_dynamic());
        assert!(!config.bundler.minify);
        assert_eq!(config.bundler.root.as_deref(), Some("src"));
        assert_eq!(config.bundler.sourcemap, SourcemapMode::None);
    }

    /// Manifest model and dist validation working together.
    #[test]
    fn test_manifest_drives_dist_validation() {
        let dist = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dist.path().join("popup")).unwrap();
        std::fs::write(dist.path().join("popup/index.html"), "<html></html>").unwrap();
        std::fs::write(
            dist.path().join("manifest.json"),
            r#"{
                "manifest_version": 3,
                "name": "Example",
                "version": "0.1.0",
                "action": { "default_popup": "popup/index.html" },
                "icons": { "16": "icons/icon-16.png" }
            }"#,
        )
        .unwrap();

        let result = validate_dist(dist.path());
        assert!(!result.is_ok());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, ErrorCode::MissingReferencedFile);
        assert_eq!(result.errors[0].path.as_deref(), Some("icons/icon-16.png"));
    }
}
