//! Config and output validation logic.

use std::collections::HashSet;
use std::path::Path;

use crate::config::{BuildConfig, CssSpec, EntrypointSpec, CONFIG_VERSION};
use crate::error::{ErrorCode, ValidationError, ValidationResult, ValidationWarning, WarningCode};
use crate::manifest::{Manifest, MANIFEST_FILE_NAME};

/// Validates a build config against its extension root.
///
/// Shape errors (bad paths, duplicate outputs, empty entry lists) are
/// errors; missing source files are warnings because the build skips them.
/// All findings are collected in one pass.
///
/// # Example
/// ```
/// use chex_config::{BuildConfig, EntrypointSpec};
/// use chex_config::validation::validate_config;
///
/// let config = BuildConfig::builder(EntrypointSpec::dynamic("src/sites")).build();
/// let result = validate_config(std::path::Path::new("."), &config);
/// assert!(result.is_ok());
/// ```
pub fn validate_config(root: &Path, config: &BuildConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    validate_config_version(config, &mut result);

    let mut seen_outputs: HashSet<String> = HashSet::new();
    validate_entrypoints(root, config, &mut seen_outputs, &mut result);
    validate_css(root, config, &mut seen_outputs, &mut result);
    validate_html_files(root, config, &mut seen_outputs, &mut result);
    validate_icons(root, config, &mut result);

    result
}

fn validate_config_version(config: &BuildConfig, result: &mut ValidationResult) {
    if config.config_version != CONFIG_VERSION {
        result.add_error(ValidationError::with_path(
            ErrorCode::UnsupportedConfigVersion,
            format!(
                "config_version must be {}, got {}",
                CONFIG_VERSION, config.config_version
            ),
            "config_version",
        ));
    }
}

fn validate_entrypoints(
    root: &Path,
    config: &BuildConfig,
    seen_outputs: &mut HashSet<String>,
    result: &mut ValidationResult,
) {
    match &config.entrypoints {
        EntrypointSpec::Static { entries } => {
            if entries.is_empty() {
                result.add_error(ValidationError::with_path(
                    ErrorCode::NoEntrypoints,
                    "entries array must have at least one entry",
                    "entrypoints.entries",
                ));
                return;
            }

            for (i, entry) in entries.iter().enumerate() {
                check_path_safety(
                    &entry.entry,
                    format!("entrypoints.entries[{}].entry", i),
                    result,
                );
                check_path_safety(
                    &entry.outdir,
                    format!("entrypoints.entries[{}].outdir", i),
                    result,
                );
                if let Some(outfile) = &entry.outfile {
                    check_path_safety(
                        outfile,
                        format!("entrypoints.entries[{}].outfile", i),
                        result,
                    );
                }

                let output = format!(
                    "{}/{}",
                    entry.outdir,
                    entry.outfile.as_deref().unwrap_or("index.js")
                );
                if !seen_outputs.insert(output.clone()) {
                    result.add_error(ValidationError::with_path(
                        ErrorCode::DuplicateOutput,
                        format!("two entries produce the same output: '{}'", output),
                        format!("entrypoints.entries[{}]", i),
                    ));
                }

                if !root.join(&entry.entry).exists() {
                    result.add_warning(ValidationWarning::with_path(
                        WarningCode::MissingEntryFile,
                        format!("entry file does not exist: '{}'", entry.entry),
                        format!("entrypoints.entries[{}].entry", i),
                    ));
                }
            }
        }
        EntrypointSpec::Dynamic { scan_dir, .. } => {
            check_path_safety(scan_dir, "entrypoints.scan_dir".to_string(), result);

            if !root.join(scan_dir).is_dir() {
                result.add_warning(ValidationWarning::with_path(
                    WarningCode::MissingScanDir,
                    format!("scan directory does not exist: '{}'", scan_dir),
                    "entrypoints.scan_dir",
                ));
            }
        }
    }
}

fn validate_css(
    root: &Path,
    config: &BuildConfig,
    seen_outputs: &mut HashSet<String>,
    result: &mut ValidationResult,
) {
    match &config.css {
        CssSpec::None => {}
        CssSpec::Copy { files } => {
            for (i, file) in files.iter().enumerate() {
                check_path_safety(&file.src, format!("css.files[{}].src", i), result);
                check_path_safety(&file.dest, format!("css.files[{}].dest", i), result);

                if !seen_outputs.insert(file.dest.clone()) {
                    result.add_error(ValidationError::with_path(
                        ErrorCode::DuplicateOutput,
                        format!("duplicate output path: '{}'", file.dest),
                        format!("css.files[{}].dest", i),
                    ));
                }

                if !root.join(&file.src).exists() {
                    result.add_warning(ValidationWarning::with_path(
                        WarningCode::MissingCopySource,
                        format!("css source does not exist: '{}'", file.src),
                        format!("css.files[{}].src", i),
                    ));
                }
            }
        }
        CssSpec::Tailwind { input, output, .. } => {
            check_path_safety(input, "css.input".to_string(), result);
            check_path_safety(output, "css.output".to_string(), result);

            if !seen_outputs.insert(output.clone()) {
                result.add_error(ValidationError::with_path(
                    ErrorCode::DuplicateOutput,
                    format!("duplicate output path: '{}'", output),
                    "css.output",
                ));
            }
        }
    }
}

fn validate_html_files(
    root: &Path,
    config: &BuildConfig,
    seen_outputs: &mut HashSet<String>,
    result: &mut ValidationResult,
) {
    for (i, file) in config.html_files.iter().enumerate() {
        check_path_safety(&file.src, format!("html_files[{}].src", i), result);
        check_path_safety(&file.dest, format!("html_files[{}].dest", i), result);

        if !seen_outputs.insert(file.dest.clone()) {
            result.add_error(ValidationError::with_path(
                ErrorCode::DuplicateOutput,
                format!("duplicate output path: '{}'", file.dest),
                format!("html_files[{}].dest", i),
            ));
        }

        if !root.join(&file.src).exists() {
            result.add_warning(ValidationWarning::with_path(
                WarningCode::MissingCopySource,
                format!("html source does not exist: '{}'", file.src),
                format!("html_files[{}].src", i),
            ));
        }
    }
}

fn validate_icons(root: &Path, config: &BuildConfig, result: &mut ValidationResult) {
    if !config.icons.generate {
        return;
    }

    if config.icons.sizes.is_empty() {
        result.add_error(ValidationError::with_path(
            ErrorCode::EmptyIconSizes,
            "icon generation is enabled but sizes is empty",
            "icons.sizes",
        ));
    }

    for (i, size) in config.icons.sizes.iter().enumerate() {
        if *size == 0 {
            result.add_error(ValidationError::with_path(
                ErrorCode::EmptyIconSizes,
                "icon sizes must be positive",
                format!("icons.sizes[{}]", i),
            ));
        }
    }

    if !root.join("icons/icon.svg").exists() {
        result.add_warning(ValidationWarning::with_path(
            WarningCode::MissingIconSvg,
            "icons/icon.svg does not exist; icon generation will be skipped",
            "icons",
        ));
    }
}

/// Validates a built output directory against its manifest.
///
/// Reads `manifest.json` from `dist` and checks that every file path it
/// references exists. Every missing path is collected before the result is
/// returned; the check reads but never writes, so it can be re-run freely.
pub fn validate_dist(dist: &Path) -> ValidationResult {
    let mut result = ValidationResult::default();

    let manifest_path = dist.join(MANIFEST_FILE_NAME);
    if !manifest_path.exists() {
        result.add_error(ValidationError::with_path(
            ErrorCode::ManifestMissing,
            format!("{} not found in output directory", MANIFEST_FILE_NAME),
            manifest_path.display().to_string(),
        ));
        return result;
    }

    let json = match std::fs::read_to_string(&manifest_path) {
        Ok(json) => json,
        Err(e) => {
            result.add_error(ValidationError::with_path(
                ErrorCode::ManifestParse,
                format!("failed to read {}: {}", MANIFEST_FILE_NAME, e),
                manifest_path.display().to_string(),
            ));
            return result;
        }
    };

    let manifest = match Manifest::from_json(&json) {
        Ok(manifest) => manifest,
        Err(e) => {
            result.add_error(ValidationError::with_path(
                ErrorCode::ManifestParse,
                format!("invalid {}: {}", MANIFEST_FILE_NAME, e),
                manifest_path.display().to_string(),
            ));
            return result;
        }
    };

    for path in manifest.referenced_paths() {
        if !dist.join(path).exists() {
            result.add_error(ValidationError::with_path(
                ErrorCode::MissingReferencedFile,
                format!("manifest references missing file: '{}'", path),
                path,
            ));
        }
    }

    result
}

/// Checks if a config-declared path is safe to join under a directory.
pub fn is_safe_rel_path(path: &str) -> bool {
    rel_path_safety_errors(path).is_empty()
}

fn rel_path_safety_errors(path: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if path.is_empty() {
        errors.push("path cannot be empty".to_string());
        return errors;
    }

    if path.starts_with('/') || path.starts_with('\\') {
        errors.push(format!("path must be relative, not absolute: '{}'", path));
    }

    if path.len() >= 2 && path.chars().nth(1) == Some(':') {
        errors.push(format!("path must not contain drive letter: '{}'", path));
    }

    if path.contains('\\') {
        errors.push(format!("path must use forward slashes only: '{}'", path));
    }

    for segment in path.split('/') {
        if segment == ".." {
            errors.push(format!("path must not contain '..': '{}'", path));
            break;
        }
    }

    errors
}

fn check_path_safety(path: &str, field: String, result: &mut ValidationResult) {
    for message in rel_path_safety_errors(path) {
        result.add_error(ValidationError::with_path(
            ErrorCode::UnsafePath,
            message,
            &field,
        ));
    }
}
