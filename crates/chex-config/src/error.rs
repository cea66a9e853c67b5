//! Error types for config loading and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Error codes for build config and output validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Config shape errors (E001-E009)
    /// E001: Unsupported config_version
    UnsupportedConfigVersion,
    /// E002: Static entrypoint list is empty
    NoEntrypoints,
    /// E003: Unsafe path (absolute or traversal)
    UnsafePath,
    /// E004: Two entries or copies target the same output path
    DuplicateOutput,
    /// E005: Icon generation enabled with no sizes
    EmptyIconSizes,

    // Output validation errors (E010-E012)
    /// E010: manifest.json missing from the output directory
    ManifestMissing,
    /// E011: manifest.json is not valid JSON
    ManifestParse,
    /// E012: Manifest references a file absent from the output directory
    MissingReferencedFile,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::UnsupportedConfigVersion => "E001",
            ErrorCode::NoEntrypoints => "E002",
            ErrorCode::UnsafePath => "E003",
            ErrorCode::DuplicateOutput => "E004",
            ErrorCode::EmptyIconSizes => "E005",
            ErrorCode::ManifestMissing => "E010",
            ErrorCode::ManifestParse => "E011",
            ErrorCode::MissingReferencedFile => "E012",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Warning codes for build config validation.
///
/// Warnings cover conditions the build survives: a missing source file is
/// skipped at build time, so here it only warns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCode {
    /// W001: A static entry's source file does not exist
    MissingEntryFile,
    /// W002: A declared copy source does not exist
    MissingCopySource,
    /// W003: Icon generation enabled but icons/icon.svg is absent
    MissingIconSvg,
    /// W004: Dynamic scan directory does not exist
    MissingScanDir,
}

impl WarningCode {
    /// Returns the warning code string (e.g., "W001").
    pub fn code(&self) -> &'static str {
        match self {
            WarningCode::MissingEntryFile => "W001",
            WarningCode::MissingCopySource => "W002",
            WarningCode::MissingIconSvg => "W003",
            WarningCode::MissingScanDir => "W004",
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A validation error with code, message, and optional config/file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Path to the problematic field or file (e.g., "entrypoints.entries[0]").
    pub path: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Creates a new validation error with a path.
    pub fn with_path(code: ErrorCode, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref path) = self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// A validation warning with code, message, and optional path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The warning code.
    pub code: WarningCode,
    /// Human-readable warning message.
    pub message: String,
    /// Path to the problematic field or file.
    pub path: Option<String>,
}

impl ValidationWarning {
    /// Creates a new validation warning.
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Creates a new validation warning with a path.
    pub fn with_path(
        code: WarningCode,
        message: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref path) = self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

/// Error loading a build config from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file does not exist.
    #[error("config file not found: {path}")]
    NotFound {
        /// Path that was checked.
        path: PathBuf,
    },

    /// JSON parsing error.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of config or output validation.
///
/// Checks never fail fast: every error is collected so a single run reports
/// the complete picture.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether validation passed (no errors).
    pub ok: bool,
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of validation warnings.
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// Creates a successful validation result.
    pub fn success() -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Creates a failed validation result.
    pub fn failure(errors: Vec<ValidationError>) -> Self {
        Self {
            ok: false,
            errors,
            warnings: Vec::new(),
        }
    }

    /// Adds an error to the result.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
        self.ok = false;
    }

    /// Adds a warning to the result.
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Merges another result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.ok = self.ok && other.ok;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Converts to a Result, returning Err if there are errors.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, Vec<ValidationError>> {
        if self.ok {
            Ok(self.warnings)
        } else {
            Err(self.errors)
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::success()
    }
}
