//! Build configuration types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Current config version.
pub const CONFIG_VERSION: u32 = 1;

/// Default config file name, resolved relative to the extension root.
pub const CONFIG_FILE_NAME: &str = "chex.json";

/// Output directory name, created under the extension root.
pub const DIST_DIR_NAME: &str = "dist";

/// Default PNG sizes generated from the icon SVG.
pub const DEFAULT_ICON_SIZES: &[u32] = &[16, 48, 128];

/// Default file name matched inside scanned entrypoint directories.
pub const DEFAULT_ENTRY_PATTERN: &str = "index.ts";

/// Sourcemap emission mode passed through to the bundler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourcemapMode {
    /// No sourcemaps.
    None,
    /// Sourcemap embedded in the output file.
    Inline,
    /// Sourcemap written next to the output file.
    External,
}

impl SourcemapMode {
    /// Returns the mode as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourcemapMode::None => "none",
            SourcemapMode::Inline => "inline",
            SourcemapMode::External => "external",
        }
    }
}

impl std::fmt::Display for SourcemapMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SourcemapMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(SourcemapMode::None),
            "inline" => Ok(SourcemapMode::Inline),
            "external" => Ok(SourcemapMode::External),
            _ => Err(format!("unknown sourcemap mode: {}", s)),
        }
    }
}

/// A source file copied into the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyFile {
    /// Source path, relative to the extension root.
    pub src: String,
    /// Destination path, relative to the output directory.
    pub dest: String,
}

impl CopyFile {
    /// Creates a new copy declaration.
    pub fn new(src: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
        }
    }
}

/// A statically declared entrypoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticEntry {
    /// Source file, relative to the extension root.
    pub entry: String,
    /// Output subdirectory, relative to the output directory.
    pub outdir: String,
    /// Output file name; the bundler's default is `index.js`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outfile: Option<String>,
}

impl StaticEntry {
    /// Creates a new static entry with the default output name.
    pub fn new(entry: impl Into<String>, outdir: impl Into<String>) -> Self {
        Self {
            entry: entry.into(),
            outdir: outdir.into(),
            outfile: None,
        }
    }

    /// Sets an explicit output file name.
    pub fn with_outfile(mut self, outfile: impl Into<String>) -> Self {
        self.outfile = Some(outfile.into());
        self
    }
}

/// How entrypoints are discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntrypointSpec {
    /// An explicit list of entry files.
    Static {
        /// Entries bundled in declaration order.
        entries: Vec<StaticEntry>,
    },
    /// One entry per immediate subdirectory of `scan_dir` that contains
    /// a file named `pattern`.
    Dynamic {
        /// Directory to scan, relative to the extension root.
        scan_dir: String,
        /// File name that marks a subdirectory as an entrypoint.
        #[serde(default = "default_entry_pattern")]
        pattern: String,
    },
}

impl EntrypointSpec {
    /// Creates a static spec from a list of entries.
    pub fn static_entries(entries: Vec<StaticEntry>) -> Self {
        EntrypointSpec::Static { entries }
    }

    /// Creates a dynamic spec with the default pattern.
    pub fn dynamic(scan_dir: impl Into<String>) -> Self {
        EntrypointSpec::Dynamic {
            scan_dir: scan_dir.into(),
            pattern: default_entry_pattern(),
        }
    }

    /// Returns true for the dynamic variant.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, EntrypointSpec::Dynamic { .. })
    }
}

/// An entrypoint after resolution, ready to hand to the bundler.
///
/// Derived from the config and the filesystem; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    /// Absolute (or root-joined) path to the source file.
    pub entry: PathBuf,
    /// Output subdirectory, relative to the output directory.
    pub outdir: String,
    /// Output file name when it differs from the bundler default.
    pub outfile: Option<String>,
}

impl ResolvedEntry {
    /// Creates a resolved entry with the default output name.
    pub fn new(entry: impl Into<PathBuf>, outdir: impl Into<String>) -> Self {
        Self {
            entry: entry.into(),
            outdir: outdir.into(),
            outfile: None,
        }
    }

    /// Sets an explicit output file name.
    pub fn with_outfile(mut self, outfile: impl Into<String>) -> Self {
        self.outfile = Some(outfile.into());
        self
    }
}

/// How stylesheets are produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CssSpec {
    /// The extension ships no CSS.
    #[default]
    None,
    /// Stylesheets copied verbatim into the output directory.
    Copy {
        /// Files copied byte-for-byte.
        files: Vec<CopyFile>,
    },
    /// A single stylesheet compiled by the Tailwind CLI.
    Tailwind {
        /// Input stylesheet, relative to the extension root.
        input: String,
        /// Output path, relative to the output directory.
        output: String,
        /// Whether the compiler minifies its output.
        #[serde(default = "default_true")]
        minify: bool,
    },
}

/// Icon rasterization settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconSpec {
    /// Whether icons are generated at all.
    #[serde(default = "default_true")]
    pub generate: bool,
    /// PNG edge sizes, in pixels.
    #[serde(default = "default_icon_sizes")]
    pub sizes: Vec<u32>,
}

impl Default for IconSpec {
    fn default() -> Self {
        Self {
            generate: true,
            sizes: default_icon_sizes(),
        }
    }
}

/// Options forwarded to the external bundler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundlerOptions {
    /// Whether the bundler minifies its output.
    #[serde(default = "default_true")]
    pub minify: bool,
    /// Sourcemap emission mode.
    #[serde(default = "default_sourcemap")]
    pub sourcemap: SourcemapMode,
    /// Whether code splitting is enabled.
    #[serde(default)]
    pub splitting: bool,
    /// Base directory for computing output paths, relative to the
    /// extension root (the bundler's outbase).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
}

impl Default for BundlerOptions {
    fn default() -> Self {
        Self {
            minify: true,
            sourcemap: SourcemapMode::None,
            splitting: false,
            root: None,
        }
    }
}

/// A chex build configuration.
///
/// This is the top-level structure loaded from `chex.json` at the extension
/// root. Every optional field's default is defined here, once; the pipeline
/// never applies fallbacks of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Schema version; must be 1.
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// How entrypoints are discovered.
    pub entrypoints: EntrypointSpec,

    /// How stylesheets are produced.
    #[serde(default)]
    pub css: CssSpec,

    /// HTML files copied into the output directory.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub html_files: Vec<CopyFile>,

    /// Icon rasterization settings.
    #[serde(default)]
    pub icons: IconSpec,

    /// Options forwarded to the external bundler.
    #[serde(default)]
    pub bundler: BundlerOptions,

    /// Whether manifest-referenced paths are checked after the build.
    #[serde(default = "default_true")]
    pub validate_manifest: bool,
}

fn default_config_version() -> u32 {
    CONFIG_VERSION
}

fn default_true() -> bool {
    true
}

fn default_icon_sizes() -> Vec<u32> {
    DEFAULT_ICON_SIZES.to_vec()
}

fn default_entry_pattern() -> String {
    DEFAULT_ENTRY_PATTERN.to_string()
}

fn default_sourcemap() -> SourcemapMode {
    SourcemapMode::None
}

impl BuildConfig {
    /// Creates a new config builder.
    pub fn builder(entrypoints: EntrypointSpec) -> ConfigBuilder {
        ConfigBuilder::new(entrypoints)
    }

    /// Parses a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parses a config from a JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Loads a config from a file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }

    /// Serializes the config to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the config to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Builder for constructing `BuildConfig` instances.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    entrypoints: EntrypointSpec,
    css: CssSpec,
    html_files: Vec<CopyFile>,
    icons: IconSpec,
    bundler: BundlerOptions,
    validate_manifest: bool,
}

impl ConfigBuilder {
    /// Creates a new config builder.
    pub fn new(entrypoints: EntrypointSpec) -> Self {
        Self {
            entrypoints,
            css: CssSpec::default(),
            html_files: Vec::new(),
            icons: IconSpec::default(),
            bundler: BundlerOptions::default(),
            validate_manifest: true,
        }
    }

    /// Sets the CSS handling.
    pub fn css(mut self, css: CssSpec) -> Self {
        self.css = css;
        self
    }

    /// Adds an HTML file to copy.
    pub fn html_file(mut self, src: impl Into<String>, dest: impl Into<String>) -> Self {
        self.html_files.push(CopyFile::new(src, dest));
        self
    }

    /// Sets all HTML files to copy.
    pub fn html_files(mut self, files: Vec<CopyFile>) -> Self {
        self.html_files = files;
        self
    }

    /// Sets the icon settings.
    pub fn icons(mut self, icons: IconSpec) -> Self {
        self.icons = icons;
        self
    }

    /// Disables icon generation.
    pub fn no_icons(mut self) -> Self {
        self.icons.generate = false;
        self
    }

    /// Sets the bundler options.
    pub fn bundler(mut self, bundler: BundlerOptions) -> Self {
        self.bundler = bundler;
        self
    }

    /// Disables post-build manifest validation.
    pub fn no_validate(mut self) -> Self {
        self.validate_manifest = false;
        self
    }

    /// Builds the config.
    pub fn build(self) -> BuildConfig {
        BuildConfig {
            config_version: CONFIG_VERSION,
            entrypoints: self.entrypoints,
            css: self.css,
            html_files: self.html_files,
            icons: self.icons,
            bundler: self.bundler,
            validate_manifest: self.validate_manifest,
        }
    }
}
