//! esbuild subprocess orchestrator.
//!
//! This module handles locating the esbuild executable, building its
//! command line from a [`BundleRequest`], and collecting diagnostics from
//! the subprocess.

use std::ffi::{OsStr, OsString};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use chex_config::SourcemapMode;

use crate::error::{BundleError, BundleResult};

/// Default timeout for a single bundler invocation (2 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Output file name the bundler produces before any rename.
pub const DEFAULT_OUTPUT_NAME: &str = "index.js";

/// Environment variable overriding the esbuild executable path.
pub const BUNDLER_ENV_VAR: &str = "CHEX_ESBUILD";

/// Configuration for the bundler orchestrator.
#[derive(Debug, Clone)]
pub struct BundlerConfig {
    /// Path to the esbuild executable.
    pub binary_path: Option<PathBuf>,
    /// Directory whose `node_modules/.bin` is searched for a project-local
    /// install, typically the extension root.
    pub search_dir: Option<PathBuf>,
    /// Timeout for a single invocation.
    pub timeout: Duration,
    /// Whether to capture the bundler's stderr.
    pub capture_output: bool,
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            binary_path: None,
            search_dir: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            capture_output: true,
        }
    }
}

impl BundlerConfig {
    /// Sets the esbuild executable path.
    pub fn binary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary_path = Some(path.into());
        self
    }

    /// Sets the directory searched for a project-local install.
    pub fn search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dir = Some(dir.into());
        self
    }

    /// Sets the timeout duration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

/// A single bundling request.
///
/// The request assumes the entry file exists; skip-if-missing policy lives
/// with the caller.
#[derive(Debug, Clone)]
pub struct BundleRequest {
    /// Path to the entry source file.
    pub entry: PathBuf,
    /// Directory the bundle is written into.
    pub outdir: PathBuf,
    /// Output file name; when set and different from `index.js`, the
    /// default output is renamed after the build.
    pub outfile: Option<String>,
    /// Whether the bundler minifies its output.
    pub minify: bool,
    /// Sourcemap emission mode.
    pub sourcemap: SourcemapMode,
    /// Whether code splitting is enabled.
    pub splitting: bool,
    /// Base directory for computing output paths (the bundler's outbase).
    pub outbase: Option<PathBuf>,
}

impl BundleRequest {
    /// Creates a request with the default bundler options.
    pub fn new(entry: impl Into<PathBuf>, outdir: impl Into<PathBuf>) -> Self {
        Self {
            entry: entry.into(),
            outdir: outdir.into(),
            outfile: None,
            minify: true,
            sourcemap: SourcemapMode::None,
            splitting: false,
            outbase: None,
        }
    }

    /// Sets an explicit output file name.
    pub fn outfile(mut self, outfile: impl Into<String>) -> Self {
        self.outfile = Some(outfile.into());
        self
    }

    /// Sets whether output is minified.
    pub fn minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    /// Sets the sourcemap mode.
    pub fn sourcemap(mut self, sourcemap: SourcemapMode) -> Self {
        self.sourcemap = sourcemap;
        self
    }

    /// Sets whether code splitting is enabled.
    pub fn splitting(mut self, splitting: bool) -> Self {
        self.splitting = splitting;
        self
    }

    /// Sets the outbase directory.
    pub fn outbase(mut self, outbase: impl Into<PathBuf>) -> Self {
        self.outbase = Some(outbase.into());
        self
    }
}

/// Result of a successful bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleOutput {
    /// Path of the written bundle, after any rename.
    pub path: PathBuf,
}

/// The esbuild subprocess orchestrator.
pub struct Bundler {
    config: BundlerConfig,
}

impl Bundler {
    /// Creates a new bundler with default configuration.
    pub fn new() -> Self {
        Self {
            config: BundlerConfig::default(),
        }
    }

    /// Creates a new bundler with the given configuration.
    pub fn with_config(config: BundlerConfig) -> Self {
        Self { config }
    }

    /// Finds the esbuild executable path.
    pub fn find_bundler(&self) -> BundleResult<PathBuf> {
        // Check config override first
        if let Some(ref path) = self.config.binary_path {
            if path.exists() {
                return Ok(path.clone());
            }
        }

        // Check CHEX_ESBUILD environment variable
        if let Ok(path) = std::env::var(BUNDLER_ENV_VAR) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(path);
            }
        }

        let bundler_names = if cfg!(windows) {
            vec!["esbuild.cmd", "esbuild.exe", "esbuild"]
        } else {
            vec!["esbuild"]
        };

        // Prefer a project-local install under node_modules/.bin
        if let Some(ref dir) = self.config.search_dir {
            for name in &bundler_names {
                let path = dir.join("node_modules").join(".bin").join(name);
                if path.exists() {
                    return Ok(path);
                }
            }
        }

        // Try to find esbuild in PATH
        for name in &bundler_names {
            if let Ok(path) = which::which(name) {
                return Ok(path);
            }
        }

        // Try common installation paths
        let common_paths = if cfg!(target_os = "macos") {
            vec!["/opt/homebrew/bin/esbuild", "/usr/local/bin/esbuild"]
        } else if cfg!(windows) {
            vec![]
        } else {
            vec!["/usr/local/bin/esbuild", "/usr/bin/esbuild"]
        };

        for path_str in common_paths {
            let path = PathBuf::from(path_str);
            if path.exists() {
                return Ok(path);
            }
        }

        Err(BundleError::BundlerNotFound)
    }

    /// Bundles a single entry.
    ///
    /// Invokes `esbuild <entry> --bundle --format=esm --platform=browser
    /// --outdir=<outdir> --entry-names=index` plus the flags the request
    /// enables, so the bundle always lands at `<outdir>/index.js` first.
    /// When `outfile` names something else, the file is renamed afterwards.
    pub fn bundle(&self, request: &BundleRequest) -> BundleResult<BundleOutput> {
        let bundler_path = self.find_bundler()?;

        std::fs::create_dir_all(&request.outdir)?;

        let mut cmd = Command::new(&bundler_path);
        cmd.args(build_args(request));

        if self.config.capture_output {
            // Only stderr is surfaced; stdout stays unpiped so a chatty
            // bundler cannot fill a pipe nobody drains.
            cmd.stdout(Stdio::null()).stderr(Stdio::piped());
        }

        let child = cmd.spawn().map_err(BundleError::SpawnFailed)?;

        let (status, stderr) =
            wait_with_timeout(child, self.config.timeout, self.config.capture_output)?;

        if !status.success() {
            let exit_code = status.code().unwrap_or(-1);
            return Err(BundleError::build_failed(exit_code, stderr));
        }

        let default_output = request.outdir.join(DEFAULT_OUTPUT_NAME);
        if !default_output.exists() {
            return Err(BundleError::OutputMissing {
                path: default_output,
            });
        }

        let path = match &request.outfile {
            Some(outfile) if outfile != DEFAULT_OUTPUT_NAME => {
                let renamed = request.outdir.join(outfile);
                std::fs::rename(&default_output, &renamed)?;
                renamed
            }
            _ => default_output,
        };

        Ok(BundleOutput { path })
    }
}

impl Default for Bundler {
    fn default() -> Self {
        Self::new()
    }
}

fn eq_arg(flag: &str, value: &OsStr) -> OsString {
    let mut arg = OsString::from(flag);
    arg.push("=");
    arg.push(value);
    arg
}

fn build_args(request: &BundleRequest) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        request.entry.as_os_str().to_os_string(),
        OsString::from("--bundle"),
        OsString::from("--format=esm"),
        OsString::from("--platform=browser"),
        eq_arg("--outdir", request.outdir.as_os_str()),
        OsString::from("--entry-names=index"),
    ];

    if request.minify {
        args.push(OsString::from("--minify"));
    }

    match request.sourcemap {
        SourcemapMode::None => {}
        SourcemapMode::Inline => args.push(OsString::from("--sourcemap=inline")),
        SourcemapMode::External => args.push(OsString::from("--sourcemap")),
    }

    if request.splitting {
        args.push(OsString::from("--splitting"));
    }

    if let Some(ref outbase) = request.outbase {
        args.push(eq_arg("--outbase", outbase.as_os_str()));
    }

    args
}

/// Waits for a child process, killing it when the timeout expires.
///
/// Returns the exit status and captured stderr. Exposed for other stages
/// that drive external tools the same way.
pub fn wait_with_timeout(
    mut child: Child,
    timeout: Duration,
    capture_output: bool,
) -> BundleResult<(ExitStatus, String)> {
    let start = Instant::now();

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(BundleError::Timeout {
                        timeout_secs: timeout.as_secs(),
                    });
                }
                std::thread::sleep(Duration::from_millis(100));
            }
            Err(e) => return Err(BundleError::SpawnFailed(e)),
        }
    };

    let stderr = if capture_output {
        let mut buf = String::new();
        if let Some(mut err) = child.stderr.take() {
            let _ = err.read_to_string(&mut buf);
        }
        buf
    } else {
        String::new()
    };

    Ok((status, stderr))
}

/// Checks whether an entry's source file exists.
pub fn entry_exists(entry: &Path) -> bool {
    entry.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_as_strings(request: &BundleRequest) -> Vec<String> {
        build_args(request)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_config_builder() {
        let config = BundlerConfig::default()
            .binary_path("/usr/local/bin/esbuild")
            .search_dir("/work/ext")
            .timeout_secs(30);

        assert_eq!(
            config.binary_path,
            Some(PathBuf::from("/usr/local/bin/esbuild"))
        );
        assert_eq!(config.search_dir, Some(PathBuf::from("/work/ext")));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.capture_output);
    }

    #[test]
    fn test_build_args_defaults() {
        let request = BundleRequest::new("src/popup/index.ts", "/out/popup");
        let args = args_as_strings(&request);

        assert_eq!(args[0], "src/popup/index.ts");
        assert!(args.contains(&"--bundle".to_string()));
        assert!(args.contains(&"--format=esm".to_string()));
        assert!(args.contains(&"--platform=browser".to_string()));
        assert!(args.contains(&"--outdir=/out/popup".to_string()));
        assert!(args.contains(&"--entry-names=index".to_string()));
        assert!(args.contains(&"--minify".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("--sourcemap")));
        assert!(!args.contains(&"--splitting".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("--outbase")));
    }

    #[test]
    fn test_build_args_full() {
        let request = BundleRequest::new("src/sites/gh/index.ts", "/out/sites/gh")
            .minify(false)
            .sourcemap(SourcemapMode::Inline)
            .splitting(true)
            .outbase("src");
        let args = args_as_strings(&request);

        assert!(!args.contains(&"--minify".to_string()));
        assert!(args.contains(&"--sourcemap=inline".to_string()));
        assert!(args.contains(&"--splitting".to_string()));
        assert!(args.contains(&"--outbase=src".to_string()));
    }

    #[test]
    fn test_build_args_external_sourcemap() {
        let request =
            BundleRequest::new("src/a/index.ts", "/out/a").sourcemap(SourcemapMode::External);
        let args = args_as_strings(&request);
        assert!(args.contains(&"--sourcemap".to_string()));
        assert!(!args.contains(&"--sourcemap=inline".to_string()));
    }

    #[test]
    fn test_wait_with_timeout_captures_stderr() {
        let mut cmd = if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "echo hello 1>&2"]);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", "echo hello 1>&2"]);
            cmd
        };

        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        let child = cmd.spawn().unwrap();

        let (status, stderr) = wait_with_timeout(child, Duration::from_secs(2), true).unwrap();
        assert!(status.success());
        assert!(stderr.to_lowercase().contains("hello"));
    }

    #[cfg(unix)]
    fn write_stub_bundler(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("esbuild");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[cfg(unix)]
    const STUB_WRITES_OUTPUT: &str = r#"
for arg in "$@"; do
  case "$arg" in
    --outdir=*) outdir="${arg#--outdir=}" ;;
  esac
done
mkdir -p "$outdir"
echo "// bundled" > "$outdir/index.js"
"#;

    #[cfg(unix)]
    #[test]
    fn test_bundle_writes_default_output() {
        let dir = tempfile::tempdir().unwrap();
        let stub = write_stub_bundler(dir.path(), STUB_WRITES_OUTPUT);

        let bundler = Bundler::with_config(BundlerConfig::default().binary_path(&stub));
        let outdir = dir.path().join("dist/popup");
        let request = BundleRequest::new(dir.path().join("index.ts"), &outdir);

        let output = bundler.bundle(&request).unwrap();
        assert_eq!(output.path, outdir.join("index.js"));
        assert!(output.path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_bundle_renames_custom_outfile() {
        let dir = tempfile::tempdir().unwrap();
        let stub = write_stub_bundler(dir.path(), STUB_WRITES_OUTPUT);

        let bundler = Bundler::with_config(BundlerConfig::default().binary_path(&stub));
        let outdir = dir.path().join("dist/content");
        let request =
            BundleRequest::new(dir.path().join("index.ts"), &outdir).outfile("content.js");

        let output = bundler.bundle(&request).unwrap();
        assert_eq!(output.path, outdir.join("content.js"));
        assert!(output.path.exists());
        assert!(!outdir.join("index.js").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_bundle_failure_surfaces_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let stub = write_stub_bundler(
            dir.path(),
            r#"echo "entry.ts: error: Could not resolve" 1>&2; exit 1"#,
        );

        let bundler = Bundler::with_config(BundlerConfig::default().binary_path(&stub));
        let request = BundleRequest::new(dir.path().join("index.ts"), dir.path().join("dist"));

        let err = bundler.bundle(&request).unwrap_err();
        match err {
            BundleError::BuildFailed { exit_code, stderr } => {
                assert_eq!(exit_code, 1);
                assert!(stderr.contains("Could not resolve"));
            }
            other => panic!("expected BuildFailed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_bundle_missing_output_detected() {
        let dir = tempfile::tempdir().unwrap();
        // Exits successfully without writing anything.
        let stub = write_stub_bundler(dir.path(), "exit 0");

        let bundler = Bundler::with_config(BundlerConfig::default().binary_path(&stub));
        let request = BundleRequest::new(dir.path().join("index.ts"), dir.path().join("dist"));

        let err = bundler.bundle(&request).unwrap_err();
        assert!(matches!(err, BundleError::OutputMissing { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_bundle_timeout_kills_process() {
        let dir = tempfile::tempdir().unwrap();
        let stub = write_stub_bundler(dir.path(), "sleep 5");

        let bundler = Bundler::with_config(
            BundlerConfig::default()
                .binary_path(&stub)
                .timeout(Duration::from_millis(300)),
        );
        let request = BundleRequest::new(dir.path().join("index.ts"), dir.path().join("dist"));

        let err = bundler.bundle(&request).unwrap_err();
        assert!(matches!(err, BundleError::Timeout { .. }));
    }

    #[test]
    fn test_find_bundler_prefers_config_override() {
        let dir = tempfile::tempdir().unwrap();
        let stub = dir.path().join("esbuild");
        std::fs::write(&stub, "").unwrap();

        let bundler = Bundler::with_config(BundlerConfig::default().binary_path(&stub));
        assert_eq!(bundler.find_bundler().unwrap(), stub);
    }

    #[test]
    fn test_find_bundler_skips_missing_override() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope/esbuild");
        let local = dir.path().join("node_modules/.bin");
        std::fs::create_dir_all(&local).unwrap();
        std::fs::write(local.join("esbuild"), "").unwrap();

        let bundler = Bundler::with_config(
            BundlerConfig::default()
                .binary_path(&missing)
                .search_dir(dir.path()),
        );
        // The dangling override is ignored in favor of the local install.
        assert_eq!(bundler.find_bundler().unwrap(), local.join("esbuild"));
    }
}
