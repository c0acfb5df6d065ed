//! Run configuration.
//!
//! A [`Context`] is built once by the command-line layer and passed by
//! reference to anything that needs the project directory or the
//! verbosity. Nothing in the library reads the environment on its own.

use log::LevelFilter;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming the project root.
pub const PROJDIR_ENV: &str = "PROJDIR";

/// Environment variable holding the default verbosity level.
pub const VERBOSITY_ENV: &str = "VERBOSITY_LEVEL";

/// Immutable run context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Root that relative paths are resolved against.
    pub project_dir: PathBuf,
    /// 0 = warnings only, 1 = progress, 2+ = details.
    pub verbosity: u8,
}

impl Default for Context {
    fn default() -> Self {
        Self::new(PathBuf::from("."), 0)
    }
}

impl Context {
    pub fn new(project_dir: impl Into<PathBuf>, verbosity: u8) -> Self {
        Self {
            project_dir: project_dir.into(),
            verbosity,
        }
    }

    /// Build a context from explicit overrides, falling back to the
    /// `PROJDIR` / `VERBOSITY_LEVEL` environment and then to defaults.
    ///
    /// An unparsable `VERBOSITY_LEVEL` counts as 0.
    pub fn from_env(project_dir: Option<PathBuf>, verbosity: Option<u8>) -> Self {
        let project_dir = project_dir
            .or_else(|| env::var_os(PROJDIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        let verbosity = verbosity.unwrap_or_else(|| {
            env::var(VERBOSITY_ENV)
                .ok()
                .and_then(|v| v.trim().parse::<i64>().ok())
                .map(|v| v.clamp(0, u8::MAX as i64) as u8)
                .unwrap_or(0)
        });
        Self::new(project_dir, verbosity)
    }

    /// Resolve a user-supplied path.
    ///
    /// - `/path/to/file` is used as-is
    /// - `./path/to/file` is relative to the current directory
    /// - `path/to/file` is relative to the project directory
    pub fn resolve_path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            return path.to_path_buf();
        }
        if path.starts_with(".") {
            return match env::current_dir() {
                Ok(cwd) => cwd.join(path),
                Err(_) => path.to_path_buf(),
            };
        }
        self.project_dir.join(path)
    }

    /// Default log filter for this verbosity.
    pub fn log_filter(&self) -> LevelFilter {
        match self.verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}
