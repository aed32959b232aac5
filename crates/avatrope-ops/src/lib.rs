//! Operational helpers: logging setup and local artifact layout.

use std::path::{Path, PathBuf};

use avatrope_types::{AvatropeError, Result};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// How chatty a run should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    /// Quiet wins over verbose.
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    pub fn log_level(self, configured: &str) -> String {
        match self {
            Verbosity::Quiet => "error".into(),
            Verbosity::Verbose => "debug".into(),
            Verbosity::Normal => configured.to_string(),
        }
    }
}

pub fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|err| AvatropeError::Configuration(format!("failed to create log filter: {err}")))?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| AvatropeError::Configuration(format!("tracing init error: {err}")))?;
    Ok(())
}

pub fn ensure_output_dir(path: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = path.as_ref().to_path_buf();
    std::fs::create_dir_all(&dir).map_err(|err| {
        AvatropeError::Configuration(format!("failed to create output dir {:?}: {err}", dir))
    })?;
    info!("Output directory ready at {:?}", dir);
    Ok(dir)
}

pub fn frame_path(dir: &Path, epoch: i64) -> PathBuf {
    dir.join(format!("frame_{epoch}.png"))
}

pub fn animation_path(dir: &Path, epoch: i64) -> PathBuf {
    dir.join(format!("animated_{epoch}.gif"))
}
