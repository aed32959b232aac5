use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use avatrope_driver::{RunMode, RunPlan, RunReport, Session};
use avatrope_frames::{GeneratorKind, StateStore};
use avatrope_ops::{init_tracing, Verbosity};
use avatrope_types::{config::AvatropeConfig, credentials::Credentials};
use avatrope_upload::{DryRunPublisher, HttpPublisher, ProfilePublisher, UploadOutcome};
use chrono::{Local, Utc};
use clap::Parser;
use tracing::{debug, info, warn};

/// Periodically re-render a profile picture from the current time and upload it.
#[derive(Debug, Parser)]
#[command(name = "avatrope", version, disable_version_flag = true)]
struct Cli {
    /// Print version.
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    version: Option<bool>,

    /// Frame generator to render with.
    #[arg(value_enum)]
    generator: GeneratorKind,

    /// Configuration file.
    #[arg(short, long, env = "AVATROPE_CONFIG", default_value = "avatrope.toml")]
    config: PathBuf,

    /// Verbose output, including API responses.
    #[arg(short = 'V', long)]
    verbose: bool,

    /// Output as little as possible; overrides --verbose.
    #[arg(short, long)]
    quiet: bool,

    /// Render and save the frame, but skip every network call.
    #[arg(short, long)]
    pretend: bool,

    /// Also post this status after the picture is updated.
    #[arg(short, long, value_name = "STATUS")]
    status: Option<String>,

    /// Render a local animated GIF of the generator instead of uploading.
    #[arg(short, long)]
    gif: bool,

    /// Number of intervals in the GIF (frames = steps + 1).
    #[arg(long, requires = "gif")]
    steps: Option<u32>,

    /// Seconds of generator time covered by the GIF.
    #[arg(long, requires = "gif")]
    duration: Option<u64>,

    /// Discard persisted generator state and start a new cycle now.
    #[arg(long)]
    reset_state: bool,
}

impl Cli {
    fn plan(&self, config: &AvatropeConfig) -> Result<RunPlan> {
        let mode = if self.gif {
            RunMode::Animated {
                steps: self.steps.unwrap_or(config.animation.steps),
                duration_secs: self.duration.unwrap_or(config.animation.duration_secs),
            }
        } else {
            if let Some(status) = &self.status {
                if status.trim().is_empty() {
                    bail!("--status needs non-empty text");
                }
            }
            RunMode::Single {
                status: self.status.clone(),
            }
        };
        if let RunMode::Animated { steps: 0, .. } = mode {
            bail!("--steps must be greater than zero");
        }
        Ok(RunPlan {
            generator: self.generator,
            reset_state: self.reset_state,
            mode,
        })
    }

    fn uploads(&self) -> bool {
        !self.pretend && !self.gif
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, config_warning) = load_config(&cli.config);
    let verbosity = Verbosity::from_flags(cli.verbose, cli.quiet);
    init_tracing(&verbosity.log_level(&config.ops.log_level))?;
    if let Some(message) = config_warning {
        warn!("{message}");
    }

    debug!("Start at {}", Local::now());
    debug!("Options: {:?}", cli);

    let plan = cli.plan(&config)?;
    let store = StateStore::new(&config.storage.state_dir);
    let now = Utc::now().timestamp();

    let report = if cli.uploads() {
        let credentials =
            Credentials::load(&config.credentials.app_path, &config.credentials.user_path)?;
        let publisher = HttpPublisher::new(&config.api, credentials)?;
        run_session(publisher, store, &config, &plan, now).await?
    } else {
        run_session(DryRunPublisher::new(), store, &config, &plan, now).await?
    };

    summarize(&report);
    debug!("Finished at {}", Local::now());
    Ok(())
}

async fn run_session<P: ProfilePublisher>(
    publisher: P,
    store: StateStore,
    config: &AvatropeConfig,
    plan: &RunPlan,
    now: i64,
) -> Result<RunReport> {
    let session = Session::new(
        publisher,
        store,
        &config.storage.output_dir,
        config.animation.frame_delay_ms,
    );
    Ok(session.run(plan, now).await?)
}

fn summarize(report: &RunReport) {
    info!(
        "Wrote {} frame(s) to {:?}",
        report.frames, report.artifact
    );
    if let Some(UploadOutcome::Accepted { status, .. }) = &report.image_upload {
        info!("Profile picture updated ({status})");
    }
    if let Some(UploadOutcome::Accepted { status, .. }) = &report.status_update {
        info!("Status posted ({status})");
    }
}

/// Reads the config file, falling back to built-in defaults with a warning.
fn load_config(path: &Path) -> (AvatropeConfig, Option<String>) {
    match AvatropeConfig::from_file(path) {
        Ok(cfg) => match cfg.validate() {
            Ok(()) => (cfg, None),
            Err(err) => (
                AvatropeConfig::default(),
                Some(format!(
                    "Invalid config in {:?}: {err}. Falling back to internal defaults.",
                    path
                )),
            ),
        },
        Err(err) => (
            AvatropeConfig::default(),
            Some(format!("{err}. Falling back to internal defaults.")),
        ),
    }
}
