//! One invocation: render, save, and optionally publish.

use std::path::{Path, PathBuf};

use avatrope_frames::{FrameGenerator, GeneratorKind, StateStore};
use avatrope_ops::{animation_path, ensure_output_dir, frame_path};
use avatrope_types::Result;
use avatrope_upload::{ProfilePublisher, UploadOutcome};
use tracing::info;

use crate::animation::{render_sequence, render_single, save_gif, save_png};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Render "now", save it, upload it, then post `status` if given.
    Single { status: Option<String> },
    /// Local preview of the generator's trajectory; never uploads.
    Animated { steps: u32, duration_secs: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub generator: GeneratorKind,
    pub reset_state: bool,
    pub mode: RunMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub artifact: PathBuf,
    pub frames: usize,
    pub image_upload: Option<UploadOutcome>,
    pub status_update: Option<UploadOutcome>,
}

pub struct Session<P>
where
    P: ProfilePublisher,
{
    publisher: P,
    store: StateStore,
    output_dir: PathBuf,
    frame_delay_ms: u32,
}

impl<P> Session<P>
where
    P: ProfilePublisher,
{
    pub fn new(
        publisher: P,
        store: StateStore,
        output_dir: impl Into<PathBuf>,
        frame_delay_ms: u32,
    ) -> Self {
        Self {
            publisher,
            store,
            output_dir: output_dir.into(),
            frame_delay_ms,
        }
    }

    pub async fn run(&self, plan: &RunPlan, now: i64) -> Result<RunReport> {
        let generator = FrameGenerator::load(plan.generator, &self.store, now, plan.reset_state)?;
        let dir = ensure_output_dir(&self.output_dir)?;

        match &plan.mode {
            RunMode::Single { status } => {
                self.run_single(&generator, &dir, now, status.as_deref())
                    .await
            }
            RunMode::Animated {
                steps,
                duration_secs,
            } => self.run_animated(&generator, &dir, now, *steps, *duration_secs),
        }
    }

    async fn run_single(
        &self,
        generator: &FrameGenerator,
        dir: &Path,
        now: i64,
        status: Option<&str>,
    ) -> Result<RunReport> {
        let frame = render_single(generator, now)?;
        let artifact = frame_path(dir, now);
        save_png(&frame, &artifact)?;
        info!("Frame written to {:?}", artifact);

        let image_upload = self.publisher.update_profile_image(&artifact).await?;
        let status_update = match status {
            Some(text) => Some(self.publisher.update_status(text).await?),
            None => None,
        };

        Ok(RunReport {
            artifact,
            frames: 1,
            image_upload: Some(image_upload),
            status_update,
        })
    }

    fn run_animated(
        &self,
        generator: &FrameGenerator,
        dir: &Path,
        now: i64,
        steps: u32,
        duration_secs: u64,
    ) -> Result<RunReport> {
        let frames = render_sequence(generator, now, steps, duration_secs)?;
        let artifact = animation_path(dir, now);
        save_gif(&frames, self.frame_delay_ms, &artifact)?;

        Ok(RunReport {
            artifact,
            frames: frames.len(),
            image_upload: None,
            status_update: None,
        })
    }
}
