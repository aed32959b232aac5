//! Turning a generator into local artifacts.

use std::{fs::File, io::BufWriter, path::Path};

use avatrope_frames::{canvas::frame_to_image, render_error, FrameGenerator};
use avatrope_types::{frame::Frame, AvatropeError, Result};
use image::{
    codecs::gif::{GifEncoder, Repeat},
    Delay,
};
use tracing::{debug, info};

/// `steps + 1` evenly spaced instants from `start` to `start + duration`.
pub fn sample_timestamps(start: i64, steps: u32, duration_secs: u64) -> Result<Vec<i64>> {
    if steps == 0 {
        return Err(AvatropeError::Configuration(
            "animation needs at least one step".into(),
        ));
    }
    let duration = i128::from(duration_secs);
    let steps_wide = i128::from(steps);
    (0..=steps)
        .map(|i| {
            i64::try_from(duration * i128::from(i) / steps_wide)
                .ok()
                .and_then(|offset| start.checked_add(offset))
                .ok_or_else(|| {
                    AvatropeError::Configuration(format!(
                        "animation of {duration_secs}s from {start} leaves the timestamp range"
                    ))
                })
        })
        .collect()
}

pub fn render_single(generator: &FrameGenerator, now: i64) -> Result<Frame> {
    info!("Generating {} frame for time: {now}", generator.kind());
    generator.render(now)
}

pub fn render_sequence(
    generator: &FrameGenerator,
    start: i64,
    steps: u32,
    duration_secs: u64,
) -> Result<Vec<Frame>> {
    let timestamps = sample_timestamps(start, steps, duration_secs)?;
    info!(
        "Rendering {} {} frames across {duration_secs}s",
        timestamps.len(),
        generator.kind()
    );
    timestamps
        .into_iter()
        .map(|t| generator.render(t))
        .collect()
}

pub fn save_png(frame: &Frame, path: &Path) -> Result<()> {
    frame_to_image(frame)?
        .save(path)
        .map_err(|err| render_error(format!("failed to save frame {:?}: {err}", path)))?;
    debug!("Saved frame {} to {:?}", frame.rendered_at, path);
    Ok(())
}

/// Writes `frames` as a looping GIF, `delay_ms` per frame.
pub fn save_gif(frames: &[Frame], delay_ms: u32, path: &Path) -> Result<()> {
    let file = File::create(path)
        .map_err(|err| render_error(format!("failed to create {:?}: {err}", path)))?;
    let mut encoder = GifEncoder::new(BufWriter::new(file));
    encoder
        .set_repeat(Repeat::Infinite)
        .map_err(|err| render_error(format!("gif setup failed: {err}")))?;
    for frame in frames {
        let image = frame_to_image(frame)?;
        let delay = Delay::from_numer_denom_ms(delay_ms, 1);
        encoder
            .encode_frame(image::Frame::from_parts(image, 0, 0, delay))
            .map_err(|err| {
                render_error(format!("failed to encode frame {}: {err}", frame.rendered_at))
            })?;
    }
    drop(encoder);
    info!("Saved {} frame animation to {:?}", frames.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatrope_frames::{ColorCycle, GradientCycle, GradientState};
    use image::{codecs::gif::GifDecoder, AnimationDecoder};

    fn gradient() -> FrameGenerator {
        FrameGenerator::GradientCycle(
            GradientCycle::from_state(GradientState {
                start_time: 0,
                period: 1_000,
            })
            .unwrap(),
        )
    }

    #[test]
    fn samples_include_both_endpoints() {
        assert_eq!(
            sample_timestamps(1_000, 4, 400).unwrap(),
            vec![1_000, 1_100, 1_200, 1_300, 1_400]
        );
        let month = sample_timestamps(0, 60, 2_592_000).unwrap();
        assert_eq!(month.len(), 61);
        assert_eq!(month[1], 43_200);
        assert_eq!(*month.last().unwrap(), 2_592_000);
    }

    #[test]
    fn uneven_durations_still_end_on_the_final_instant() {
        let samples = sample_timestamps(10, 3, 100).unwrap();
        assert_eq!(samples, vec![10, 43, 76, 110]);
    }

    #[test]
    fn zero_steps_is_rejected() {
        assert!(matches!(
            sample_timestamps(0, 0, 100),
            Err(AvatropeError::Configuration(_))
        ));
    }

    #[test]
    fn oversized_durations_are_rejected_instead_of_wrapping() {
        assert!(matches!(
            sample_timestamps(0, 1, u64::MAX),
            Err(AvatropeError::Configuration(_))
        ));
        assert!(matches!(
            sample_timestamps(i64::MAX - 10, 2, 100),
            Err(AvatropeError::Configuration(_))
        ));
        let edge = sample_timestamps(i64::MAX - 100, 2, 100).unwrap();
        assert_eq!(*edge.last().unwrap(), i64::MAX);
    }

    #[test]
    fn sequence_frames_follow_sample_order() {
        let frames = render_sequence(&gradient(), 100, 4, 400).unwrap();
        let stamps: Vec<i64> = frames.iter().map(|f| f.rendered_at).collect();
        assert_eq!(stamps, vec![100, 200, 300, 400, 500]);
    }

    #[test]
    fn png_is_written_at_full_size() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("frame_45000.png");
        let generator = FrameGenerator::ColorCycle(ColorCycle::new());
        let frame = render_single(&generator, 45_000).unwrap();
        save_png(&frame, &path).unwrap();

        let decoded = image::open(&path).expect("decode png");
        assert_eq!((decoded.width(), decoded.height()), (200, 200));
    }

    #[test]
    fn gif_contains_every_frame() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("animated_0.gif");
        let frames = render_sequence(&gradient(), 0, 3, 900).unwrap();
        save_gif(&frames, 100, &path).unwrap();

        let decoder = GifDecoder::new(File::open(&path).unwrap()).expect("gif decoder");
        let decoded = decoder.into_frames().collect_frames().expect("frames");
        assert_eq!(decoded.len(), 4);
    }
}
