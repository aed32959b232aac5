use std::{fmt, str::FromStr};

use avatrope_types::{
    color::Hsl,
    frame::{Frame, HEIGHT, WIDTH},
    AvatropeError, Result,
};
use chrono::{Local, TimeZone};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    canvas::{Canvas, Gravity},
    render_error,
    state::{PersistentState, StateOrigin, StateStore},
};

/// 25 hours, so a stale picture drifts visibly against the wall clock.
pub const SECONDS_PER_CYCLE: i64 = 60 * 60 * 25;
/// Default gradient period of 30 days.
pub const DEFAULT_PERIOD: i64 = 60 * 60 * 24 * 30;
/// Half-width of the gradient's hue band, as a fraction of the full circle.
pub const HUE_HALF_WINDOW: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GeneratorKind {
    Color,
    Gradient,
}

impl GeneratorKind {
    pub const ALL: [GeneratorKind; 2] = [GeneratorKind::Color, GeneratorKind::Gradient];

    pub fn as_str(self) -> &'static str {
        match self {
            GeneratorKind::Color => "color",
            GeneratorKind::Gradient => "gradient",
        }
    }

    /// Name used for the generator's state file.
    pub fn state_name(self) -> &'static str {
        match self {
            GeneratorKind::Color => "ColorCycle",
            GeneratorKind::Gradient => "GradientCycle",
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeneratorKind {
    type Err = AvatropeError;

    fn from_str(s: &str) -> Result<Self> {
        GeneratorKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let valid: Vec<&str> = GeneratorKind::ALL.iter().map(|k| k.as_str()).collect();
                AvatropeError::Configuration(format!(
                    "unknown generator '{s}', expected one of: {}",
                    valid.join(", ")
                ))
            })
    }
}

/// Solid background whose hue walks once around the circle per cycle,
/// stamped with the day and time it was rendered for.
#[derive(Debug, Clone)]
pub struct ColorCycle {
    seconds_per_cycle: i64,
}

impl Default for ColorCycle {
    fn default() -> Self {
        Self {
            seconds_per_cycle: SECONDS_PER_CYCLE,
        }
    }
}

impl ColorCycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hue_at(&self, now: i64) -> f64 {
        now.rem_euclid(self.seconds_per_cycle) as f64 / self.seconds_per_cycle as f64 * 360.0
    }

    pub fn render(&self, now: i64) -> Result<Frame> {
        let hue = self.hue_at(now);
        debug!("ColorCycle hue {hue:.3} at {now}");
        let (day, clock) = watermark(now, &Local)
            .ok_or_else(|| render_error(format!("timestamp {now} has no local time")))?;

        let mut canvas = Canvas::solid(WIDTH, HEIGHT, Hsl::pastel(hue).to_rgb());
        canvas.annotate(&day, Gravity::North);
        canvas.annotate(&clock, Gravity::South);
        Ok(canvas.into_frame(now))
    }
}

/// Day-of-month and `HH.MM` labels for `now` in `tz`.
pub fn watermark<Tz>(now: i64, tz: &Tz) -> Option<(String, String)>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let at = tz.timestamp_opt(now, 0).single()?;
    Some((at.format("%d").to_string(), at.format("%H.%M").to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradientState {
    /// Fixed at first creation so the phase survives restarts.
    pub start_time: i64,
    pub period: i64,
}

impl GradientState {
    pub fn starting_at(now: i64) -> Self {
        Self {
            start_time: now,
            period: DEFAULT_PERIOD,
        }
    }
}

impl PersistentState for GradientState {
    fn check(&self) -> std::result::Result<(), String> {
        if self.period > 0 {
            Ok(())
        } else {
            Err(format!("period must be positive, got {}", self.period))
        }
    }
}

/// Horizontal gradient over a narrow hue band that drifts with the phase.
#[derive(Debug, Clone)]
pub struct GradientCycle {
    state: GradientState,
}

impl GradientCycle {
    pub fn from_state(state: GradientState) -> Result<Self> {
        state.check().map_err(AvatropeError::State)?;
        Ok(Self { state })
    }

    /// Loads persisted state, initialising it at `now` on first use or when
    /// `reset` is requested.
    pub fn load(store: &StateStore, now: i64, reset: bool) -> Result<Self> {
        let name = GeneratorKind::Gradient.state_name();
        let loaded = if reset {
            store.reset(name, GradientState::starting_at(now))?
        } else {
            store.load_or_init(name, || GradientState::starting_at(now))?
        };
        if loaded.origin != StateOrigin::Loaded {
            debug!("GradientCycle state origin: {:?}", loaded.origin);
        }
        Self::from_state(loaded.state)
    }

    pub fn state(&self) -> &GradientState {
        &self.state
    }

    /// Normalised position within the period, in `[0, 1)`.
    pub fn phase_at(&self, now: i64) -> f64 {
        let elapsed = i128::from(now) - i128::from(self.state.start_time);
        elapsed.rem_euclid(i128::from(self.state.period)) as f64 / self.state.period as f64
    }

    /// Raw `(lower, upper)` hues; may fall outside `[0, 360)`.
    pub fn hue_bounds(&self, now: i64) -> (f64, f64) {
        let phase = self.phase_at(now);
        (
            (phase - HUE_HALF_WINDOW) * 360.0,
            (phase + HUE_HALF_WINDOW) * 360.0,
        )
    }

    pub fn render(&self, now: i64) -> Result<Frame> {
        let (lower, upper) = self.hue_bounds(now);
        debug!(
            "GradientCycle start {} now {} phase {:.5}",
            self.state.start_time,
            now,
            self.phase_at(now)
        );
        let canvas = Canvas::horizontal_gradient(
            WIDTH,
            HEIGHT,
            Hsl::pastel(upper).to_rgb(),
            Hsl::pastel(lower).to_rgb(),
        );
        Ok(canvas.into_frame(now))
    }
}

/// Closed set of frame generators behind one `render` capability.
#[derive(Debug, Clone)]
pub enum FrameGenerator {
    ColorCycle(ColorCycle),
    GradientCycle(GradientCycle),
}

impl FrameGenerator {
    pub fn load(kind: GeneratorKind, store: &StateStore, now: i64, reset: bool) -> Result<Self> {
        match kind {
            GeneratorKind::Color => Ok(FrameGenerator::ColorCycle(ColorCycle::new())),
            GeneratorKind::Gradient => Ok(FrameGenerator::GradientCycle(GradientCycle::load(
                store, now, reset,
            )?)),
        }
    }

    pub fn kind(&self) -> GeneratorKind {
        match self {
            FrameGenerator::ColorCycle(_) => GeneratorKind::Color,
            FrameGenerator::GradientCycle(_) => GeneratorKind::Gradient,
        }
    }

    pub fn render(&self, now: i64) -> Result<Frame> {
        match self {
            FrameGenerator::ColorCycle(generator) => generator.render(now),
            FrameGenerator::GradientCycle(generator) => generator.render(now),
        }
    }
}
