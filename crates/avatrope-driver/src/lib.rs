//! Animation driver and per-run orchestration.

pub mod animation;
pub mod session;

pub use animation::{render_sequence, render_single, sample_timestamps, save_gif, save_png};
pub use session::{RunMode, RunPlan, RunReport, Session};
