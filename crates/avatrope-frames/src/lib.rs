//! Frame generators and their persisted state.

pub mod canvas;
pub mod generators;
pub mod state;

use avatrope_types::AvatropeError;

pub use generators::{
    ColorCycle, FrameGenerator, GeneratorKind, GradientCycle, GradientState, SECONDS_PER_CYCLE,
};
pub use state::{LoadedState, PersistentState, StateLoadFailure, StateOrigin, StateStore};

pub fn render_error(message: impl Into<String>) -> AvatropeError {
    AvatropeError::Render(message.into())
}
