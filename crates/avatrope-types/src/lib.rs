//! Shared domain types for the avatrope workspace.

pub mod color;
pub mod config;
pub mod credentials;
pub mod frame;

mod errors;

pub use errors::{AvatropeError, Result};
