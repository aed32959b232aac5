//! Upload client: multipart encoding, OAuth signing and the publisher seam.

pub mod client;
pub mod multipart;
pub mod oauth;

use avatrope_types::AvatropeError;

pub use client::{DryRunPublisher, HttpPublisher, ProfilePublisher, UploadOutcome};

pub fn upload_error(message: impl Into<String>) -> AvatropeError {
    AvatropeError::Upload(message.into())
}
