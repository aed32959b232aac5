use thiserror::Error;

pub type Result<T, E = AvatropeError> = std::result::Result<T, E>;

/// Unified error type covering common failure scenarios across subsystems.
#[derive(Debug, Error)]
pub enum AvatropeError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("credentials error: {0}")]
    Credentials(String),
    #[error("state error: {0}")]
    State(String),
    #[error("render error: {0}")]
    Render(String),
    #[error("upload error: {0}")]
    Upload(String),
    #[error("upload rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
