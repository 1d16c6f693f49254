use std::path::PathBuf;

use arxivist_store::{ProvisioningError, StoreError};
use thiserror::Error;

/// Startup-fatal failures while materialising the inference context.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),

    #[error("classifier declares no inputs; cannot determine its input key")]
    NoInputSignature,

    #[error("artifact dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("classifier could not be loaded from {dir}: {reason:#}")]
    ClassifierUnavailable { dir: PathBuf, reason: anyhow::Error },

    #[error("sentence encoder '{name}' is unavailable: {reason:#}")]
    EncoderUnavailable { name: String, reason: anyhow::Error },

    #[error("unreadable artifact: {0}")]
    Artifact(#[from] StoreError),

    #[error("inference context was already published")]
    AlreadyBootstrapped,
}

/// Per-query failures. None of them touch the shared context.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Bootstrap has not published a context yet.
    #[error("models not loaded yet")]
    NotReady,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("inference failed: {0:#}")]
    Inference(anyhow::Error),
}

impl QueryError {
    /// Only [`QueryError::NotReady`] is worth retrying (after backoff).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotReady)
    }

    /// HTTP status a transport should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotReady => 503,
            Self::InvalidArgument(_) => 422,
            Self::Inference(_) => 500,
        }
    }
}
