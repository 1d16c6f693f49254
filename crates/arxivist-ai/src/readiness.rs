//! Readiness gate: a write-once slot for the inference context.
//!
//! The context is published exactly once and read without locking afterwards.
//! Until then every query is turned away with [`QueryError::NotReady`].

use std::sync::OnceLock;

use tracing::info;

use crate::bootstrap::InferenceContext;
use crate::{BootstrapError, QueryError};

#[derive(Debug, Default)]
pub struct Readiness {
    slot: OnceLock<InferenceContext>,
}

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the context. Fails if one was already published; the existing
    /// context is kept.
    pub fn publish(&self, ctx: InferenceContext) -> Result<&InferenceContext, BootstrapError> {
        self.slot
            .set(ctx)
            .map_err(|_| BootstrapError::AlreadyBootstrapped)?;
        info!("inference context published");
        self.context().map_err(|_| BootstrapError::AlreadyBootstrapped)
    }

    pub fn is_ready(&self) -> bool {
        self.slot.get().is_some()
    }

    /// The published context, or [`QueryError::NotReady`].
    pub fn context(&self) -> Result<&InferenceContext, QueryError> {
        self.slot.get().ok_or(QueryError::NotReady)
    }
}
