//! Service facade: input-bound checks in front of the two engines, plus the
//! disk-level health report.

use arxivist_core::config::{MAX_K, MIN_QUERY_CHARS, MIN_TEXT_CHARS};
use arxivist_core::{AssetSet, HealthStatus, Recommendation, ServiceConfig, SubjectPrediction};

use crate::bootstrap::bootstrap;
use crate::engine;
use crate::model::ModelBackend;
use crate::readiness::Readiness;
use crate::{BootstrapError, QueryError};

/// Entry points consumed by a transport. Share behind an `Arc`.
#[derive(Debug)]
pub struct Service {
    config: ServiceConfig,
    assets: AssetSet,
    readiness: Readiness,
}

impl Service {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            assets: AssetSet::new(&config.models_dir),
            config,
            readiness: Readiness::new(),
        }
    }

    /// Bootstrap the inference context and publish it. Call once at startup,
    /// before accepting queries.
    pub fn start(&self, backend: &dyn ModelBackend) -> Result<(), BootstrapError> {
        if self.readiness.is_ready() {
            return Err(BootstrapError::AlreadyBootstrapped);
        }
        let ctx = bootstrap(&self.config, backend)?;
        self.readiness.publish(ctx)?;
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }

    /// Top-`top_k` subjects for `text` (at least [`MIN_TEXT_CHARS`] characters,
    /// `1 <= top_k <= MAX_K`).
    pub fn classify(&self, text: &str, top_k: usize) -> Result<Vec<SubjectPrediction>, QueryError> {
        check_length("text", text, MIN_TEXT_CHARS)?;
        check_k("top_k", top_k)?;
        engine::classify(self.readiness.context()?, text, top_k)
    }

    /// Top-`k` titles for `query` (at least [`MIN_QUERY_CHARS`] characters,
    /// `1 <= k <= MAX_K`).
    pub fn recommend(&self, query: &str, k: usize) -> Result<Vec<Recommendation>, QueryError> {
        check_length("query", query, MIN_QUERY_CHARS)?;
        check_k("k", k)?;
        engine::recommend(self.readiness.context()?, query, k)
    }

    /// Which required assets are on disk. Never touches the inference context.
    pub fn health_status(&self) -> HealthStatus {
        HealthStatus::inspect(&self.assets, self.readiness.is_ready())
    }
}

fn check_length(field: &str, value: &str, min: usize) -> Result<(), QueryError> {
    let len = value.chars().count();
    if len < min {
        return Err(QueryError::InvalidArgument(format!(
            "{field} must be at least {min} characters, got {len}"
        )));
    }
    Ok(())
}

fn check_k(field: &str, k: usize) -> Result<(), QueryError> {
    if !(1..=MAX_K).contains(&k) {
        return Err(QueryError::InvalidArgument(format!(
            "{field} must be between 1 and {MAX_K}, got {k}"
        )));
    }
    Ok(())
}
