//! Read-only diagnostic report on the asset set.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::asset::AssetSet;

/// Disk-level health of the service.
///
/// Reports asset presence on disk, not whether the inference context has been
/// published. `ready` echoes the readiness gate for operators.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub models_dir: String,
    pub ready: bool,
    /// Asset key → present on disk.
    pub assets: BTreeMap<&'static str, bool>,
    /// RFC 3339 timestamp of the check.
    pub checked_at: String,
}

impl HealthStatus {
    /// Inspect `assets` on disk.
    pub fn inspect(assets: &AssetSet, ready: bool) -> Self {
        let presence: BTreeMap<&'static str, bool> = assets
            .presence()
            .into_iter()
            .map(|(asset, present)| (asset.key(), present))
            .collect();

        Self {
            status: "ok",
            models_dir: assets.base_dir().display().to_string(),
            ready,
            assets: presence,
            checked_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// True when every required asset is on disk.
    pub fn assets_complete(&self) -> bool {
        self.assets.values().all(|&present| present)
    }
}
