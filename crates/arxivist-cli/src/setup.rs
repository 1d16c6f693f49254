//! Startup and asset download.

use anyhow::Context;
use arxivist_ai::{OnnxBackend, Service};
use arxivist_core::{AssetSet, ServiceConfig};
use arxivist_fetch::ArtifactClient;
use tracing::{info, warn};

const BUNDLE_FILE: &str = "models.zip";

/// Bootstrap a service. The asset set is provisioned first; only then is a
/// missing encoder downloaded, unless `offline`.
pub async fn start(config: ServiceConfig, offline: bool) -> anyhow::Result<Service> {
    arxivist_store::ensure(&config.models_dir, config.models_zip.as_deref())
        .context("provisioning model assets")?;

    if !offline {
        ArtifactClient::new()
            .ensure_encoder(&config.encoder_dir, &config.encoder_model, false)
            .await
            .with_context(|| format!("fetching sentence encoder '{}'", config.encoder_model))?;
    }

    let service = Service::new(config);
    service
        .start(&OnnxBackend)
        .context("bootstrapping inference context")?;
    Ok(service)
}

/// Download and unpack the model bundle when the asset set is incomplete,
/// then make sure the encoder files are cached.
pub async fn fetch(config: &ServiceConfig, url: &str, force: bool) -> anyhow::Result<()> {
    let client = ArtifactClient::new();
    let assets = AssetSet::new(&config.models_dir);

    if assets.is_complete() {
        info!(models_dir = %config.models_dir.display(), "asset set complete; skipping bundle");
    } else {
        let archive = config.models_dir.join(BUNDLE_FILE);
        client
            .download(url, &archive)
            .await
            .context("downloading model bundle")?;
        let provisioned = arxivist_store::ensure(&config.models_dir, Some(&archive));
        if let Err(e) = std::fs::remove_file(&archive) {
            warn!(archive = %archive.display(), error = %e, "could not remove downloaded bundle");
        }
        provisioned.context("provisioning from downloaded bundle")?;
    }

    let encoder = client
        .ensure_encoder(&config.encoder_dir, &config.encoder_model, force)
        .await
        .with_context(|| format!("fetching sentence encoder '{}'", config.encoder_model))?;
    info!(encoder = %encoder.display(), "encoder ready");
    Ok(())
}
