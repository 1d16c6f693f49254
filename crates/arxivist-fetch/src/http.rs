//! HTTP client for the model bundle and HuggingFace-hosted encoders.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

const HUGGINGFACE_URL: &str = "https://huggingface.co";

/// Encoder files as `(path in the HuggingFace repo, local file name)`.
pub const ENCODER_FILES: &[(&str, &str)] = &[
    ("onnx/model.onnx", "model.onnx"),
    ("tokenizer.json", "tokenizer.json"),
];

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status} for {url}")]
    Server { status: u16, url: String },
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> FetchError + '_ {
    move |source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Downloads artifacts to local files.
pub struct ArtifactClient {
    client: reqwest::Client,
    hub_url: String,
}

impl Default for ArtifactClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactClient {
    /// Client resolving encoders against huggingface.co.
    pub fn new() -> Self {
        Self::with_hub(HUGGINGFACE_URL.to_string())
    }

    /// Client resolving encoders against a HuggingFace-compatible mirror.
    ///
    /// `hub_url` should be like `https://huggingface.co` (no trailing slash).
    pub fn with_hub(hub_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            hub_url: hub_url.trim_end_matches('/').to_string(),
        }
    }

    /// Download `url` to `dest`, returning the number of bytes written.
    ///
    /// The body is streamed into `<dest>.part` and renamed into place once
    /// complete, so `dest` never holds a truncated file.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(io_err(parent))?;
        }

        info!(url, dest = %dest.display(), "downloading");
        let mut resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Server {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let part = part_path(dest);
        let written = match stream_to(&mut resp, &part).await {
            Ok(written) => written,
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&part).await {
                    warn!(part = %part.display(), error = %cleanup, "could not remove partial download");
                }
                return Err(e);
            }
        };

        tokio::fs::rename(&part, dest).await.map_err(io_err(dest))?;
        info!(bytes = written, dest = %dest.display(), "download complete");
        Ok(written)
    }

    /// URL of `remote_path` in the `sentence-transformers/<name>` repository.
    pub fn encoder_file_url(&self, name: &str, remote_path: &str) -> String {
        format!(
            "{}/sentence-transformers/{name}/resolve/main/{remote_path}",
            self.hub_url
        )
    }

    /// Make sure `<dir>/<name>` holds the encoder files, downloading the
    /// missing ones (all of them when `force`). Returns the model directory.
    pub async fn ensure_encoder(
        &self,
        dir: &Path,
        name: &str,
        force: bool,
    ) -> Result<PathBuf, FetchError> {
        let model_dir = dir.join(name);
        for (remote, local) in ENCODER_FILES {
            let dest = model_dir.join(local);
            if !force && dest.exists() {
                debug!(file = %dest.display(), "encoder file present");
                continue;
            }
            self.download(&self.encoder_file_url(name, remote), &dest)
                .await?;
        }
        Ok(model_dir)
    }
}

async fn stream_to(resp: &mut reqwest::Response, part: &Path) -> Result<u64, FetchError> {
    let mut file = tokio::fs::File::create(part).await.map_err(io_err(part))?;
    let mut written = 0u64;
    while let Some(chunk) = resp.chunk().await? {
        file.write_all(&chunk).await.map_err(io_err(part))?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(io_err(part))?;
    Ok(written)
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}
