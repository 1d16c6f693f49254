//! Service configuration and query policy constants.

use std::path::PathBuf;

/// Largest `k` accepted by either engine.
pub const MAX_K: usize = 30;

/// `k` used when a caller does not supply one.
pub const DEFAULT_K: usize = 5;

/// Minimum length (in characters) of a passage submitted for classification.
pub const MIN_TEXT_CHARS: usize = 5;

/// Minimum length (in characters) of a recommendation query.
pub const MIN_QUERY_CHARS: usize = 2;

/// Reserved label emitted by the vocabulary for out-of-vocabulary output slots.
pub const UNKNOWN_LABEL: &str = "[UNK]";

/// Sentence encoder used for title recommendation.
pub const DEFAULT_ENCODER: &str = "all-MiniLM-L6-v2";

/// Published bundle containing the six required assets.
pub const DEFAULT_BUNDLE_URL: &str =
    "https://github.com/Zeamanuel-Admasu/NLP-paper-recommendation/releases/download/models-v1/models.zip";

/// Where the service finds its artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Base directory holding the required asset set.
    pub models_dir: PathBuf,
    /// Optional local archive to unpack when assets are missing.
    pub models_zip: Option<PathBuf>,
    /// Cache root for sentence encoders, one sub-directory per model name.
    pub encoder_dir: PathBuf,
    /// Encoder model name, resolved under `encoder_dir`.
    pub encoder_model: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let models_dir = PathBuf::from("models");
        Self {
            encoder_dir: models_dir.join("encoders"),
            models_dir,
            models_zip: None,
            encoder_model: DEFAULT_ENCODER.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Build a config from `MODELS_DIR`, `MODELS_ZIP_PATH`, `ENCODER_DIR` and
    /// `ENCODER_MODEL`, falling back to [`ServiceConfig::default`].
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let models_dir = non_empty("MODELS_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.models_dir);
        let encoder_dir = non_empty("ENCODER_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| models_dir.join("encoders"));

        Self {
            models_zip: non_empty("MODELS_ZIP_PATH").map(PathBuf::from),
            encoder_model: non_empty("ENCODER_MODEL").unwrap_or(defaults.encoder_model),
            models_dir,
            encoder_dir,
        }
    }

    /// Directory expected to hold the configured encoder's files.
    pub fn encoder_path(&self) -> PathBuf {
        self.encoder_dir.join(&self.encoder_model)
    }
}
