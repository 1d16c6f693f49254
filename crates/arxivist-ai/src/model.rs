//! Model seams: the classifier and encoder are opaque text → vector functions,
//! loaded through a [`ModelBackend`].

use std::path::Path;

/// Multi-label subject classifier: text → one probability per label slot.
pub trait TextClassifier: Send + Sync {
    /// Names of the model's declared inputs, in declaration order.
    fn input_names(&self) -> Vec<String>;

    /// Run one forward pass, feeding `text` to the input named `input_key`.
    fn predict(&self, input_key: &str, text: &str) -> anyhow::Result<Vec<f32>>;
}

/// Sentence encoder: text → fixed-width embedding.
pub trait TextEncoder: Send + Sync {
    /// Output width, when the model declares one.
    fn dim(&self) -> Option<usize>;

    fn encode(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}

/// Loads models from disk for [`crate::bootstrap`].
pub trait ModelBackend {
    /// Load the classifier from the asset set's classifier directory.
    fn load_classifier(&self, dir: &Path) -> anyhow::Result<Box<dyn TextClassifier>>;

    /// Load the encoder from its resolved model directory.
    fn load_encoder(&self, model_dir: &Path) -> anyhow::Result<Box<dyn TextEncoder>>;
}
