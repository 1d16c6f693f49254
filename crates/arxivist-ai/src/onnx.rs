use std::path::Path;

use crate::classifier::OnnxClassifier;
use crate::embedder::Embedder;
use crate::model::{ModelBackend, TextClassifier, TextEncoder};

/// Loads both models with ONNX Runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct OnnxBackend;

impl ModelBackend for OnnxBackend {
    fn load_classifier(&self, dir: &Path) -> anyhow::Result<Box<dyn TextClassifier>> {
        Ok(Box::new(OnnxClassifier::load(dir)?))
    }

    fn load_encoder(&self, model_dir: &Path) -> anyhow::Result<Box<dyn TextEncoder>> {
        Ok(Box::new(Embedder::load(model_dir)?))
    }
}
