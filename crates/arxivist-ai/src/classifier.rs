//! ONNX Runtime subject classifier.
//!
//! The exported graph takes one tensor of token ids and returns a probability
//! per vocabulary entry. Weights live next to the graph in `model.onnx_data`,
//! which ONNX Runtime resolves relative to `model.onnx`.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::model::TextClassifier;

const MAX_TOKENS: usize = 512;

pub struct OnnxClassifier {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    input_names: Vec<String>,
}

impl OnnxClassifier {
    /// Load from a directory holding `model.onnx`, `model.onnx_data` and
    /// `tokenizer.json`.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let model_path = dir.join("model.onnx");
        let tokenizer_path = dir.join("tokenizer.json");

        anyhow::ensure!(model_path.exists(), "model.onnx not found in {dir:?}");
        anyhow::ensure!(tokenizer_path.exists(), "tokenizer.json not found in {dir:?}");

        let session = Session::builder()?.commit_from_file(&model_path)?;
        let input_names: Vec<String> = session
            .inputs()
            .iter()
            .map(|input| input.name().to_string())
            .collect();

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;

        info!(inputs = ?input_names, model = %model_path.display(), "loaded subject classifier");
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            input_names,
        })
    }
}

impl TextClassifier for OnnxClassifier {
    fn input_names(&self) -> Vec<String> {
        self.input_names.clone()
    }

    fn predict(&self, input_key: &str, text: &str) -> anyhow::Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;
        let ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let shape = [1i64, ids.len() as i64];
        let tensor = Tensor::from_array((shape, ids.into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("classifier session lock poisoned"))?;
        let outputs = session.run(ort::inputs![input_key.to_string() => tensor])?;

        // [1, labels] -> first row.
        let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = shape;
        let width = dims
            .last()
            .map(|&d| d as usize)
            .ok_or_else(|| anyhow::anyhow!("classifier output has no dimensions"))?;
        anyhow::ensure!(
            data.len() >= width,
            "classifier output shorter than its declared width: {dims:?}"
        );
        debug!(?dims, "classifier forward pass");
        Ok(data[..width].to_vec())
    }
}
