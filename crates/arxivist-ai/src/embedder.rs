//! Query encoder for recommendation: one sentence in, one mean-pooled,
//! L2-normalised vector out.
//!
//! Expects a sentence-transformers export (`model.onnx` + `tokenizer.json`)
//! taking `input_ids`, `attention_mask` and `token_type_ids` and returning
//! token embeddings shaped `[1, seq, dim]`.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::{Tensor, ValueType};
use tokenizers::{Encoding, Tokenizer};
use tracing::{debug, info};

use crate::model::TextEncoder;

/// Queries longer than this are truncated before encoding.
const MAX_QUERY_TOKENS: usize = 256;

/// Sentence encoder backed by ONNX Runtime.
pub struct Embedder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    /// Declared output width; `None` when the graph leaves it dynamic.
    dim: Option<usize>,
}

impl Embedder {
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );

        let session = Session::builder()?.commit_from_file(&model_path)?;
        let dim = session
            .outputs()
            .first()
            .and_then(|output| declared_width(output.dtype()));

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_QUERY_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;

        info!(dim = ?dim, model = %model_path.display(), "loaded query encoder");
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            dim,
        })
    }

    fn forward(&self, encoding: &Encoding) -> anyhow::Result<Vec<f32>> {
        let mask = encoding.get_attention_mask();
        let shape = [1i64, encoding.len() as i64];
        let ids = Tensor::from_array((shape, to_i64(encoding.get_ids())))?;
        let attention = Tensor::from_array((shape, to_i64(mask)))?;
        let types = Tensor::from_array((shape, to_i64(encoding.get_type_ids())))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("encoder session lock poisoned"))?;
        let outputs = session.run(ort::inputs![
            "input_ids" => ids,
            "attention_mask" => attention,
            "token_type_ids" => types,
        ])?;

        let (shape, tokens) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = shape;
        anyhow::ensure!(
            dims.len() == 3 && dims[0] == 1 && dims[1] as usize == mask.len(),
            "unexpected encoder output shape {dims:?} for {} tokens",
            mask.len()
        );
        let width = dims[2] as usize;
        if let Some(dim) = self.dim {
            anyhow::ensure!(width == dim, "encoder returned width {width}, declared {dim}");
        }
        debug!(tokens = mask.len(), width, "encoded query");
        Ok(mean_pool(tokens, mask, width))
    }
}

impl TextEncoder for Embedder {
    fn dim(&self) -> Option<usize> {
        self.dim
    }

    fn encode(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;
        self.forward(&encoding)
    }
}

fn to_i64(values: &[u32]) -> Box<[i64]> {
    values.iter().map(|&v| v as i64).collect()
}

/// Average the attended token rows of `tokens` (`mask.len() x width`), then
/// scale to unit length. Returns a zero vector when nothing is attended.
fn mean_pool(tokens: &[f32], mask: &[u32], width: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; width];
    if width == 0 {
        return pooled;
    }
    let mut attended = 0usize;
    for (row, _) in tokens.chunks_exact(width).zip(mask).filter(|(_, m)| **m > 0) {
        for (p, v) in pooled.iter_mut().zip(row) {
            *p += v;
        }
        attended += 1;
    }
    if attended == 0 {
        return pooled;
    }

    let norm = pooled.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for p in &mut pooled {
            *p /= norm;
        }
    }
    pooled
}

/// Last axis of a tensor type, if the graph fixes it.
fn declared_width(output: &ValueType) -> Option<usize> {
    match output {
        ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| (d > 0).then_some(d as usize)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arxivist_core::cosine_similarity;
    use std::path::PathBuf;

    fn model_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("models")
            .join("encoders")
            .join("all-MiniLM-L6-v2")
    }

    fn require_model() -> PathBuf {
        let dir = model_dir();
        if !dir.join("model.onnx").exists() {
            panic!("encoder not found, run `arxivist fetch` first");
        }
        dir
    }

    #[test]
    fn pooling_skips_padding_and_normalises() {
        // Two attended rows and one masked row of width 2.
        let tokens = [3.0, 0.0, 1.0, 4.0, 100.0, 100.0];
        let pooled = mean_pool(&tokens, &[1, 1, 0], 2);
        // Mean (2, 2) scaled to unit length.
        assert!((pooled[0] - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((pooled[1] - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn pooling_nothing_attended_is_zero() {
        assert_eq!(mean_pool(&[1.0, 2.0], &[0], 2), vec![0.0, 0.0]);
    }

    #[test]
    fn load_fails_without_tokenizer() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("model.onnx"), b"").unwrap();
        let err = Embedder::load(dir.path()).err().unwrap();
        assert!(err.to_string().contains("tokenizer.json not found"));
    }

    #[test]
    #[ignore = "requires models/encoders/all-MiniLM-L6-v2"]
    fn encodes_unit_vectors_of_declared_width() {
        let encoder = Embedder::load(&require_model()).unwrap();
        let v = encoder
            .encode("Graph neural networks for molecule property prediction")
            .unwrap();
        if let Some(dim) = encoder.dim() {
            assert_eq!(v.len(), dim);
        }
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4, "expected unit norm, got {norm}");
    }

    #[test]
    #[ignore = "requires models/encoders/all-MiniLM-L6-v2"]
    fn related_queries_score_higher() {
        let encoder = Embedder::load(&require_model()).unwrap();
        let transformers = encoder.encode("attention-based sequence transduction").unwrap();
        let translation = encoder
            .encode("neural machine translation with transformers")
            .unwrap();
        let topology = encoder.encode("homotopy groups of spheres").unwrap();

        let near = cosine_similarity(&transformers, &translation);
        let far = cosine_similarity(&transformers, &topology);
        assert!(near > far, "near ({near:.4}) should beat far ({far:.4})");
    }
}
