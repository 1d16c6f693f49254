//! In-memory models and on-disk fixtures for tests.

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use arrow::array::{FixedSizeListBuilder, Float32Builder};
use arrow::datatypes::{DataType, Field};
use arrow::record_batch::RecordBatch;
use arxivist_core::schema::embeddings_schema;
use arxivist_core::{EmbeddingMatrix, RequiredAsset};
use parquet::arrow::ArrowWriter;

use crate::bootstrap::InferenceContext;
use crate::labels::LabelVocabulary;
use crate::model::{ModelBackend, TextClassifier, TextEncoder};

/// Classifier that returns the same probability vector for every passage.
pub struct FixedClassifier {
    inputs: Vec<String>,
    probs: Vec<f32>,
}

impl FixedClassifier {
    pub fn new(inputs: &[&str], probs: Vec<f32>) -> Self {
        Self {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            probs,
        }
    }
}

impl TextClassifier for FixedClassifier {
    fn input_names(&self) -> Vec<String> {
        self.inputs.clone()
    }

    fn predict(&self, input_key: &str, _text: &str) -> anyhow::Result<Vec<f32>> {
        anyhow::ensure!(
            self.inputs.iter().any(|i| i == input_key),
            "unknown input {input_key}"
        );
        Ok(self.probs.clone())
    }
}

/// Encoder backed by a lookup table of query → vector.
pub struct LookupEncoder {
    dim: Option<usize>,
    vectors: HashMap<String, Vec<f32>>,
}

impl LookupEncoder {
    pub fn new(dim: usize) -> Self {
        Self {
            dim: Some(dim),
            vectors: HashMap::new(),
        }
    }

    /// Encoder that does not declare its output width.
    pub fn undeclared() -> Self {
        Self {
            dim: None,
            vectors: HashMap::new(),
        }
    }

    pub fn with(mut self, query: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(query.to_string(), vector);
        self
    }
}

impl TextEncoder for LookupEncoder {
    fn dim(&self) -> Option<usize> {
        self.dim
    }

    fn encode(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no vector for {text:?}"))
    }
}

/// Backend handing out fake models and recording where it was asked to look.
pub struct FakeBackend {
    inputs: Vec<&'static str>,
    probs: Vec<f32>,
    encoder_dim: usize,
    queries: Vec<(&'static str, Vec<f32>)>,
    encoder_available: bool,
    pub encoder_dir: Arc<Mutex<Option<PathBuf>>>,
}

impl FakeBackend {
    pub fn new(inputs: &[&'static str], encoder_dim: usize) -> Self {
        Self {
            inputs: inputs.to_vec(),
            probs: Vec::new(),
            encoder_dim,
            queries: Vec::new(),
            encoder_available: true,
            encoder_dir: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_probs(mut self, probs: Vec<f32>) -> Self {
        self.probs = probs;
        self
    }

    pub fn with_query(mut self, query: &'static str, vector: Vec<f32>) -> Self {
        self.queries.push((query, vector));
        self
    }

    pub fn without_encoder(mut self) -> Self {
        self.encoder_available = false;
        self
    }
}

impl ModelBackend for FakeBackend {
    fn load_classifier(&self, dir: &Path) -> anyhow::Result<Box<dyn TextClassifier>> {
        anyhow::ensure!(dir.join("model.onnx").exists(), "model.onnx not found in {dir:?}");
        Ok(Box::new(FixedClassifier::new(&self.inputs, self.probs.clone())))
    }

    fn load_encoder(&self, model_dir: &Path) -> anyhow::Result<Box<dyn TextEncoder>> {
        *self.encoder_dir.lock().unwrap() = Some(model_dir.to_path_buf());
        anyhow::ensure!(self.encoder_available, "model.onnx not found in {model_dir:?}");
        let encoder = self
            .queries
            .iter()
            .fold(LookupEncoder::new(self.encoder_dim), |enc, (q, v)| {
                enc.with(q, v.clone())
            });
        Ok(Box::new(encoder))
    }
}

/// Context over the given vocabulary, classifier output, and corpus.
pub fn context(
    vocab: &[&str],
    probs: Vec<f32>,
    rows: Vec<Vec<f32>>,
    titles: &[&str],
    encoder: LookupEncoder,
) -> InferenceContext {
    InferenceContext::from_parts(
        Box::new(FixedClassifier::new(&["text"], probs)),
        LabelVocabulary::new(vocab.iter().map(|s| s.to_string()).collect()),
        EmbeddingMatrix::from_rows(rows).unwrap(),
        titles.iter().map(|s| s.to_string()).collect(),
        Box::new(encoder),
    )
    .unwrap()
}

/// Write a complete asset set under `dir`. Classifier files are placeholders.
pub fn write_asset_set(dir: &Path, vocab: &[&str], rows: &[Vec<f32>], titles: &[&str]) {
    for asset in [
        RequiredAsset::ClassifierGraph,
        RequiredAsset::ClassifierWeights,
        RequiredAsset::ClassifierTokenizer,
    ] {
        let path = dir.join(asset.relative_path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"placeholder").unwrap();
    }

    fs::write(
        dir.join(RequiredAsset::LabelVocab.relative_path()),
        serde_json::to_string(vocab).unwrap(),
    )
    .unwrap();
    fs::write(
        dir.join(RequiredAsset::Titles.relative_path()),
        serde_json::to_string(titles).unwrap(),
    )
    .unwrap();

    let dim = rows[0].len() as i32;
    let mut builder = FixedSizeListBuilder::new(Float32Builder::new(), dim)
        .with_field(Arc::new(Field::new("item", DataType::Float32, true)));
    for row in rows {
        builder.values().append_slice(row);
        builder.append(true);
    }
    let schema = Arc::new(embeddings_schema(dim));
    let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(builder.finish())]).unwrap();

    let file = File::create(dir.join(RequiredAsset::Embeddings.relative_path())).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}
