//! One-time materialisation of the inference context.
//!
//! [`bootstrap`] provisions the asset set, loads every artifact and both
//! models, and checks the alignment contracts between them. The resulting
//! [`InferenceContext`] is immutable; publish it through a
//! [`crate::Readiness`] before serving queries.

use std::fmt;
use std::time::Instant;

use arxivist_core::{AssetSet, EmbeddingMatrix, RequiredAsset, ServiceConfig};
use arxivist_store::{provision, read_embeddings, read_label_vocab, read_titles};
use tracing::info;

use crate::labels::LabelVocabulary;
use crate::model::{ModelBackend, TextClassifier, TextEncoder};
use crate::BootstrapError;

/// Everything a query needs, fully populated or not at all.
pub struct InferenceContext {
    pub(crate) classifier: Box<dyn TextClassifier>,
    pub(crate) input_key: String,
    pub(crate) labels: LabelVocabulary,
    pub(crate) embeddings: EmbeddingMatrix,
    pub(crate) titles: Vec<String>,
    pub(crate) encoder: Box<dyn TextEncoder>,
}

impl InferenceContext {
    /// Assemble a context from already-loaded parts, running the same
    /// input-key discovery and alignment checks as [`bootstrap`].
    pub fn from_parts(
        classifier: Box<dyn TextClassifier>,
        labels: LabelVocabulary,
        embeddings: EmbeddingMatrix,
        titles: Vec<String>,
        encoder: Box<dyn TextEncoder>,
    ) -> Result<Self, BootstrapError> {
        let input_key = discover_input_key(classifier.as_ref())?;
        check_row_alignment(&embeddings, &titles)?;
        check_encoder_width(encoder.as_ref(), &embeddings)?;
        Ok(Self {
            classifier,
            input_key,
            labels,
            embeddings,
            titles,
            encoder,
        })
    }

    /// Name of the classifier input the passage is fed to.
    pub fn input_key(&self) -> &str {
        &self.input_key
    }

    pub fn labels(&self) -> &LabelVocabulary {
        &self.labels
    }

    pub fn embeddings(&self) -> &EmbeddingMatrix {
        &self.embeddings
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }
}

impl fmt::Debug for InferenceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceContext")
            .field("input_key", &self.input_key)
            .field("labels", &self.labels.len())
            .field("rows", &self.embeddings.rows())
            .field("dim", &self.embeddings.dim())
            .finish_non_exhaustive()
    }
}

/// Provision, load, and validate the full inference context.
///
/// Provisioning failures propagate unchanged inside
/// [`BootstrapError::Provisioning`].
pub fn bootstrap(
    config: &ServiceConfig,
    backend: &dyn ModelBackend,
) -> Result<InferenceContext, BootstrapError> {
    let start = Instant::now();
    let assets = AssetSet::new(&config.models_dir);

    provision::ensure(assets.base_dir(), config.models_zip.as_deref())?;

    let classifier_dir = assets.classifier_dir();
    let classifier = backend
        .load_classifier(&classifier_dir)
        .map_err(|reason| BootstrapError::ClassifierUnavailable {
            dir: classifier_dir.clone(),
            reason,
        })?;
    let input_key = discover_input_key(classifier.as_ref())?;
    info!(input_key = %input_key, "classifier input discovered");

    let labels = LabelVocabulary::new(read_label_vocab(&assets.path(RequiredAsset::LabelVocab))?);

    let embeddings = read_embeddings(&assets.path(RequiredAsset::Embeddings))?;
    let titles = read_titles(&assets.path(RequiredAsset::Titles))?;
    check_row_alignment(&embeddings, &titles)?;

    let encoder_dir = config.encoder_path();
    let encoder =
        backend
            .load_encoder(&encoder_dir)
            .map_err(|reason| BootstrapError::EncoderUnavailable {
                name: config.encoder_model.clone(),
                reason,
            })?;
    check_encoder_width(encoder.as_ref(), &embeddings)?;

    info!(
        labels = labels.len(),
        titles = titles.len(),
        dim = embeddings.dim(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "inference context ready"
    );

    Ok(InferenceContext {
        classifier,
        input_key,
        labels,
        embeddings,
        titles,
        encoder,
    })
}

fn discover_input_key(classifier: &dyn TextClassifier) -> Result<String, BootstrapError> {
    classifier
        .input_names()
        .into_iter()
        .next()
        .ok_or(BootstrapError::NoInputSignature)
}

fn check_row_alignment(embeddings: &EmbeddingMatrix, titles: &[String]) -> Result<(), BootstrapError> {
    if embeddings.rows() != titles.len() {
        return Err(BootstrapError::DimensionMismatch(format!(
            "embedding matrix has {} rows but title list has {} entries",
            embeddings.rows(),
            titles.len()
        )));
    }
    Ok(())
}

fn check_encoder_width(
    encoder: &dyn TextEncoder,
    embeddings: &EmbeddingMatrix,
) -> Result<(), BootstrapError> {
    if let Some(dim) = encoder.dim()
        && dim != embeddings.dim()
    {
        return Err(BootstrapError::DimensionMismatch(format!(
            "encoder produces {dim}-dim vectors but embedding matrix is {}-dim",
            embeddings.dim()
        )));
    }
    Ok(())
}
