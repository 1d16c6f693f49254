//! Layout of the required asset set.
//!
//! Six artifacts must be present under the models directory before the
//! service can bootstrap. Either all six exist or none are assumed.

use std::path::{Path, PathBuf};

/// One of the six artifacts the service cannot start without.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RequiredAsset {
    /// ONNX graph of the subject classifier.
    ClassifierGraph,
    /// External-data weights referenced by the classifier graph.
    ClassifierWeights,
    /// Tokenizer feeding the classifier's input slot.
    ClassifierTokenizer,
    /// Ordered label list; index = classifier output dimension.
    LabelVocab,
    /// Precomputed title embeddings, one row per title.
    Embeddings,
    /// Title list, index-aligned with the embedding rows.
    Titles,
}

/// Sub-directory holding the classifier's three files.
pub const CLASSIFIER_DIR: &str = "classifier";

impl RequiredAsset {
    pub const ALL: [RequiredAsset; 6] = [
        Self::ClassifierGraph,
        Self::ClassifierWeights,
        Self::ClassifierTokenizer,
        Self::LabelVocab,
        Self::Embeddings,
        Self::Titles,
    ];

    /// Stable key used in health reports.
    pub fn key(self) -> &'static str {
        match self {
            Self::ClassifierGraph => "classifier_graph",
            Self::ClassifierWeights => "classifier_weights",
            Self::ClassifierTokenizer => "classifier_tokenizer",
            Self::LabelVocab => "label_vocab",
            Self::Embeddings => "embeddings",
            Self::Titles => "titles",
        }
    }

    /// Path relative to the models directory.
    pub fn relative_path(self) -> PathBuf {
        match self {
            Self::ClassifierGraph => Path::new(CLASSIFIER_DIR).join("model.onnx"),
            Self::ClassifierWeights => Path::new(CLASSIFIER_DIR).join("model.onnx_data"),
            Self::ClassifierTokenizer => Path::new(CLASSIFIER_DIR).join("tokenizer.json"),
            Self::LabelVocab => PathBuf::from("label_vocab.json"),
            Self::Embeddings => PathBuf::from("embeddings.parquet"),
            Self::Titles => PathBuf::from("titles.json"),
        }
    }
}

/// The required assets addressed by a base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSet {
    base_dir: PathBuf,
}

impl AssetSet {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Absolute (or base-relative) path of one asset.
    pub fn path(&self, asset: RequiredAsset) -> PathBuf {
        self.base_dir.join(asset.relative_path())
    }

    /// Directory holding the classifier graph, weights and tokenizer.
    pub fn classifier_dir(&self) -> PathBuf {
        self.base_dir.join(CLASSIFIER_DIR)
    }

    /// Presence of every asset on disk, in [`RequiredAsset::ALL`] order.
    pub fn presence(&self) -> Vec<(RequiredAsset, bool)> {
        RequiredAsset::ALL
            .iter()
            .map(|&a| (a, self.path(a).exists()))
            .collect()
    }

    /// Paths of assets that are not on disk.
    pub fn missing(&self) -> Vec<PathBuf> {
        self.presence()
            .into_iter()
            .filter(|(_, present)| !present)
            .map(|(a, _)| self.path(a))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}
