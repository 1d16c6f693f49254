//! Inference layer: model bootstrap, subject classification, and title
//! recommendation over an immutable, write-once inference context.
//!
//! The ONNX Runtime implementations of the model traits live behind the `onnx`
//! feature; everything else runs against any [`TextClassifier`] /
//! [`TextEncoder`] implementation.

mod error;
pub use error::{BootstrapError, QueryError};

pub mod bootstrap;
pub mod engine;
pub mod labels;
pub mod model;
pub mod readiness;
pub mod service;

#[cfg(test)]
mod test_utils;

pub use bootstrap::{InferenceContext, bootstrap};
pub use labels::LabelVocabulary;
pub use model::{ModelBackend, TextClassifier, TextEncoder};
pub use readiness::Readiness;
pub use service::Service;

#[cfg(feature = "onnx")]
mod classifier;
#[cfg(feature = "onnx")]
mod embedder;
#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
pub use classifier::OnnxClassifier;
#[cfg(feature = "onnx")]
pub use embedder::Embedder;
#[cfg(feature = "onnx")]
pub use onnx::OnnxBackend;
