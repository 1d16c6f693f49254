//! Artifact fetching: the published model bundle and sentence-transformers
//! encoder files.

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{ArtifactClient, ENCODER_FILES, FetchError};
