//! Core types shared by every arxivist crate: configuration, the required asset
//! layout, ranked result types, and the top-k / cosine math behind both engines.

pub mod asset;
pub mod config;
pub mod health;
pub mod matrix;
pub mod ranking;
pub mod schema;

pub use asset::{AssetSet, RequiredAsset};
pub use config::ServiceConfig;
pub use health::HealthStatus;
pub use matrix::{EmbeddingMatrix, MatrixError};
pub use ranking::{Recommendation, SubjectPrediction, cosine_similarity, top_k_indices};
