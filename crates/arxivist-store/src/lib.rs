//! Storage layer: asset provisioning from a bundle archive, and readers for the
//! label vocabulary, title list, and Parquet embedding matrix.

mod error;
pub use error::{ProvisioningError, StoreError};

pub mod artifacts;
pub mod provision;

pub use artifacts::{read_embeddings, read_label_vocab, read_titles};
pub use provision::ensure;
