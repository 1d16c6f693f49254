//! Arrow schema of the embedding matrix artifact.

use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema};

/// Column holding one embedding per title.
pub const EMBEDDING_COLUMN: &str = "embedding";

/// Element type of an embedding column of width `dim`.
pub fn embedding_type(dim: i32) -> DataType {
    DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim)
}

/// Schema for `embeddings.parquet`: a single `FixedSizeList<Float32, dim>` column,
/// one row per title, in title-list order.
pub fn embeddings_schema(dim: i32) -> Schema {
    Schema::new(vec![Field::new(
        EMBEDDING_COLUMN,
        embedding_type(dim),
        false,
    )])
}
