//! Readers for the data artifacts of the asset set.
//!
//! - `label_vocab.json`: JSON array of label strings; index = classifier output slot
//! - `titles.json`: JSON array of title strings; index = embedding row
//! - `embeddings.parquet`: one `embedding` column, `FixedSizeList<Float32, D>`
//!   (a plain `List<Float32>` column is also accepted)

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use arrow::array::{Array, ArrayRef, FixedSizeListArray, Float32Array, ListArray};
use arrow::record_batch::RecordBatch;
use arxivist_core::EmbeddingMatrix;
use arxivist_core::schema::EMBEDDING_COLUMN;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::info;

use crate::StoreError;

/// Read the ordered label vocabulary.
pub fn read_label_vocab(path: &Path) -> Result<Vec<String>, StoreError> {
    let labels = read_string_list(path)?;
    info!(labels = labels.len(), path = %path.display(), "loaded label vocabulary");
    Ok(labels)
}

/// Read the ordered title list.
pub fn read_titles(path: &Path) -> Result<Vec<String>, StoreError> {
    let titles = read_string_list(path)?;
    info!(titles = titles.len(), path = %path.display(), "loaded title list");
    Ok(titles)
}

fn read_string_list(path: &Path) -> Result<Vec<String>, StoreError> {
    let file = open(path)?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn open(path: &Path) -> Result<File, StoreError> {
    File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a Parquet file into Arrow RecordBatches.
fn read_parquet(path: &Path) -> Result<Vec<RecordBatch>, StoreError> {
    let file = open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let batches: Result<Vec<RecordBatch>, _> = reader.collect();
    Ok(batches?)
}

/// Read the embedding matrix, one row per title, in file order.
pub fn read_embeddings(path: &Path) -> Result<EmbeddingMatrix, StoreError> {
    let batches = read_parquet(path)?;

    let mut data: Vec<f32> = Vec::new();
    let mut dim: Option<usize> = None;
    let mut row_base = 0usize;

    for batch in &batches {
        let col = batch.column_by_name(EMBEDDING_COLUMN).ok_or_else(|| {
            StoreError::Schema(format!(
                "missing '{EMBEDDING_COLUMN}' column in {}",
                path.display()
            ))
        })?;

        for row in 0..batch.num_rows() {
            let values = embedding_row(col, row, row_base + row)?;
            match dim {
                None => dim = Some(values.len()),
                Some(d) if d != values.len() => {
                    return Err(StoreError::Schema(format!(
                        "embedding row {} has {} values, expected {d}",
                        row_base + row,
                        values.len()
                    )));
                }
                Some(_) => {}
            }
            data.extend_from_slice(values.values());
        }
        row_base += batch.num_rows();
    }

    let dim = dim.ok_or_else(|| {
        StoreError::Schema(format!("embedding matrix {} has no rows", path.display()))
    })?;
    let matrix = EmbeddingMatrix::from_flat(data, dim)?;
    info!(rows = matrix.rows(), dim, path = %path.display(), "loaded embedding matrix");
    Ok(matrix)
}

/// Extract one row of the embedding column as a dense Float32 array.
///
/// `global_row` is only used for diagnostics.
fn embedding_row(
    col: &ArrayRef,
    row: usize,
    global_row: usize,
) -> Result<Float32Array, StoreError> {
    if col.is_null(row) {
        return Err(StoreError::Schema(format!(
            "embedding row {global_row} is null"
        )));
    }

    let values: ArrayRef = if let Some(fsl) = col.as_any().downcast_ref::<FixedSizeListArray>() {
        fsl.value(row)
    } else if let Some(list) = col.as_any().downcast_ref::<ListArray>() {
        list.value(row)
    } else {
        return Err(StoreError::Schema(format!(
            "'{EMBEDDING_COLUMN}' column has unsupported type {:?}",
            col.data_type()
        )));
    };

    let floats = values
        .as_any()
        .downcast_ref::<Float32Array>()
        .ok_or_else(|| {
            StoreError::Schema(format!(
                "'{EMBEDDING_COLUMN}' values are {:?}, expected Float32",
                values.data_type()
            ))
        })?;
    if floats.null_count() > 0 {
        return Err(StoreError::Schema(format!(
            "embedding row {global_row} contains nulls"
        )));
    }
    Ok(floats.clone())
}
