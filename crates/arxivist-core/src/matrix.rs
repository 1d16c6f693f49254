//! Dense row-major embedding matrix with precomputed row norms.

use thiserror::Error;

use crate::ranking::{cosine_with_norms, l2_norm};

#[derive(Debug, Error, PartialEq)]
pub enum MatrixError {
    #[error("matrix data has {len} values, not a multiple of width {dim}")]
    Ragged { len: usize, dim: usize },
    #[error("row {row} has {got} values, expected {dim}")]
    RowWidth { row: usize, got: usize, dim: usize },
    #[error("embedding width must be non-zero")]
    ZeroWidth,
}

/// N×D embedding matrix, row `i` = embedding of corpus entry `i`.
#[derive(Debug, Clone)]
pub struct EmbeddingMatrix {
    data: Vec<f32>,
    dim: usize,
    norms: Vec<f32>,
}

impl EmbeddingMatrix {
    /// Build from flat row-major data.
    pub fn from_flat(data: Vec<f32>, dim: usize) -> Result<Self, MatrixError> {
        if dim == 0 {
            return Err(MatrixError::ZeroWidth);
        }
        if data.len() % dim != 0 {
            return Err(MatrixError::Ragged {
                len: data.len(),
                dim,
            });
        }
        let norms = data.chunks_exact(dim).map(l2_norm).collect();
        Ok(Self { data, dim, norms })
    }

    /// Build from individual rows, which must all share one width.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, MatrixError> {
        let dim = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * dim);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != dim {
                return Err(MatrixError::RowWidth {
                    row,
                    got: values.len(),
                    dim,
                });
            }
            data.extend(values);
        }
        Self::from_flat(data, dim)
    }

    /// Number of rows (N).
    pub fn rows(&self) -> usize {
        self.norms.len()
    }

    /// Embedding width (D).
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.norms.is_empty()
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Cosine similarity of `query` against every row, in row order.
    pub fn cosine_scores(&self, query: &[f32]) -> Vec<f32> {
        let query_norm = l2_norm(query);
        self.data
            .chunks_exact(self.dim)
            .zip(&self.norms)
            .map(|(row, &norm)| cosine_with_norms(query, query_norm, row, norm))
            .collect()
    }
}
