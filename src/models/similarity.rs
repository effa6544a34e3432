use serde::{Deserialize, Serialize};

/// Square matrix of precomputed pairwise similarity scores
///
/// `row(i)[j]` is the similarity of catalog row `i` to catalog row `j`.
/// Stored row-major in a single buffer. Every score is finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f32>>", into = "Vec<Vec<f32>>")]
pub struct SimilarityMatrix {
    size: usize,
    scores: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatrixError {
    #[error("row {row} has {len} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("non-finite score at ({row}, {col})")]
    NonFinite { row: usize, col: usize },
}

impl SimilarityMatrix {
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, MatrixError> {
        let size = rows.len();
        let mut scores = Vec::with_capacity(size * size);

        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != size {
                return Err(MatrixError::RaggedRow {
                    row,
                    len: values.len(),
                    expected: size,
                });
            }
            if let Some(col) = values.iter().position(|v| !v.is_finite()) {
                return Err(MatrixError::NonFinite { row, col });
            }
            scores.extend(values);
        }

        Ok(Self { size, scores })
    }

    /// Number of rows (and columns)
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.size {
            return None;
        }
        let start = index * self.size;
        Some(&self.scores[start..start + self.size])
    }
}

impl TryFrom<Vec<Vec<f32>>> for SimilarityMatrix {
    type Error = MatrixError;

    fn try_from(rows: Vec<Vec<f32>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<SimilarityMatrix> for Vec<Vec<f32>> {
    fn from(matrix: SimilarityMatrix) -> Self {
        if matrix.size == 0 {
            return Vec::new();
        }
        matrix
            .scores
            .chunks(matrix.size)
            .map(|row| row.to_vec())
            .collect()
    }
}
