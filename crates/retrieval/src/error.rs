//! Error types for index and cluster construction.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RetrievalError {
    /// Nothing to build from
    #[error("Cannot build from zero vectors")]
    Empty,

    /// Vectors of different lengths were supplied together
    #[error("Dimension mismatch at row {row}: expected {expected}, found {found}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// More clusters requested than there are points
    #[error("Cannot form {clusters} clusters from {points} points")]
    TooFewPoints { clusters: usize, points: usize },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Check that every row has the same, non-zero-count dimension.
pub(crate) fn check_rows(vectors: &[Vec<f32>]) -> Result<usize> {
    let expected = vectors.first().ok_or(RetrievalError::Empty)?.len();
    for (row, v) in vectors.iter().enumerate() {
        if v.len() != expected {
            return Err(RetrievalError::DimensionMismatch {
                row,
                expected,
                found: v.len(),
            });
        }
    }
    Ok(expected)
}
