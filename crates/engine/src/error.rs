//! Error types for the recommendation engine.

use pipeline::PipelineError;
use profiles::{ProfileError, ProfileId};
use retrieval::RetrievalError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The requested profile is not in the corpus
    #[error("Unknown profile: {id}")]
    UnknownProfile { id: ProfileId },

    /// Too few profiles to train on
    #[error("Insufficient data: {have} profiles, need at least {need}")]
    InsufficientData { have: usize, need: usize },

    /// A submitted record was rejected
    #[error("Invalid record: {0}")]
    InvalidRecord(#[from] ProfileError),

    #[error("Encoding failed: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Model construction failed: {0}")]
    Retrieval(#[from] RetrievalError),
}

impl EngineError {
    /// Expected steady-state conditions of a growing corpus, as opposed to faults
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            EngineError::UnknownProfile { .. } | EngineError::InsufficientData { .. }
        )
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, EngineError>;
