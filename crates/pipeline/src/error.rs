//! Error types for the encoding pipeline.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// The encoder needs at least one profile to learn its statistics from
    #[error("Cannot fit the feature encoder on an empty corpus")]
    EmptyCorpus,
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, PipelineError>;
