//! Scoring, encoding and filtering of roommate profiles.
//!
//! This crate provides:
//! - CompatibilityScorer for the three weighted-predicate sub-scores
//! - FeatureEncoder for turning profiles into fixed-length vectors
//! - Filter trait and the hard-filter implementations
//! - FilterPipeline for composing filters
//!
//! ## Architecture
//! A recommendation request flows through the pipeline in stages:
//! 1. Every profile is annotated with its compatibility sub-scores on entry
//! 2. FeatureEncoder (fitted on the corpus) encodes the requester
//! 3. Neighbor retrieval produces candidates
//! 4. Hard filters remove candidates that are never acceptable
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{CompatibilityScorer, FeatureEncoder, FilterContext, FilterPipeline};
//!
//! CompatibilityScorer.annotate(&mut profile);
//!
//! let encoder = FeatureEncoder::fit(corpus.profiles())?;
//! let vector = encoder.encode(&profile);
//!
//! let filtered = FilterPipeline::hard_filters()
//!     .apply(candidates, &FilterContext::new(&profile, false))?;
//! ```

pub mod compatibility;
pub mod error;
pub mod features;
pub mod filter_pipeline;
pub mod filters;
pub mod traits;

#[cfg(test)]
mod testing;

// Re-export main types
pub use compatibility::CompatibilityScorer;
pub use error::{PipelineError, Result};
pub use features::{CategoricalColumn, FeatureEncoder, NumericColumn};
pub use filter_pipeline::FilterPipeline;
pub use traits::{Filter, FilterContext};
