//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to retrieved candidates.

use profiles::Profile;
use retrieval::Candidate;

use crate::error::Result;

/// What a filter knows about the request it is filtering for.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    /// The profile recommendations are being computed for
    pub requester: &'a Profile,
    /// Whether mock profiles may appear in the result
    pub include_mock: bool,
}

impl<'a> FilterContext<'a> {
    pub fn new(requester: &'a Profile, include_mock: bool) -> Self {
        Self {
            requester,
            include_mock,
        }
    }
}

/// Core trait for filtering candidates.
///
/// All filters must implement this trait to be used in the FilterPipeline.
///
/// ## Design Note
/// - `Send + Sync` allows one pipeline to serve concurrent requests
/// - Filters take ownership of the Vec<Candidate> and return a filtered Vec
/// - Filters only ever remove candidates; they never add or reorder them
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of candidates.
    ///
    /// # Arguments
    /// * `candidates` - The candidates to filter (takes ownership)
    /// * `context` - The requester and request options
    fn apply(&self, candidates: Vec<Candidate>, context: &FilterContext<'_>)
    -> Result<Vec<Candidate>>;
}
