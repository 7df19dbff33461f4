//! Filter to remove the requester from its own results.
//!
//! The neighbor index always returns the query profile itself (distance 0),
//! so this is the first filter in the pipeline.

use retrieval::Candidate;

use crate::error::Result;
use crate::traits::{Filter, FilterContext};

/// Removes the candidate whose id equals the requester's.
pub struct SelfExclusionFilter;

impl Filter for SelfExclusionFilter {
    fn name(&self) -> &str {
        "SelfExclusionFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &FilterContext<'_>,
    ) -> Result<Vec<Candidate>> {
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| candidate.profile_id() != context.requester.profile_id)
            .collect();
        Ok(filtered)
    }
}
