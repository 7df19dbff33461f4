//! Filter keeping smokers away from non-smokers.

use profiles::Profile;
use retrieval::Candidate;

use crate::error::Result;
use crate::traits::{Filter, FilterContext};

/// A non-smoking requester (the default) rejects smokers; a smoker accepts anyone.
pub fn smoking_compatible(requester: &Profile, candidate: &Profile) -> bool {
    requester.is_smoker() || !candidate.is_smoker()
}

/// Removes smokers from a non-smoker's results.
pub struct SmokingFilter;

impl Filter for SmokingFilter {
    fn name(&self) -> &str {
        "SmokingFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &FilterContext<'_>,
    ) -> Result<Vec<Candidate>> {
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| smoking_compatible(context.requester, &candidate.profile))
            .collect();
        Ok(filtered)
    }
}
