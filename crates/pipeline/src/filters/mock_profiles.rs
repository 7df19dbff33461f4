//! Filter to restrict results to real profiles on request.

use retrieval::Candidate;

use crate::error::Result;
use crate::traits::{Filter, FilterContext};

/// Removes mock profiles unless the request includes them.
pub struct MockProfileFilter;

impl Filter for MockProfileFilter {
    fn name(&self) -> &str {
        "MockProfileFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &FilterContext<'_>,
    ) -> Result<Vec<Candidate>> {
        if context.include_mock {
            return Ok(candidates);
        }
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| !candidate.profile.is_mock)
            .collect();
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{candidates, ids, profile, record};

    fn pool() -> Vec<Candidate> {
        candidates(vec![
            profile(record("real1"), false),
            profile(record("mock1"), true),
            profile(record("real2"), false),
        ])
    }

    #[test]
    fn test_excludes_mock_by_request() {
        let requester = profile(record("me"), false);
        let context = FilterContext::new(&requester, false);
        let filtered = MockProfileFilter.apply(pool(), &context).unwrap();
        assert_eq!(ids(&filtered), vec!["real1", "real2"]);
    }

    #[test]
    fn test_keeps_everything_when_mock_included() {
        let requester = profile(record("me"), false);
        let context = FilterContext::new(&requester, true);
        let filtered = MockProfileFilter.apply(pool(), &context).unwrap();
        assert_eq!(filtered.len(), 3);
    }
}
