//! Filter enforcing the requester's pet tolerance.

use profiles::{PetTolerance, Profile};
use retrieval::Candidate;

use crate::error::Result;
use crate::traits::{Filter, FilterContext};

/// Whether `candidate` is acceptable to `requester` under the pet rule.
///
/// - `no-pets`: the candidate must not have pets
/// - `cats` / `dogs`: the candidate has no pets, or declares the same tolerance
/// - `both` / `unknown`: no constraint
pub fn pets_compatible(requester: &Profile, candidate: &Profile) -> bool {
    match requester.pet_tolerance {
        PetTolerance::NoPets => !candidate.has_pets,
        PetTolerance::Cats | PetTolerance::Dogs => {
            !candidate.has_pets || candidate.pet_tolerance == requester.pet_tolerance
        }
        PetTolerance::Both | PetTolerance::Unknown => true,
    }
}

/// Removes candidates whose pet situation the requester does not tolerate.
pub struct PetPolicyFilter;

impl Filter for PetPolicyFilter {
    fn name(&self) -> &str {
        "PetPolicyFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &FilterContext<'_>,
    ) -> Result<Vec<Candidate>> {
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| pets_compatible(context.requester, &candidate.profile))
            .collect();
        Ok(filtered)
    }
}
