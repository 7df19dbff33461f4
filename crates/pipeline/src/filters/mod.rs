//! Hard filter implementations.
//!
//! Hard filters are non-negotiable exclusion rules applied after retrieval.
//! None of them ever relaxes to pad a short result.

pub mod mock_profiles;
pub mod pet_policy;
pub mod self_exclusion;
pub mod smoking;

// Re-export for convenience
pub use mock_profiles::MockProfileFilter;
pub use pet_policy::{PetPolicyFilter, pets_compatible};
pub use self_exclusion::SelfExclusionFilter;
pub use smoking::{SmokingFilter, smoking_compatible};
