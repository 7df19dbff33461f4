//! Types shared between retrieval and the filtering pipeline.

use profiles::Profile;
use std::sync::Arc;

/// One hit from a neighbor query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the hit in the corpus the index was built over
    pub position: usize,
    /// Cosine distance (1 - cosine similarity) to the query
    pub distance: f32,
}

/// A retrieved profile on its way through the hard filters.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub position: usize,
    pub profile: Arc<Profile>,
    pub distance: f32,
}

impl Candidate {
    pub fn new(position: usize, profile: Arc<Profile>, distance: f32) -> Self {
        Self {
            position,
            profile,
            distance,
        }
    }

    pub fn profile_id(&self) -> &str {
        &self.profile.profile_id
    }
}
