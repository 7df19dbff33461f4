//! The trained model.
//!
//! A `ModelArtifacts` value is built in full by one training run and then
//! shared read-only behind an `Arc`. Retraining builds a new one and swaps it
//! in, so a query holding the old `Arc` keeps a consistent view.

use chrono::{DateTime, Utc};
use pipeline::FeatureEncoder;
use profiles::Profile;
use retrieval::{ClusterAssignment, NeighborIndex};
use std::sync::Arc;

#[derive(Debug)]
pub struct ModelArtifacts {
    /// Increases by one with every successful training run
    pub version: u64,
    pub trained_at: DateTime<Utc>,
    /// Encoder fitted on `profiles`
    pub encoder: FeatureEncoder,
    /// Index over the encoded `profiles`; hit positions index into `profiles`
    pub index: NeighborIndex,
    pub clusters: ClusterAssignment,
    /// The corpus prefix this model was trained on
    pub profiles: Vec<Arc<Profile>>,
}

impl ModelArtifacts {
    /// Corpus size at training time
    pub fn trained_on(&self) -> usize {
        self.profiles.len()
    }

    /// Cluster label of the profile at `position`, if it was part of training.
    pub fn cluster_at(&self, position: usize) -> Option<usize> {
        self.clusters.labels.get(position).copied()
    }

    pub fn n_clusters(&self) -> usize {
        self.clusters.n_clusters()
    }
}
