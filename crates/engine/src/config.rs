//! Engine configuration.
//!
//! Every field has a default, so a JSON config file only needs to name the
//! values it changes:
//!
//! ```json
//! { "neighbor_count": 30, "retrain_interval": 100 }
//! ```

use retrieval::ClusterAssigner;
use serde::{Deserialize, Serialize};

/// Tunable parameters of a `RecommendationEngine`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Smallest corpus `train()` accepts
    pub min_training_size: usize,
    /// Neighbors retrieved per query, before filtering
    pub neighbor_count: usize,
    /// Upper bound on the number of k-means clusters
    pub max_clusters: usize,
    /// Corpus members per cluster when choosing k
    pub profiles_per_cluster: usize,
    pub cluster_seed: u64,
    pub kmeans_max_iter: usize,
    pub kmeans_tol: f32,
    /// Retrain automatically whenever the corpus size crosses a multiple of this
    pub retrain_interval: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_training_size: 10,
            neighbor_count: 20,
            max_clusters: 5,
            profiles_per_cluster: 10,
            cluster_seed: 42,
            kmeans_max_iter: 300,
            kmeans_tol: 1e-4,
            retrain_interval: 50,
        }
    }
}

impl EngineConfig {
    pub fn with_min_training_size(mut self, size: usize) -> Self {
        self.min_training_size = size;
        self
    }

    pub fn with_neighbor_count(mut self, count: usize) -> Self {
        self.neighbor_count = count;
        self
    }

    pub fn with_max_clusters(mut self, max_clusters: usize) -> Self {
        self.max_clusters = max_clusters;
        self
    }

    pub fn with_profiles_per_cluster(mut self, per_cluster: usize) -> Self {
        self.profiles_per_cluster = per_cluster;
        self
    }

    pub fn with_cluster_seed(mut self, seed: u64) -> Self {
        self.cluster_seed = seed;
        self
    }

    pub fn with_retrain_interval(mut self, interval: usize) -> Self {
        self.retrain_interval = interval;
        self
    }

    /// The clustering step described by this config
    pub fn cluster_assigner(&self) -> ClusterAssigner {
        ClusterAssigner::new()
            .with_max_clusters(self.max_clusters)
            .with_profiles_per_cluster(self.profiles_per_cluster)
            .with_seed(self.cluster_seed)
            .with_max_iter(self.kmeans_max_iter)
            .with_tol(self.kmeans_tol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.min_training_size, 10);
        assert_eq!(config.neighbor_count, 20);
        assert_eq!(config.retrain_interval, 50);
        assert_eq!(config.cluster_assigner().cluster_count_for(100), 5);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "neighbor_count": 30, "cluster_seed": 7 }"#).unwrap();
        assert_eq!(config.neighbor_count, 30);
        assert_eq!(config.cluster_seed, 7);
        assert_eq!(config.max_clusters, 5);
        assert_eq!(config.kmeans_tol, 1e-4);
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::default()
            .with_max_clusters(3)
            .with_profiles_per_cluster(4);
        assert_eq!(config.cluster_assigner().cluster_count_for(100), 3);
        assert_eq!(config.cluster_assigner().cluster_count_for(8), 2);
    }
}
