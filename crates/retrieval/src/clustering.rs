//! K-means partitioning of the encoded corpus.
//!
//! Cluster labels are a diagnostic signal only (how often recommendations
//! land in the requester's own cluster). They never drive retrieval.
//!
//! ## Algorithm
//! 1. k-means++ initialization: the first centroid is drawn uniformly, each
//!    further one with probability proportional to its squared distance to the
//!    nearest centroid chosen so far (seeded `StdRng`)
//! 2. Lloyd iterations: assign every point to its nearest centroid (parallel),
//!    then move each centroid to the mean of its points
//! 3. Stop when no centroid moves more than `tol`, or after `max_iter` rounds

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::error::{Result, RetrievalError, check_rows};
use crate::similarity::squared_euclidean;

/// Output of a clustering run.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAssignment {
    /// One label per input row, in `0..centroids.len()`
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f32>>,
    /// Sum of squared distances from each point to its centroid
    pub inertia: f64,
    /// Lloyd iterations actually run
    pub n_iter: usize,
}

impl ClusterAssignment {
    pub fn n_clusters(&self) -> usize {
        self.centroids.len()
    }

    /// Number of members per cluster
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centroids.len()];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }
}

/// Chooses the cluster count from the corpus size and runs k-means.
#[derive(Debug, Clone)]
pub struct ClusterAssigner {
    max_clusters: usize,
    profiles_per_cluster: usize,
    seed: u64,
    max_iter: usize,
    tol: f32,
}

impl Default for ClusterAssigner {
    fn default() -> Self {
        Self {
            max_clusters: 5,
            profiles_per_cluster: 10,
            seed: 42,
            max_iter: 300,
            tol: 1e-4,
        }
    }
}

impl ClusterAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_clusters(mut self, max_clusters: usize) -> Self {
        self.max_clusters = max_clusters.max(1);
        self
    }

    pub fn with_profiles_per_cluster(mut self, profiles_per_cluster: usize) -> Self {
        self.profiles_per_cluster = profiles_per_cluster.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    pub fn with_tol(mut self, tol: f32) -> Self {
        self.tol = tol;
        self
    }

    /// `max(1, min(max_clusters, n / profiles_per_cluster))`
    pub fn cluster_count_for(&self, n: usize) -> usize {
        (n / self.profiles_per_cluster).min(self.max_clusters).max(1)
    }

    /// Partition `vectors` into `cluster_count_for(vectors.len())` groups.
    #[instrument(skip(self, vectors), fields(points = vectors.len()))]
    pub fn fit(&self, vectors: &[Vec<f32>]) -> Result<ClusterAssignment> {
        let k = self.cluster_count_for(vectors.len());
        let assignment = KMeans {
            n_clusters: k,
            max_iter: self.max_iter,
            tol: self.tol,
            seed: self.seed,
        }
        .fit(vectors)?;

        debug!(
            "K-means: k={}, {} iterations, inertia {:.4}, sizes {:?}",
            k,
            assignment.n_iter,
            assignment.inertia,
            assignment.sizes()
        );
        Ok(assignment)
    }
}

// ============================================================================
// Lloyd's algorithm
// ============================================================================

struct KMeans {
    n_clusters: usize,
    max_iter: usize,
    tol: f32,
    seed: u64,
}

impl KMeans {
    fn fit(&self, x: &[Vec<f32>]) -> Result<ClusterAssignment> {
        check_rows(x)?;
        if x.len() < self.n_clusters {
            return Err(RetrievalError::TooFewPoints {
                clusters: self.n_clusters,
                points: x.len(),
            });
        }

        let mut centroids = self.plusplus_init(x);
        let mut labels = assign_labels(x, &centroids);
        let mut n_iter = 0;

        for _ in 0..self.max_iter {
            n_iter += 1;
            let updated = update_centroids(x, &labels, &centroids);
            let converged = self.converged(&centroids, &updated);
            centroids = updated;
            labels = assign_labels(x, &centroids);
            if converged {
                break;
            }
        }

        let inertia = x
            .par_iter()
            .zip(labels.par_iter())
            .map(|(point, &label)| squared_euclidean(point, &centroids[label]))
            .sum();

        Ok(ClusterAssignment {
            labels,
            centroids,
            inertia,
            n_iter,
        })
    }

    fn plusplus_init(&self, x: &[Vec<f32>]) -> Vec<Vec<f32>> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids = Vec::with_capacity(self.n_clusters);
        centroids.push(x[rng.random_range(0..x.len())].clone());

        let mut min_dist: Vec<f64> = x
            .iter()
            .map(|p| squared_euclidean(p, &centroids[0]))
            .collect();

        while centroids.len() < self.n_clusters {
            let total: f64 = min_dist.iter().sum();
            let next = if total > 0.0 && total.is_finite() {
                roulette_pick(&min_dist, rng.random_range(0.0..total))
            } else {
                // Every point coincides with a centroid already
                rng.random_range(0..x.len())
            };

            let centroid = x[next].clone();
            for (d, p) in min_dist.iter_mut().zip(x) {
                *d = d.min(squared_euclidean(p, &centroid));
            }
            centroids.push(centroid);
        }
        centroids
    }

    fn converged(&self, old: &[Vec<f32>], new: &[Vec<f32>]) -> bool {
        let tol_sq = f64::from(self.tol) * f64::from(self.tol);
        old.iter()
            .zip(new)
            .all(|(a, b)| squared_euclidean(a, b) <= tol_sq)
    }
}

/// Position whose cumulative weight first exceeds `target`.
///
/// Rounding can leave `target` past the last weight; the pick then falls back
/// to the last point with non-zero weight, never to an existing centroid.
fn roulette_pick(weights: &[f64], mut target: f64) -> usize {
    for (i, &w) in weights.iter().enumerate() {
        if target < w {
            return i;
        }
        target -= w;
    }
    weights
        .iter()
        .rposition(|&w| w > 0.0)
        .unwrap_or(weights.len().saturating_sub(1))
}

/// Index of the nearest centroid for every point; ties go to the lower index.
fn assign_labels(x: &[Vec<f32>], centroids: &[Vec<f32>]) -> Vec<usize> {
    x.par_iter()
        .map(|point| {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (c, centroid) in centroids.iter().enumerate() {
                let dist = squared_euclidean(point, centroid);
                if dist < best_dist {
                    best_dist = dist;
                    best = c;
                }
            }
            best
        })
        .collect()
}

/// Mean of each cluster's members; an empty cluster keeps its previous centroid.
fn update_centroids(x: &[Vec<f32>], labels: &[usize], previous: &[Vec<f32>]) -> Vec<Vec<f32>> {
    let dim = previous.first().map_or(0, Vec::len);
    let mut sums = vec![vec![0.0f64; dim]; previous.len()];
    let mut counts = vec![0usize; previous.len()];

    for (point, &label) in x.iter().zip(labels) {
        counts[label] += 1;
        for (s, &v) in sums[label].iter_mut().zip(point) {
            *s += f64::from(v);
        }
    }

    sums.into_iter()
        .zip(counts)
        .zip(previous)
        .map(|((sum, count), old)| {
            if count == 0 {
                old.clone()
            } else {
                sum.into_iter().map(|s| (s / count as f64) as f32).collect()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two well-separated blobs of five points each.
    fn blobs() -> Vec<Vec<f32>> {
        let mut points = Vec::new();
        for i in 0..5 {
            let jitter = i as f32 * 0.01;
            points.push(vec![0.0 + jitter, 0.0 - jitter]);
            points.push(vec![10.0 - jitter, 10.0 + jitter]);
        }
        points
    }

    #[test]
    fn test_cluster_count_for() {
        let assigner = ClusterAssigner::new();
        assert_eq!(assigner.cluster_count_for(0), 1);
        assert_eq!(assigner.cluster_count_for(9), 1);
        assert_eq!(assigner.cluster_count_for(10), 1);
        assert_eq!(assigner.cluster_count_for(25), 2);
        assert_eq!(assigner.cluster_count_for(49), 4);
        assert_eq!(assigner.cluster_count_for(1000), 5);
    }

    #[test]
    fn test_separates_blobs() {
        let points = blobs();
        let assignment = KMeans {
            n_clusters: 2,
            max_iter: 300,
            tol: 1e-4,
            seed: 42,
        }
        .fit(&points)
        .unwrap();

        assert_eq!(assignment.labels.len(), points.len());
        // Even rows are one blob, odd rows the other
        for pair in assignment.labels.chunks(2) {
            assert_ne!(pair[0], pair[1]);
        }
        assert_eq!(assignment.sizes(), vec![5, 5]);
        assert!(assignment.inertia < 0.01);
    }

    #[test]
    fn test_same_seed_same_labels() {
        let points: Vec<Vec<f32>> = (0..60)
            .map(|i| vec![(i % 7) as f32, (i % 11) as f32, (i % 3) as f32])
            .collect();
        let assigner = ClusterAssigner::new();
        let a = assigner.fit(&points).unwrap();
        let b = assigner.fit(&points).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.n_clusters(), 5);
        assert!(a.labels.iter().all(|&l| l < 5));
    }

    #[test]
    fn test_identical_points() {
        let points = vec![vec![1.0, 1.0]; 30];
        let assignment = ClusterAssigner::new().fit(&points).unwrap();
        assert_eq!(assignment.n_clusters(), 3);
        assert_eq!(assignment.inertia, 0.0);
        assert!(assignment.centroids.iter().all(|c| c == &vec![1.0, 1.0]));
    }

    #[test]
    fn test_small_input_uses_single_cluster() {
        let points = vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![5.0, 5.0]];
        let assignment = ClusterAssigner::new().fit(&points).unwrap();
        assert_eq!(assignment.labels, vec![0, 0, 0]);
        assert_eq!(assignment.n_clusters(), 1);
    }

    #[test]
    fn test_roulette_pick() {
        let weights = [0.0, 1.0, 2.0, 0.0];
        assert_eq!(roulette_pick(&weights, 0.5), 1);
        assert_eq!(roulette_pick(&weights, 1.0), 2);
        // Past the total: last point with weight, not the trailing centroid
        assert_eq!(roulette_pick(&weights, 3.0), 2);
        assert_eq!(roulette_pick(&weights, 3.0 + 1e-12), 2);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            ClusterAssigner::new().fit(&[]).unwrap_err(),
            RetrievalError::Empty
        );
        let too_few = KMeans {
            n_clusters: 3,
            max_iter: 10,
            tol: 1e-4,
            seed: 1,
        }
        .fit(&[vec![0.0], vec![1.0]]);
        assert_eq!(
            too_few.unwrap_err(),
            RetrievalError::TooFewPoints {
                clusters: 3,
                points: 2
            }
        );
    }

    #[test]
    fn test_max_iter_limit() {
        let points = blobs();
        let assignment = ClusterAssigner::new()
            .with_profiles_per_cluster(5)
            .with_max_iter(1)
            .fit(&points)
            .unwrap();
        assert_eq!(assignment.n_iter, 1);
    }
}
