//! Nearest-neighbor index under cosine distance.
//!
//! ## Algorithm
//! Exact brute-force search:
//! 1. At build time, store every vector with its precomputed norm
//! 2. At query time, compute the cosine distance to every stored vector in parallel
//! 3. Order by (distance ASC, position ASC) and keep the first k
//!
//! The index is immutable once built. Vectors appended to the corpus later are
//! invisible until a new index is built.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::error::{Result, check_rows};
use crate::similarity::{cosine_with_norms, norm};
use crate::types::Neighbor;

/// Default cap on neighbors returned per query.
pub const DEFAULT_MAX_NEIGHBORS: usize = 20;

/// Immutable k-nearest-neighbor structure over encoded profile vectors.
#[derive(Debug, Clone)]
pub struct NeighborIndex {
    vectors: Vec<Vec<f32>>,
    norms: Vec<f64>,
    /// `min(max_neighbors, len)`, fixed at build time
    k: usize,
}

impl NeighborIndex {
    /// Build an index. Row `i` of `vectors` is reported as position `i`.
    ///
    /// # Errors
    /// Fails on an empty input or on rows of differing dimension.
    pub fn build(vectors: Vec<Vec<f32>>, max_neighbors: usize) -> Result<Self> {
        let dimension = check_rows(&vectors)?;
        let norms: Vec<f64> = vectors.par_iter().map(|v| norm(v)).collect();
        let k = max_neighbors.min(vectors.len());

        debug!(
            "Built neighbor index: {} vectors, dimension {}, k={}",
            vectors.len(),
            dimension,
            k
        );
        Ok(Self { vectors, norms, k })
    }

    /// Number of indexed vectors
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// The neighbor count fixed at build time
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn dimension(&self) -> usize {
        self.vectors.first().map_or(0, Vec::len)
    }

    /// The fitted `k` nearest neighbors of `vector`.
    pub fn nearest(&self, vector: &[f32]) -> Vec<Neighbor> {
        self.query(vector, self.k)
    }

    /// The `k` nearest neighbors of `vector` (k is clamped to the index size),
    /// ordered by ascending cosine distance, ties broken by position.
    #[instrument(skip(self, vector), fields(indexed = self.vectors.len()))]
    pub fn query(&self, vector: &[f32], k: usize) -> Vec<Neighbor> {
        let k = k.min(self.vectors.len());
        if k == 0 {
            return Vec::new();
        }
        let query_norm = norm(vector);

        let mut hits: Vec<Neighbor> = self
            .vectors
            .par_iter()
            .zip(self.norms.par_iter())
            .enumerate()
            .map(|(position, (stored, &stored_norm))| Neighbor {
                position,
                distance: 1.0 - cosine_with_norms(vector, stored, query_norm, stored_norm),
            })
            .collect();

        hits.sort_unstable_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        });
        hits.truncate(k);

        debug!("Neighbor query returned {} hits", hits.len());
        hits
    }
}
