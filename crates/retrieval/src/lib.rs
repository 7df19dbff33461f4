//! # Retrieval Crate
//!
//! Vector-space machinery behind recommendations: cosine similarity, the
//! exact nearest-neighbor index that produces candidates, and the k-means
//! clustering used for diagnostics.
//!
//! ## Main Components
//!
//! - **similarity**: Cosine similarity/distance and non-finite sanitization
//! - **neighbors**: `NeighborIndex`, brute-force cosine k-NN
//! - **clustering**: `ClusterAssigner`, seeded k-means++ with Lloyd iterations
//! - **types**: `Neighbor` hits and `Candidate` profiles
//!
//! ## Example Usage
//!
//! ```ignore
//! use retrieval::{ClusterAssigner, NeighborIndex};
//!
//! let index = NeighborIndex::build(vectors.clone(), 20)?;
//! let hits = index.nearest(&vectors[0]);
//!
//! let clusters = ClusterAssigner::new().fit(&vectors)?;
//! println!("{} clusters, inertia {}", clusters.n_clusters(), clusters.inertia);
//! ```

pub mod clustering;
pub mod error;
pub mod neighbors;
pub mod similarity;
pub mod types;

pub use clustering::{ClusterAssigner, ClusterAssignment};
pub use error::{Result, RetrievalError};
pub use neighbors::{DEFAULT_MAX_NEIGHBORS, NeighborIndex};
pub use similarity::{cosine_distance, cosine_similarity, sanitize_non_finite};
pub use types::{Candidate, Neighbor};
