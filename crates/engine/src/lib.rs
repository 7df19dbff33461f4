//! # Engine Crate
//!
//! The roommate recommendation engine: owns the profile corpus and the
//! trained model, and serves ranked, filtered recommendations.
//!
//! ## Main Components
//!
//! - **engine**: `RecommendationEngine`, the only mutator of corpus and model
//! - **artifacts**: `ModelArtifacts`, the immutable trained model
//! - **policy**: `RetrainPolicy` and the default `BatchBoundaryPolicy`
//! - **config**: `EngineConfig`, loadable from JSON
//! - **error**: `EngineError`
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine::{EngineConfig, RecommendationEngine};
//! use profiles::MockProfileGenerator;
//!
//! let engine = RecommendationEngine::new(EngineConfig::default());
//! let mut generator = MockProfileGenerator::new(42);
//! engine.add_profiles_batch(&generator.generate_mock(100), true)?;
//!
//! let id = engine.add_profile(&generator.generate_real(1)[0], false)?;
//! engine.train();
//! for rec in engine.recommend(&id, 5, true) {
//!     println!("{} ({:.2})", rec.profile.profile_id, rec.compatibility_score);
//! }
//! ```

pub mod artifacts;
pub mod config;
pub mod engine;
pub mod error;
pub mod policy;

pub use artifacts::ModelArtifacts;
pub use config::EngineConfig;
pub use engine::{EngineState, Recommendation, RecommendationEngine};
pub use error::{EngineError, Result};
pub use policy::{BatchBoundaryPolicy, RetrainPolicy};
