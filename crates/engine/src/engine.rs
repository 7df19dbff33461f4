//! # Recommendation Engine
//!
//! This module coordinates the whole recommendation flow:
//! 1. Validate and score incoming profiles, append them to the corpus
//! 2. Retrain when the retrain policy says so (or on demand)
//! 3. For a request, encode the requester with the current encoder
//! 4. Retrieve the nearest neighbors from the index
//! 5. Apply the hard filters
//! 6. Re-encode the survivors and rank them by cosine similarity
//! 7. Return the top N
//!
//! ## Concurrency
//! The engine is `Send + Sync` and can be shared behind an `Arc`. The corpus
//! sits behind an `RwLock`; the trained model is an `Arc<ModelArtifacts>`
//! swapped wholesale under its own `RwLock`, so a query works on one model
//! for its whole duration. A mutex serializes training runs.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use chrono::Utc;
use pipeline::{CompatibilityScorer, FeatureEncoder, FilterContext, FilterPipeline};
use profiles::{Corpus, Profile, ProfileId, ProfileRecord, parse_profile};
use retrieval::{Candidate, NeighborIndex, cosine_similarity};
use tracing::{debug, info, instrument, warn};

use crate::artifacts::ModelArtifacts;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::policy::{BatchBoundaryPolicy, RetrainPolicy};

/// Whether a model has been trained yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Untrained,
    /// A model exists; it may be stale relative to later additions
    Trained,
}

/// One ranked result.
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub profile: Arc<Profile>,
    /// Cosine similarity between the requester's and this profile's vectors
    pub compatibility_score: f32,
    /// Cluster label from the current model; `None` if added after training
    pub cluster: Option<usize>,
}

/// Owns the corpus and the trained model.
pub struct RecommendationEngine {
    config: EngineConfig,
    policy: Box<dyn RetrainPolicy>,
    scorer: CompatibilityScorer,
    filters: FilterPipeline,
    corpus: RwLock<Corpus>,
    artifacts: RwLock<Option<Arc<ModelArtifacts>>>,
    training: Mutex<()>,
    versions: AtomicU64,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl RecommendationEngine {
    /// Create an empty, untrained engine.
    ///
    /// The retrain policy is a `BatchBoundaryPolicy` at `config.retrain_interval`.
    pub fn new(config: EngineConfig) -> Self {
        let policy = BatchBoundaryPolicy::new(config.retrain_interval);
        Self {
            config,
            policy: Box::new(policy),
            scorer: CompatibilityScorer::new(),
            filters: FilterPipeline::hard_filters(),
            corpus: RwLock::new(Corpus::new()),
            artifacts: RwLock::new(None),
            training: Mutex::new(()),
            versions: AtomicU64::new(0),
        }
    }

    /// Replace the retrain policy (builder pattern).
    pub fn with_policy(mut self, policy: impl RetrainPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Corpus
    // ========================================================================

    /// Validate, score and append one profile, returning its id.
    ///
    /// May retrain synchronously if the retrain policy fires.
    ///
    /// # Errors
    /// `InvalidRecord` for a malformed record or a duplicate id; the corpus
    /// is unchanged.
    #[instrument(skip(self, record))]
    pub fn add_profile(&self, record: &ProfileRecord, is_mock: bool) -> Result<ProfileId> {
        let profile = self.prepare(record, is_mock)?;
        let id = profile.profile_id.clone();

        let position = self.corpus_mut().push(profile)?;
        debug!("Added profile {} at position {}", id, position);

        self.maybe_retrain(position, position + 1);
        Ok(id)
    }

    /// Validate every record, then append them all at once.
    ///
    /// A single bad record (or a duplicate id, within the batch or against the
    /// corpus) rejects the whole batch. Crossing one or more retrain
    /// boundaries triggers a single retrain.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub fn add_profiles_batch(
        &self,
        records: &[ProfileRecord],
        is_mock: bool,
    ) -> Result<Vec<ProfileId>> {
        let profiles = records
            .iter()
            .map(|record| self.prepare(record, is_mock))
            .collect::<Result<Vec<Profile>>>()?;
        let ids: Vec<ProfileId> = profiles.iter().map(|p| p.profile_id.clone()).collect();

        let range = self.corpus_mut().extend(profiles)?;
        info!(
            "Added batch of {} profiles (mock: {}), corpus size {}",
            ids.len(),
            is_mock,
            range.end
        );

        self.maybe_retrain(range.start, range.end);
        Ok(ids)
    }

    fn prepare(&self, record: &ProfileRecord, is_mock: bool) -> Result<Profile> {
        let mut profile = parse_profile(record, is_mock)?;
        self.scorer.annotate(&mut profile);
        Ok(profile)
    }

    fn maybe_retrain(&self, before: usize, after: usize) {
        if self.policy.should_retrain(before, after) {
            info!(
                "{} triggered retraining at corpus size {}",
                self.policy.name(),
                after
            );
            self.train();
        }
    }

    // ========================================================================
    // Training
    // ========================================================================

    /// Retrain on the full corpus. Returns `false` (leaving any previous model
    /// in place) when the corpus is too small or training fails.
    pub fn train(&self) -> bool {
        match self.try_train() {
            Ok(_) => true,
            Err(err) => {
                warn!("Training failed: {}", err);
                false
            }
        }
    }

    /// Retrain on the full corpus and return the new model.
    ///
    /// # Errors
    /// `InsufficientData` when the corpus is below `min_training_size`.
    pub fn try_train(&self) -> Result<Arc<ModelArtifacts>> {
        let _guard = self.lock_training();
        self.train_locked()
    }

    /// The current model, training one first if there is none yet.
    fn ensure_trained(&self) -> Result<Arc<ModelArtifacts>> {
        if let Some(artifacts) = self.model() {
            return Ok(artifacts);
        }
        let _guard = self.lock_training();
        // Another caller may have finished training while we waited
        match self.model() {
            Some(artifacts) => Ok(artifacts),
            None => self.train_locked(),
        }
    }

    #[instrument(skip(self))]
    fn train_locked(&self) -> Result<Arc<ModelArtifacts>> {
        let start_time = Instant::now();
        let profiles: Vec<Arc<Profile>> = self.corpus().profiles().to_vec();

        let need = self.config.min_training_size;
        if profiles.len() < need {
            return Err(EngineError::InsufficientData {
                have: profiles.len(),
                need,
            });
        }

        let encoder = FeatureEncoder::fit(&profiles)?;
        let vectors = encoder.transform(&profiles);
        let clusters = self.config.cluster_assigner().fit(&vectors)?;
        let index = NeighborIndex::build(vectors, self.config.neighbor_count)?;

        let version = self.versions.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        let artifacts = Arc::new(ModelArtifacts {
            version,
            trained_at: Utc::now(),
            encoder,
            index,
            clusters,
            profiles,
        });
        *self.artifacts_mut() = Some(artifacts.clone());

        info!(
            "Trained model v{} on {} profiles: dimension {}, k={}, {} clusters in {:.2?}",
            version,
            artifacts.trained_on(),
            artifacts.encoder.dimension(),
            artifacts.index.k(),
            artifacts.n_clusters(),
            start_time.elapsed()
        );
        Ok(artifacts)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Top `n` recommendations for `profile_id`, best first.
    ///
    /// Unknown ids and an untrainable corpus yield an empty list; use
    /// [`try_recommend`](Self::try_recommend) to see why.
    pub fn recommend(&self, profile_id: &str, n: usize, include_mock: bool) -> Vec<Recommendation> {
        match self.try_recommend(profile_id, n, include_mock) {
            Ok(recommendations) => recommendations,
            Err(err) if err.is_soft() => {
                debug!("No recommendations for {}: {}", profile_id, err);
                Vec::new()
            }
            Err(err) => {
                warn!("Recommendation failed for {}: {}", profile_id, err);
                Vec::new()
            }
        }
    }

    /// Top `n` recommendations for `profile_id`, best first.
    ///
    /// Trains first if no model exists. Never mutates the corpus, and the
    /// model is only ever created, never modified. Filtering is never relaxed,
    /// so fewer than `n` results may come back.
    #[instrument(skip(self))]
    pub fn try_recommend(
        &self,
        profile_id: &str,
        n: usize,
        include_mock: bool,
    ) -> Result<Vec<Recommendation>> {
        let requester = self
            .profile(profile_id)
            .ok_or_else(|| EngineError::UnknownProfile {
                id: profile_id.to_string(),
            })?;
        let artifacts = self.ensure_trained()?;

        let query = artifacts.encoder.encode(&requester);
        let candidates: Vec<Candidate> = artifacts
            .index
            .nearest(&query)
            .into_iter()
            .filter_map(|hit| {
                let profile = artifacts.profiles.get(hit.position)?;
                Some(Candidate::new(hit.position, profile.clone(), hit.distance))
            })
            .collect();

        let context = FilterContext::new(&requester, include_mock);
        let survivors = self.filters.apply(candidates, &context)?;

        let survivor_profiles: Vec<Arc<Profile>> =
            survivors.iter().map(|c| c.profile.clone()).collect();
        let vectors = artifacts.encoder.transform(&survivor_profiles);

        let mut scored: Vec<(Candidate, f32)> = survivors
            .into_iter()
            .zip(vectors.iter().map(|v| cosine_similarity(&query, v)))
            .collect();

        // Similarity DESC, then corpus order
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.position.cmp(&b.0.position))
        });
        scored.truncate(n);

        debug!(
            "Returning {} recommendations for {} from model v{}",
            scored.len(),
            profile_id,
            artifacts.version
        );

        Ok(scored
            .into_iter()
            .map(|(candidate, score)| Recommendation {
                cluster: artifacts.cluster_at(candidate.position),
                profile: candidate.profile,
                compatibility_score: score,
            })
            .collect())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn profile(&self, profile_id: &str) -> Option<Arc<Profile>> {
        self.corpus().get(profile_id).cloned()
    }

    /// Cluster label of a profile under the current model.
    pub fn cluster_of(&self, profile_id: &str) -> Option<usize> {
        let position = self.corpus().position(profile_id)?;
        self.model()?.cluster_at(position)
    }

    /// Snapshot of every profile, in insertion order
    pub fn profiles(&self) -> Vec<Arc<Profile>> {
        self.corpus().profiles().to_vec()
    }

    /// The current model, if any
    pub fn model(&self) -> Option<Arc<ModelArtifacts>> {
        self.artifacts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn state(&self) -> EngineState {
        if self.model().is_some() {
            EngineState::Trained
        } else {
            EngineState::Untrained
        }
    }

    /// True when profiles were added since the current model was trained.
    pub fn is_stale(&self) -> bool {
        self.model()
            .is_some_and(|artifacts| artifacts.trained_on() < self.len())
    }

    /// Version of the current model; 0 before the first training
    pub fn model_version(&self) -> u64 {
        self.model().map_or(0, |artifacts| artifacts.version)
    }

    pub fn len(&self) -> usize {
        self.corpus().len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus().is_empty()
    }

    /// (real, mock) profile counts
    pub fn counts(&self) -> (usize, usize) {
        self.corpus().counts()
    }

    // ========================================================================
    // Lock helpers
    // ========================================================================

    // Every critical section leaves the guarded value consistent, so a
    // poisoned lock is still safe to use.

    fn corpus(&self) -> RwLockReadGuard<'_, Corpus> {
        self.corpus.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn corpus_mut(&self) -> RwLockWriteGuard<'_, Corpus> {
        self.corpus.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn artifacts_mut(&self) -> RwLockWriteGuard<'_, Option<Arc<ModelArtifacts>>> {
        self.artifacts.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_training(&self) -> MutexGuard<'_, ()> {
        self.training.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use profiles::MockProfileGenerator;

    fn engine_with_mocks(n: usize) -> RecommendationEngine {
        let engine = RecommendationEngine::default();
        let records = MockProfileGenerator::new(42).generate_mock(n);
        engine.add_profiles_batch(&records, true).unwrap();
        engine
    }

    #[test]
    fn test_new_engine_is_untrained() {
        let engine = RecommendationEngine::default();
        assert_eq!(engine.state(), EngineState::Untrained);
        assert_eq!(engine.model_version(), 0);
        assert!(!engine.is_stale());
        assert!(engine.is_empty());
    }

    #[test]
    fn test_added_profiles_are_annotated() {
        let engine = engine_with_mocks(3);
        for profile in engine.profiles() {
            assert_eq!(profile.compat.schedule, 1.0);
            assert_eq!(profile.compat.lifestyle, 1.0);
            assert_eq!(profile.compat.living_habits, 1.0);
        }
    }

    #[test]
    fn test_train_and_staleness() {
        let engine = engine_with_mocks(12);
        assert!(engine.train());
        assert_eq!(engine.state(), EngineState::Trained);
        assert_eq!(engine.model_version(), 1);
        assert!(!engine.is_stale());

        let record = MockProfileGenerator::new(7).generate_mock(1).remove(0);
        let id = engine.add_profile(&record, true).unwrap();
        assert!(engine.is_stale());
        assert_eq!(engine.cluster_of(&id), None);

        assert!(engine.train());
        assert_eq!(engine.model_version(), 2);
        assert!(engine.cluster_of(&id).is_some());
    }

    #[test]
    fn test_insufficient_data_stays_untrained() {
        let engine = engine_with_mocks(9);
        assert!(!engine.train());
        assert!(matches!(
            engine.try_train(),
            Err(EngineError::InsufficientData { have: 9, need: 10 })
        ));
        assert_eq!(engine.state(), EngineState::Untrained);
        assert!(engine.recommend(&engine.profiles()[0].profile_id, 5, true).is_empty());
    }

    #[test]
    fn test_configured_minimum() {
        let engine = RecommendationEngine::new(EngineConfig::default().with_min_training_size(3));
        let records = MockProfileGenerator::new(1).generate_mock(3);
        engine.add_profiles_batch(&records, true).unwrap();
        assert!(engine.train());
        assert_eq!(engine.model().unwrap().index.k(), 3);
    }

    #[test]
    fn test_unknown_profile() {
        let engine = engine_with_mocks(12);
        assert!(engine.recommend("nobody", 5, true).is_empty());
        assert!(matches!(
            engine.try_recommend("nobody", 5, true),
            Err(EngineError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn test_recommend_trains_lazily() {
        let engine = engine_with_mocks(30);
        assert_eq!(engine.state(), EngineState::Untrained);

        let id = engine.profiles()[0].profile_id.clone();
        let recommendations = engine.recommend(&id, 5, true);
        assert_eq!(engine.state(), EngineState::Trained);
        assert!(recommendations.len() <= 5);
        for pair in recommendations.windows(2) {
            assert!(pair[0].compatibility_score >= pair[1].compatibility_score);
        }
    }

    #[test]
    fn test_recommend_does_not_mutate() {
        let engine = engine_with_mocks(30);
        engine.train();
        let id = engine.profiles()[3].profile_id.clone();

        let first = engine.recommend(&id, 10, true);
        let second = engine.recommend(&id, 10, true);
        assert_eq!(engine.model_version(), 1);
        assert_eq!(engine.len(), 30);

        let ids = |recs: &[Recommendation]| -> Vec<String> {
            recs.iter().map(|r| r.profile.profile_id.clone()).collect()
        };
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_batch_with_bad_record_is_rejected() {
        let engine = engine_with_mocks(3);
        let mut records = MockProfileGenerator::new(9).generate_mock(3);
        records[1].remove("age");

        let err = engine.add_profiles_batch(&records, true).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRecord(_)));
        assert_eq!(engine.len(), 3);
    }
}
