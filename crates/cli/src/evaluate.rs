//! Recommendation quality report over the real users of an engine.

use engine::RecommendationEngine;
use pipeline::filters::{pets_compatible, smoking_compatible};
use profiles::ProfileId;
use serde::Serialize;
use tracing::debug;

/// Aggregate quality metrics for one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub real_users: usize,
    pub total_recommendations: usize,
    /// Share of recommendations meeting the requester's pet and smoking criteria
    pub criteria_accuracy: f64,
    pub avg_compatibility: f64,
    /// Share of each user's recommendations in their own cluster, averaged over users
    pub cluster_consistency: f64,
    pub avg_recommendations_per_user: f64,
}

/// Request `n` recommendations for every real user and score the results.
///
/// Returns `None` with fewer than two real users or when nothing was
/// recommended at all.
pub fn evaluate(
    engine: &RecommendationEngine,
    real_users: &[ProfileId],
    n: usize,
) -> Option<EvaluationReport> {
    if real_users.len() < 2 {
        return None;
    }

    let mut total = 0usize;
    let mut criteria_met = 0usize;
    let mut score_sum = 0.0f64;
    let mut consistency_sum = 0.0f64;

    for id in real_users {
        let Some(requester) = engine.profile(id) else {
            continue;
        };
        let recommendations = engine.recommend(id, n, true);
        if recommendations.is_empty() {
            debug!("No recommendations for {}", id);
            continue;
        }

        total += recommendations.len();
        score_sum += recommendations
            .iter()
            .map(|r| f64::from(r.compatibility_score))
            .sum::<f64>();

        let own_cluster = engine.cluster_of(id);
        let same_cluster = recommendations
            .iter()
            .filter(|r| own_cluster.is_some() && r.cluster == own_cluster)
            .count();
        consistency_sum += same_cluster as f64 / recommendations.len() as f64;

        criteria_met += recommendations
            .iter()
            .filter(|r| {
                pets_compatible(&requester, &r.profile) && smoking_compatible(&requester, &r.profile)
            })
            .count();
    }

    if total == 0 {
        return None;
    }

    let users = real_users.len() as f64;
    Some(EvaluationReport {
        real_users: real_users.len(),
        total_recommendations: total,
        criteria_accuracy: criteria_met as f64 / total as f64,
        avg_compatibility: score_sum / total as f64,
        cluster_consistency: consistency_sum / users,
        avg_recommendations_per_user: total as f64 / users,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use profiles::MockProfileGenerator;

    fn populated(mock: usize, real: usize) -> (RecommendationEngine, Vec<ProfileId>) {
        let engine = RecommendationEngine::default();
        let mut generator = MockProfileGenerator::new(42);
        engine
            .add_profiles_batch(&generator.generate_mock(mock), true)
            .unwrap();
        let ids = generator
            .generate_real(real)
            .iter()
            .map(|r| engine.add_profile(r, false).unwrap())
            .collect();
        (engine, ids)
    }

    #[test]
    fn test_needs_two_real_users() {
        let (engine, ids) = populated(50, 1);
        assert!(evaluate(&engine, &ids, 5).is_none());
    }

    #[test]
    fn test_report_over_trained_engine() {
        let (engine, ids) = populated(100, 10);
        engine.train();
        let report = evaluate(&engine, &ids, 5).unwrap();

        assert_eq!(report.real_users, 10);
        assert!(report.total_recommendations <= 50);
        assert!(report.total_recommendations > 0);
        // Hard filters guarantee the criteria
        assert_eq!(report.criteria_accuracy, 1.0);
        assert!((0.0..=1.0).contains(&report.cluster_consistency));
        assert!(report.avg_compatibility <= 1.0);
        assert_eq!(
            report.avg_recommendations_per_user,
            report.total_recommendations as f64 / 10.0
        );
    }
}
