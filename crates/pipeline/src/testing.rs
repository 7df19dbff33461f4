//! Shared fixtures for unit tests.

use profiles::{Profile, ProfileRecord, parse_profile};
use retrieval::Candidate;
use std::sync::Arc;

/// A valid record with the given id; callers override fields with `with`.
pub fn record(id: &str) -> ProfileRecord {
    ProfileRecord::new()
        .with("profile_id", id)
        .with("age", 28)
        .with("gender", "female")
        .with("personality_type", "ambivert")
        .with("sleep_pattern", "flexible")
        .with("preferred_location_type", "urban")
        .with("income_level", "medium")
        .with("cleanliness_level", "clean")
        .with("pet_tolerance", "both")
}

pub fn profile(record: ProfileRecord, is_mock: bool) -> Profile {
    parse_profile(&record, is_mock).unwrap()
}

/// Wrap profiles as candidates at consecutive positions.
pub fn candidates(profiles: Vec<Profile>) -> Vec<Candidate> {
    profiles
        .into_iter()
        .enumerate()
        .map(|(i, p)| Candidate::new(i, Arc::new(p), i as f32 * 0.1))
        .collect()
}

pub fn ids(candidates: &[Candidate]) -> Vec<&str> {
    candidates.iter().map(Candidate::profile_id).collect()
}
