//! Synthetic profile records.
//!
//! Mock profiles densify a small corpus so clustering and neighbor retrieval
//! have something to work with. "Real-style" records mimic what a signup form
//! collects: a subset of fields and no id, so the engine assigns one.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use tracing::debug;
use uuid::Builder;

use crate::record::ProfileRecord;
use crate::types::*;

const OCCUPATIONS: &[&str] = &["Student", "Engineer", "Teacher", "Doctor", "Artist"];
const DAILY_ROUTINES: &[&str] = &["Regular 9-5", "Flexible", "Night shifts"];

/// Seeded generator of profile records.
pub struct MockProfileGenerator {
    rng: StdRng,
}

impl MockProfileGenerator {
    /// Create a generator; the same seed always yields the same records.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate `n` complete mock records with `mock_<uuid>` ids.
    pub fn generate_mock(&mut self, n: usize) -> Vec<ProfileRecord> {
        debug!("Generating {} mock profile records", n);
        (0..n).map(|_| self.mock_record()).collect()
    }

    /// Generate `n` partial records shaped like real signups (no id).
    pub fn generate_real(&mut self, n: usize) -> Vec<ProfileRecord> {
        (0..n).map(|_| self.real_record()).collect()
    }

    fn mock_record(&mut self) -> ProfileRecord {
        let id = Builder::from_random_bytes(self.rng.random::<[u8; 16]>()).into_uuid();
        let hobby_count = self.rng.random_range(1..=4);

        ProfileRecord::new()
            .with("profile_id", format!("mock_{}", id))
            .with("age", self.rng.random_range(18..=45))
            .with("gender", self.pick(known(Gender::ALL, Gender::Unknown)))
            .with("occupation", self.pick_str(OCCUPATIONS))
            .with("religion", self.pick(known(Religion::ALL, Religion::Unknown)))
            .with("smoking", self.pick(SmokingStatus::ALL))
            .with(
                "personality_type",
                self.pick(known(PersonalityType::ALL, PersonalityType::Unknown)),
            )
            .with("daily_routine", self.pick_str(DAILY_ROUTINES))
            .with("sleep_pattern", self.pick(known(SleepPattern::ALL, SleepPattern::Unknown)))
            .with(
                "preferred_location_type",
                self.pick(known(LocationType::ALL, LocationType::Unknown)),
            )
            .with("commute_tolerance_minutes", self.rng.random_range(5..=120))
            .with("hobbies", self.hobbies(hobby_count))
            .with("income_level", self.pick(known(IncomeLevel::ALL, IncomeLevel::Unknown)))
            .with("budget_range", self.pick(known(BudgetRange::ALL, BudgetRange::Unknown)))
            .with(
                "cleanliness_level",
                self.pick(known(CleanlinessLevel::ALL, CleanlinessLevel::Unknown)),
            )
            .with(
                "chore_sharing_preference",
                self.pick(known(ChoreSharing::ALL, ChoreSharing::Unknown)),
            )
            .with(
                "noise_tolerance",
                self.pick(known(NoiseTolerance::ALL, NoiseTolerance::Unknown)),
            )
            .with("guest_frequency", self.pick(known(Frequency::ALL, Frequency::Unknown)))
            .with("party_habits", self.pick(known(Frequency::ALL, Frequency::Unknown)))
            .with("has_pets", if self.rng.random_bool(0.5) { "yes" } else { "no" })
            .with("pet_tolerance", self.pick(known(PetTolerance::ALL, PetTolerance::Unknown)))
            .with(
                "cooking_frequency",
                self.pick(known(CookingFrequency::ALL, CookingFrequency::Unknown)),
            )
            .with("diet_type", self.pick(&MOCK_DIETS))
            .with("shared_groceries", self.rng.random_bool(0.5))
            .with("work_hours", self.pick(&MOCK_WORK_HOURS))
            .with("works_from_home", self.rng.random_bool(0.5))
            .with("chronotype", self.pick(known(SleepPattern::ALL, SleepPattern::Unknown)))
            .with("privacy_level", self.pick(known(PrivacyLevel::ALL, PrivacyLevel::Unknown)))
            .with(
                "shared_space_usage",
                self.pick(known(SharedSpaceUsage::ALL, SharedSpaceUsage::Unknown)),
            )
    }

    fn real_record(&mut self) -> ProfileRecord {
        let hobby_count = self.rng.random_range(1..=3);

        ProfileRecord::new()
            .with("age", self.rng.random_range(20..=35))
            .with("gender", self.pick(known(Gender::ALL, Gender::Unknown)))
            .with("occupation", self.pick_str(OCCUPATIONS))
            .with(
                "personality_type",
                self.pick(known(PersonalityType::ALL, PersonalityType::Unknown)),
            )
            .with("sleep_pattern", self.pick(known(SleepPattern::ALL, SleepPattern::Unknown)))
            .with(
                "preferred_location_type",
                self.pick(known(LocationType::ALL, LocationType::Unknown)),
            )
            .with("hobbies", self.hobbies(hobby_count))
            .with("income_level", self.pick(known(IncomeLevel::ALL, IncomeLevel::Unknown)))
            .with(
                "cleanliness_level",
                self.pick(known(CleanlinessLevel::ALL, CleanlinessLevel::Unknown)),
            )
            .with("pet_tolerance", self.pick(known(PetTolerance::ALL, PetTolerance::Unknown)))
            .with("diet_type", self.pick(&REAL_DIETS))
            .with("smoking", self.pick(SmokingStatus::ALL))
    }

    fn pick<T: Copy + std::fmt::Display>(&mut self, values: &[T]) -> Value {
        values
            .choose(&mut self.rng)
            .map(|v| Value::String(v.to_string()))
            .unwrap_or(Value::Null)
    }

    fn pick_str(&mut self, values: &[&str]) -> Value {
        values
            .choose(&mut self.rng)
            .map(|v| Value::String(v.to_string()))
            .unwrap_or(Value::Null)
    }

    fn hobbies(&mut self, count: usize) -> Value {
        Hobby::ALL
            .choose_multiple(&mut self.rng, count)
            .map(|h| Value::String(h.label().to_string()))
            .collect()
    }
}

const MOCK_DIETS: [DietType; 4] = [
    DietType::Vegan,
    DietType::Vegetarian,
    DietType::Omnivore,
    DietType::Pescatarian,
];
const REAL_DIETS: [DietType; 3] = [DietType::Vegan, DietType::Vegetarian, DietType::Omnivore];
const MOCK_WORK_HOURS: [WorkHours; 3] =
    [WorkHours::NineToFive, WorkHours::Flexible, WorkHours::ShiftWork];

/// The domain without its `Unknown` sentinel (always declared last).
fn known<T: PartialEq>(all: &'static [T], unknown: T) -> &'static [T] {
    match all.last() {
        Some(last) if *last == unknown => &all[..all.len() - 1],
        _ => all,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_profile;

    #[test]
    fn test_mock_records_parse() {
        let mut generator = MockProfileGenerator::new(7);
        for record in generator.generate_mock(50) {
            let profile = parse_profile(&record, true).unwrap();
            assert!(profile.profile_id.starts_with("mock_"));
            assert!((18..=45).contains(&profile.age));
            assert!(!profile.hobbies.is_empty() && profile.hobbies.len() <= 4);
            assert_ne!(profile.gender, Gender::Unknown);
            assert_ne!(profile.work_hours, WorkHours::Unknown);
        }
    }

    #[test]
    fn test_real_records_parse_without_id() {
        let mut generator = MockProfileGenerator::new(7);
        for record in generator.generate_real(20) {
            assert!(!record.contains("profile_id"));
            let profile = parse_profile(&record, false).unwrap();
            assert!((20..=35).contains(&profile.age));
            assert_eq!(profile.commute_tolerance_minutes, None);
        }
    }

    #[test]
    fn test_same_seed_same_records() {
        let a = MockProfileGenerator::new(42).generate_mock(5);
        let b = MockProfileGenerator::new(42).generate_mock(5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_known_strips_unknown() {
        assert_eq!(known(Gender::ALL, Gender::Unknown).len(), 4);
        assert_eq!(known(PetTolerance::ALL, PetTolerance::Unknown).len(), 4);
        assert_eq!(known(Hobby::ALL, Hobby::Art).len(), 7);
    }
}
