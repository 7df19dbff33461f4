//! Weighted-predicate compatibility sub-scores.
//!
//! Each sub-score is the sum of the weights of the attribute-equality
//! predicates that hold between a profile and a counterpart. A counterpart
//! field that is not supplied falls back to the profile's own value, so a
//! profile with no counterpart at all scores 1.0 on every sub-score. That
//! baseline measures internal consistency; use [`CompatibilityScorer::score_pair`]
//! for a genuine two-party comparison.

use profiles::{CompatScores, Counterpart, Profile};

// Weights in tenths, so a full match sums to exactly 10.
const SLEEP_PATTERN: u8 = 4;
const WORK_HOURS: u8 = 3;
const CHRONOTYPE: u8 = 3;

const PERSONALITY: u8 = 3;
const NOISE_TOLERANCE: u8 = 2;
const GUEST_FREQUENCY: u8 = 2;
const PARTY_HABITS: u8 = 2;
const PRIVACY_LEVEL: u8 = 1;

const CLEANLINESS: u8 = 4;
const CHORE_SHARING: u8 = 3;
const SHARED_GROCERIES: u8 = 2;
const DIET_TYPE: u8 = 1;

/// Computes the schedule, lifestyle and living-habits sub-scores.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompatibilityScorer;

impl CompatibilityScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score a profile against its own counterpart fields (or itself where absent).
    pub fn score(&self, profile: &Profile) -> CompatScores {
        match &profile.counterpart {
            Some(counterpart) => self.score_against(profile, counterpart),
            None => self.score_against(profile, &Counterpart::default()),
        }
    }

    /// Score `a` against every attribute of `b`.
    pub fn score_pair(&self, a: &Profile, b: &Profile) -> CompatScores {
        self.score_against(a, &Counterpart::from_profile(b))
    }

    /// Score a profile against an explicit counterpart.
    pub fn score_against(&self, p: &Profile, c: &Counterpart) -> CompatScores {
        let schedule = weigh(&[
            (matches(p.sleep_pattern, c.sleep_pattern), SLEEP_PATTERN),
            (matches(p.work_hours, c.work_hours), WORK_HOURS),
            (matches(p.chronotype, c.chronotype), CHRONOTYPE),
        ]);

        let lifestyle = weigh(&[
            (matches(p.personality_type, c.personality_type), PERSONALITY),
            (matches(p.noise_tolerance, c.noise_tolerance), NOISE_TOLERANCE),
            (matches(p.guest_frequency, c.guest_frequency), GUEST_FREQUENCY),
            (matches(p.party_habits, c.party_habits), PARTY_HABITS),
            (matches(p.privacy_level, c.privacy_level), PRIVACY_LEVEL),
        ]);

        let living_habits = weigh(&[
            (matches(p.cleanliness_level, c.cleanliness_level), CLEANLINESS),
            (
                matches(p.chore_sharing_preference, c.chore_sharing_preference),
                CHORE_SHARING,
            ),
            (matches(p.shared_groceries, c.shared_groceries), SHARED_GROCERIES),
            (matches(p.diet_type, c.diet_type), DIET_TYPE),
        ]);

        CompatScores {
            schedule,
            lifestyle,
            living_habits,
        }
    }

    /// Write the derived sub-scores onto the profile.
    pub fn annotate(&self, profile: &mut Profile) {
        profile.compat = self.score(profile);
    }
}

/// A field matches when the counterpart is absent or equal.
fn matches<T: PartialEq>(own: T, counterpart: Option<T>) -> bool {
    counterpart.is_none_or(|other| other == own)
}

fn weigh(predicates: &[(bool, u8)]) -> f32 {
    let tenths: u8 = predicates
        .iter()
        .filter(|(holds, _)| *holds)
        .map(|(_, weight)| weight)
        .sum();
    f32::from(tenths) / 10.0
}
