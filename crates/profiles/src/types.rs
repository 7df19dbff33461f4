//! Core domain types for roommate profiles.
//!
//! The categorical attributes of a profile all come from small closed
//! vocabularies. Each one is an enum with a canonical label (the string used
//! in records and JSON output) and, where the attribute is optional, an
//! explicit `Unknown` variant standing in for "not supplied".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ProfileError;

// =============================================================================
// Type Aliases
// =============================================================================

/// Globally unique identifier of a profile (a UUID unless supplied by the caller)
pub type ProfileId = String;

// =============================================================================
// Closed vocabularies
// =============================================================================

/// Declares a closed categorical domain.
///
/// Generates the enum, its `ALL` variant table, `label()`, case-insensitive
/// `from_label()`, plus `Display` and `FromStr`.
macro_rules! closed_domain {
    (
        $(#[$meta:meta])*
        $name:ident : $domain:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Name of the domain, used in error messages.
            pub const DOMAIN: &'static str = $domain;

            /// Canonical label of this value.
            pub fn label(&self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }

            /// Looks up a value by label, ignoring ASCII case and surrounding whitespace.
            pub fn from_label(s: &str) -> Option<Self> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label().eq_ignore_ascii_case(s))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = ProfileError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_label(s).ok_or_else(|| ProfileError::invalid($domain, s))
            }
        }
    };
}

closed_domain! {
    Gender: "gender" {
        Male => "male",
        Female => "female",
        NonBinary => "non-binary",
        PreferNotToSay => "prefer-not-to-say",
        Unknown => "unknown",
    }
}

closed_domain! {
    Religion: "religion" {
        Christianity => "christianity",
        Islam => "islam",
        Hinduism => "hinduism",
        Judaism => "judaism",
        Other => "other",
        /// Explicitly non-religious (distinct from `Unknown`)
        NoReligion => "none",
        Unknown => "unknown",
    }
}

closed_domain! {
    PersonalityType: "personality_type" {
        Introvert => "introvert",
        Extrovert => "extrovert",
        Ambivert => "ambivert",
        Unknown => "unknown",
    }
}

closed_domain! {
    /// Sleep pattern; also the domain of `chronotype`
    SleepPattern: "sleep_pattern" {
        EarlyBird => "early-bird",
        NightOwl => "night-owl",
        Flexible => "flexible",
        Unknown => "unknown",
    }
}

closed_domain! {
    LocationType: "preferred_location_type" {
        Urban => "urban",
        Suburban => "suburban",
        Rural => "rural",
        Unknown => "unknown",
    }
}

closed_domain! {
    /// The fixed hobby vocabulary. No `Unknown`: a hobby set only ever holds real hobbies.
    Hobby: "hobbies" {
        Reading => "reading",
        Sports => "sports",
        Travelling => "travelling",
        Music => "music",
        Movies => "movies",
        Gaming => "gaming",
        Cooking => "cooking",
        Art => "art",
    }
}

closed_domain! {
    IncomeLevel: "income_level" {
        Low => "low",
        Medium => "medium",
        High => "high",
        VeryHigh => "very-high",
        Unknown => "unknown",
    }
}

closed_domain! {
    BudgetRange: "budget_range" {
        Low => "low",
        Medium => "medium",
        High => "high",
        Unknown => "unknown",
    }
}

closed_domain! {
    CleanlinessLevel: "cleanliness_level" {
        VeryClean => "very-clean",
        Clean => "clean",
        Average => "average",
        Messy => "messy",
        Unknown => "unknown",
    }
}

closed_domain! {
    ChoreSharing: "chore_sharing_preference" {
        Share => "share",
        Separate => "separate",
        Unknown => "unknown",
    }
}

closed_domain! {
    NoiseTolerance: "noise_tolerance" {
        Quiet => "quiet",
        Average => "average",
        Noisy => "noisy",
        Unknown => "unknown",
    }
}

closed_domain! {
    /// How often something happens; used for guests and parties
    Frequency: "frequency" {
        Never => "never",
        Rarely => "rarely",
        Sometimes => "sometimes",
        Often => "often",
        Unknown => "unknown",
    }
}

closed_domain! {
    PetTolerance: "pet_tolerance" {
        NoPets => "no-pets",
        Cats => "cats",
        Dogs => "dogs",
        Both => "both",
        Unknown => "unknown",
    }
}

closed_domain! {
    CookingFrequency: "cooking_frequency" {
        Never => "never",
        Sometimes => "sometimes",
        Often => "often",
        Always => "always",
        Unknown => "unknown",
    }
}

closed_domain! {
    DietType: "diet_type" {
        Vegan => "vegan",
        Vegetarian => "vegetarian",
        Omnivore => "omnivore",
        Pescatarian => "pescatarian",
        Other => "other",
        Unknown => "unknown",
    }
}

closed_domain! {
    WorkHours: "work_hours" {
        NineToFive => "9-5",
        Flexible => "flexible",
        ShiftWork => "shift-work",
        Other => "other",
        Unknown => "unknown",
    }
}

closed_domain! {
    PrivacyLevel: "privacy_level" {
        High => "high",
        Medium => "medium",
        Low => "low",
        Unknown => "unknown",
    }
}

closed_domain! {
    SharedSpaceUsage: "shared_space_usage" {
        Private => "private",
        Shared => "shared",
        Both => "both",
        Unknown => "unknown",
    }
}

closed_domain! {
    /// Smoking status. Unspecified means non-smoker.
    SmokingStatus: "smoking" {
        Smoker => "Smoker",
        NonSmoker => "Non-smoker",
    }
}

impl Default for SmokingStatus {
    fn default() -> Self {
        SmokingStatus::NonSmoker
    }
}

// =============================================================================
// Compatibility
// =============================================================================

/// The three derived compatibility sub-scores, each in [0, 1].
///
/// Written by the compatibility scorer before a profile enters the corpus;
/// never supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CompatScores {
    pub schedule: f32,
    pub lifestyle: f32,
    pub living_habits: f32,
}

/// A second party's attributes, compared field by field against a profile.
///
/// Any field left as `None` falls back to the profile's own value, so that
/// predicate trivially holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Counterpart {
    pub sleep_pattern: Option<SleepPattern>,
    pub work_hours: Option<WorkHours>,
    pub chronotype: Option<SleepPattern>,
    pub personality_type: Option<PersonalityType>,
    pub noise_tolerance: Option<NoiseTolerance>,
    pub guest_frequency: Option<Frequency>,
    pub party_habits: Option<Frequency>,
    pub privacy_level: Option<PrivacyLevel>,
    pub cleanliness_level: Option<CleanlinessLevel>,
    pub chore_sharing_preference: Option<ChoreSharing>,
    pub shared_groceries: Option<bool>,
    pub diet_type: Option<DietType>,
}

impl Counterpart {
    /// A fully specified counterpart taken from another profile.
    pub fn from_profile(other: &Profile) -> Self {
        Self {
            sleep_pattern: Some(other.sleep_pattern),
            work_hours: Some(other.work_hours),
            chronotype: Some(other.chronotype),
            personality_type: Some(other.personality_type),
            noise_tolerance: Some(other.noise_tolerance),
            guest_frequency: Some(other.guest_frequency),
            party_habits: Some(other.party_habits),
            privacy_level: Some(other.privacy_level),
            cleanliness_level: Some(other.cleanliness_level),
            chore_sharing_preference: Some(other.chore_sharing_preference),
            shared_groceries: Some(other.shared_groceries),
            diet_type: Some(other.diet_type),
        }
    }

    /// True when no counterpart field is set.
    pub fn is_empty(&self) -> bool {
        *self == Counterpart::default()
    }
}

// =============================================================================
// Profile
// =============================================================================

/// One person's lifestyle record plus derived compatibility sub-scores.
///
/// Profiles are immutable once they enter the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub profile_id: ProfileId,
    pub is_mock: bool,

    // Personal
    pub age: u32,
    pub gender: Gender,
    pub religion: Religion,
    pub occupation: Option<String>,

    // Lifestyle
    pub personality_type: PersonalityType,
    pub daily_routine: Option<String>,
    pub sleep_pattern: SleepPattern,
    pub chronotype: SleepPattern,
    pub smoking: SmokingStatus,

    // Neighborhood
    pub preferred_location_type: LocationType,
    /// Minutes; `None` is imputed at encoding time
    pub commute_tolerance_minutes: Option<f32>,

    pub hobbies: BTreeSet<Hobby>,

    // Financial
    pub income_level: IncomeLevel,
    pub budget_range: BudgetRange,

    // Shared living
    pub cleanliness_level: CleanlinessLevel,
    pub chore_sharing_preference: ChoreSharing,
    pub noise_tolerance: NoiseTolerance,
    pub guest_frequency: Frequency,
    pub party_habits: Frequency,
    pub privacy_level: PrivacyLevel,
    pub shared_space_usage: SharedSpaceUsage,

    // Pets
    pub has_pets: bool,
    pub pet_tolerance: PetTolerance,

    // Food & kitchen
    pub cooking_frequency: CookingFrequency,
    pub diet_type: DietType,
    pub shared_groceries: bool,

    // Work
    pub work_hours: WorkHours,
    pub works_from_home: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Derived; see `CompatScores`
    pub compat: CompatScores,
    /// Second-party fields supplied via `match_*` keys, if any
    pub counterpart: Option<Counterpart>,
}

impl Profile {
    /// True if this person smokes.
    pub fn is_smoker(&self) -> bool {
        self.smoking == SmokingStatus::Smoker
    }
}
