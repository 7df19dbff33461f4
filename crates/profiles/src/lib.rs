//! # Profiles Crate
//!
//! Domain model for the roommate matcher: the closed attribute vocabularies,
//! the `Profile` entity, raw `ProfileRecord`s and their validation, and the
//! append-only `Corpus` that owns every profile.
//!
//! ## Main Components
//!
//! - **types**: Vocabulary enums, `Profile`, `Counterpart`, `CompatScores`
//! - **record**: `ProfileRecord`, the loose attribute map callers submit
//! - **parser**: Record validation (`MalformedRecord` errors) into `Profile`
//! - **corpus**: Append-only, position-stable profile store
//! - **synthetic**: Seeded mock/real-style record generator
//! - **error**: Error types for record handling
//!
//! ## Example Usage
//!
//! ```ignore
//! use profiles::{parse_profile, Corpus, ProfileRecord};
//!
//! let record = ProfileRecord::new()
//!     .with("age", 27)
//!     .with("gender", "female")
//!     .with("personality_type", "introvert")
//!     .with("sleep_pattern", "early-bird")
//!     .with("preferred_location_type", "urban")
//!     .with("income_level", "medium")
//!     .with("cleanliness_level", "clean")
//!     .with("pet_tolerance", "no-pets");
//!
//! let mut corpus = Corpus::new();
//! corpus.push(parse_profile(&record, false)?)?;
//! ```

pub mod corpus;
pub mod error;
pub mod parser;
pub mod record;
pub mod synthetic;
pub mod types;

// Re-export commonly used types for convenience
pub use corpus::Corpus;
pub use error::{ProfileError, Result};
pub use parser::{REQUIRED_FIELDS, parse_profile, parse_profile_at};
pub use record::ProfileRecord;
pub use synthetic::MockProfileGenerator;
pub use types::{
    // Type aliases
    ProfileId,
    // Core types
    CompatScores,
    Counterpart,
    Profile,
    // Vocabularies
    BudgetRange,
    ChoreSharing,
    CleanlinessLevel,
    CookingFrequency,
    DietType,
    Frequency,
    Gender,
    Hobby,
    IncomeLevel,
    LocationType,
    NoiseTolerance,
    PersonalityType,
    PetTolerance,
    PrivacyLevel,
    Religion,
    SharedSpaceUsage,
    SleepPattern,
    SmokingStatus,
    WorkHours,
};
