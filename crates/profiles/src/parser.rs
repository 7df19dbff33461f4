//! Validation of raw records into typed profiles.
//!
//! Rules:
//! - required categorical and numeric fields must be present and valid
//! - optional categoricals fall back to `Unknown`, booleans to `false`,
//!   smoking to non-smoker, hobbies to the empty set
//! - values outside their domain are rejected, never coerced
//! - `profile_id` and timestamps are assigned when absent

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ProfileError, Result};
use crate::record::ProfileRecord;
use crate::types::*;

/// Fields a record must carry.
pub const REQUIRED_FIELDS: &[&str] = &[
    "age",
    "gender",
    "personality_type",
    "sleep_pattern",
    "preferred_location_type",
    "income_level",
    "cleanliness_level",
    "pet_tolerance",
];

/// Parse a record, stamping missing timestamps with the current time.
pub fn parse_profile(record: &ProfileRecord, is_mock: bool) -> Result<Profile> {
    parse_profile_at(record, is_mock, Utc::now())
}

/// Parse a record, stamping missing timestamps with `now`.
///
/// The returned profile carries zeroed compatibility scores; the scorer fills
/// them in before the profile is stored.
pub fn parse_profile_at(
    record: &ProfileRecord,
    is_mock: bool,
    now: DateTime<Utc>,
) -> Result<Profile> {
    let profile_id = match string_field(record, "profile_id")? {
        Some(id) if !id.trim().is_empty() => id.trim().to_string(),
        Some(id) => return Err(ProfileError::invalid("profile_id", format!("{:?}", id))),
        None => {
            let id = Uuid::new_v4().to_string();
            debug!("Assigned profile id {}", id);
            id
        }
    };

    let (created_at, updated_at) = match (
        timestamp_field(record, "created_at")?,
        timestamp_field(record, "updated_at")?,
    ) {
        (Some(created), Some(updated)) => (created, updated),
        (Some(created), None) => (created, created),
        // A defaulted creation time must never postdate the supplied update
        (None, Some(updated)) => (updated.min(now), updated),
        (None, None) => (now, now),
    };
    if created_at > updated_at {
        return Err(ProfileError::TimestampOrder {
            created_at: created_at.to_rfc3339(),
            updated_at: updated_at.to_rfc3339(),
        });
    }

    let counterpart = parse_counterpart(record)?;

    Ok(Profile {
        profile_id,
        is_mock,
        age: parse_age(record)?,
        gender: required(record, "gender", Gender::from_label)?,
        religion: optional(record, "religion", Religion::from_label)?.unwrap_or(Religion::Unknown),
        occupation: string_field(record, "occupation")?.map(str::to_string),
        personality_type: required(record, "personality_type", PersonalityType::from_label)?,
        daily_routine: string_field(record, "daily_routine")?.map(str::to_string),
        sleep_pattern: required(record, "sleep_pattern", SleepPattern::from_label)?,
        chronotype: optional(record, "chronotype", SleepPattern::from_label)?
            .unwrap_or(SleepPattern::Unknown),
        smoking: optional(record, "smoking", SmokingStatus::from_label)?.unwrap_or_default(),
        preferred_location_type: required(
            record,
            "preferred_location_type",
            LocationType::from_label,
        )?,
        commute_tolerance_minutes: parse_commute(record)?,
        hobbies: parse_hobbies(record)?,
        income_level: required(record, "income_level", IncomeLevel::from_label)?,
        budget_range: optional(record, "budget_range", BudgetRange::from_label)?
            .unwrap_or(BudgetRange::Unknown),
        cleanliness_level: required(record, "cleanliness_level", CleanlinessLevel::from_label)?,
        chore_sharing_preference: optional(
            record,
            "chore_sharing_preference",
            ChoreSharing::from_label,
        )?
        .unwrap_or(ChoreSharing::Unknown),
        noise_tolerance: optional(record, "noise_tolerance", NoiseTolerance::from_label)?
            .unwrap_or(NoiseTolerance::Unknown),
        guest_frequency: optional(record, "guest_frequency", Frequency::from_label)?
            .unwrap_or(Frequency::Unknown),
        party_habits: optional(record, "party_habits", Frequency::from_label)?
            .unwrap_or(Frequency::Unknown),
        privacy_level: optional(record, "privacy_level", PrivacyLevel::from_label)?
            .unwrap_or(PrivacyLevel::Unknown),
        shared_space_usage: optional(record, "shared_space_usage", SharedSpaceUsage::from_label)?
            .unwrap_or(SharedSpaceUsage::Unknown),
        has_pets: bool_field(record, "has_pets")?.unwrap_or(false),
        pet_tolerance: required(record, "pet_tolerance", PetTolerance::from_label)?,
        cooking_frequency: optional(record, "cooking_frequency", CookingFrequency::from_label)?
            .unwrap_or(CookingFrequency::Unknown),
        diet_type: optional(record, "diet_type", DietType::from_label)?.unwrap_or(DietType::Unknown),
        shared_groceries: bool_field(record, "shared_groceries")?.unwrap_or(false),
        work_hours: optional(record, "work_hours", WorkHours::from_label)?
            .unwrap_or(WorkHours::Unknown),
        works_from_home: bool_field(record, "works_from_home")?.unwrap_or(false),
        created_at,
        updated_at,
        compat: CompatScores::default(),
        counterpart,
    })
}

// =============================================================================
// Field helpers
// =============================================================================

fn missing(field: &str) -> ProfileError {
    ProfileError::MissingField {
        field: field.to_string(),
    }
}

/// A string-valued field; any other JSON type is invalid.
fn string_field<'a>(record: &'a ProfileRecord, field: &str) -> Result<Option<&'a str>> {
    match record.get(field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(ProfileError::invalid(field, other)),
    }
}

fn required<T>(record: &ProfileRecord, field: &str, parse: fn(&str) -> Option<T>) -> Result<T> {
    optional(record, field, parse)?.ok_or_else(|| missing(field))
}

fn optional<T>(
    record: &ProfileRecord,
    field: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>> {
    string_field(record, field)?
        .map(|label| parse(label).ok_or_else(|| ProfileError::invalid(field, label)))
        .transpose()
}

/// Accepts JSON booleans, 0/1, and yes/no/true/false strings.
fn bool_field(record: &ProfileRecord, field: &str) -> Result<Option<bool>> {
    let value = match record.get(field) {
        None => return Ok(None),
        Some(v) => v,
    };
    let parsed = match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" => Some(true),
            "no" | "false" => Some(false),
            _ => None,
        },
        _ => None,
    };
    parsed
        .map(Some)
        .ok_or_else(|| ProfileError::invalid(field, value))
}

fn timestamp_field(record: &ProfileRecord, field: &str) -> Result<Option<DateTime<Utc>>> {
    string_field(record, field)?
        .map(|s| {
            DateTime::parse_from_rfc3339(s.trim())
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(|_| ProfileError::invalid(field, s))
        })
        .transpose()
}

fn parse_age(record: &ProfileRecord) -> Result<u32> {
    let value = record.get("age").ok_or_else(|| missing("age"))?;
    let age = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    age.and_then(|a| u32::try_from(a).ok())
        .ok_or_else(|| ProfileError::invalid("age", value))
}

fn parse_commute(record: &ProfileRecord) -> Result<Option<f32>> {
    let value = match record.get("commute_tolerance_minutes") {
        None => return Ok(None),
        Some(v) => v,
    };
    value
        .as_f64()
        .filter(|m| m.is_finite() && *m >= 0.0)
        .map(|m| Some(m as f32))
        .ok_or_else(|| ProfileError::invalid("commute_tolerance_minutes", value))
}

fn parse_hobbies(record: &ProfileRecord) -> Result<BTreeSet<Hobby>> {
    let value = match record.get("hobbies") {
        None => return Ok(BTreeSet::new()),
        Some(v) => v,
    };
    let items = value
        .as_array()
        .ok_or_else(|| ProfileError::invalid("hobbies", value))?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .and_then(Hobby::from_label)
                .ok_or_else(|| ProfileError::invalid("hobbies", item))
        })
        .collect()
}

fn parse_counterpart(record: &ProfileRecord) -> Result<Option<Counterpart>> {
    let counterpart = Counterpart {
        sleep_pattern: optional(record, "match_sleep_pattern", SleepPattern::from_label)?,
        work_hours: optional(record, "match_work_hours", WorkHours::from_label)?,
        chronotype: optional(record, "match_chronotype", SleepPattern::from_label)?,
        personality_type: optional(record, "match_personality", PersonalityType::from_label)?,
        noise_tolerance: optional(record, "match_noise_tolerance", NoiseTolerance::from_label)?,
        guest_frequency: optional(record, "match_guest_frequency", Frequency::from_label)?,
        party_habits: optional(record, "match_party_habits", Frequency::from_label)?,
        privacy_level: optional(record, "match_privacy_level", PrivacyLevel::from_label)?,
        cleanliness_level: optional(record, "match_cleanliness", CleanlinessLevel::from_label)?,
        chore_sharing_preference: optional(
            record,
            "match_chore_preference",
            ChoreSharing::from_label,
        )?,
        shared_groceries: bool_field(record, "match_shared_groceries")?,
        diet_type: optional(record, "match_diet_type", DietType::from_label)?,
    };

    Ok(if counterpart.is_empty() {
        None
    } else {
        Some(counterpart)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_record() -> ProfileRecord {
        ProfileRecord::new()
            .with("age", 27)
            .with("gender", "female")
            .with("personality_type", "introvert")
            .with("sleep_pattern", "early-bird")
            .with("preferred_location_type", "urban")
            .with("income_level", "medium")
            .with("cleanliness_level", "clean")
            .with("pet_tolerance", "cats")
    }

    #[test]
    fn test_minimal_record_gets_defaults() {
        let profile = parse_profile(&minimal_record(), false).unwrap();

        assert_eq!(profile.age, 27);
        assert_eq!(profile.gender, Gender::Female);
        assert_eq!(profile.religion, Religion::Unknown);
        assert_eq!(profile.chronotype, SleepPattern::Unknown);
        assert_eq!(profile.smoking, SmokingStatus::NonSmoker);
        assert_eq!(profile.commute_tolerance_minutes, None);
        assert!(profile.hobbies.is_empty());
        assert!(!profile.has_pets);
        assert!(profile.counterpart.is_none());
        assert!(!profile.profile_id.is_empty());
        assert!(profile.created_at <= profile.updated_at);
    }

    #[test]
    fn test_every_required_field_is_enforced() {
        for field in REQUIRED_FIELDS {
            let mut record = minimal_record();
            record.remove(field);
            let err = parse_profile(&record, false).unwrap_err();
            assert_eq!(
                err,
                ProfileError::MissingField {
                    field: field.to_string()
                },
                "field {}",
                field
            );
            assert!(err.is_malformed());
        }
    }

    #[test]
    fn test_out_of_domain_value_is_rejected() {
        let record = minimal_record().with("diet_type", "carnivore");
        let err = parse_profile(&record, false).unwrap_err();
        assert_eq!(
            err,
            ProfileError::InvalidValue {
                field: "diet_type".to_string(),
                value: "carnivore".to_string()
            }
        );
    }

    #[test]
    fn test_wrong_json_type_is_rejected() {
        let record = minimal_record().with("gender", 3);
        assert!(matches!(
            parse_profile(&record, false),
            Err(ProfileError::InvalidValue { .. })
        ));

        let record = minimal_record().with("age", -4);
        assert!(parse_profile(&record, false).is_err());

        let record = minimal_record().with("age", 27.5);
        assert!(parse_profile(&record, false).is_err());
    }

    #[test]
    fn test_hobbies_outside_vocabulary_are_rejected() {
        let ok = minimal_record().with("hobbies", vec!["Reading", "art", "art"]);
        let profile = parse_profile(&ok, false).unwrap();
        assert_eq!(profile.hobbies.len(), 2);
        assert!(profile.hobbies.contains(&Hobby::Reading));

        let bad = minimal_record().with("hobbies", vec!["reading", "board games"]);
        assert!(parse_profile(&bad, false).is_err());
    }

    #[test]
    fn test_pet_and_smoking_fields() {
        let record = minimal_record()
            .with("has_pets", "yes")
            .with("smoking", "Smoker");
        let profile = parse_profile(&record, false).unwrap();
        assert!(profile.has_pets);
        assert!(profile.is_smoker());

        let record = minimal_record().with("has_pets", "maybe");
        assert!(parse_profile(&record, false).is_err());
    }

    #[test]
    fn test_supplied_id_and_timestamps_are_kept() {
        let record = minimal_record()
            .with("profile_id", "user_001")
            .with("created_at", "2024-01-01T00:00:00Z")
            .with("updated_at", "2024-02-01T00:00:00Z");
        let profile = parse_profile(&record, true).unwrap();

        assert_eq!(profile.profile_id, "user_001");
        assert!(profile.is_mock);
        assert_eq!(profile.created_at.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_timestamp_order_is_enforced() {
        let record = minimal_record()
            .with("created_at", "2024-03-01T00:00:00Z")
            .with("updated_at", "2024-02-01T00:00:00Z");
        assert!(matches!(
            parse_profile(&record, false),
            Err(ProfileError::TimestampOrder { .. })
        ));
    }

    #[test]
    fn test_missing_created_at_never_postdates_updated_at() {
        let now = "2026-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();

        let past = minimal_record().with("updated_at", "2024-01-01T00:00:00Z");
        let profile = parse_profile_at(&past, false, now).unwrap();
        assert_eq!(profile.created_at, profile.updated_at);
        assert_eq!(profile.created_at.to_rfc3339(), "2024-01-01T00:00:00+00:00");

        let future = minimal_record().with("updated_at", "2027-01-01T00:00:00Z");
        let profile = parse_profile_at(&future, false, now).unwrap();
        assert_eq!(profile.created_at, now);
        assert!(profile.created_at < profile.updated_at);
    }

    #[test]
    fn test_counterpart_fields_are_collected() {
        let record = minimal_record()
            .with("match_sleep_pattern", "night-owl")
            .with("match_shared_groceries", true);
        let profile = parse_profile(&record, false).unwrap();
        let counterpart = profile.counterpart.unwrap();

        assert_eq!(counterpart.sleep_pattern, Some(SleepPattern::NightOwl));
        assert_eq!(counterpart.shared_groceries, Some(true));
        assert_eq!(counterpart.work_hours, None);
    }
}
