//! Feature encoding for profiles.
//!
//! Turns a `Profile` into the fixed-length vector that clustering and
//! neighbor retrieval operate on. All statistics are learned once by
//! [`FeatureEncoder::fit`] and reused unchanged for every later encoding,
//! including single-profile queries.
//!
//! ## Vector layout
//! 1. Standardized numerics: `(value - mean) / std`, missing values imputed
//!    with the fit-time median first
//! 2. One-hot categoricals, one block per column: the labels observed at fit
//!    time (sorted) followed by an "other" slot for anything unseen
//! 3. Multi-hot hobbies over the fixed hobby vocabulary

use profiles::{Hobby, Profile};
use rayon::prelude::*;
use retrieval::sanitize_non_finite;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::error::{PipelineError, Result};

// ============================================================================
// Columns
// ============================================================================

/// Numeric input columns, in vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericColumn {
    Age,
    CommuteTolerance,
    ScheduleCompat,
    LifestyleCompat,
    LivingHabitsCompat,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 5] = [
        NumericColumn::Age,
        NumericColumn::CommuteTolerance,
        NumericColumn::ScheduleCompat,
        NumericColumn::LifestyleCompat,
        NumericColumn::LivingHabitsCompat,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NumericColumn::Age => "age",
            NumericColumn::CommuteTolerance => "commute_tolerance_minutes",
            NumericColumn::ScheduleCompat => "schedule_compat",
            NumericColumn::LifestyleCompat => "lifestyle_compat",
            NumericColumn::LivingHabitsCompat => "living_habits_compat",
        }
    }

    /// The raw value, `None` when missing.
    fn value(&self, p: &Profile) -> Option<f64> {
        match self {
            NumericColumn::Age => Some(f64::from(p.age)),
            NumericColumn::CommuteTolerance => p.commute_tolerance_minutes.map(f64::from),
            NumericColumn::ScheduleCompat => Some(f64::from(p.compat.schedule)),
            NumericColumn::LifestyleCompat => Some(f64::from(p.compat.lifestyle)),
            NumericColumn::LivingHabitsCompat => Some(f64::from(p.compat.living_habits)),
        }
    }
}

/// Categorical input columns, in vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoricalColumn {
    Gender,
    PersonalityType,
    SleepPattern,
    PreferredLocationType,
    IncomeLevel,
    BudgetRange,
    CleanlinessLevel,
    NoiseTolerance,
    PetTolerance,
    DietType,
    WorkHours,
    PrivacyLevel,
}

impl CategoricalColumn {
    pub const ALL: [CategoricalColumn; 12] = [
        CategoricalColumn::Gender,
        CategoricalColumn::PersonalityType,
        CategoricalColumn::SleepPattern,
        CategoricalColumn::PreferredLocationType,
        CategoricalColumn::IncomeLevel,
        CategoricalColumn::BudgetRange,
        CategoricalColumn::CleanlinessLevel,
        CategoricalColumn::NoiseTolerance,
        CategoricalColumn::PetTolerance,
        CategoricalColumn::DietType,
        CategoricalColumn::WorkHours,
        CategoricalColumn::PrivacyLevel,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CategoricalColumn::Gender => "gender",
            CategoricalColumn::PersonalityType => "personality_type",
            CategoricalColumn::SleepPattern => "sleep_pattern",
            CategoricalColumn::PreferredLocationType => "preferred_location_type",
            CategoricalColumn::IncomeLevel => "income_level",
            CategoricalColumn::BudgetRange => "budget_range",
            CategoricalColumn::CleanlinessLevel => "cleanliness_level",
            CategoricalColumn::NoiseTolerance => "noise_tolerance",
            CategoricalColumn::PetTolerance => "pet_tolerance",
            CategoricalColumn::DietType => "diet_type",
            CategoricalColumn::WorkHours => "work_hours",
            CategoricalColumn::PrivacyLevel => "privacy_level",
        }
    }

    fn label(&self, p: &Profile) -> &'static str {
        match self {
            CategoricalColumn::Gender => p.gender.label(),
            CategoricalColumn::PersonalityType => p.personality_type.label(),
            CategoricalColumn::SleepPattern => p.sleep_pattern.label(),
            CategoricalColumn::PreferredLocationType => p.preferred_location_type.label(),
            CategoricalColumn::IncomeLevel => p.income_level.label(),
            CategoricalColumn::BudgetRange => p.budget_range.label(),
            CategoricalColumn::CleanlinessLevel => p.cleanliness_level.label(),
            CategoricalColumn::NoiseTolerance => p.noise_tolerance.label(),
            CategoricalColumn::PetTolerance => p.pet_tolerance.label(),
            CategoricalColumn::DietType => p.diet_type.label(),
            CategoricalColumn::WorkHours => p.work_hours.label(),
            CategoricalColumn::PrivacyLevel => p.privacy_level.label(),
        }
    }
}

// ============================================================================
// Fitted statistics
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct NumericStats {
    median: f64,
    mean: f64,
    /// Population standard deviation, or 1 when that is zero or non-finite
    scale: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct CategoryBlock {
    column: CategoricalColumn,
    /// Labels seen at fit time, sorted; the block has one extra "other" slot
    labels: Vec<&'static str>,
}

impl CategoryBlock {
    fn width(&self) -> usize {
        self.labels.len() + 1
    }

    fn slot(&self, label: &str) -> usize {
        self.labels
            .binary_search_by(|probe| (*probe).cmp(label))
            .unwrap_or(self.labels.len())
    }
}

/// Fitted profile encoder.
///
/// Only obtainable through [`FeatureEncoder::fit`], so there is no way to
/// encode with statistics that were never learned.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureEncoder {
    numeric: Vec<NumericStats>,
    categorical: Vec<CategoryBlock>,
    dimension: usize,
}

impl FeatureEncoder {
    /// Learn imputation, standardization and vocabulary statistics.
    ///
    /// # Errors
    /// `EmptyCorpus` when `profiles` is empty.
    #[instrument(skip(profiles), fields(profiles = profiles.len()))]
    pub fn fit(profiles: &[Arc<Profile>]) -> Result<Self> {
        if profiles.is_empty() {
            return Err(PipelineError::EmptyCorpus);
        }

        let numeric: Vec<NumericStats> = NumericColumn::ALL
            .iter()
            .map(|column| {
                let observed: Vec<f64> = profiles
                    .iter()
                    .filter_map(|p| column.value(p))
                    .filter(|v| v.is_finite())
                    .collect();
                let median = median(observed);
                let imputed: Vec<f64> = profiles
                    .iter()
                    .map(|p| column.value(p).filter(|v| v.is_finite()).unwrap_or(median))
                    .collect();
                let (mean, std) = mean_and_std(&imputed);
                NumericStats {
                    median,
                    mean,
                    scale: if std > 0.0 && std.is_finite() { std } else { 1.0 },
                }
            })
            .collect();

        let categorical: Vec<CategoryBlock> = CategoricalColumn::ALL
            .iter()
            .map(|&column| {
                let mut labels: Vec<&'static str> =
                    profiles.iter().map(|p| column.label(p)).collect();
                labels.sort_unstable();
                labels.dedup();
                CategoryBlock { column, labels }
            })
            .collect();

        let dimension = numeric.len()
            + categorical.iter().map(CategoryBlock::width).sum::<usize>()
            + Hobby::ALL.len();

        debug!(
            "Fitted feature encoder on {} profiles: dimension {}",
            profiles.len(),
            dimension
        );

        Ok(Self {
            numeric,
            categorical,
            dimension,
        })
    }

    /// Length of every encoded vector
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Encode one profile. Non-finite components are replaced by zero.
    pub fn encode(&self, profile: &Profile) -> Vec<f32> {
        let mut vector = Vec::with_capacity(self.dimension);

        for (column, stats) in NumericColumn::ALL.iter().zip(&self.numeric) {
            let value = column
                .value(profile)
                .filter(|v| v.is_finite())
                .unwrap_or(stats.median);
            vector.push(((value - stats.mean) / stats.scale) as f32);
        }

        for block in &self.categorical {
            let start = vector.len();
            vector.resize(start + block.width(), 0.0);
            vector[start + block.slot(block.column.label(profile))] = 1.0;
        }

        vector.extend(Hobby::ALL.iter().map(|hobby| {
            if profile.hobbies.contains(hobby) {
                1.0
            } else {
                0.0
            }
        }));

        let replaced = sanitize_non_finite(&mut vector);
        if replaced > 0 {
            warn!(
                "Replaced {} non-finite components encoding {}",
                replaced, profile.profile_id
            );
        }
        vector
    }

    /// Encode many profiles in parallel, preserving order.
    pub fn transform(&self, profiles: &[Arc<Profile>]) -> Vec<Vec<f32>> {
        profiles.par_iter().map(|p| self.encode(p)).collect()
    }

    /// Human-readable name of every vector component, in order.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = NumericColumn::ALL
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        for block in &self.categorical {
            let column = block.column.name();
            names.extend(block.labels.iter().map(|l| format!("{column}={l}")));
            names.push(format!("{column}=other"));
        }
        names.extend(Hobby::ALL.iter().map(|h| format!("hobby={h}")));
        names
    }
}

// ============================================================================
// Statistics helpers
// ============================================================================

/// Median with the even-count midpoint convention; 0 for no values.
fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_unstable_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Mean and population standard deviation.
fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use profiles::{Gender, ProfileRecord, parse_profile};
    use retrieval::cosine_similarity;

    fn profile(id: &str, age: u32, commute: Option<f64>, gender: &str) -> Arc<Profile> {
        let mut record = ProfileRecord::new()
            .with("profile_id", id)
            .with("age", age)
            .with("gender", gender)
            .with("personality_type", "introvert")
            .with("sleep_pattern", "early-bird")
            .with("preferred_location_type", "urban")
            .with("income_level", "medium")
            .with("cleanliness_level", "clean")
            .with("pet_tolerance", "cats")
            .with("hobbies", vec!["reading", "music"]);
        if let Some(minutes) = commute {
            record.insert("commute_tolerance_minutes", minutes);
        }
        Arc::new(parse_profile(&record, false).unwrap())
    }

    fn corpus() -> Vec<Arc<Profile>> {
        vec![
            profile("a", 20, Some(10.0), "male"),
            profile("b", 30, Some(30.0), "female"),
            profile("c", 40, None, "female"),
            profile("d", 30, Some(50.0), "male"),
        ]
    }

    #[test]
    fn test_fit_empty_is_error() {
        assert_eq!(
            FeatureEncoder::fit(&[]).unwrap_err(),
            PipelineError::EmptyCorpus
        );
    }

    #[test]
    fn test_dimension_matches_layout() {
        let encoder = FeatureEncoder::fit(&corpus()).unwrap();
        // 5 numerics + gender {female, male, other} + 11 single-label blocks of
        // width 2 + 8 hobbies
        assert_eq!(encoder.dimension(), 5 + 3 + 11 * 2 + 8);
        assert_eq!(encoder.feature_names().len(), encoder.dimension());
        assert_eq!(encoder.encode(&corpus()[0]).len(), encoder.dimension());
    }

    #[test]
    fn test_median_imputation_and_standardization() {
        let profiles = corpus();
        let encoder = FeatureEncoder::fit(&profiles).unwrap();

        // commute median over {10, 30, 50} is 30; imputed column {10, 30, 30, 50}
        let commute = &encoder.numeric[1];
        assert_eq!(commute.median, 30.0);
        assert_eq!(commute.mean, 30.0);
        assert!((commute.scale - 200.0f64.sqrt()).abs() < 1e-9);

        // The missing commute encodes to the standardized median
        let vector = encoder.encode(&profiles[2]);
        assert_eq!(vector[1], 0.0);
    }

    #[test]
    fn test_constant_column_scales_by_one() {
        let encoder = FeatureEncoder::fit(&corpus()).unwrap();
        // Compat scores are all zero (profiles were not annotated)
        let schedule = &encoder.numeric[2];
        assert_eq!(schedule.scale, 1.0);
        assert_eq!(encoder.encode(&corpus()[0])[2], 0.0);
    }

    #[test]
    fn test_unseen_category_goes_to_other() {
        let encoder = FeatureEncoder::fit(&corpus()).unwrap();
        let mut stranger = (*profile("z", 25, Some(20.0), "male")).clone();
        stranger.gender = Gender::NonBinary;

        let vector = encoder.encode(&stranger);
        // gender block sits right after the 5 numerics: [female, male, other]
        assert_eq!(&vector[5..8], &[0.0, 0.0, 1.0]);

        let known = encoder.encode(&corpus()[1]);
        assert_eq!(&known[5..8], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_hobbies_multi_hot() {
        let encoder = FeatureEncoder::fit(&corpus()).unwrap();
        let vector = encoder.encode(&corpus()[0]);
        let hobbies = &vector[vector.len() - Hobby::ALL.len()..];
        let hot: Vec<Hobby> = Hobby::ALL
            .iter()
            .zip(hobbies)
            .filter(|(_, v)| **v == 1.0)
            .map(|(h, _)| *h)
            .collect();
        assert_eq!(hot, vec![Hobby::Reading, Hobby::Music]);
    }

    #[test]
    fn test_single_profile_query_uses_fit_statistics() {
        let encoder = FeatureEncoder::fit(&corpus()).unwrap();
        let newcomer = profile("n", 30, None, "female");
        let alone = encoder.transform(&[newcomer.clone()]);
        let together = encoder.transform(&[corpus()[0].clone(), newcomer]);
        assert_eq!(alone[0], together[1]);
    }

    #[test]
    fn test_self_similarity() {
        let profiles = corpus();
        let encoder = FeatureEncoder::fit(&profiles).unwrap();
        for v in encoder.transform(&profiles) {
            assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_median_helper() {
        assert_eq!(median(vec![]), 0.0);
        assert_eq!(median(vec![3.0]), 3.0);
        assert_eq!(median(vec![4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(vec![5.0, 1.0, 3.0]), 3.0);
    }
}
