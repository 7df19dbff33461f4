//! Property tests for the feature encoder.

use pipeline::{CompatibilityScorer, FeatureEncoder};
use profiles::{MockProfileGenerator, Profile, parse_profile};
use proptest::prelude::*;
use retrieval::cosine_similarity;
use std::sync::Arc;

fn generated_corpus(seed: u64, mock: usize, real: usize) -> Vec<Arc<Profile>> {
    let mut generator = MockProfileGenerator::new(seed);
    let mut records = generator.generate_mock(mock);
    records.extend(generator.generate_real(real));
    records
        .iter()
        .map(|record| {
            let mut profile = parse_profile(record, false).unwrap();
            CompatibilityScorer.annotate(&mut profile);
            Arc::new(profile)
        })
        .collect()
}

proptest! {
    #[test]
    fn encoded_profile_is_maximally_self_similar(
        seed in any::<u64>(),
        mock in 1usize..40,
        real in 0usize..10,
    ) {
        let corpus = generated_corpus(seed, mock, real);
        let encoder = FeatureEncoder::fit(&corpus).unwrap();
        for vector in encoder.transform(&corpus) {
            prop_assert_eq!(vector.len(), encoder.dimension());
            prop_assert!(vector.iter().all(|v| v.is_finite()));
            prop_assert!((cosine_similarity(&vector, &vector) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn encoding_twice_is_bit_identical(seed in any::<u64>(), n in 1usize..30) {
        let corpus = generated_corpus(seed, n, 0);
        let encoder = FeatureEncoder::fit(&corpus).unwrap();
        let batch = encoder.transform(&corpus);
        for (profile, batched) in corpus.iter().zip(&batch) {
            let single = encoder.encode(profile);
            prop_assert_eq!(&single, batched);
            prop_assert_eq!(single, encoder.encode(profile));
        }
    }

    #[test]
    fn unseen_fields_never_break_encoding(seed in any::<u64>(), n in 1usize..20) {
        // Fit on mock profiles only, then encode sparse real-style profiles
        let fitted_on = generated_corpus(seed, n, 0);
        let queries = generated_corpus(seed.wrapping_add(1), 0, 5);
        let encoder = FeatureEncoder::fit(&fitted_on).unwrap();
        for vector in encoder.transform(&queries) {
            prop_assert_eq!(vector.len(), encoder.dimension());
            prop_assert!(vector.iter().all(|v| v.is_finite()));
        }
    }
}
