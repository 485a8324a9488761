//! Tests for similarity scoring

use super::*;
use approx::assert_relative_eq;

fn features(centroid: f64, mfcc: Vec<f64>, chroma: Vec<f64>, contrast: Vec<f64>) -> FeatureVector {
    FeatureVector {
        spectral_centroid: centroid,
        spectral_bandwidth: 800.0,
        mfcc,
        chroma,
        spectral_contrast: contrast,
    }
}

fn sample_features() -> FeatureVector {
    features(
        1500.0,
        (0..13).map(|i| (i as f64 - 6.0) * 3.5).collect(),
        (0..12).map(|i| 0.1 + i as f64 * 0.05).collect(),
        vec![12.0, 18.0, 21.0, 19.5, 17.0, 16.0, 30.0],
    )
}

fn fingerprint(fill: &str, compact: &str) -> Fingerprint {
    Fingerprint {
        mfcc_hash: fill.repeat(32),
        chroma_hash: fill.repeat(32),
        energy_hash: fill.repeat(32),
        compact_hash: compact.to_string(),
    }
}

struct Described {
    features: FeatureVector,
    fingerprint: Fingerprint,
}

impl AudioDescriptor for Described {
    fn features(&self) -> &FeatureVector {
        &self.features
    }
    fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }
}

#[test]
fn test_identical_features_score_one() {
    let fv = sample_features();
    assert_relative_eq!(feature_similarity(&fv, &fv), 1.0, epsilon = 1e-12);
}

#[test]
fn test_zero_norm_components_are_clamped() {
    let zero = features(0.0, vec![0.0; 13], vec![0.0; 12], vec![0.0; 7]);
    let score = feature_similarity(&zero, &zero);
    assert_relative_eq!(score, 1.0);

    let other = sample_features();
    let score = feature_similarity(&zero, &other);
    assert!((0.0..=1.0).contains(&score));
    assert_relative_eq!(score, 0.0);
}

#[test]
fn test_opposite_vectors_clamp_to_zero() {
    let a = features(1000.0, vec![1.0; 13], vec![1.0; 12], vec![1.0; 7]);
    let b = features(-1000.0, vec![-1.0; 13], vec![-1.0; 12], vec![-1.0; 7]);
    // Raw weighted sum is -0.9 - 0.1 = -1.0
    assert_eq!(feature_similarity(&a, &b), 0.0);
}

#[test]
fn test_non_finite_input_scores_zero() {
    let mut a = sample_features();
    a.mfcc[0] = f64::NAN;
    let score = feature_similarity(&a, &sample_features());
    assert_eq!(score, 0.0);
}

#[test]
fn test_centroid_similarity() {
    assert_relative_eq!(centroid_similarity(1000.0, 500.0), 0.5);
    assert_relative_eq!(centroid_similarity(500.0, 1000.0), 0.5);
    assert_relative_eq!(centroid_similarity(0.0, 0.0), 1.0);
    assert_relative_eq!(centroid_similarity(0.0, 10.0), 0.0);
}

#[test]
fn test_cosine_length_mismatch_scores_zero() {
    assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
}

#[test]
fn test_hash_similarity_identity() {
    let h = fingerprint("a1", "0badf00d");
    assert_relative_eq!(hash_similarity(&h, &h).unwrap(), 1.0);
}

#[test]
fn test_byte_match_fraction() {
    assert_relative_eq!(byte_match("x", "00112233", "00ff2233").unwrap(), 0.75);
    assert_relative_eq!(byte_match("x", "00112233", "ffeeddcc").unwrap(), 0.0);
}

#[test]
fn test_hash_similarity_weights() {
    let a = fingerprint("aa", "00000000");
    let mut b = a.clone();
    b.mfcc_hash = "bb".repeat(32);
    // Only the mfcc field (weight 0.4) disagrees everywhere
    assert_relative_eq!(hash_similarity(&a, &b).unwrap(), 0.6, epsilon = 1e-12);

    b.compact_hash = "00000001".to_string();
    assert_relative_eq!(hash_similarity(&a, &b).unwrap(), 0.575, epsilon = 1e-12);
}

#[test]
fn test_hash_length_mismatch() {
    let a = fingerprint("aa", "00000000");
    let mut b = a.clone();
    b.energy_hash = "aa".repeat(16);

    let err = hash_similarity(&a, &b).unwrap_err();
    assert_eq!(
        err,
        SimilarityError::LengthMismatch(LengthMismatchError {
            field: "energy_hash",
            left: 32,
            right: 16,
        })
    );

    let (score, errors) = hash_similarity_lenient(&a, &b);
    assert_relative_eq!(score, 0.8, epsilon = 1e-12);
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_invalid_hex_is_reported() {
    let a = fingerprint("aa", "00000000");
    let mut b = a.clone();
    b.compact_hash = "zzzzzzzz".to_string();
    assert!(matches!(
        hash_similarity(&a, &b),
        Err(SimilarityError::InvalidHex { field: "compact_hash", .. })
    ));
}

#[test]
fn test_combined_similarity_blends_scores() {
    let query = Described {
        features: sample_features(),
        fingerprint: fingerprint("aa", "00000000"),
    };
    let candidate = Described {
        features: sample_features(),
        fingerprint: fingerprint("bb", "11111111"),
    };

    // Features identical (1.0), fingerprints disjoint (0.0)
    assert_relative_eq!(combined_similarity(&query, &candidate, 0.7).unwrap(), 0.7, epsilon = 1e-9);
    assert_relative_eq!(combined_similarity(&query, &candidate, 0.0).unwrap(), 0.0, epsilon = 1e-9);
    assert_relative_eq!(combined_similarity(&query, &query, 0.6).unwrap(), 1.0, epsilon = 1e-9);

    assert!(matches!(
        combined_similarity(&query, &candidate, 1.2),
        Err(SimilarityError::InvalidAlpha(_))
    ));
}

#[test]
fn test_invalid_alpha_error_carries_value() {
    let described = Described {
        features: sample_features(),
        fingerprint: fingerprint("aa", "00000000"),
    };
    assert_eq!(
        combined_similarity(&described, &described, -0.5),
        Err(SimilarityError::InvalidAlpha(-0.5))
    );
    assert_ne!(
        SimilarityError::InvalidAlpha(0.25),
        SimilarityError::InvalidAlpha(0.5)
    );
}
