//! Similarity scoring between feature vectors and fingerprints
//!
//! All functions are pure. The combined score is a weighted heuristic in
//! [0, 1], not a metric: it has no triangle inequality and clamping can
//! break symmetry for pathological inputs.

use crate::error::{LengthMismatchError, SimilarityError};
use crate::features::FeatureVector;
use crate::fingerprint::Fingerprint;

#[cfg(test)]
mod tests;

/// Component weights of [`feature_similarity`]
pub const MFCC_WEIGHT: f64 = 0.4;
pub const CHROMA_WEIGHT: f64 = 0.3;
pub const CONTRAST_WEIGHT: f64 = 0.2;
pub const CENTROID_WEIGHT: f64 = 0.1;

/// Field weights of [`hash_similarity`]
pub const MFCC_HASH_WEIGHT: f64 = 0.4;
pub const CHROMA_HASH_WEIGHT: f64 = 0.3;
pub const ENERGY_HASH_WEIGHT: f64 = 0.2;
pub const COMPACT_HASH_WEIGHT: f64 = 0.1;

/// Anything that carries both a feature vector and a fingerprint
pub trait AudioDescriptor {
    fn features(&self) -> &FeatureVector;
    fn fingerprint(&self) -> &Fingerprint;
}

/// One minus the cosine distance.
///
/// Two zero vectors are identical (1.0), a zero vector against a non-zero
/// one scores 0.0, and vectors of different lengths score 0.0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        log::debug!("cosine over mismatched lengths {} and {}", a.len(), b.len());
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    match (norm_a > 0.0, norm_b > 0.0) {
        (false, false) => 1.0,
        (true, true) => dot / (norm_a * norm_b),
        _ => 0.0,
    }
}

/// `1 - |c1 - c2| / max(c1, c2)`, 1.0 when both are zero
pub fn centroid_similarity(c1: f64, c2: f64) -> f64 {
    let denom = c1.abs().max(c2.abs());
    if denom == 0.0 {
        return 1.0;
    }
    1.0 - (c1 - c2).abs() / denom
}

/// Weighted feature similarity, clamped into [0, 1]
pub fn feature_similarity(v1: &FeatureVector, v2: &FeatureVector) -> f64 {
    let raw = MFCC_WEIGHT * cosine_similarity(&v1.mfcc, &v2.mfcc)
        + CHROMA_WEIGHT * cosine_similarity(&v1.chroma, &v2.chroma)
        + CONTRAST_WEIGHT * cosine_similarity(&v1.spectral_contrast, &v2.spectral_contrast)
        + CENTROID_WEIGHT * centroid_similarity(v1.spectral_centroid, v2.spectral_centroid);
    clamp_unit(raw)
}

/// Fraction of byte positions at which two hex digests agree
pub fn byte_match(field: &'static str, h1: &str, h2: &str) -> Result<f64, SimilarityError> {
    let decode = |value: &str| {
        hex::decode(value).map_err(|_| SimilarityError::InvalidHex {
            field,
            value: value.to_string(),
        })
    };
    let a = decode(h1)?;
    let b = decode(h2)?;

    if a.len() != b.len() {
        return Err(LengthMismatchError {
            field,
            left: a.len(),
            right: b.len(),
        }
        .into());
    }
    if a.is_empty() {
        return Ok(1.0);
    }

    let equal = a.iter().zip(&b).filter(|(x, y)| x == y).count();
    Ok(equal as f64 / a.len() as f64)
}

fn hash_fields<'a>(
    h1: &'a Fingerprint,
    h2: &'a Fingerprint,
) -> [(&'static str, &'a str, &'a str, f64); 4] {
    [
        ("mfcc_hash", h1.mfcc_hash.as_str(), h2.mfcc_hash.as_str(), MFCC_HASH_WEIGHT),
        ("chroma_hash", h1.chroma_hash.as_str(), h2.chroma_hash.as_str(), CHROMA_HASH_WEIGHT),
        ("energy_hash", h1.energy_hash.as_str(), h2.energy_hash.as_str(), ENERGY_HASH_WEIGHT),
        ("compact_hash", h1.compact_hash.as_str(), h2.compact_hash.as_str(), COMPACT_HASH_WEIGHT),
    ]
}

/// Weighted byte-match similarity of two fingerprints.
///
/// Fails on the first field whose digests differ in length or are not hex.
pub fn hash_similarity(h1: &Fingerprint, h2: &Fingerprint) -> Result<f64, SimilarityError> {
    let mut score = 0.0;
    for (field, a, b, weight) in hash_fields(h1, h2) {
        score += weight * byte_match(field, a, b)?;
    }
    Ok(clamp_unit(score))
}

/// Like [`hash_similarity`], but a failing field scores 0 and the failure
/// is returned alongside the score.
pub fn hash_similarity_lenient(h1: &Fingerprint, h2: &Fingerprint) -> (f64, Vec<SimilarityError>) {
    let mut score = 0.0;
    let mut errors = Vec::new();
    for (field, a, b, weight) in hash_fields(h1, h2) {
        match byte_match(field, a, b) {
            Ok(s) => score += weight * s,
            Err(e) => errors.push(e),
        }
    }
    (clamp_unit(score), errors)
}

/// `alpha * feature_similarity + (1 - alpha) * hash_similarity`
pub fn combined_similarity<Q, C>(query: &Q, candidate: &C, alpha: f64) -> Result<f64, SimilarityError>
where
    Q: AudioDescriptor + ?Sized,
    C: AudioDescriptor + ?Sized,
{
    if !(0.0..=1.0).contains(&alpha) {
        return Err(SimilarityError::InvalidAlpha(alpha));
    }

    let features = feature_similarity(query.features(), candidate.features());
    let hashes = hash_similarity(query.fingerprint(), candidate.fingerprint())?;
    Ok(clamp_unit(alpha * features + (1.0 - alpha) * hashes))
}

/// Clamp into [0, 1]; NaN becomes 0
fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
