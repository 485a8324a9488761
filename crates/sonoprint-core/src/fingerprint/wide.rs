//! Wide per-family digests: SHA-256 over quantised descriptor text

use sha2::{Digest, Sha256};

/// Render `trunc(x * 1000)` of every value as concatenated decimal text
pub fn quantize(values: &[f64], absolute: bool) -> String {
    values
        .iter()
        .map(|&x| {
            let x = if absolute { x.abs() } else { x };
            ((x * 1000.0) as i64).to_string()
        })
        .collect()
}

/// Hex SHA-256 of `text`
pub fn digest(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// MFCC family digest; coefficients are quantised by magnitude
pub fn mfcc_digest(mfcc_mean: &[f64]) -> String {
    digest(&quantize(mfcc_mean, true))
}

pub fn chroma_digest(chroma_mean: &[f64]) -> String {
    digest(&quantize(chroma_mean, false))
}

/// Energy envelope digest over the first `frames` RMS values.
///
/// Shorter envelopes are hashed in full.
pub fn energy_digest(rms: &[f64], frames: usize) -> String {
    digest(&quantize(&rms[..frames.min(rms.len())], false))
}
