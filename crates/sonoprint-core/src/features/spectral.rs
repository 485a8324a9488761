//! Per-frame spectral shape descriptors: centroid, bandwidth, contrast,
//! plus the time-domain RMS energy and zero-crossing rate

use super::mel::power_to_db;
use std::ops::Range;

/// Magnitude-weighted mean frequency, 0 for silent frames
pub fn spectral_centroid(magnitudes: &[f32], freqs: &[f32]) -> f32 {
    let total: f32 = magnitudes.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    magnitudes.iter().zip(freqs).map(|(m, f)| m * f).sum::<f32>() / total
}

/// Spread of the normalised spectrum around its centroid (Hz)
pub fn spectral_bandwidth(magnitudes: &[f32], freqs: &[f32], centroid: f32) -> f32 {
    let total: f32 = magnitudes.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    magnitudes
        .iter()
        .zip(freqs)
        .map(|(m, f)| (m / total) * (f - centroid).powi(2))
        .sum::<f32>()
        .sqrt()
}

/// FFT bin ranges of the octave bands used for spectral contrast
///
/// Band 0 spans `[0, fmin]`, band k spans `[fmin*2^(k-1), fmin*2^k]`, the
/// last band reaches the Nyquist frequency. Every band but the first also
/// takes the bin just below its lower edge.
pub fn contrast_band_ranges(freqs: &[f32], n_bands: usize, fmin: f32) -> Vec<Range<usize>> {
    let num_bins = freqs.len();
    let mut edges = Vec::with_capacity(n_bands + 2);
    edges.push(0.0f32);
    edges.extend((0..=n_bands).map(|k| fmin * 2f32.powi(k as i32)));

    (0..=n_bands)
        .map(|k| {
            let (lo, hi) = (edges[k], edges[k + 1]);
            let first = freqs.iter().position(|&f| f >= lo).unwrap_or(num_bins);
            let start = if k > 0 { first.saturating_sub(1) } else { first };
            let end = if k == n_bands {
                num_bins
            } else {
                // Upper edge bin belongs to the next band
                freqs.iter().rposition(|&f| f <= hi).unwrap_or(0)
            };
            let start = start.min(num_bins.saturating_sub(1));
            start..end.clamp(start + 1, num_bins)
        })
        .collect()
}

/// Peak-to-valley contrast (dB) of every band in one magnitude frame
pub fn spectral_contrast(magnitudes: &[f32], bands: &[Range<usize>], quantile: f32) -> Vec<f32> {
    bands
        .iter()
        .map(|range| {
            let mut band: Vec<f32> = magnitudes[range.clone()].to_vec();
            band.sort_unstable_by(|a, b| a.total_cmp(b));
            let n = band.len();
            let idx = ((quantile * n as f32).round() as usize).clamp(1, n);
            let valley = band[..idx].iter().sum::<f32>() / idx as f32;
            let peak = band[n - idx..].iter().sum::<f32>() / idx as f32;
            power_to_db(peak) - power_to_db(valley)
        })
        .collect()
}

/// Root-mean-square energy of one time-domain frame
pub fn rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    (frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32).sqrt()
}

/// Fraction of adjacent sample pairs whose sign differs
pub fn zero_crossing_rate(frame: &[f32]) -> f32 {
    if frame.len() < 2 {
        return 0.0;
    }
    let crossings = frame
        .windows(2)
        .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
        .count();
    crossings as f32 / frame.len() as f32
}
