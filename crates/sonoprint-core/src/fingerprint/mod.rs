//! Fingerprint generation
//!
//! A fingerprint holds three wide digests (MFCC, chroma, energy envelope)
//! for fine per-family discrimination and one compact 32-bit digest meant
//! as a coarse pre-filter key.

pub mod compact;
pub mod wide;

use crate::audio::Waveform;
use crate::config::AnalysisConfig;
use crate::error::FingerprintError;
use crate::features::{mean, SpectralDescriptors};
use compact::CompactSummary;
use serde::{Deserialize, Serialize};

/// Digests of one excerpt, all lowercase hex
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    pub mfcc_hash: String,
    pub chroma_hash: String,
    pub energy_hash: String,
    pub compact_hash: String,
}

impl Fingerprint {
    /// The compact digest as an integer, for pre-filtering lookups
    pub fn prefilter_key(&self) -> Option<u32> {
        u32::from_str_radix(&self.compact_hash, 16).ok()
    }
}

/// Fingerprint generator
pub struct FingerprintGenerator {
    config: AnalysisConfig,
}

impl FingerprintGenerator {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Fingerprint the leading analysis window of `waveform`
    pub fn generate(&self, waveform: &Waveform) -> Result<Fingerprint, FingerprintError> {
        self.config.validate()?;
        if waveform.sample_rate() == 0 {
            return Err(FingerprintError::InvalidSampleRate(waveform.sample_rate()));
        }
        if waveform.is_empty() {
            return Err(FingerprintError::EmptyWaveform);
        }

        let samples = crate::audio::prepare(waveform, &self.config)
            .map_err(|e| FingerprintError::Resample(e.to_string()))?;
        let descriptors = SpectralDescriptors::compute(&samples, &self.config);
        Ok(self.from_descriptors(&descriptors))
    }

    /// Build the fingerprint from already computed descriptors
    pub fn from_descriptors(&self, descriptors: &SpectralDescriptors) -> Fingerprint {
        let mfcc_mean = descriptors.mfcc_mean();
        let chroma_mean = descriptors.chroma_mean();
        let rms: Vec<f64> = descriptors.rms.iter().map(|&v| v as f64).collect();

        let k = self.config.energy_frames;
        if rms.len() < k {
            log::warn!(
                "Energy digest computed over {} frames instead of {}; short excerpts match less reliably",
                rms.len(),
                k
            );
        }

        let summary = CompactSummary {
            mfcc_mean: mean_f64(&mfcc_mean),
            chroma_mean: mean_f64(&chroma_mean),
            rms_mean: mean(&descriptors.rms),
            zcr_mean: mean(&descriptors.zcr),
        };

        Fingerprint {
            mfcc_hash: wide::mfcc_digest(&mfcc_mean),
            chroma_hash: wide::chroma_digest(&chroma_mean),
            energy_hash: wide::energy_digest(&rms, k),
            compact_hash: summary.digest(),
        }
    }
}

fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
