//! Single-pass analysis producing both the feature vector and the
//! fingerprint of a waveform

use crate::audio::Waveform;
use crate::config::AnalysisConfig;
use crate::error::ExtractionError;
use crate::features::{FeatureExtractor, FeatureVector, SpectralDescriptors};
use crate::fingerprint::{Fingerprint, FingerprintGenerator};
use crate::similarity::AudioDescriptor;
use serde::{Deserialize, Serialize};

/// Feature vector and fingerprint of one excerpt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackAnalysis {
    pub features: FeatureVector,
    pub fingerprint: Fingerprint,
}

impl AudioDescriptor for TrackAnalysis {
    fn features(&self) -> &FeatureVector {
        &self.features
    }

    fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }
}

/// Analyse `waveform` once and derive both products from the same
/// descriptors. Equal to running [`FeatureExtractor::extract`] and
/// [`FingerprintGenerator::generate`] separately.
pub fn analyze(waveform: &Waveform, config: &AnalysisConfig) -> Result<TrackAnalysis, ExtractionError> {
    let samples = FeatureExtractor::new(config).prepare(waveform)?;
    let descriptors = SpectralDescriptors::compute(&samples, config);

    log::debug!(
        "Analysed {:.1}s excerpt ({} frames)",
        samples.len() as f64 / config.sample_rate as f64,
        descriptors.num_frames()
    );

    Ok(TrackAnalysis {
        features: descriptors.summarize(),
        fingerprint: FingerprintGenerator::new(config).from_descriptors(&descriptors),
    })
}
