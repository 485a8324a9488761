//! Spectral feature extraction
//!
//! Turns a waveform into a fixed-shape [`FeatureVector`]: time-averaged
//! centroid, bandwidth, MFCC, chroma and spectral contrast.

pub mod chroma;
pub mod mel;
pub mod spectral;

use crate::audio::{prepare, Waveform};
use crate::config::AnalysisConfig;
use crate::error::ExtractionError;
use crate::transform::{compute_stft, frame_signal};
use chroma::ChromaMapper;
use mel::MelFilterBank;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Time-averaged spectral descriptors of one excerpt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub spectral_centroid: f64,
    pub spectral_bandwidth: f64,
    pub mfcc: Vec<f64>,
    pub chroma: Vec<f64>,
    pub spectral_contrast: Vec<f64>,
}

impl FeatureVector {
    /// All values in field order: centroid, bandwidth, mfcc, chroma, contrast
    pub fn to_flat(&self) -> Vec<f64> {
        let mut flat = Vec::with_capacity(
            2 + self.mfcc.len() + self.chroma.len() + self.spectral_contrast.len(),
        );
        flat.push(self.spectral_centroid);
        flat.push(self.spectral_bandwidth);
        flat.extend_from_slice(&self.mfcc);
        flat.extend_from_slice(&self.chroma);
        flat.extend_from_slice(&self.spectral_contrast);
        flat
    }

    /// SHA-256 (hex) of the L2-normalised flat vector.
    ///
    /// Identical audio gives identical digests regardless of overall
    /// scale of the descriptors.
    pub fn digest(&self) -> String {
        let mut flat = self.to_flat();
        let norm = flat.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for v in &mut flat {
                *v /= norm;
            }
        }

        let mut hasher = Sha256::new();
        for v in &flat {
            hasher.update(v.to_le_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

/// Per-frame descriptors of a prepared excerpt, shared by feature
/// extraction and fingerprinting
#[derive(Debug, Clone)]
pub struct SpectralDescriptors {
    pub centroid: Vec<f32>,
    pub bandwidth: Vec<f32>,
    /// mfcc[frame][coefficient]
    pub mfcc: Vec<Vec<f32>>,
    /// chroma[frame][pitch_class]
    pub chroma: Vec<Vec<f32>>,
    /// contrast[frame][band]
    pub contrast: Vec<Vec<f32>>,
    pub rms: Vec<f32>,
    pub zcr: Vec<f32>,
}

impl SpectralDescriptors {
    /// Analyse samples already at `config.sample_rate`
    pub fn compute(samples: &[f32], config: &AnalysisConfig) -> Self {
        let spectrogram = compute_stft(samples, config.sample_rate, config.n_fft, config.hop_length);
        let freqs = spectrogram.bin_frequencies();

        let bank = MelFilterBank::new(config.n_mels, config.sample_rate, config.n_fft);
        let chroma_mapper = ChromaMapper::new(&freqs, config.n_chroma);
        let bands =
            spectral::contrast_band_ranges(&freqs, config.contrast_bands, config.contrast_fmin);

        let mut centroid = Vec::with_capacity(spectrogram.num_frames);
        let mut bandwidth = Vec::with_capacity(spectrogram.num_frames);
        let mut contrast = Vec::with_capacity(spectrogram.num_frames);
        let mut chroma = Vec::with_capacity(spectrogram.num_frames);
        let mut power_frames = Vec::with_capacity(spectrogram.num_frames);

        for (t, frame) in spectrogram.magnitudes.iter().enumerate() {
            let c = spectral::spectral_centroid(frame, &freqs);
            centroid.push(c);
            bandwidth.push(spectral::spectral_bandwidth(frame, &freqs, c));
            contrast.push(spectral::spectral_contrast(frame, &bands, config.contrast_quantile));

            let power = spectrogram.power_frame(t);
            chroma.push(chroma_mapper.apply(&power));
            power_frames.push(power);
        }

        let mfcc = mel::mfcc_frames(&power_frames, &bank, config.n_mfcc);

        let time_frames = frame_signal(samples, config.n_fft, config.hop_length);
        let rms = time_frames.iter().map(|f| spectral::rms(f)).collect();
        let zcr = time_frames
            .iter()
            .map(|f| spectral::zero_crossing_rate(f))
            .collect();

        log::trace!(
            "Computed descriptors over {} frames ({} samples)",
            spectrogram.num_frames,
            samples.len()
        );

        Self {
            centroid,
            bandwidth,
            mfcc,
            chroma,
            contrast,
            rms,
            zcr,
        }
    }

    pub fn num_frames(&self) -> usize {
        self.centroid.len()
    }

    pub fn mfcc_mean(&self) -> Vec<f64> {
        column_means(&self.mfcc)
    }

    pub fn chroma_mean(&self) -> Vec<f64> {
        column_means(&self.chroma)
    }

    /// Collapse the frames into a [`FeatureVector`]
    pub fn summarize(&self) -> FeatureVector {
        FeatureVector {
            spectral_centroid: mean(&self.centroid),
            spectral_bandwidth: mean(&self.bandwidth),
            mfcc: self.mfcc_mean(),
            chroma: self.chroma_mean(),
            spectral_contrast: column_means(&self.contrast),
        }
    }
}

/// Mean of a series, 0 when empty
pub(crate) fn mean(values: &[f32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

/// Mean over frames of each column of a [frame][column] matrix
fn column_means(frames: &[Vec<f32>]) -> Vec<f64> {
    let width = frames.first().map_or(0, Vec::len);
    let mut sums = vec![0.0f64; width];
    for frame in frames {
        for (sum, &v) in sums.iter_mut().zip(frame) {
            *sum += v as f64;
        }
    }
    let n = frames.len().max(1) as f64;
    sums.into_iter().map(|s| s / n).collect()
}

/// Feature extractor
pub struct FeatureExtractor {
    config: AnalysisConfig,
}

impl FeatureExtractor {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Extract the feature vector of the leading analysis window
    pub fn extract(&self, waveform: &Waveform) -> Result<FeatureVector, ExtractionError> {
        let samples = self.prepare(waveform)?;
        Ok(SpectralDescriptors::compute(&samples, &self.config).summarize())
    }

    /// Validate, truncate and resample, ready for [`SpectralDescriptors::compute`]
    pub(crate) fn prepare(&self, waveform: &Waveform) -> Result<Vec<f32>, ExtractionError> {
        self.config.validate()?;
        if waveform.sample_rate() == 0 {
            return Err(ExtractionError::InvalidSampleRate(waveform.sample_rate()));
        }
        if waveform.is_empty() {
            return Err(ExtractionError::EmptyWaveform);
        }
        prepare(waveform, &self.config).map_err(|e| ExtractionError::Resample(e.to_string()))
    }
}
