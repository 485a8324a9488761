//! Configuration parameters for spectral analysis and fingerprinting
//!
//! Defaults follow the common 22.05 kHz / 2048-point analysis setup.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Analysis configuration shared by the feature extractor and the
/// fingerprint generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    // Audio processing
    pub sample_rate: u32,
    pub analysis_window_s: f64,

    // Short-time transform
    pub n_fft: usize,
    pub hop_length: usize,

    // Descriptors
    pub n_mels: usize,
    pub n_mfcc: usize,
    pub n_chroma: usize,
    pub contrast_bands: usize,
    pub contrast_fmin: f32,
    pub contrast_quantile: f32,

    // Fingerprinting
    pub energy_frames: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            analysis_window_s: 30.0,

            n_fft: 2048,
            hop_length: 512,

            n_mels: 128,
            n_mfcc: 13,
            n_chroma: 12,
            contrast_bands: 6,
            contrast_fmin: 200.0,
            contrast_quantile: 0.02,

            energy_frames: 100,
        }
    }
}

impl AnalysisConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError("sample_rate must be > 0".into()));
        }
        if !(self.analysis_window_s > 0.0) {
            return Err(ConfigError("analysis_window_s must be > 0".into()));
        }
        if self.hop_length == 0 || self.n_fft < 2 * self.hop_length {
            return Err(ConfigError(
                "n_fft must be at least twice hop_length, hop_length > 0".into(),
            ));
        }
        if self.n_mels == 0 || self.n_mfcc == 0 || self.n_mfcc > self.n_mels {
            return Err(ConfigError("need 0 < n_mfcc <= n_mels".into()));
        }
        if self.n_chroma == 0 {
            return Err(ConfigError("n_chroma must be > 0".into()));
        }
        if self.contrast_bands == 0 || !(self.contrast_fmin > 0.0) {
            return Err(ConfigError(
                "contrast_bands and contrast_fmin must be > 0".into(),
            ));
        }
        let nyquist = self.sample_rate as f32 / 2.0;
        if self.contrast_fmin * 2f32.powi(self.contrast_bands as i32 - 1) >= nyquist {
            return Err(ConfigError(format!(
                "{} contrast bands from {} Hz exceed the Nyquist frequency",
                self.contrast_bands, self.contrast_fmin
            )));
        }
        if !(self.contrast_quantile > 0.0 && self.contrast_quantile < 0.5) {
            return Err(ConfigError("contrast_quantile must be in (0, 0.5)".into()));
        }
        if self.energy_frames == 0 {
            return Err(ConfigError("energy_frames must be > 0".into()));
        }
        Ok(())
    }

    /// Number of values in a spectral contrast vector
    pub fn contrast_len(&self) -> usize {
        self.contrast_bands + 1
    }

    /// Maximum number of samples analysed at the canonical rate
    pub fn window_samples(&self, sample_rate: u32) -> usize {
        (self.analysis_window_s * sample_rate as f64).round() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.contrast_len(), 7);
        assert_eq!(config.window_samples(22050), 661_500);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = AnalysisConfig::default();
        config.sample_rate = 0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.n_mfcc = 200;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.contrast_bands = 9;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.hop_length = 4096;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AnalysisConfig = toml::from_str("energy_frames = 50").unwrap();
        assert_eq!(config.energy_frames, 50);
        assert_eq!(config.n_fft, 2048);
    }
}
