//! Immutable mono waveform and the preparation steps applied before analysis

use super::resample_to_target;
use crate::config::AnalysisConfig;
use anyhow::Result;

/// Mono samples together with their sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_s(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// The first `seconds` of audio, or everything if the waveform is shorter
    pub fn leading_window(&self, seconds: f64) -> &[f32] {
        let n = (seconds * self.sample_rate as f64).round() as usize;
        &self.samples[..n.min(self.samples.len())]
    }
}

/// Truncate to the analysis window and bring the samples to the canonical
/// analysis rate.
///
/// Callers validate emptiness and sample rate first; this only transforms.
pub fn prepare(waveform: &Waveform, config: &AnalysisConfig) -> Result<Vec<f32>> {
    let window = waveform.leading_window(config.analysis_window_s);
    resample_to_target(window, waveform.sample_rate(), config.sample_rate)
}

/// Mix two waveforms sample-wise: `weight * a + (1 - weight) * b`.
///
/// `b` is resampled to `a`'s rate when they differ; the result has the
/// length of the shorter input. `weight` is clamped into [0, 1].
pub fn blend(a: &Waveform, b: &Waveform, weight: f32) -> Result<Waveform> {
    if a.sample_rate() == 0 || b.sample_rate() == 0 {
        anyhow::bail!("cannot blend waveforms with a zero sample rate");
    }

    let weight = if weight.is_finite() { weight.clamp(0.0, 1.0) } else { 0.5 };
    let b_samples = resample_to_target(b.samples(), b.sample_rate(), a.sample_rate())?;

    let mixed: Vec<f32> = a
        .samples()
        .iter()
        .zip(b_samples.iter())
        .map(|(&x, &y)| weight * x + (1.0 - weight) * y)
        .collect();

    log::debug!(
        "Blended {} samples at {:.0}% / {:.0}%",
        mixed.len(),
        weight * 100.0,
        (1.0 - weight) * 100.0
    );

    Ok(Waveform::new(mixed, a.sample_rate()))
}
