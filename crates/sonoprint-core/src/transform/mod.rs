//! Short-time Fourier transform
//!
//! Centered, Hann-windowed frames transformed with rustfft. Frame `t`
//! covers samples `[t*hop - n_fft/2, t*hop + n_fft/2)` of the zero-padded
//! signal, giving `1 + len / hop` frames.

use rustfft::{num_complex::Complex, FftPlanner};
use std::f32::consts::PI;

/// Magnitude spectrogram
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// Magnitude values [time_frame][frequency_bin]
    pub magnitudes: Vec<Vec<f32>>,
    /// Number of time frames
    pub num_frames: usize,
    /// Number of frequency bins (`n_fft / 2 + 1`)
    pub num_bins: usize,
    pub n_fft: usize,
    pub sample_rate: u32,
}

impl Spectrogram {
    /// Centre frequency of every bin in Hz
    pub fn bin_frequencies(&self) -> Vec<f32> {
        let step = self.sample_rate as f32 / self.n_fft as f32;
        (0..self.num_bins).map(|bin| bin as f32 * step).collect()
    }

    /// Power (squared magnitude) of one frame
    pub fn power_frame(&self, frame: usize) -> Vec<f32> {
        self.magnitudes[frame].iter().map(|m| m * m).collect()
    }
}

/// Compute the magnitude STFT of `samples`
pub fn compute_stft(samples: &[f32], sample_rate: u32, n_fft: usize, hop: usize) -> Spectrogram {
    let frames = frame_signal(samples, n_fft, hop);
    let num_bins = n_fft / 2 + 1;

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n_fft);
    let window = create_hann_window(n_fft);

    let mut buffer = vec![Complex::new(0.0f32, 0.0); n_fft];
    let mut magnitudes = Vec::with_capacity(frames.len());

    for frame in &frames {
        for (slot, (&s, &w)) in buffer.iter_mut().zip(frame.iter().zip(window.iter())) {
            *slot = Complex::new(s * w, 0.0);
        }
        fft.process(&mut buffer);
        magnitudes.push(buffer[..num_bins].iter().map(|c| c.norm()).collect());
    }

    Spectrogram {
        num_frames: magnitudes.len(),
        magnitudes,
        num_bins,
        n_fft,
        sample_rate,
    }
}

/// Split `samples` into centered, zero-padded frames of `frame_length`
pub fn frame_signal(samples: &[f32], frame_length: usize, hop: usize) -> Vec<Vec<f32>> {
    let pad = frame_length / 2;
    let mut padded = vec![0.0f32; samples.len() + 2 * pad];
    padded[pad..pad + samples.len()].copy_from_slice(samples);

    let num_frames = 1 + samples.len() / hop;
    (0..num_frames)
        .map(|t| {
            let start = t * hop;
            let mut frame = vec![0.0f32; frame_length];
            let end = (start + frame_length).min(padded.len());
            frame[..end - start].copy_from_slice(&padded[start..end]);
            frame
        })
        .collect()
}

/// Periodic Hann window
pub fn create_hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / size as f32).cos())
        .collect()
}
