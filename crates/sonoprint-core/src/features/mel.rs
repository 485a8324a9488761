//! Mel filter bank and cepstral coefficients

/// Slaney mel scale: linear below 1 kHz, logarithmic above
pub fn hz_to_mel(hz: f32) -> f32 {
    const F_SP: f32 = 200.0 / 3.0;
    const MIN_LOG_HZ: f32 = 1000.0;
    const MIN_LOG_MEL: f32 = MIN_LOG_HZ / F_SP;
    let logstep = 6.4f32.ln() / 27.0;

    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / logstep
    } else {
        hz / F_SP
    }
}

pub fn mel_to_hz(mel: f32) -> f32 {
    const F_SP: f32 = 200.0 / 3.0;
    const MIN_LOG_HZ: f32 = 1000.0;
    const MIN_LOG_MEL: f32 = MIN_LOG_HZ / F_SP;
    let logstep = 6.4f32.ln() / 27.0;

    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (logstep * (mel - MIN_LOG_MEL)).exp()
    } else {
        mel * F_SP
    }
}

/// Triangular, area-normalised mel filters over `[0, sr/2]`
#[derive(Debug, Clone)]
pub struct MelFilterBank {
    /// weights[filter][fft_bin]
    weights: Vec<Vec<f32>>,
}

impl MelFilterBank {
    pub fn new(n_mels: usize, sample_rate: u32, n_fft: usize) -> Self {
        let num_bins = n_fft / 2 + 1;
        let fft_freqs: Vec<f32> = (0..num_bins)
            .map(|bin| bin as f32 * sample_rate as f32 / n_fft as f32)
            .collect();

        let max_mel = hz_to_mel(sample_rate as f32 / 2.0);
        let mel_points: Vec<f32> = (0..n_mels + 2)
            .map(|i| mel_to_hz(max_mel * i as f32 / (n_mels + 1) as f32))
            .collect();

        let weights = (0..n_mels)
            .map(|m| {
                let (lower, center, upper) = (mel_points[m], mel_points[m + 1], mel_points[m + 2]);
                let enorm = 2.0 / (upper - lower);
                fft_freqs
                    .iter()
                    .map(|&f| {
                        let rising = (f - lower) / (center - lower);
                        let falling = (upper - f) / (upper - center);
                        rising.min(falling).max(0.0) * enorm
                    })
                    .collect()
            })
            .collect();

        Self { weights }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Mel band energies of one power-spectrum frame
    pub fn apply(&self, power: &[f32]) -> Vec<f32> {
        self.weights
            .iter()
            .map(|w| w.iter().zip(power).map(|(a, b)| a * b).sum())
            .collect()
    }
}

/// `10*log10(max(x, 1e-10))`
pub fn power_to_db(x: f32) -> f32 {
    10.0 * x.max(1e-10).log10()
}

/// Orthonormal DCT-II basis, `n_out` rows of length `n_in`
pub fn dct_basis(n_out: usize, n_in: usize) -> Vec<Vec<f32>> {
    let scale_0 = (1.0 / n_in as f32).sqrt();
    let scale_k = (2.0 / n_in as f32).sqrt();
    (0..n_out)
        .map(|k| {
            let scale = if k == 0 { scale_0 } else { scale_k };
            (0..n_in)
                .map(|n| {
                    scale
                        * (std::f32::consts::PI * k as f32 * (2.0 * n as f32 + 1.0)
                            / (2.0 * n_in as f32))
                            .cos()
                })
                .collect()
        })
        .collect()
}

/// MFCCs for every frame of a power spectrogram
///
/// Log mel energies are floored 80 dB below the loudest value of the whole
/// excerpt before the DCT.
pub fn mfcc_frames(power_frames: &[Vec<f32>], bank: &MelFilterBank, n_mfcc: usize) -> Vec<Vec<f32>> {
    const TOP_DB: f32 = 80.0;

    let log_mel: Vec<Vec<f32>> = power_frames
        .iter()
        .map(|frame| bank.apply(frame).into_iter().map(power_to_db).collect())
        .collect();

    let max_db = log_mel
        .iter()
        .flatten()
        .copied()
        .fold(f32::NEG_INFINITY, f32::max);
    let floor = max_db - TOP_DB;

    let basis = dct_basis(n_mfcc, bank.len());
    log_mel
        .iter()
        .map(|frame| {
            let clipped: Vec<f32> = frame.iter().map(|&v| v.max(floor)).collect();
            basis
                .iter()
                .map(|row| row.iter().zip(&clipped).map(|(b, v)| b * v).sum())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mel_scale_roundtrip() {
        for hz in [0.0, 440.0, 1000.0, 4000.0, 11025.0] {
            assert_relative_eq!(mel_to_hz(hz_to_mel(hz)), hz, max_relative = 1e-4);
        }
        assert_relative_eq!(hz_to_mel(1000.0), 15.0, epsilon = 1e-5);
    }

    #[test]
    fn test_filter_bank_shape() {
        let bank = MelFilterBank::new(128, 22050, 2048);
        assert_eq!(bank.len(), 128);
        let energies = bank.apply(&vec![1.0; 1025]);
        assert_eq!(energies.len(), 128);
        assert!(energies.iter().all(|&e| e >= 0.0));
    }

    #[test]
    fn test_dct_is_orthonormal() {
        let basis = dct_basis(8, 8);
        for i in 0..8 {
            for j in 0..8 {
                let dot: f32 = basis[i].iter().zip(&basis[j]).map(|(a, b)| a * b).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(dot, expected, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_mfcc_of_silence_is_constant() {
        let bank = MelFilterBank::new(40, 16000, 512);
        let frames = vec![vec![0.0; 257]; 4];
        let mfcc = mfcc_frames(&frames, &bank, 13);
        assert_eq!(mfcc.len(), 4);
        // Flat -100 dB log spectrum: only the DC coefficient is non-zero
        assert!(mfcc[0][0] < 0.0);
        assert!(mfcc[0][1..].iter().all(|c| c.abs() < 1e-2));
    }
}
