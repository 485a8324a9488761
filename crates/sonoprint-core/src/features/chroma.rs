//! Pitch-class energy (chroma) from a power spectrum

/// Lowest frequency folded into the chroma profile (C1)
const C1_HZ: f32 = 32.703_197;

/// Maps FFT bins onto pitch classes, C = 0
#[derive(Debug, Clone)]
pub struct ChromaMapper {
    /// Pitch class of every FFT bin, `None` below C1
    classes: Vec<Option<usize>>,
    n_chroma: usize,
}

impl ChromaMapper {
    pub fn new(freqs: &[f32], n_chroma: usize) -> Self {
        let classes = freqs
            .iter()
            .map(|&f| {
                if f < C1_HZ * 2f32.powf(-0.5 / n_chroma as f32) {
                    return None;
                }
                let position = (n_chroma as f32 * (f / C1_HZ).log2()).round() as i64;
                Some(position.rem_euclid(n_chroma as i64) as usize)
            })
            .collect();

        Self { classes, n_chroma }
    }

    /// Chroma vector of one power frame, normalised so its maximum is 1
    pub fn apply(&self, power: &[f32]) -> Vec<f32> {
        let mut chroma = vec![0.0f32; self.n_chroma];
        for (class, &p) in self.classes.iter().zip(power) {
            if let Some(c) = class {
                chroma[*c] += p;
            }
        }

        let max = chroma.iter().copied().fold(0.0f32, f32::max);
        if max > 0.0 {
            for value in &mut chroma {
                *value /= max;
            }
        }
        chroma
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bins() -> Vec<f32> {
        (0..1025).map(|i| i as f32 * 22050.0 / 2048.0).collect()
    }

    #[test]
    fn test_a440_maps_to_class_9() {
        let freqs = bins();
        let mapper = ChromaMapper::new(&freqs, 12);
        let a_bin = freqs
            .iter()
            .position(|&f| (f - 441.0).abs() < 6.0)
            .unwrap();

        let mut power = vec![0.0; freqs.len()];
        power[a_bin] = 4.0;
        let chroma = mapper.apply(&power);
        assert_eq!(chroma.len(), 12);
        assert_eq!(chroma[9], 1.0);
        assert_eq!(chroma.iter().filter(|&&c| c > 0.0).count(), 1);
    }

    #[test]
    fn test_dc_and_silence_ignored() {
        let freqs = bins();
        let mapper = ChromaMapper::new(&freqs, 12);
        let mut power = vec![0.0; freqs.len()];
        power[0] = 100.0;
        assert!(mapper.apply(&power).iter().all(|&c| c == 0.0));
    }
}
