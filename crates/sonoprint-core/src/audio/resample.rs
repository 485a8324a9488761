//! Audio resampling with rubato's FFT resampler

use anyhow::Result;
use rubato::{FftFixedIn, Resampler};

const CHUNK_SIZE: usize = 1024;

/// Resample mono audio from `from_rate` to `to_rate`.
///
/// The resampler delay is trimmed so the output starts at the same instant
/// as the input, and the output length is `round(len * to_rate / from_rate)`.
pub fn resample_to_target(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    if from_rate == 0 || to_rate == 0 {
        anyhow::bail!("cannot resample from {} Hz to {} Hz", from_rate, to_rate);
    }

    let expected =
        (samples.len() as f64 * to_rate as f64 / from_rate as f64).round() as usize;

    let mut resampler =
        FftFixedIn::<f32>::new(from_rate as usize, to_rate as usize, CHUNK_SIZE, 2, 1)?;
    let delay = resampler.output_delay();
    let mut output: Vec<f32> = Vec::with_capacity(expected + delay + CHUNK_SIZE);

    let mut pos = 0;
    while samples.len() - pos >= resampler.input_frames_next() {
        let n = resampler.input_frames_next();
        let input = [&samples[pos..pos + n]];
        let chunk = resampler.process(&input[..], None)?;
        output.extend_from_slice(&chunk[0]);
        pos += n;
    }

    if pos < samples.len() {
        let input = [&samples[pos..]];
        let chunk = resampler.process_partial(Some(&input[..]), None)?;
        output.extend_from_slice(&chunk[0]);
    }

    // Flush the samples still held back by the resampler delay
    while output.len() < expected + delay {
        let chunk = resampler.process_partial::<&[f32]>(None, None)?;
        if chunk[0].is_empty() {
            break;
        }
        output.extend_from_slice(&chunk[0]);
    }

    output.drain(..delay.min(output.len()));
    output.resize(expected, 0.0);

    log::trace!(
        "Resampled {} samples @ {}Hz to {} samples @ {}Hz",
        samples.len(),
        from_rate,
        output.len(),
        to_rate
    );

    Ok(output)
}
