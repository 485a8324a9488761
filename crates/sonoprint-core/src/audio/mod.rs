//! Audio decoding, resampling and waveform handling
//!
//! Decoding is the collaborator that turns a file into samples; the analysis
//! core only ever sees a [`Waveform`].

mod decoder;
mod resample;
mod waveform;

pub use decoder::{decode_audio, AudioData};
pub use resample::resample_to_target;
pub use waveform::{blend, prepare, Waveform};

use std::path::Path;

/// Supported audio formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    Flac,
    Ogg,
    Unknown,
}

impl AudioFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("wav") | Some("wave") => AudioFormat::Wav,
            Some("mp3") => AudioFormat::Mp3,
            Some("flac") => AudioFormat::Flac,
            Some("ogg") => AudioFormat::Ogg,
            _ => AudioFormat::Unknown,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, AudioFormat::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(AudioFormat::from_path(Path::new("a/b/12_song.WAV")), AudioFormat::Wav);
        assert_eq!(AudioFormat::from_path(Path::new("track.mp3")), AudioFormat::Mp3);
        assert_eq!(AudioFormat::from_path(Path::new("track.flac")), AudioFormat::Flac);
        assert!(!AudioFormat::from_path(Path::new("cover.png")).is_supported());
        assert!(!AudioFormat::from_path(Path::new("README")).is_supported());
    }
}
