//! Error types for the analysis, scoring and search pipeline

use thiserror::Error;

/// Feature extraction failures
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("cannot extract features from an empty waveform")]
    EmptyWaveform,

    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    #[error("resampling failed: {0}")]
    Resample(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Fingerprint generation failures
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("cannot fingerprint an empty waveform")]
    EmptyWaveform,

    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    #[error("resampling failed: {0}")]
    Resample(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Digest comparison failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimilarityError {
    #[error(transparent)]
    LengthMismatch(#[from] LengthMismatchError),

    #[error("{field} is not valid hex: {value:?}")]
    InvalidHex { field: &'static str, value: String },

    #[error("alpha must be within [0, 1], got {0}")]
    InvalidAlpha(f64),
}

/// Two digests of the same family have different lengths
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} length mismatch: {left} vs {right} bytes")]
pub struct LengthMismatchError {
    pub field: &'static str,
    pub left: usize,
    pub right: usize,
}

/// Catalog load, save and ingestion failures
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),

    #[error("track '{0}' is already in the catalog")]
    DuplicateTrack(String),

    #[error("failed to persist catalog: {0}")]
    Persist(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),
}

/// Search request failures
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("alpha must be within [0, 1], got {0}")]
    InvalidAlpha(f64),

    #[error("top_n must be greater than zero")]
    InvalidTopN,

    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),
}

/// Invalid analysis or search configuration
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid configuration: {0}")]
pub struct ConfigError(pub String);
