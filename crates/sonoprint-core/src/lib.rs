//! Sonoprint Core - audio similarity search
//!
//! Summarises a leading excerpt of each track into a spectral feature
//! vector and a multi-granularity fingerprint, keeps them in a catalog,
//! and ranks catalog entries of the same track type against a query.

pub mod analysis;
pub mod audio;
pub mod catalog;
pub mod config;
pub mod error;
pub mod features;
pub mod fingerprint;
pub mod ingest;
pub mod search;
pub mod settings;
pub mod similarity;
pub mod transform;

pub use analysis::{analyze, TrackAnalysis};
pub use audio::Waveform;
pub use catalog::{classify, CatalogEntry, CatalogIndex, CatalogSnapshot, TrackType};
pub use config::AnalysisConfig;
pub use error::{CatalogError, ExtractionError, FingerprintError, SearchError, SimilarityError};
pub use features::{FeatureExtractor, FeatureVector};
pub use fingerprint::{Fingerprint, FingerprintGenerator};
pub use ingest::{ingest, ingest_and_persist};
pub use search::{Query, SearchOptions, SearchReport, Searcher, SimilarityResult};
pub use settings::Settings;
pub use similarity::{combined_similarity, feature_similarity, hash_similarity, AudioDescriptor};

/// Decode an audio file and analyse its leading excerpt
pub fn analyze_file(path: &std::path::Path, config: &AnalysisConfig) -> anyhow::Result<TrackAnalysis> {
    let waveform = audio::decode_audio(path)?;

    log::info!(
        "Decoded {}: {:.1}s @ {}Hz",
        path.display(),
        waveform.duration_s(),
        waveform.sample_rate()
    );

    Ok(analyze(&waveform, config)?)
}
