//! Sonoprint catalog storage library
//!
//! Persists the catalog as two parallel JSON collections (fingerprints and
//! feature vectors) keyed by song name.

pub mod format;
pub mod reader;
pub mod writer;

pub use format::{
    CatalogData, CatalogRecord, FeatureRecord, FeaturesPayload, HashPayload, HashRecord,
    FEATURES_FILE, HASHES_FILE,
};
pub use reader::CatalogReader;
pub use writer::CatalogWriter;

use std::path::PathBuf;

/// Errors raised while reading or writing a catalog directory
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("catalog file not found: {0}")]
    Missing(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("inconsistent catalog: {0}")]
    Inconsistent(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
