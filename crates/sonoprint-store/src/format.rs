//! Persisted catalog layout
//!
//! `feature_hashes.json` holds `[{song_name, hash: {...}}]` and
//! `all_features.json` holds `[{song_name, features: {...}}]`. The two
//! collections are parallel and joined by `song_name` on load.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// File holding the fingerprint records
pub const HASHES_FILE: &str = "feature_hashes.json";

/// File holding the feature vector records
pub const FEATURES_FILE: &str = "all_features.json";

/// Hex digests of one track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashPayload {
    pub mfcc_hash: String,
    pub chroma_hash: String,
    pub energy_hash: String,
    pub compact_hash: String,
}

/// Time-averaged spectral descriptors of one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturesPayload {
    pub spectral_centroid: f64,
    pub spectral_bandwidth: f64,
    pub mfcc: Vec<f64>,
    pub chroma: Vec<f64>,
    pub spectral_contrast: Vec<f64>,
}

/// One entry of `feature_hashes.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashRecord {
    pub song_name: String,
    pub hash: HashPayload,
}

/// One entry of `all_features.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub song_name: String,
    pub features: FeaturesPayload,
    /// SHA-256 of the normalised feature vector, absent in older catalogs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_digest: Option<String>,
}

/// A joined record: fingerprint and features of one song
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRecord {
    pub song_name: String,
    pub hash: HashPayload,
    pub features: FeaturesPayload,
    pub feature_digest: Option<String>,
}

/// The whole catalog in insertion order, with O(1) lookup by song name
#[derive(Debug, Clone, Default)]
pub struct CatalogData {
    records: Vec<CatalogRecord>,
    by_name: HashMap<String, usize>,
}

impl CatalogData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, returning false (and leaving the data untouched)
    /// when the song name is already present.
    pub fn push(&mut self, record: CatalogRecord) -> bool {
        if self.by_name.contains_key(&record.song_name) {
            return false;
        }
        self.by_name
            .insert(record.song_name.clone(), self.records.len());
        self.records.push(record);
        true
    }

    pub fn get(&self, song_name: &str) -> Option<&CatalogRecord> {
        self.by_name.get(song_name).map(|&idx| &self.records[idx])
    }

    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Split into the two parallel collections written to disk
    pub fn split(&self) -> (Vec<HashRecord>, Vec<FeatureRecord>) {
        self.records
            .iter()
            .map(|r| {
                (
                    HashRecord {
                        song_name: r.song_name.clone(),
                        hash: r.hash.clone(),
                    },
                    FeatureRecord {
                        song_name: r.song_name.clone(),
                        features: r.features.clone(),
                        feature_digest: r.feature_digest.clone(),
                    },
                )
            })
            .unzip()
    }
}
