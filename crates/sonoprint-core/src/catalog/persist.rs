//! Conversion between catalog entries and the on-disk store records

use super::{CatalogEntry, CatalogIndex};
use crate::error::CatalogError;
use crate::features::FeatureVector;
use crate::fingerprint::Fingerprint;
use sonoprint_store::{
    CatalogData, CatalogReader, CatalogRecord, CatalogWriter, FeaturesPayload, HashPayload,
    StoreError,
};
use std::path::Path;

impl From<&CatalogEntry> for CatalogRecord {
    fn from(entry: &CatalogEntry) -> Self {
        let f = &entry.features;
        let h = &entry.fingerprint;
        CatalogRecord {
            song_name: entry.track_id.clone(),
            hash: HashPayload {
                mfcc_hash: h.mfcc_hash.clone(),
                chroma_hash: h.chroma_hash.clone(),
                energy_hash: h.energy_hash.clone(),
                compact_hash: h.compact_hash.clone(),
            },
            features: FeaturesPayload {
                spectral_centroid: f.spectral_centroid,
                spectral_bandwidth: f.spectral_bandwidth,
                mfcc: f.mfcc.clone(),
                chroma: f.chroma.clone(),
                spectral_contrast: f.spectral_contrast.clone(),
            },
            feature_digest: Some(entry.feature_digest.clone()),
        }
    }
}

impl From<CatalogRecord> for CatalogEntry {
    fn from(record: CatalogRecord) -> Self {
        let features = FeatureVector {
            spectral_centroid: record.features.spectral_centroid,
            spectral_bandwidth: record.features.spectral_bandwidth,
            mfcc: record.features.mfcc,
            chroma: record.features.chroma,
            spectral_contrast: record.features.spectral_contrast,
        };
        // Older catalogs carry no digest
        let feature_digest = record
            .feature_digest
            .unwrap_or_else(|| features.digest());

        CatalogEntry {
            track_type: super::classify(&record.song_name),
            track_id: record.song_name,
            fingerprint: Fingerprint {
                mfcc_hash: record.hash.mfcc_hash,
                chroma_hash: record.hash.chroma_hash,
                energy_hash: record.hash.energy_hash,
                compact_hash: record.hash.compact_hash,
            },
            features,
            feature_digest,
        }
    }
}

impl CatalogIndex {
    /// Load a persisted catalog from `dir`
    pub fn load(dir: &Path) -> Result<Self, CatalogError> {
        let data = CatalogReader::read(dir).map_err(|e| CatalogError::Unavailable(e.to_string()))?;
        Self::from_data(dir, data)
    }

    /// Load `dir`, or start empty when the catalog files do not exist yet.
    /// Malformed files are still an error.
    pub fn load_or_empty(dir: &Path) -> Result<Self, CatalogError> {
        match CatalogReader::read(dir) {
            Ok(data) => Self::from_data(dir, data),
            Err(StoreError::Missing(path)) => {
                log::info!("No catalog at {}, starting empty", path.display());
                Ok(Self::new())
            }
            Err(e) => Err(CatalogError::Unavailable(e.to_string())),
        }
    }

    fn from_data(dir: &Path, data: CatalogData) -> Result<Self, CatalogError> {
        log::info!("Loaded {} catalog entries from {}", data.len(), dir.display());
        let records = data.records().to_vec();
        Self::from_entries(records.into_iter().map(CatalogEntry::from))
    }

    /// Write the current snapshot to `dir`
    pub fn save(&self, dir: &Path) -> Result<(), CatalogError> {
        let snapshot = self.snapshot();
        let mut data = CatalogData::new();
        for entry in snapshot.entries() {
            data.push(CatalogRecord::from(entry.as_ref()));
        }

        CatalogWriter::new()
            .write(dir, &data)
            .map_err(|e| CatalogError::Persist(e.to_string()))?;
        log::info!("Saved {} catalog entries to {}", data.len(), dir.display());
        Ok(())
    }
}
