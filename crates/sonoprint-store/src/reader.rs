//! Catalog directory reader

use crate::format::{CatalogData, CatalogRecord, FeatureRecord, HashRecord, FEATURES_FILE, HASHES_FILE};
use crate::{Result, StoreError};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub struct CatalogReader;

impl CatalogReader {
    /// Read both parallel collections from `dir` and join them by song name.
    pub fn read(dir: &Path) -> Result<CatalogData> {
        let hashes: Vec<HashRecord> = Self::read_json(&dir.join(HASHES_FILE))?;
        let features: Vec<FeatureRecord> = Self::read_json(&dir.join(FEATURES_FILE))?;

        log::debug!(
            "Read {} hash records and {} feature records from {}",
            hashes.len(),
            features.len(),
            dir.display()
        );

        Self::join(hashes, features)
    }

    /// Join the two collections. Hash order defines catalog order.
    pub fn join(hashes: Vec<HashRecord>, features: Vec<FeatureRecord>) -> Result<CatalogData> {
        if hashes.len() != features.len() {
            return Err(StoreError::Inconsistent(format!(
                "{} hash records but {} feature records",
                hashes.len(),
                features.len()
            )));
        }

        let mut by_name: HashMap<String, FeatureRecord> = HashMap::with_capacity(features.len());
        for record in features {
            let name = record.song_name.clone();
            if by_name.insert(name.clone(), record).is_some() {
                return Err(StoreError::Inconsistent(format!(
                    "duplicate feature record for '{}'",
                    name
                )));
            }
        }

        let mut data = CatalogData::new();
        for hash_record in hashes {
            let feature_record = by_name.remove(&hash_record.song_name).ok_or_else(|| {
                StoreError::Inconsistent(format!(
                    "no feature record for '{}'",
                    hash_record.song_name
                ))
            })?;

            let song_name = hash_record.song_name;
            let pushed = data.push(CatalogRecord {
                song_name: song_name.clone(),
                hash: hash_record.hash,
                features: feature_record.features,
                feature_digest: feature_record.feature_digest,
            });
            if !pushed {
                return Err(StoreError::Inconsistent(format!(
                    "duplicate hash record for '{}'",
                    song_name
                )));
            }
        }

        Ok(data)
    }

    fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::Missing(path.to_path_buf())
            } else {
                StoreError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|e| StoreError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
