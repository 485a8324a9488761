//! Catalog directory writer

use crate::format::{CatalogData, FEATURES_FILE, HASHES_FILE};
use crate::{Result, StoreError};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct CatalogWriter {}

impl CatalogWriter {
    pub fn new() -> Self {
        Self {}
    }

    /// Write both collections into `dir`, creating it if needed.
    ///
    /// Both files are first written to sibling temporary files; only when
    /// both are complete are they renamed into place, hashes first. Readers
    /// never observe a half-written file. A crash between the two renames
    /// can still leave a new hash file next to the previous features file,
    /// which the reader then reports as `Inconsistent`.
    pub fn write(&self, dir: &Path, data: &CatalogData) -> Result<()> {
        std::fs::create_dir_all(dir).map_err(|e| StoreError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let (hashes, features) = data.split();
        let hashes_path = dir.join(HASHES_FILE);
        let features_path = dir.join(FEATURES_FILE);
        let hashes_tmp = self.stage_json(&hashes_path, &hashes)?;
        let features_tmp = self.stage_json(&features_path, &features)?;

        Self::commit(&hashes_tmp, &hashes_path)?;
        Self::commit(&features_tmp, &features_path)?;

        log::debug!("Wrote {} records to {}", data.len(), dir.display());
        Ok(())
    }

    /// Serialise `value` next to `path`, returning the temporary file
    fn stage_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<PathBuf> {
        let tmp_path = path.with_extension("json.tmp");
        let io_err = |e| StoreError::Io {
            path: tmp_path.clone(),
            source: e,
        };

        let file = File::create(&tmp_path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value).map_err(|e| StoreError::Parse {
            path: tmp_path.clone(),
            source: e,
        })?;
        writer.flush().map_err(io_err)?;
        Ok(tmp_path)
    }

    fn commit(tmp_path: &Path, path: &Path) -> Result<()> {
        std::fs::rename(tmp_path, path).map_err(|e| StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl Default for CatalogWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{CatalogRecord, FeaturesPayload, HashPayload};
    use crate::reader::CatalogReader;

    #[test]
    fn test_write_then_read() {
        let dir = std::env::temp_dir().join(format!("sonoprint-store-write-{}", std::process::id()));
        let mut data = CatalogData::new();
        for name in ["vocals_one", "music_two"] {
            data.push(CatalogRecord {
                song_name: name.to_string(),
                hash: HashPayload {
                    mfcc_hash: "ab".repeat(32),
                    chroma_hash: "cd".repeat(32),
                    energy_hash: "ef".repeat(32),
                    compact_hash: "01234567".to_string(),
                },
                features: FeaturesPayload {
                    spectral_centroid: 1234.5,
                    spectral_bandwidth: 987.25,
                    mfcc: (0..13).map(|i| i as f64 * -1.5).collect(),
                    chroma: vec![0.25; 12],
                    spectral_contrast: vec![18.0; 7],
                },
                feature_digest: Some("ff".repeat(32)),
            });
        }

        CatalogWriter::new().write(&dir, &data).unwrap();
        assert!(dir.join(HASHES_FILE).is_file());
        assert!(dir.join(FEATURES_FILE).is_file());
        assert!(!dir.join("feature_hashes.json.tmp").exists());
        assert!(!dir.join("all_features.json.tmp").exists());

        let loaded = CatalogReader::read(&dir).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.records()[1].song_name, "music_two");
        assert_eq!(loaded.get("vocals_one"), data.get("vocals_one"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    fn record(name: &str, values: Vec<f64>) -> CatalogRecord {
        CatalogRecord {
            song_name: name.to_string(),
            hash: HashPayload {
                mfcc_hash: "ab".repeat(32),
                chroma_hash: "cd".repeat(32),
                energy_hash: "ef".repeat(32),
                compact_hash: "01234567".to_string(),
            },
            features: FeaturesPayload {
                spectral_centroid: values[0] * 1000.0,
                spectral_bandwidth: values[1] * 700.0,
                mfcc: values.clone(),
                chroma: values.iter().map(|v| v.abs().fract()).collect(),
                spectral_contrast: values.iter().map(|v| v * 3.7).collect(),
            },
            feature_digest: None,
        }
    }

    #[test]
    fn test_arbitrary_floats_survive_exactly() {
        let dir = std::env::temp_dir().join(format!("sonoprint-store-floats-{}", std::process::id()));
        let mut state = 0x2545_f491_4f6c_dd1du64;
        let mut data = CatalogData::new();
        for i in 0..200 {
            let values: Vec<f64> = (0..13)
                .map(|_| {
                    state ^= state << 13;
                    state ^= state >> 7;
                    state ^= state << 17;
                    (state >> 11) as f64 / (1u64 << 53) as f64 * 60.0 - 30.0
                })
                .collect();
            data.push(record(&format!("track_{}", i), values));
        }
        data.push(record("edge", vec![0.1, -10.574076175689695, 21.21903241764415, 1e-300, 5e-324]));

        CatalogWriter::new().write(&dir, &data).unwrap();
        let loaded = CatalogReader::read(&dir).unwrap();

        for (saved, read) in data.records().iter().zip(loaded.records()) {
            let bits = |r: &CatalogRecord| -> Vec<u64> {
                let f = &r.features;
                [f.spectral_centroid, f.spectral_bandwidth]
                    .iter()
                    .chain(&f.mfcc)
                    .chain(&f.chroma)
                    .chain(&f.spectral_contrast)
                    .map(|v| v.to_bits())
                    .collect()
            };
            assert_eq!(bits(saved), bits(read), "{}", saved.song_name);
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_rewrite_replaces_both_files() {
        let dir = std::env::temp_dir().join(format!("sonoprint-store-rewrite-{}", std::process::id()));
        let writer = CatalogWriter::new();

        let mut first = CatalogData::new();
        first.push(record("old", vec![1.0, 2.0, 3.0]));
        writer.write(&dir, &first).unwrap();

        // A leftover temporary file from an interrupted write is overwritten
        std::fs::write(dir.join("all_features.json.tmp"), "garbage").unwrap();

        let mut second = CatalogData::new();
        second.push(record("old", vec![1.0, 2.0, 3.0]));
        second.push(record("new", vec![4.0, 5.0, 6.0]));
        writer.write(&dir, &second).unwrap();

        let loaded = CatalogReader::read(&dir).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.get("new").is_some());
        assert!(!dir.join("all_features.json.tmp").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
