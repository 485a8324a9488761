//! Catalog index of ingested tracks
//!
//! Entries are immutable and shared through copy-on-write snapshots:
//! searches read an `Arc<CatalogSnapshot>` while the single writer swaps in
//! a new snapshot, so a reader sees either the old or the new state.

mod persist;

use crate::analysis::TrackAnalysis;
use crate::error::CatalogError;
use crate::features::FeatureVector;
use crate::fingerprint::Fingerprint;
use crate::similarity::AudioDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

const VOCAL_KEYWORDS: [&str; 3] = ["vocals", "vocal", "lyrics"];
const MUSIC_KEYWORDS: [&str; 3] = ["music", "instruments", "instrumental"];

/// Track category, derived from the track name only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    Vocals,
    Music,
    Original,
}

impl TrackType {
    /// Type of a two-track blend: equal types are kept, any other pair
    /// (including any `Original`) is an `Original`.
    pub fn merge(self, other: TrackType) -> TrackType {
        match (self, other) {
            (TrackType::Vocals, TrackType::Vocals) => TrackType::Vocals,
            (TrackType::Music, TrackType::Music) => TrackType::Music,
            _ => TrackType::Original,
        }
    }
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackType::Vocals => "vocals",
            TrackType::Music => "music",
            TrackType::Original => "original",
        };
        f.write_str(name)
    }
}

/// Classify a track by case-insensitive keyword match on its name
pub fn classify(track_id: &str) -> TrackType {
    let name = track_id.to_lowercase();
    if VOCAL_KEYWORDS.iter().any(|k| name.contains(k)) {
        TrackType::Vocals
    } else if MUSIC_KEYWORDS.iter().any(|k| name.contains(k)) {
        TrackType::Music
    } else {
        TrackType::Original
    }
}

/// Song name of an audio file: the file stem without its leading
/// `<prefix>_` (e.g. a team number).
pub fn song_name_from_file(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let name = stem.split_once('_').map_or(stem, |(_, rest)| rest);
    Some(name.to_string())
}

/// One ingested track
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub track_id: String,
    pub track_type: TrackType,
    pub features: FeatureVector,
    pub fingerprint: Fingerprint,
    pub feature_digest: String,
}

impl CatalogEntry {
    pub fn new(track_id: impl Into<String>, analysis: TrackAnalysis) -> Self {
        let track_id = track_id.into();
        Self {
            track_type: classify(&track_id),
            feature_digest: analysis.features.digest(),
            features: analysis.features,
            fingerprint: analysis.fingerprint,
            track_id,
        }
    }
}

impl AudioDescriptor for CatalogEntry {
    fn features(&self) -> &FeatureVector {
        &self.features
    }

    fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }
}

/// Immutable view of the catalog at one point in time
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    entries: Vec<Arc<CatalogEntry>>,
    by_id: HashMap<String, usize>,
    /// First entry holding each feature digest
    by_digest: HashMap<String, usize>,
}

impl CatalogSnapshot {
    pub fn entries(&self) -> &[Arc<CatalogEntry>] {
        &self.entries
    }

    pub fn get(&self, track_id: &str) -> Option<&Arc<CatalogEntry>> {
        self.by_id.get(track_id).map(|&idx| &self.entries[idx])
    }

    pub fn contains(&self, track_id: &str) -> bool {
        self.by_id.contains_key(track_id)
    }

    /// An entry whose features are identical to `digest`'s, if any
    pub fn find_digest(&self, digest: &str) -> Option<&Arc<CatalogEntry>> {
        self.by_digest.get(digest).map(|&idx| &self.entries[idx])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, entry: CatalogEntry) -> Result<Arc<CatalogEntry>, CatalogError> {
        if self.contains(&entry.track_id) {
            return Err(CatalogError::DuplicateTrack(entry.track_id));
        }
        let idx = self.entries.len();
        self.by_id.insert(entry.track_id.clone(), idx);
        self.by_digest.entry(entry.feature_digest.clone()).or_insert(idx);
        let entry = Arc::new(entry);
        self.entries.push(Arc::clone(&entry));
        Ok(entry)
    }

    /// [`CatalogSnapshot::push`], warning when the audio is already present
    /// under another name
    fn push_checked(&mut self, entry: CatalogEntry) -> Result<Arc<CatalogEntry>, CatalogError> {
        if !self.contains(&entry.track_id) {
            if let Some(existing) = self.find_digest(&entry.feature_digest) {
                log::warn!(
                    "'{}' has the same features as catalog entry '{}'",
                    entry.track_id,
                    existing.track_id
                );
            }
        }
        self.push(entry)
    }
}

/// Shared, append-only catalog
#[derive(Debug, Default)]
pub struct CatalogIndex {
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from entries, rejecting duplicate track ids
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Result<Self, CatalogError> {
        let mut snapshot = CatalogSnapshot::default();
        for entry in entries {
            snapshot.push(entry)?;
        }
        Ok(Self {
            current: RwLock::new(Arc::new(snapshot)),
        })
    }

    /// The current state; cheap, and unaffected by later inserts
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Append one entry. Writers are serialised by the lock; readers keep
    /// whichever snapshot they already hold.
    pub fn insert(&self, entry: CatalogEntry) -> Result<Arc<CatalogEntry>, CatalogError> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if guard.contains(&entry.track_id) {
            return Err(CatalogError::DuplicateTrack(entry.track_id));
        }

        let mut next = CatalogSnapshot::clone(&guard);
        let entry = next.push_checked(entry)?;
        *guard = Arc::new(next);
        log::debug!("Inserted '{}' ({}), catalog size {}", entry.track_id, entry.track_type, guard.len());
        Ok(entry)
    }

    /// Append a batch under one write lock, publishing a single new
    /// snapshot. Each entry gets its own result; a duplicate id (against the
    /// catalog or earlier in the batch) does not stop the others.
    pub fn insert_all(
        &self,
        entries: impl IntoIterator<Item = CatalogEntry>,
    ) -> Vec<Result<Arc<CatalogEntry>, CatalogError>> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = CatalogSnapshot::clone(&guard);
        let results: Vec<_> = entries.into_iter().map(|e| next.push_checked(e)).collect();

        if next.len() != guard.len() {
            log::debug!("Inserted {} entries, catalog size {}", next.len() - guard.len(), next.len());
            *guard = Arc::new(next);
        }
        results
    }

    pub fn contains(&self, track_id: &str) -> bool {
        self.snapshot().contains(track_id)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn entry(track_id: &str, seed: f64) -> CatalogEntry {
        CatalogEntry::new(
            track_id,
            TrackAnalysis {
                features: FeatureVector {
                    spectral_centroid: 1000.0 + seed,
                    spectral_bandwidth: 900.0,
                    mfcc: vec![seed; 13],
                    chroma: vec![0.5; 12],
                    spectral_contrast: vec![20.0; 7],
                },
                fingerprint: Fingerprint {
                    mfcc_hash: "ab".repeat(32),
                    chroma_hash: "cd".repeat(32),
                    energy_hash: "ef".repeat(32),
                    compact_hash: "01020304".to_string(),
                },
            },
        )
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("Adele_Hello_Vocals"), TrackType::Vocals);
        assert_eq!(classify("song (lyrics)"), TrackType::Vocals);
        assert_eq!(classify("Hello_INSTRUMENTAL"), TrackType::Music);
        assert_eq!(classify("hello-music"), TrackType::Music);
        assert_eq!(classify("Hello"), TrackType::Original);
        assert_eq!(classify(""), TrackType::Original);
    }

    #[test]
    fn test_merge_rule() {
        use TrackType::*;
        assert_eq!(Vocals.merge(Vocals), Vocals);
        assert_eq!(Music.merge(Music), Music);
        assert_eq!(Vocals.merge(Music), Original);
        assert_eq!(Music.merge(Vocals), Original);
        assert_eq!(Original.merge(Original), Original);
        assert_eq!(Original.merge(Vocals), Original);
        assert_eq!(Music.merge(Original), Original);
    }

    #[test]
    fn test_song_name_from_file() {
        assert_eq!(
            song_name_from_file(Path::new("Music/12_Hello_vocals.wav")).as_deref(),
            Some("Hello_vocals")
        );
        assert_eq!(
            song_name_from_file(Path::new("plain.mp3")).as_deref(),
            Some("plain")
        );
    }

    #[test]
    fn test_insert_and_lookup() {
        let index = CatalogIndex::new();
        assert!(index.is_empty());
        index.insert(entry("a_vocals", 1.0)).unwrap();
        index.insert(entry("b", 2.0)).unwrap();

        let snapshot = index.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("a_vocals").unwrap().track_type, TrackType::Vocals);
        assert!(snapshot.get("c").is_none());
    }

    #[test]
    fn test_duplicate_track_rejected() {
        let index = CatalogIndex::new();
        index.insert(entry("a", 1.0)).unwrap();
        assert!(matches!(
            index.insert(entry("a", 2.0)),
            Err(CatalogError::DuplicateTrack(id)) if id == "a"
        ));
        assert!(CatalogIndex::from_entries(vec![entry("x", 1.0), entry("x", 1.0)]).is_err());
    }

    #[test]
    fn test_snapshot_isolated_from_later_inserts() {
        let index = CatalogIndex::new();
        index.insert(entry("a", 1.0)).unwrap();
        let before = index.snapshot();
        index.insert(entry("b", 2.0)).unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(index.snapshot().len(), 2);
    }

    #[test]
    fn test_concurrent_readers_and_writer() {
        let index = Arc::new(CatalogIndex::new());
        let writer = {
            let index = Arc::clone(&index);
            std::thread::spawn(move || {
                for i in 0..50 {
                    index.insert(entry(&format!("t{}", i), i as f64)).unwrap();
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let snapshot = index.snapshot();
                        // Every visible entry is complete and indexed
                        for (i, e) in snapshot.entries().iter().enumerate() {
                            assert_eq!(snapshot.get(&e.track_id).map(|x| x.track_id.as_str()), Some(e.track_id.as_str()));
                            assert_eq!(e.track_id, format!("t{}", i));
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }
        assert_eq!(index.len(), 50);
    }

    #[test]
    fn test_insert_all_publishes_one_snapshot() {
        let index = CatalogIndex::new();
        index.insert(entry("a", 1.0)).unwrap();
        let before = index.snapshot();

        let results = index.insert_all(vec![entry("b", 2.0), entry("a", 3.0), entry("c", 4.0), entry("b", 5.0)]);
        assert!(results[0].is_ok());
        assert!(matches!(&results[1], Err(CatalogError::DuplicateTrack(id)) if id == "a"));
        assert!(results[2].is_ok());
        assert!(matches!(&results[3], Err(CatalogError::DuplicateTrack(id)) if id == "b"));

        assert_eq!(before.len(), 1);
        let after = index.snapshot();
        let ids: Vec<_> = after.entries().iter().map(|e| e.track_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(after.get("b").unwrap().features.mfcc[0], 2.0);
    }

    #[test]
    fn test_insert_all_without_new_entries_keeps_snapshot() {
        let index = CatalogIndex::new();
        index.insert(entry("a", 1.0)).unwrap();
        let before = index.snapshot();
        assert!(index.insert_all(vec![entry("a", 1.0)])[0].is_err());
        assert!(Arc::ptr_eq(&before, &index.snapshot()));
    }

    #[test]
    fn test_digest_lookup() {
        let index = CatalogIndex::new();
        index.insert(entry("first", 1.0)).unwrap();
        // Same features under a new name are accepted
        index.insert(entry("second", 1.0)).unwrap();
        index.insert(entry("other", 2.0)).unwrap();

        let snapshot = index.snapshot();
        let digest = &snapshot.get("second").unwrap().feature_digest;
        assert_eq!(snapshot.find_digest(digest).unwrap().track_id, "first");
        assert_eq!(
            snapshot.find_digest(&entry("other", 2.0).feature_digest).unwrap().track_id,
            "other"
        );
        assert!(snapshot.find_digest(&entry("x", 9.0).feature_digest).is_none());
    }
}
