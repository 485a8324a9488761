//! Ingestion of new tracks into the catalog

use crate::analysis::analyze;
use crate::audio::Waveform;
use crate::catalog::{CatalogEntry, CatalogIndex};
use crate::config::AnalysisConfig;
use crate::error::CatalogError;
use std::path::Path;
use std::sync::Arc;

/// Analyse `waveform` and add it to `catalog` under `track_id`.
///
/// Duplicate ids are rejected before any analysis runs; the check is
/// repeated under the catalog write lock so concurrent ingests of the
/// same id still leave exactly one entry.
pub fn ingest(
    catalog: &CatalogIndex,
    track_id: &str,
    waveform: &Waveform,
    config: &AnalysisConfig,
) -> Result<Arc<CatalogEntry>, CatalogError> {
    if catalog.contains(track_id) {
        return Err(CatalogError::DuplicateTrack(track_id.to_string()));
    }

    let analysis = analyze(waveform, config)?;
    let entry = catalog.insert(CatalogEntry::new(track_id, analysis))?;
    log::info!("Ingested '{}' as {}", entry.track_id, entry.track_type);
    Ok(entry)
}

/// [`ingest`] followed by a save of the whole catalog to `dir`
pub fn ingest_and_persist(
    catalog: &CatalogIndex,
    track_id: &str,
    waveform: &Waveform,
    config: &AnalysisConfig,
    dir: &Path,
) -> Result<Arc<CatalogEntry>, CatalogError> {
    let entry = ingest(catalog, track_id, waveform, config)?;
    catalog.save(dir)?;
    Ok(entry)
}
