//! JSON output formatting

use serde::Serialize;
use sonoprint_core::{SearchReport, SimilarityResult, TrackType};

#[derive(Serialize)]
struct SearchOutput<'a> {
    query: &'a str,
    query_type: TrackType,
    candidates: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    timed_out: bool,
    results: &'a [SimilarityResult],
}

/// Outcome of ingesting one file
#[derive(Debug, Serialize)]
pub struct IngestStatus {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_type: Option<TrackType>,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl IngestStatus {
    pub fn ingested(file: String, song_name: String, track_type: TrackType) -> Self {
        Self {
            file,
            song_name: Some(song_name),
            track_type: Some(track_type),
            status: "ingested",
            reason: None,
        }
    }

    pub fn skipped(file: String, reason: impl Into<String>) -> Self {
        Self {
            file,
            song_name: None,
            track_type: None,
            status: "skipped",
            reason: Some(reason.into()),
        }
    }

    pub fn failed(file: String, reason: impl Into<String>) -> Self {
        Self {
            file,
            song_name: None,
            track_type: None,
            status: "failed",
            reason: Some(reason.into()),
        }
    }
}

#[derive(Serialize)]
struct IngestOutput<'a> {
    catalog: &'a str,
    catalog_size: usize,
    ingested: usize,
    processing_time_seconds: f64,
    files: &'a [IngestStatus],
}

/// Print any serialisable value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing output: {}", e),
    }
}

/// Print a search report as `{query, query_type, results}`
pub fn print_search_report(query: &str, query_type: TrackType, report: &SearchReport) {
    if !report.failures.is_empty() {
        log::info!(
            "{} candidates could not be scored",
            report.failures.len()
        );
    }
    print_json(&SearchOutput {
        query,
        query_type,
        candidates: report.candidates,
        timed_out: report.timed_out,
        results: &report.results,
    });
}

/// Print the per-file summary of an ingestion run
pub fn print_ingest_summary(catalog: &str, catalog_size: usize, elapsed_s: f64, files: &[IngestStatus]) {
    print_json(&IngestOutput {
        catalog,
        catalog_size,
        ingested: files.iter().filter(|f| f.status == "ingested").count(),
        processing_time_seconds: elapsed_s,
        files,
    });
}
