//! Search orchestration: type filtering, candidate scoring and ranking
//!
//! A search reads one immutable [`CatalogSnapshot`]; it never writes to the
//! catalog, so an abandoned or timed-out search leaves it untouched.

use crate::analysis::{analyze, TrackAnalysis};
use crate::audio::Waveform;
use crate::catalog::{classify, CatalogEntry, CatalogSnapshot, TrackType};
use crate::config::AnalysisConfig;
use crate::error::{ExtractionError, SearchError, SimilarityError};
use crate::features::FeatureVector;
use crate::fingerprint::Fingerprint;
use crate::settings::SearchSettings;
use crate::similarity::{combined_similarity, AudioDescriptor};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};


/// An immutable search request built from one track or a two-track blend
#[derive(Debug, Clone)]
pub struct Query {
    label: String,
    track_type: TrackType,
    analysis: TrackAnalysis,
}

impl Query {
    /// Query for a single track; its type comes from the name
    pub fn single(track_id: impl Into<String>, analysis: TrackAnalysis) -> Self {
        let label = track_id.into();
        Self {
            track_type: classify(&label),
            label,
            analysis,
        }
    }

    /// Query for a blend of two tracks, typed with [`TrackType::merge`]
    pub fn blend(first_id: &str, second_id: &str, analysis: TrackAnalysis) -> Self {
        Self {
            label: format!("{} + {}", first_id, second_id),
            track_type: classify(first_id).merge(classify(second_id)),
            analysis,
        }
    }

    /// Analyse `waveform` and build a single-track query from it
    pub fn from_waveform(
        track_id: impl Into<String>,
        waveform: &Waveform,
        config: &AnalysisConfig,
    ) -> Result<Self, ExtractionError> {
        Ok(Self::single(track_id, analyze(waveform, config)?))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn track_type(&self) -> TrackType {
        self.track_type
    }
}

impl AudioDescriptor for Query {
    fn features(&self) -> &FeatureVector {
        &self.analysis.features
    }

    fn fingerprint(&self) -> &Fingerprint {
        &self.analysis.fingerprint
    }
}

/// One ranked catalog match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityResult {
    #[serde(rename = "song_name")]
    pub track_id: String,
    pub similarity: f64,
}

/// A candidate that could not be scored
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFailure {
    pub track_id: String,
    pub error: SimilarityError,
}

/// Ranked results plus what happened to every candidate
#[derive(Debug, Clone, Default)]
pub struct SearchReport {
    pub results: Vec<SimilarityResult>,
    /// Entries that passed the type filter
    pub candidates: usize,
    /// Candidates that produced a score
    pub scored: usize,
    pub failures: Vec<CandidateFailure>,
    /// The deadline expired before every candidate was scored
    pub timed_out: bool,
}

/// Scheduling options for [`Searcher`]
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Candidate count above which scoring runs on the worker pool
    pub parallel_threshold: usize,
    /// Worker pool size, 0 lets rayon pick
    pub max_workers: usize,
    pub timeout: Option<Duration>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::from(&SearchSettings::default())
    }
}

impl From<&SearchSettings> for SearchOptions {
    fn from(settings: &SearchSettings) -> Self {
        Self {
            parallel_threshold: settings.parallel_threshold,
            max_workers: settings.max_workers,
            timeout: settings.timeout(),
        }
    }
}

enum Outcome {
    Scored(SimilarityResult),
    Failed(CandidateFailure),
    Skipped,
}

/// Runs searches against catalog snapshots on a bounded worker pool
pub struct Searcher {
    options: SearchOptions,
    pool: rayon::ThreadPool,
}

impl Searcher {
    pub fn new(options: SearchOptions) -> Result<Self, SearchError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.max_workers)
            .thread_name(|i| format!("sonoprint-search-{}", i))
            .build()
            .map_err(|e| SearchError::WorkerPool(e.to_string()))?;
        Ok(Self { options, pool })
    }

    /// Top `top_n` entries of the query's type, best first
    pub fn search(
        &self,
        snapshot: &CatalogSnapshot,
        query: &Query,
        top_n: usize,
        alpha: f64,
    ) -> Result<Vec<SimilarityResult>, SearchError> {
        Ok(self.search_with_report(snapshot, query, top_n, alpha)?.results)
    }

    /// Like [`Searcher::search`], also reporting failed and skipped candidates
    pub fn search_with_report(
        &self,
        snapshot: &CatalogSnapshot,
        query: &Query,
        top_n: usize,
        alpha: f64,
    ) -> Result<SearchReport, SearchError> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(SearchError::InvalidAlpha(alpha));
        }
        if top_n == 0 {
            return Err(SearchError::InvalidTopN);
        }

        let candidates: Vec<&CatalogEntry> = snapshot
            .entries()
            .iter()
            .map(|e| e.as_ref())
            .filter(|e| e.track_type == query.track_type)
            .collect();

        log::debug!(
            "Searching '{}' ({}) against {} of {} catalog entries",
            query.label,
            query.track_type,
            candidates.len(),
            snapshot.len()
        );

        let deadline = self.options.timeout.map(|t| Instant::now() + t);
        let expired = AtomicBool::new(false);
        let score = |entry: &CatalogEntry| -> Outcome {
            if let Some(deadline) = deadline {
                if expired.load(Ordering::Relaxed) || Instant::now() >= deadline {
                    expired.store(true, Ordering::Relaxed);
                    return Outcome::Skipped;
                }
            }
            match combined_similarity(query, entry, alpha) {
                Ok(similarity) => Outcome::Scored(SimilarityResult {
                    track_id: entry.track_id.clone(),
                    similarity,
                }),
                Err(error) => Outcome::Failed(CandidateFailure {
                    track_id: entry.track_id.clone(),
                    error,
                }),
            }
        };

        let outcomes: Vec<Outcome> = if candidates.len() > self.options.parallel_threshold {
            self.pool
                .install(|| candidates.par_iter().map(|&e| score(e)).collect())
        } else {
            candidates.iter().map(|&e| score(e)).collect()
        };

        let mut report = SearchReport {
            candidates: candidates.len(),
            ..SearchReport::default()
        };
        for outcome in outcomes {
            match outcome {
                Outcome::Scored(result) => report.results.push(result),
                Outcome::Failed(failure) => {
                    log::warn!(
                        "Skipping candidate '{}': {}",
                        failure.track_id,
                        failure.error
                    );
                    report.failures.push(failure);
                }
                Outcome::Skipped => {}
            }
        }
        report.scored = report.results.len();
        report.timed_out = expired.into_inner();
        if report.timed_out {
            log::warn!(
                "Search deadline expired after scoring {} of {} candidates",
                report.scored,
                report.candidates
            );
        }

        rank(&mut report.results);
        report.results.truncate(top_n);
        Ok(report)
    }
}

/// Descending similarity, ties broken by ascending track id
fn rank(results: &mut [SimilarityResult]) {
    results.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.track_id.cmp(&b.track_id))
    });
}
