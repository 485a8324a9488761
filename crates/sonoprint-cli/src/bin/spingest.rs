//! spingest - Add audio files to a Sonoprint catalog
//!
//! Usage: spingest [--catalog <dir>] [--config <file>] <inputs>...

use anyhow::Result;
use clap::Parser;
use rayon::prelude::*;
use sonoprint_cli::output::{print_ingest_summary, IngestStatus};
use sonoprint_cli::{collect_audio_files, init_logging};
use sonoprint_core::catalog::song_name_from_file;
use sonoprint_core::{analyze_file, CatalogEntry, CatalogError, CatalogIndex, Settings};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "spingest")]
#[command(about = "Analyse audio files and add them to a catalog", long_about = None)]
struct Args {
    /// Audio files or directories to ingest
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Catalog directory (overrides the config file)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let settings = Settings::load_or_default(&args.config)?;
    let catalog_dir = args
        .catalog
        .clone()
        .unwrap_or_else(|| PathBuf::from(&settings.catalog.directory));

    run_ingest(&args.inputs, &catalog_dir, &settings)
}

fn run_ingest(inputs: &[PathBuf], catalog_dir: &Path, settings: &Settings) -> Result<()> {
    let start = std::time::Instant::now();

    let files = collect_audio_files(inputs);
    if files.is_empty() {
        anyhow::bail!("No supported audio files found");
    }

    let catalog = CatalogIndex::load_or_empty(catalog_dir)?;
    log::info!(
        "Ingesting {} files into {} ({} existing entries)",
        files.len(),
        catalog_dir.display(),
        catalog.len()
    );

    // Analysis is independent per file; insertion stays single-writer
    let analysed: Vec<_> = files
        .par_iter()
        .map(|path| {
            let name = song_name_from_file(path);
            let result = match &name {
                Some(name) if catalog.contains(name) => None,
                Some(_) => Some(analyze_file(path, &settings.analysis)),
                None => None,
            };
            (path, name, result)
        })
        .collect();

    let mut statuses = Vec::with_capacity(analysed.len());
    let mut pending = Vec::new();
    for (path, name, result) in analysed {
        let file = path.display().to_string();
        let Some(name) = name else {
            statuses.push(IngestStatus::skipped(file, "cannot derive a song name"));
            continue;
        };
        match result {
            None => {
                statuses.push(IngestStatus::skipped(file, format!("'{}' is already in the catalog", name)));
            }
            Some(Err(e)) => {
                log::warn!("Failed to analyse {}: {:#}", file, e);
                statuses.push(IngestStatus::failed(file, format!("{:#}", e)));
            }
            Some(Ok(analysis)) => pending.push((file, CatalogEntry::new(name, analysis))),
        }
    }

    // One snapshot for the whole batch
    let (pending_files, entries): (Vec<_>, Vec<_>) = pending.into_iter().unzip();
    for (file, result) in pending_files.into_iter().zip(catalog.insert_all(entries)) {
        match result {
            Ok(entry) => statuses.push(IngestStatus::ingested(file, entry.track_id.clone(), entry.track_type)),
            Err(e @ CatalogError::DuplicateTrack(_)) => {
                statuses.push(IngestStatus::skipped(file, e.to_string()))
            }
            Err(e) => return Err(e.into()),
        }
    }

    if statuses.iter().any(|s| s.status == "ingested") {
        catalog.save(catalog_dir)?;
    }

    print_ingest_summary(
        &catalog_dir.display().to_string(),
        catalog.len(),
        start.elapsed().as_secs_f64(),
        &statuses,
    );
    Ok(())
}
