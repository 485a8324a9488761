//! spsearch - Find the catalog tracks most similar to an audio file
//!
//! Usage:
//!   spsearch <file>                          # single track query
//!   spsearch <file1> <file2> --blend 70      # 70% file1 + 30% file2

use anyhow::{Context, Result};
use clap::Parser;
use sonoprint_cli::init_logging;
use sonoprint_cli::output::print_search_report;
use sonoprint_core::audio::{blend, decode_audio};
use sonoprint_core::catalog::song_name_from_file;
use sonoprint_core::{analyze, CatalogIndex, Query, SearchOptions, Searcher, Settings};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "spsearch")]
#[command(about = "Search a catalog for tracks similar to a query", long_about = None)]
struct Args {
    /// Query audio file
    file1: PathBuf,

    /// Optional second file, blended with the first
    file2: Option<PathBuf>,

    /// Share of the first file in the blend, in percent
    #[arg(long, default_value_t = 50.0)]
    blend: f32,

    /// Number of results (overrides the config file)
    #[arg(long)]
    top_n: Option<usize>,

    /// Feature weight against fingerprint weight, 0..=1 (overrides the config file)
    #[arg(long)]
    alpha: Option<f64>,

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

    let mut settings = Settings::load_or_default(&args.config)?;
    if let Some(top_n) = args.top_n {
        settings.search.top_n = top_n;
    }
    if let Some(alpha) = args.alpha {
        settings.search.alpha = alpha;
    }
    settings.search.validate()?;

    let catalog_dir = args
        .catalog
        .clone()
        .unwrap_or_else(|| PathBuf::from(&settings.catalog.directory));

    run_search(&args, &catalog_dir, &settings)
}

fn track_name(path: &Path) -> String {
    song_name_from_file(path).unwrap_or_else(|| path.display().to_string())
}

fn run_search(args: &Args, catalog_dir: &Path, settings: &Settings) -> Result<()> {
    let catalog = CatalogIndex::load(catalog_dir)?;

    let first = decode_audio(&args.file1)?;
    let first_name = track_name(&args.file1);

    let query = match &args.file2 {
        Some(file2) => {
            let second = decode_audio(file2)?;
            let second_name = track_name(file2);
            let mixed = blend(&first, &second, args.blend / 100.0).context("Failed to blend queries")?;
            log::info!(
                "Blending {} ({:.0}%) with {}",
                first_name,
                args.blend,
                second_name
            );
            Query::blend(&first_name, &second_name, analyze(&mixed, &settings.analysis)?)
        }
        None => Query::single(first_name, analyze(&first, &settings.analysis)?),
    };

    let searcher = Searcher::new(SearchOptions::from(&settings.search))?;
    let report = searcher.search_with_report(
        &catalog.snapshot(),
        &query,
        settings.search.top_n,
        settings.search.alpha,
    )?;

    log::info!(
        "Scored {} of {} candidates of type {}",
        report.scored,
        report.candidates,
        query.track_type()
    );

    print_search_report(query.label(), query.track_type(), &report);
    Ok(())
}
