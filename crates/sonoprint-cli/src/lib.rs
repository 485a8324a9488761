//! Shared helpers for the Sonoprint command line tools

pub mod output;

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Initialise logging: silent by default so stdout stays parseable JSON,
/// Info level with `--verbose`.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Off
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

/// Expand `inputs` into the supported audio files they name, walking
/// directories recursively. Symlinks are followed; loops are reported and
/// skipped. The result is sorted and deduplicated.
pub fn collect_audio_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() && !is_audio(input) {
            log::warn!("Skipping unsupported input: {}", input.display());
            continue;
        }
        for entry in WalkDir::new(input).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable path: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_file() && is_audio(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    files.dedup();
    files
}

fn is_audio(path: &Path) -> bool {
    sonoprint_core::audio::AudioFormat::from_path(path).is_supported()
}
