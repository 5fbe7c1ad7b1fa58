pub mod analysis;
pub mod config;
pub mod decoding;
pub mod error;
pub mod melody;
pub mod playlist;
pub mod utils;

pub use config::{AnalysisConfig, PitchMethod};
pub use error::{MelodyError, Result};

use analysis::{SongReport, SongStatus};
use log::{debug, info, warn};
use playlist::{Playlist, PlaylistEntry};
use std::fs;
use std::io;
use std::path::{Component, Path};

/// Counts reported after a library run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibrarySummary {
    pub analyzed: usize,
    pub cached: usize,
    pub failed: usize,
    pub entries: usize,
    pub playlist_written: bool,
}

pub fn process_library(
    songs_dir: &Path,
    config: &AnalysisConfig,
    num_threads: usize,
) -> io::Result<Vec<SongReport>> {
    info!(
        "Processing songs at: {:?} with {} threads using {}",
        songs_dir, num_threads, config.method
    );
    config.validate()?;

    analysis::process_songs_parallel(songs_dir, config, num_threads)
}

/// One entry per song that has a melody file, sorted by name
pub fn build_playlist(reports: &[SongReport], songs_prefix: &str) -> Playlist {
    let mut playlist = Playlist::new();

    for report in reports.iter().filter(|r| r.status.is_usable()) {
        match PlaylistEntry::for_song(&report.mp3_path, songs_prefix) {
            Some(entry) => playlist.add(entry),
            None => warn!("Cannot name playlist entry for {:?}", report.mp3_path),
        }
    }

    playlist.sort_by_name();
    playlist
}

/// Analyze every song in `songs_dir` and write the playlist to `playlist_path`.
///
/// A missing songs directory is created and nothing else happens, so the user
/// can drop MP3 files into it and run again.
pub fn analyze_library(
    songs_dir: &Path,
    playlist_path: &Path,
    num_threads: usize,
    config: &AnalysisConfig,
) -> io::Result<LibrarySummary> {
    info!("Starting library analysis");
    debug!(
        "Songs path: {:?}, Playlist path: {:?}",
        songs_dir, playlist_path
    );

    if !songs_dir.exists() {
        fs::create_dir_all(songs_dir)?;
        warn!(
            "Created songs directory {:?}; put MP3 files in it and run again",
            songs_dir
        );
        return Ok(LibrarySummary::default());
    }

    let reports = process_library(songs_dir, config, num_threads)?;

    let prefix = songs_prefix(songs_dir, playlist_path);
    debug!("Playlist paths are prefixed with {:?}", prefix);
    let playlist = build_playlist(&reports, &prefix);

    info!("Exporting playlist to JSON at {:?}", playlist_path);
    utils::io::export_playlist_to_json(&playlist, playlist_path)?;

    let summary = LibrarySummary {
        analyzed: reports
            .iter()
            .filter(|r| matches!(r.status, SongStatus::Analyzed { .. }))
            .count(),
        cached: reports
            .iter()
            .filter(|r| r.status == SongStatus::Cached)
            .count(),
        failed: reports.iter().filter(|r| !r.status.is_usable()).count(),
        entries: playlist.len(),
        playlist_written: true,
    };

    info!(
        "Analysis complete: {} analyzed, {} cached, {} failed, {} playlist entries",
        summary.analyzed, summary.cached, summary.failed, summary.entries
    );

    Ok(summary)
}

/// Location of `songs_dir` relative to the playlist's directory, `/`-separated.
///
/// Falls back to the directory name when the songs are not below the playlist.
pub fn songs_prefix(songs_dir: &Path, playlist_path: &Path) -> String {
    let playlist_dir = match playlist_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };

    let relative = match (fs::canonicalize(songs_dir), fs::canonicalize(&playlist_dir)) {
        (Ok(songs), Ok(base)) => songs.strip_prefix(&base).ok().map(|p| p.to_path_buf()),
        _ => None,
    };

    match relative {
        Some(rel) => {
            let parts: Vec<String> = rel
                .components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect();
            if parts.is_empty() {
                ".".to_string()
            } else {
                parts.join("/")
            }
        }
        None => songs_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".".to_string()),
    }
}

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
