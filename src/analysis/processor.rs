use crate::analysis::analyzer::{analyze_song, melody_path_for};
use crate::config::AnalysisConfig;
use crate::decoding::is_supported_audio;
use log::{debug, error, info, trace, warn};
use rayon::prelude::*;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq)]
pub enum SongStatus {
    /// Melody file already existed and was left alone
    Cached,
    Analyzed { points: usize },
    Failed { reason: String },
}

impl SongStatus {
    /// Whether the song has a melody file and belongs in the playlist
    pub fn is_usable(&self) -> bool {
        !matches!(self, SongStatus::Failed { .. })
    }
}

#[derive(Debug, Clone)]
pub struct SongReport {
    pub mp3_path: PathBuf,
    pub json_path: PathBuf,
    pub status: SongStatus,
}

pub fn process_songs_parallel(
    songs_dir: &Path,
    config: &AnalysisConfig,
    num_threads: usize,
) -> io::Result<Vec<SongReport>> {
    info!(
        "Starting parallel song processing with {} threads",
        num_threads
    );

    if num_threads == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "thread count must be at least 1",
        ));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    info!("Scanning {:?} for songs...", songs_dir);
    let songs = collect_songs(songs_dir)?;
    info!("Found {} songs, starting batch analysis", songs.len());

    let reports: Vec<SongReport> = pool.install(|| {
        songs
            .par_iter()
            .map(|mp3_path| process_song(mp3_path, config))
            .collect()
    });

    let analyzed = reports
        .iter()
        .filter(|r| matches!(r.status, SongStatus::Analyzed { .. }))
        .count();
    let cached = reports
        .iter()
        .filter(|r| r.status == SongStatus::Cached)
        .count();
    info!(
        "Song processing complete: {} analyzed, {} cached, {} failed",
        analyzed,
        cached,
        reports.len() - analyzed - cached
    );

    Ok(reports)
}

/// Skip-if-exists wrapper around [`analyze_song`]; failures are logged, never raised
pub fn process_song(mp3_path: &Path, config: &AnalysisConfig) -> SongReport {
    let json_path = melody_path_for(mp3_path);

    let status = if json_path.exists() {
        info!("Melody exists, skipping: {:?}", mp3_path);
        SongStatus::Cached
    } else {
        match analyze_song(mp3_path, &json_path, config) {
            Ok(track) => {
                if track.is_empty() {
                    warn!("No voiced frames found in {:?}", mp3_path);
                }
                debug!("Wrote {} points to {:?}", track.len(), json_path);
                SongStatus::Analyzed {
                    points: track.len(),
                }
            }
            Err(e) => {
                error!("Analysis failed for {:?}: {}", mp3_path, e);
                SongStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    };

    SongReport {
        mp3_path: mp3_path.to_path_buf(),
        json_path,
        status,
    }
}

/// Audio files directly inside `songs_dir`, sorted by file name.
///
/// Files whose name is not UTF-8 are skipped since they cannot be named in the
/// playlist. When two files share a melody path (`a.mp3` and `a.MP3`) only the
/// first is kept.
pub fn collect_songs(songs_dir: &Path) -> io::Result<Vec<PathBuf>> {
    if !songs_dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("songs directory not found: {:?}", songs_dir),
        ));
    }

    let mut songs = Vec::new();
    let mut melody_paths = HashSet::new();

    for entry in WalkDir::new(songs_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !entry.file_type().is_file() {
            trace!("Skipping non-file entry: {:?}", path);
            continue;
        }

        if !is_supported_audio(path) {
            trace!("Skipping unsupported file: {:?}", path);
            continue;
        }

        if path.file_name().and_then(|n| n.to_str()).is_none() {
            warn!("Skipping song with a non UTF-8 file name: {:?}", path);
            continue;
        }

        if !melody_paths.insert(melody_path_for(path)) {
            warn!(
                "Skipping {:?}: another song already writes {:?}",
                path,
                melody_path_for(path)
            );
            continue;
        }

        songs.push(path.to_path_buf());
    }

    Ok(songs)
}
