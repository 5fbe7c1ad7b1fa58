use crate::melody::MelodyTrack;
use crate::playlist::Playlist;
use log::{debug, error, info};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Compact JSON, the player downloads one of these per song
pub fn export_melody_to_json(track: &MelodyTrack, output_path: &Path) -> io::Result<()> {
    debug!(
        "Exporting melody with {} points to JSON: {:?}",
        track.len(),
        output_path
    );

    let json = match serde_json::to_string(track) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize melody to JSON: {}", e);
            return Err(io::Error::new(io::ErrorKind::Other, e));
        }
    };

    write_json(&json, output_path)
}

/// Pretty-printed with two-space indent; non-ASCII song names are kept as UTF-8
pub fn export_playlist_to_json(playlist: &Playlist, output_path: &Path) -> io::Result<()> {
    info!(
        "Exporting playlist with {} entries to JSON: {:?}",
        playlist.len(),
        output_path
    );

    let json = match serde_json::to_string_pretty(playlist) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize playlist to JSON: {}", e);
            return Err(io::Error::new(io::ErrorKind::Other, e));
        }
    };

    write_json(&json, output_path)
}

pub fn read_melody_from_json(input_path: &Path) -> io::Result<MelodyTrack> {
    let content = fs::read_to_string(input_path)?;
    serde_json::from_str(&content).map_err(|e| {
        error!("Failed to parse melody JSON {:?}: {}", input_path, e);
        io::Error::new(io::ErrorKind::InvalidData, e)
    })
}

pub fn read_playlist_from_json(input_path: &Path) -> io::Result<Playlist> {
    let content = fs::read_to_string(input_path)?;
    serde_json::from_str(&content).map_err(|e| {
        error!("Failed to parse playlist JSON {:?}: {}", input_path, e);
        io::Error::new(io::ErrorKind::InvalidData, e)
    })
}

/// Write through a temporary file in the target directory, then rename it into
/// place. A melody file that exists is always complete.
fn write_json(json: &str, output_path: &Path) -> io::Result<()> {
    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let result = NamedTempFile::new_in(dir).and_then(|mut tmp| {
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(output_path).map_err(|e| e.error)?;
        Ok(())
    });

    match result {
        Ok(()) => {
            debug!("Successfully wrote {} bytes to {:?}", json.len(), output_path);
            Ok(())
        }
        Err(e) => {
            error!("Failed to write JSON to file {:?}: {}", output_path, e);
            Err(e)
        }
    }
}
