use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub name: String,
    pub mp3: String,
    pub json: String,
}

impl PlaylistEntry {
    pub fn new(name: String, mp3: String, json: String) -> Self {
        PlaylistEntry { name, mp3, json }
    }

    /// Build the entry for an audio file living under `songs_prefix`.
    ///
    /// Paths are joined with `/` since the player resolves them as URLs.
    pub fn for_song(mp3_path: &Path, songs_prefix: &str) -> Option<Self> {
        let file_name = mp3_path.file_name()?.to_str()?;
        let stem = mp3_path.file_stem()?.to_str()?;
        let json_name = format!("{}.json", stem);

        Some(PlaylistEntry::new(
            stem.to_string(),
            join_url(songs_prefix, file_name),
            join_url(songs_prefix, &json_name),
        ))
    }
}

fn join_url(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() || prefix == "." {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}
