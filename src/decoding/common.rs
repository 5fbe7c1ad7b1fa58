use std::path::Path;

pub fn get_supported_extensions() -> Vec<&'static str> {
    vec!["mp3"]
}

/// Audio files are matched on extension only, ignoring case (`Song.MP3` counts)
pub fn is_supported_audio(file_path: &Path) -> bool {
    file_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            get_supported_extensions()
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}
