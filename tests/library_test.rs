/// End-to-end checks of a library run over a scratch songs directory.
///
/// Decodable songs are generated as 16-bit PCM in a WAV container; symphonia
/// detects the container from the stream header, not the `.mp3` name.
use karaoke_melody::playlist::Playlist;
use karaoke_melody::utils::io::{read_melody_from_json, read_playlist_from_json};
use karaoke_melody::{AnalysisConfig, PitchMethod, analyze_library};
use std::f32::consts::PI;
use std::fs;
use std::path::Path;

const CACHED_MELODY: &str = r#"[{"t":0.0,"p":220.0},{"t":0.07,"p":221.5}]"#;

fn write_song(dir: &Path, name: &str, bytes: &[u8]) {
    fs::write(dir.join(name), bytes).unwrap();
}

fn tone_wav(frequency: f32, sample_rate: u32, seconds: f32) -> Vec<u8> {
    let n = (sample_rate as f32 * seconds) as usize;
    let data_len = (n * 2) as u32;
    let mut bytes = Vec::with_capacity(44 + n * 2);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    for i in 0..n {
        let s = 0.5 * (2.0 * PI * frequency * i as f32 / sample_rate as f32).sin();
        bytes.extend_from_slice(&((s * i16::MAX as f32) as i16).to_le_bytes());
    }
    bytes
}

#[test]
fn missing_songs_directory_is_created_without_playlist() {
    let root = tempfile::tempdir().unwrap();
    let songs = root.path().join("songs");
    let playlist = root.path().join("playlist.json");

    let summary = analyze_library(&songs, &playlist, 2, &AnalysisConfig::default()).unwrap();

    assert!(songs.is_dir());
    assert!(!playlist.exists());
    assert!(!summary.playlist_written);
}

#[test]
fn empty_directory_writes_empty_playlist() {
    let root = tempfile::tempdir().unwrap();
    let songs = root.path().join("songs");
    fs::create_dir(&songs).unwrap();
    let playlist_path = root.path().join("playlist.json");

    let summary =
        analyze_library(&songs, &playlist_path, 1, &AnalysisConfig::default()).unwrap();

    assert_eq!(summary.entries, 0);
    assert_eq!(fs::read_to_string(&playlist_path).unwrap(), "[]");
}

#[test]
fn playlist_lists_songs_with_melodies_only() {
    let root = tempfile::tempdir().unwrap();
    let songs = root.path().join("songs");
    fs::create_dir(&songs).unwrap();
    write_song(&songs, "Blue Moon.mp3", b"cached song, never decoded");
    write_song(&songs, "Blue Moon.json", CACHED_MELODY.as_bytes());
    write_song(&songs, "Broken.mp3", b"this is not an mpeg stream");
    write_song(&songs, "cover.jpg", b"");
    let playlist_path = root.path().join("playlist.json");

    let summary =
        analyze_library(&songs, &playlist_path, 4, &AnalysisConfig::default()).unwrap();

    assert_eq!(summary.cached, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.analyzed, 0);
    assert_eq!(summary.entries, 1);
    assert!(!songs.join("Broken.json").exists());

    let playlist: Playlist = read_playlist_from_json(&playlist_path).unwrap();
    assert_eq!(playlist.len(), 1);
    let entry = &playlist.entries()[0];
    assert_eq!(entry.name, "Blue Moon");
    assert_eq!(entry.mp3, "songs/Blue Moon.mp3");
    assert_eq!(entry.json, "songs/Blue Moon.json");

    // every manifest entry points at an existing melody file
    for entry in playlist.entries() {
        assert!(root.path().join(&entry.json).exists());
    }
}

#[test]
fn new_song_is_analyzed_then_cached() {
    let root = tempfile::tempdir().unwrap();
    let songs = root.path().join("songs");
    fs::create_dir(&songs).unwrap();
    // 44.1 kHz so the resampler runs too
    write_song(&songs, "Tone.mp3", &tone_wav(220.0, 44100, 1.5));
    let playlist_path = root.path().join("playlist.json");
    let config = AnalysisConfig::default().with_method(PitchMethod::McLeod);

    let first = analyze_library(&songs, &playlist_path, 2, &config).unwrap();
    assert_eq!(first.analyzed, 1);
    assert_eq!(first.failed, 0);
    assert_eq!(first.entries, 1);

    let playlist = read_playlist_from_json(&playlist_path).unwrap();
    let entry = &playlist.entries()[0];
    assert_eq!(entry.name, "Tone");
    assert_eq!(entry.mp3, "songs/Tone.mp3");
    assert_eq!(entry.json, "songs/Tone.json");

    let melody_path = root.path().join(&entry.json);
    let melody = read_melody_from_json(&melody_path).unwrap();
    assert!(!melody.is_empty());
    for pair in melody.points().windows(2) {
        assert!(pair[1].t > pair[0].t);
    }
    for point in melody.points() {
        assert!(point.p >= config.fmin && point.p <= config.fmax);
    }
    let written = fs::read_to_string(&melody_path).unwrap();
    let first_playlist = fs::read_to_string(&playlist_path).unwrap();

    let second = analyze_library(&songs, &playlist_path, 2, &config).unwrap();
    assert_eq!(second.analyzed, 0);
    assert_eq!(second.cached, 1);
    assert_eq!(fs::read_to_string(&melody_path).unwrap(), written);
    assert_eq!(fs::read_to_string(&playlist_path).unwrap(), first_playlist);
}

#[test]
fn second_run_is_idempotent() {
    let root = tempfile::tempdir().unwrap();
    let songs = root.path().join("songs");
    fs::create_dir(&songs).unwrap();
    write_song(&songs, "a.mp3", b"");
    write_song(&songs, "a.json", CACHED_MELODY.as_bytes());
    write_song(&songs, "b.MP3", b"");
    write_song(&songs, "b.json", b"[]");
    let playlist_path = root.path().join("playlist.json");
    let config = AnalysisConfig::default();

    let first = analyze_library(&songs, &playlist_path, 2, &config).unwrap();
    let first_playlist = fs::read_to_string(&playlist_path).unwrap();
    let second = analyze_library(&songs, &playlist_path, 2, &config).unwrap();

    assert_eq!(first, second);
    assert_eq!(second.cached, 2);
    assert_eq!(fs::read_to_string(&playlist_path).unwrap(), first_playlist);
    assert_eq!(
        fs::read_to_string(songs.join("a.json")).unwrap(),
        CACHED_MELODY
    );
}

#[test]
fn invalid_config_fails_the_run() {
    let root = tempfile::tempdir().unwrap();
    let songs = root.path().join("songs");
    fs::create_dir(&songs).unwrap();

    let mut config = AnalysisConfig::default();
    config.downsample_step = 0;

    assert!(analyze_library(&songs, &root.path().join("playlist.json"), 1, &config).is_err());
}
