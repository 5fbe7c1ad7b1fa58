use crate::analysis::tracker::get_tracker_for_method;
use crate::config::AnalysisConfig;
use crate::decoding::load_for_analysis;
use crate::error::Result;
use crate::melody::MelodyTrack;
use crate::utils::io::export_melody_to_json;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Melody files live next to their audio: `songs/Foo.mp3` -> `songs/Foo.json`
pub fn melody_path_for(mp3_path: &Path) -> PathBuf {
    mp3_path.with_extension("json")
}

/// Decode, track and reduce one song, then write its melody file.
///
/// Nothing is written unless the whole pipeline succeeds. A song without any
/// voiced frame produces an empty array.
pub fn analyze_song(
    mp3_path: &Path,
    json_path: &Path,
    config: &AnalysisConfig,
) -> Result<MelodyTrack> {
    info!("Analyzing {:?}", mp3_path);
    config.validate()?;

    let samples = load_for_analysis(mp3_path, config)?;
    debug!(
        "Loaded {} samples ({:.2}s) from {:?}",
        samples.len(),
        samples.len() as f64 / config.sample_rate as f64,
        mp3_path
    );

    let track = melody_from_samples(&samples, config)?;
    export_melody_to_json(&track, json_path)?;

    Ok(track)
}

/// The part of [`analyze_song`] that does not touch the filesystem
pub fn melody_from_samples(samples: &[f32], config: &AnalysisConfig) -> Result<MelodyTrack> {
    let mut tracker = get_tracker_for_method(config);
    let contour = tracker.track(samples, config.sample_rate)?;
    debug!(
        "{} tracker: {} of {} frames voiced",
        tracker.name(),
        contour.voiced_count(),
        contour.len()
    );

    let track = MelodyTrack::from_contour(&contour, config.downsample_step);
    debug!("Reduced contour to {} melody points", track.len());

    Ok(track)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tracker::test_signals::{silence, sine, write_wav};
    use crate::utils::io::read_melody_from_json;
    use crate::config::PitchMethod;

    #[test]
    fn melody_path_swaps_extension() {
        assert_eq!(
            melody_path_for(Path::new("songs/My Song.mp3")),
            PathBuf::from("songs/My Song.json")
        );
    }

    #[test]
    fn tone_becomes_points_within_bounds() {
        let config = AnalysisConfig::default().with_method(PitchMethod::McLeod);
        let track = melody_from_samples(&sine(262.0, config.sample_rate, 2.0), &config).unwrap();

        assert!(!track.is_empty());
        for pair in track.points().windows(2) {
            assert!(pair[1].t > pair[0].t);
        }
        for point in track.points() {
            assert!(point.p >= config.fmin - 0.05 && point.p <= config.fmax + 0.05);
        }
    }

    #[test]
    fn silence_becomes_empty_track() {
        let config = AnalysisConfig::default().with_method(PitchMethod::Praat);
        let track = melody_from_samples(&silence(config.sample_rate, 1.0), &config).unwrap();
        assert!(track.is_empty());
    }

    #[test]
    fn decodable_song_writes_compact_melody() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig::default().with_method(PitchMethod::McLeod);
        let mp3 = dir.path().join("tone.mp3");
        write_wav(&mp3, &sine(220.0, config.sample_rate, 1.5), config.sample_rate, 1);
        let json = melody_path_for(&mp3);

        let track = analyze_song(&mp3, &json, &config).unwrap();

        let raw = std::fs::read_to_string(&json).unwrap();
        assert!(raw.starts_with('[') && raw.ends_with(']'));
        assert!(!raw.contains('\n') && !raw.contains(' '));
        assert_eq!(read_melody_from_json(&json).unwrap(), track);

        assert!(track.len() > 10);
        for pair in track.points().windows(2) {
            assert!(pair[1].t > pair[0].t);
        }
        for point in track.points() {
            assert!(point.p >= config.fmin && point.p <= config.fmax);
        }
        let mut pitches: Vec<f64> = track.points().iter().map(|p| p.p).collect();
        pitches.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let median = pitches[pitches.len() / 2];
        assert!((median - 220.0).abs() < 220.0 * 0.03, "median {}", median);
    }

    #[test]
    fn failed_decode_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mp3 = dir.path().join("broken.mp3");
        std::fs::write(&mp3, b"not audio").unwrap();
        let json = melody_path_for(&mp3);

        assert!(analyze_song(&mp3, &json, &AnalysisConfig::default()).is_err());
        assert!(!json.exists());
    }
}
