mod autocorrelation;
mod common;
mod mcleod;
mod praat;
mod pyin;

pub use autocorrelation::AutocorrelationTracker;
pub use mcleod::McLeodTracker;
pub use praat::PraatTracker;
pub use self::pyin::PyinTracker;

use crate::config::{AnalysisConfig, PitchMethod};
use crate::error::Result;

/// Per-frame pitch estimates of one signal.
///
/// Frame `i` is centred at `times[i]`; `frequencies[i]` is `None` when the
/// frame is unvoiced or its estimate falls outside the configured range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PitchContour {
    pub times: Vec<f64>,
    pub frequencies: Vec<Option<f64>>,
}

impl PitchContour {
    pub fn new(times: Vec<f64>, frequencies: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(times.len(), frequencies.len());
        PitchContour { times, frequencies }
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn voiced_count(&self) -> usize {
        self.frequencies.iter().filter(|f| f.is_some()).count()
    }

    pub fn voiced(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times
            .iter()
            .zip(self.frequencies.iter())
            .filter_map(|(&t, f)| f.map(|f| (t, f)))
    }
}

// Common interface over the pitch estimation backends
pub trait PitchTracker {
    fn name(&self) -> &'static str;
    fn track(&mut self, samples: &[f32], sample_rate: u32) -> Result<PitchContour>;
}

// Factory function to get the tracker for a configured method
pub fn get_tracker_for_method(config: &AnalysisConfig) -> Box<dyn PitchTracker + Send> {
    match config.method {
        PitchMethod::Pyin => Box::new(PyinTracker::new(config)),
        PitchMethod::McLeod => Box::new(McLeodTracker::new(config)),
        PitchMethod::Autocorrelation => Box::new(AutocorrelationTracker::new(config)),
        PitchMethod::Praat => Box::new(PraatTracker::new(config)),
    }
}

#[cfg(test)]
pub(crate) mod test_signals {
    use std::f32::consts::PI;

    pub fn sine(frequency: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| 0.5 * (2.0 * PI * frequency * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    pub fn silence(sample_rate: u32, seconds: f32) -> Vec<f32> {
        vec![0.0; (sample_rate as f32 * seconds) as usize]
    }

    /// 16-bit PCM WAV of interleaved `samples`, decodable by symphonia's default codecs
    pub fn write_wav(path: &std::path::Path, samples: &[f32], sample_rate: u32, channels: u16) {
        let data_len = (samples.len() * 2) as u32;
        let mut bytes = Vec::with_capacity(44 + data_len as usize);
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVEfmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&channels.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * 2 * channels as u32).to_le_bytes());
        bytes.extend_from_slice(&(2 * channels).to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        for &s in samples {
            let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        std::fs::write(path, bytes).unwrap();
    }

    /// Median of the voiced estimates
    pub fn median_pitch(contour: &super::PitchContour) -> Option<f64> {
        let mut voiced: Vec<f64> = contour.voiced().map(|(_, f)| f).collect();
        if voiced.is_empty() {
            return None;
        }
        voiced.sort_by(|a, b| a.partial_cmp(b).unwrap());
        Some(voiced[voiced.len() / 2])
    }
}
