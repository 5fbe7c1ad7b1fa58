use super::common::{centered_frame, frame_count, frame_times, in_range};
use super::{PitchContour, PitchTracker};
use crate::config::AnalysisConfig;
use crate::error::Result;
use log::debug;
use pitch_detection::detector::PitchDetector;
use pitch_detection::detector::autocorrelation::AutocorrelationDetector;

/// Plain autocorrelation peak picking, frame by frame
pub struct AutocorrelationTracker {
    fmin: f64,
    fmax: f64,
    frame_length: usize,
    hop_length: usize,
    power_threshold: f64,
    clarity_threshold: f64,
}

impl AutocorrelationTracker {
    pub fn new(config: &AnalysisConfig) -> Self {
        AutocorrelationTracker {
            fmin: config.fmin,
            fmax: config.fmax,
            frame_length: config.frame_length,
            hop_length: config.hop_length,
            power_threshold: 0.5,
            clarity_threshold: 0.5,
        }
    }
}

impl PitchTracker for AutocorrelationTracker {
    fn name(&self) -> &'static str {
        "autocorrelation"
    }

    fn track(&mut self, samples: &[f32], sample_rate: u32) -> Result<PitchContour> {
        let count = frame_count(samples.len(), self.hop_length);
        let mut detector =
            AutocorrelationDetector::<f64>::new(self.frame_length, self.frame_length / 2);
        let mut frame = vec![0.0f64; self.frame_length];

        let frequencies: Vec<Option<f64>> = (0..count)
            .map(|i| {
                centered_frame(samples, i * self.hop_length, &mut frame);
                detector
                    .get_pitch(
                        &frame,
                        sample_rate as usize,
                        self.power_threshold,
                        self.clarity_threshold,
                    )
                    .and_then(|pitch| in_range(pitch.frequency, self.fmin, self.fmax))
            })
            .collect();

        debug!(
            "Autocorrelation: {} frames, {} voiced",
            frequencies.len(),
            frequencies.iter().filter(|f| f.is_some()).count()
        );

        Ok(PitchContour::new(
            frame_times(count, self.hop_length, sample_rate),
            frequencies,
        ))
    }
}
