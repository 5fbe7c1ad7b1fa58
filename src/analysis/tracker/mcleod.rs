use super::common::{centered_frame, frame_count, frame_times, in_range};
use super::{PitchContour, PitchTracker};
use crate::config::AnalysisConfig;
use crate::error::Result;
use log::debug;
use pitch_detection::detector::PitchDetector;
use pitch_detection::detector::mcleod::McLeodDetector;

/// McLeod pitch method (normalized square difference), frame by frame
pub struct McLeodTracker {
    fmin: f64,
    fmax: f64,
    frame_length: usize,
    hop_length: usize,
    /// Frames whose sum of squares is below this are treated as silence
    power_threshold: f64,
    clarity_threshold: f64,
}

impl McLeodTracker {
    pub fn new(config: &AnalysisConfig) -> Self {
        McLeodTracker {
            fmin: config.fmin,
            fmax: config.fmax,
            frame_length: config.frame_length,
            hop_length: config.hop_length,
            power_threshold: 0.5,
            clarity_threshold: 0.6,
        }
    }
}

impl PitchTracker for McLeodTracker {
    fn name(&self) -> &'static str {
        "mcleod"
    }

    fn track(&mut self, samples: &[f32], sample_rate: u32) -> Result<PitchContour> {
        let count = frame_count(samples.len(), self.hop_length);
        let mut detector = McLeodDetector::<f64>::new(self.frame_length, self.frame_length / 2);
        let mut frame = vec![0.0f64; self.frame_length];
        let mut frequencies = Vec::with_capacity(count);

        for i in 0..count {
            centered_frame(samples, i * self.hop_length, &mut frame);
            let estimate = detector
                .get_pitch(
                    &frame,
                    sample_rate as usize,
                    self.power_threshold,
                    self.clarity_threshold,
                )
                .and_then(|pitch| in_range(pitch.frequency, self.fmin, self.fmax));
            frequencies.push(estimate);
        }

        let contour = PitchContour::new(frame_times(count, self.hop_length, sample_rate), frequencies);
        debug!(
            "McLeod: {} frames, {} voiced",
            contour.len(),
            contour.voiced_count()
        );

        Ok(contour)
    }
}
