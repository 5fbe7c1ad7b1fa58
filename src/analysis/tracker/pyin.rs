//! Probabilistic YIN tracking through the `pyin` crate.
//!
//! Uses centred, zero-padded framing so frame `i` sits at `i * hop / rate`,
//! the same grid the other trackers produce.

use super::common::in_range;
use super::{PitchContour, PitchTracker};
use crate::config::AnalysisConfig;
use crate::error::Result;
use log::debug;
use ::pyin::{Framing, PYINExecutor, PadMode};

pub struct PyinTracker {
    fmin: f64,
    fmax: f64,
    frame_length: usize,
    hop_length: usize,
}

impl PyinTracker {
    pub fn new(config: &AnalysisConfig) -> Self {
        PyinTracker {
            fmin: config.fmin,
            fmax: config.fmax,
            frame_length: config.frame_length,
            hop_length: config.hop_length,
        }
    }
}

impl PitchTracker for PyinTracker {
    fn name(&self) -> &'static str {
        "pyin"
    }

    fn track(&mut self, samples: &[f32], sample_rate: u32) -> Result<PitchContour> {
        if samples.is_empty() {
            return Ok(PitchContour::default());
        }

        let wav: Vec<f64> = samples.iter().map(|&s| s as f64).collect();
        let mut executor = PYINExecutor::new(
            self.fmin,
            self.fmax,
            sample_rate,
            self.frame_length,
            None,
            Some(self.hop_length),
            None,
        );

        let (timestamps, f0, voiced_flags, _voiced_probs): (Vec<f64>, Vec<f64>, Vec<bool>, Vec<f64>) =
            executor.pyin(&wav, f64::NAN, Framing::Center(PadMode::Constant(0.0)));

        let frequencies: Vec<Option<f64>> = f0
            .iter()
            .zip(voiced_flags.iter())
            .map(|(&f, &voiced)| {
                if voiced {
                    in_range(f, self.fmin, self.fmax)
                } else {
                    None
                }
            })
            .collect();

        let contour = PitchContour::new(timestamps, frequencies);
        debug!(
            "pYIN: {} frames, {} voiced",
            contour.len(),
            contour.voiced_count()
        );

        Ok(contour)
    }
}
