mod point;

pub use point::{MelodyPoint, round_to};

use crate::analysis::tracker::PitchContour;
use log::trace;
use serde::{Deserialize, Serialize};

/// Downsampled, rounded pitch contour of one song.
///
/// Serializes as a bare JSON array of `{t, p}` objects, which is the format
/// the player loads.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct MelodyTrack {
    points: Vec<MelodyPoint>,
}

impl MelodyTrack {
    pub fn new() -> Self {
        MelodyTrack { points: Vec::new() }
    }

    /// Keep every `step`-th frame of the contour, dropping unvoiced frames.
    pub fn from_contour(contour: &PitchContour, step: usize) -> Self {
        let step = step.max(1);
        let mut track = MelodyTrack::new();

        for i in (0..contour.len()).step_by(step) {
            match contour.frequencies[i] {
                Some(pitch) => track.push(MelodyPoint::new(contour.times[i], pitch)),
                None => trace!("Frame {} unvoiced", i),
            }
        }

        track
    }

    pub fn push(&mut self, point: MelodyPoint) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[MelodyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Time of the last point, zero for an empty track
    pub fn duration(&self) -> f64 {
        self.points.last().map(|point| point.t).unwrap_or(0.0)
    }

    pub fn pitch_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.points.iter().map(|point| point.p);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }
}
