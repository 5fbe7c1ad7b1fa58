use serde::{Deserialize, Serialize};

/// One sampled pitch point as the player consumes it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MelodyPoint {
    /// Time in seconds, two decimals
    pub t: f64,
    /// Fundamental frequency in Hz, one decimal
    pub p: f64,
}

impl MelodyPoint {
    pub fn new(time: f64, pitch: f64) -> Self {
        MelodyPoint {
            t: round_to(time, 2),
            p: round_to(pitch, 1),
        }
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
