use crate::error::{MelodyError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Pitch tracking backend used for every song in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchMethod {
    Pyin,
    McLeod,
    Autocorrelation,
    Praat,
}

impl PitchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PitchMethod::Pyin => "pyin",
            PitchMethod::McLeod => "mcleod",
            PitchMethod::Autocorrelation => "autocorrelation",
            PitchMethod::Praat => "praat",
        }
    }
}

impl fmt::Display for PitchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PitchMethod {
    type Err = MelodyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pyin" => Ok(PitchMethod::Pyin),
            "mcleod" => Ok(PitchMethod::McLeod),
            "autocorrelation" | "ac" => Ok(PitchMethod::Autocorrelation),
            "praat" => Ok(PitchMethod::Praat),
            other => Err(MelodyError::InvalidConfig(format!(
                "unknown pitch method: {}",
                other
            ))),
        }
    }
}

/// Tuning parameters shared by decoding, tracking and melody reduction
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Rate the decoded audio is resampled to before tracking
    pub sample_rate: u32,
    /// Pitch floor in Hz
    pub fmin: f64,
    /// Pitch ceiling in Hz
    pub fmax: f64,
    /// Analysis frame length in samples
    pub frame_length: usize,
    /// Distance between frame centres in samples
    pub hop_length: usize,
    /// Keep every N-th frame in the written melody
    pub downsample_step: usize,
    pub method: PitchMethod,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            sample_rate: 22050,
            fmin: note_to_hz("C2").unwrap_or(65.406),
            fmax: note_to_hz("C6").unwrap_or(1046.502),
            frame_length: 2048,
            hop_length: 512,
            downsample_step: 3,
            method: PitchMethod::Pyin,
        }
    }
}

impl AnalysisConfig {
    pub fn with_method(mut self, method: PitchMethod) -> Self {
        self.method = method;
        self
    }

    /// Seconds between consecutive analysis frames
    pub fn time_step(&self) -> f64 {
        self.hop_length as f64 / self.sample_rate as f64
    }

    pub fn validate(&self) -> Result<()> {
        let nyquist = self.sample_rate as f64 / 2.0;

        if self.sample_rate == 0 {
            return Err(MelodyError::InvalidConfig("sample rate is zero".to_string()));
        }
        if !(self.fmin > 0.0) {
            return Err(MelodyError::InvalidConfig(format!(
                "pitch floor must be positive, got {}",
                self.fmin
            )));
        }
        if self.fmax <= self.fmin {
            return Err(MelodyError::InvalidConfig(format!(
                "pitch ceiling {} must exceed floor {}",
                self.fmax, self.fmin
            )));
        }
        if self.fmax >= nyquist {
            return Err(MelodyError::InvalidConfig(format!(
                "pitch ceiling {} must stay below Nyquist ({})",
                self.fmax, nyquist
            )));
        }
        if self.frame_length == 0 || self.hop_length == 0 || self.downsample_step == 0 {
            return Err(MelodyError::InvalidConfig(
                "frame length, hop length and downsample step must be non-zero".to_string(),
            ));
        }
        if self.hop_length > self.frame_length {
            return Err(MelodyError::InvalidConfig(format!(
                "hop length {} exceeds frame length {}",
                self.hop_length, self.frame_length
            )));
        }

        Ok(())
    }
}

fn note_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Ga-g])([#b]?)(-?\d+)$").expect("note pattern is a valid regex")
    })
}

/// Convert a scientific pitch name such as `C2`, `F#3` or `Bb5` to Hz (A4 = 440 Hz)
pub fn note_to_hz(note: &str) -> Option<f64> {
    let caps = note_pattern().captures(note.trim())?;

    let semitone = match caps[1].to_ascii_uppercase().as_str() {
        "C" => 0,
        "D" => 2,
        "E" => 4,
        "F" => 5,
        "G" => 7,
        "A" => 9,
        "B" => 11,
        _ => return None,
    };
    let accidental = match &caps[2] {
        "#" => 1,
        "b" => -1,
        _ => 0,
    };
    let octave: i32 = caps[3].parse().ok()?;

    let midi = (octave + 1) * 12 + semitone + accidental;
    Some(440.0 * 2f64.powf((midi as f64 - 69.0) / 12.0))
}
