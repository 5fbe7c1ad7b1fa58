use std::io;
use thiserror::Error;

/// Errors that can occur while turning one song into a melody file
#[derive(Error, Debug)]
pub enum MelodyError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    #[error("No audio track found")]
    NoAudioTrack,

    #[error("Resampling failed: {0}")]
    Resample(String),

    #[error("Pitch tracking failed: {0}")]
    Tracker(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, MelodyError>;

impl From<MelodyError> for io::Error {
    fn from(err: MelodyError) -> Self {
        match err {
            MelodyError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::Other, other),
        }
    }
}
