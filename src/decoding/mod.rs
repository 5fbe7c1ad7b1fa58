pub mod common;
pub mod decoder;
pub mod resample;

pub use common::{get_supported_extensions, is_supported_audio};
pub use decoder::{DecodedAudio, decode_to_mono};
pub use resample::resample;

use crate::config::AnalysisConfig;
use crate::error::Result;
use std::path::Path;

/// Decode `file_path` and bring it to the analysis sample rate
pub fn load_for_analysis(file_path: &Path, config: &AnalysisConfig) -> Result<Vec<f32>> {
    let audio = decode_to_mono(file_path)?;
    resample(&audio.samples, audio.sample_rate, config.sample_rate)
}
