use crate::error::{MelodyError, Result};
use log::debug;
use rubato::{FastFixedIn, PolynomialDegree, Resampler};

/// Resample a mono signal in one pass. Matching rates return a copy.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    if from_rate == 0 || to_rate == 0 {
        return Err(MelodyError::Resample(format!(
            "cannot resample from {} Hz to {} Hz",
            from_rate, to_rate
        )));
    }

    debug!(
        "Resampling {} samples from {} Hz to {} Hz",
        samples.len(),
        from_rate,
        to_rate
    );

    let mut resampler = FastFixedIn::<f32>::new(
        to_rate as f64 / from_rate as f64,
        1.0,
        PolynomialDegree::Cubic,
        samples.len(),
        1,
    )
    .map_err(|e| MelodyError::Resample(e.to_string()))?;

    let input = vec![samples.to_vec()];
    let mut output = resampler
        .process(&input, None)
        .map_err(|e| MelodyError::Resample(e.to_string()))?;

    Ok(output.pop().unwrap_or_default())
}
