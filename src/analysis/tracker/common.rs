// Framing helpers shared by the frame-by-frame trackers

/// Number of centred frames covering `len` samples (one extra frame for the tail)
pub fn frame_count(len: usize, hop_length: usize) -> usize {
    if len == 0 {
        return 0;
    }
    1 + len / hop_length
}

pub fn frame_times(count: usize, hop_length: usize, sample_rate: u32) -> Vec<f64> {
    (0..count)
        .map(|i| i as f64 * hop_length as f64 / sample_rate as f64)
        .collect()
}

/// Copy the frame centred on `center` into `out`, zero-padding past either edge
pub fn centered_frame(samples: &[f32], center: usize, out: &mut [f64]) {
    let half = out.len() / 2;
    for (j, slot) in out.iter_mut().enumerate() {
        let index = (center + j).checked_sub(half);
        *slot = match index {
            Some(i) if i < samples.len() => samples[i] as f64,
            _ => 0.0,
        };
    }
}

/// Keep finite estimates inside the configured range
pub fn in_range(frequency: f64, fmin: f64, fmax: f64) -> Option<f64> {
    if frequency.is_finite() && frequency >= fmin && frequency <= fmax {
        Some(frequency)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_cover_the_tail() {
        assert_eq!(frame_count(0, 512), 0);
        assert_eq!(frame_count(100, 512), 1);
        assert_eq!(frame_count(1024, 512), 3);
    }

    #[test]
    fn first_frame_is_zero_padded_on_the_left() {
        let samples = [1.0, 2.0, 3.0, 4.0];
        let mut frame = [9.0; 4];
        centered_frame(&samples, 0, &mut frame);
        assert_eq!(frame, [0.0, 0.0, 1.0, 2.0]);

        centered_frame(&samples, 3, &mut frame);
        assert_eq!(frame, [2.0, 3.0, 4.0, 0.0]);
    }

    #[test]
    fn out_of_range_estimates_are_dropped() {
        assert_eq!(in_range(220.0, 65.0, 1046.0), Some(220.0));
        assert_eq!(in_range(20.0, 65.0, 1046.0), None);
        assert_eq!(in_range(f64::NAN, 65.0, 1046.0), None);
    }
}
