//! Praat-style autocorrelation pitch tracking.
//!
//! Follows Boersma (1993): each frame is mean-subtracted, Hanning-windowed and
//! autocorrelated, the autocorrelation is divided by that of the window, and
//! local maxima become candidates. A Viterbi pass over all frames then picks
//! one candidate per frame using octave, octave-jump and voicing transition
//! costs.

use super::common::{frame_count, frame_times, in_range};
use super::{PitchContour, PitchTracker};
use crate::config::AnalysisConfig;
use crate::error::{MelodyError, Result};
use log::{debug, trace};
use rustfft::{Fft, FftPlanner};
use rustfft::num_complex::Complex;
use std::f64::consts::PI;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    /// Hz, 0.0 for the unvoiced candidate
    frequency: f64,
    strength: f64,
}

impl Candidate {
    const UNVOICED: Candidate = Candidate {
        frequency: 0.0,
        strength: 0.0,
    };
}

struct Frame {
    candidates: Vec<Candidate>,
    intensity: f64,
}

pub struct PraatTracker {
    fmin: f64,
    fmax: f64,
    hop_length: usize,
    max_candidates: usize,
    silence_threshold: f64,
    voicing_threshold: f64,
    octave_cost: f64,
    octave_jump_cost: f64,
    voiced_unvoiced_cost: f64,
    periods_per_window: f64,
}

impl PraatTracker {
    pub fn new(config: &AnalysisConfig) -> Self {
        PraatTracker {
            fmin: config.fmin,
            fmax: config.fmax,
            hop_length: config.hop_length,
            max_candidates: 15,
            silence_threshold: 0.03,
            voicing_threshold: 0.45,
            octave_cost: 0.01,
            octave_jump_cost: 0.35,
            voiced_unvoiced_cost: 0.14,
            periods_per_window: 3.0,
        }
    }
}

/// Per-signal constants derived from the sample rate and pitch floor
struct Geometry {
    nsamp_window: usize,
    halfnsamp_window: usize,
    nsamp_period: usize,
    halfnsamp_period: usize,
    maximum_lag: usize,
    brent_ixmax: usize,
    nsamp_fft: usize,
    window: Vec<f64>,
    /// Normalized autocorrelation of the window
    window_r: Vec<f64>,
}

struct Autocorrelator {
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    buffer: Vec<Complex<f64>>,
}

impl Autocorrelator {
    fn new(size: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        Autocorrelator {
            forward: planner.plan_fft_forward(size),
            inverse: planner.plan_fft_inverse(size),
            buffer: vec![Complex::new(0.0, 0.0); size],
        }
    }

    /// Autocorrelation of `data` (zero-padded to the FFT size) for lags `0..=max_lag`
    fn compute(&mut self, data: &[f64], max_lag: usize) -> Vec<f64> {
        let n = self.buffer.len();
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            *slot = Complex::new(data.get(i).copied().unwrap_or(0.0), 0.0);
        }
        self.forward.process(&mut self.buffer);
        for value in self.buffer.iter_mut() {
            *value = Complex::new(value.norm_sqr(), 0.0);
        }
        self.inverse.process(&mut self.buffer);

        self.buffer
            .iter()
            .take((max_lag + 1).min(n))
            .map(|c| c.re / n as f64)
            .collect()
    }
}

impl PraatTracker {
    fn geometry(&self, sample_rate: u32, fft: &mut Option<Autocorrelator>) -> Option<Geometry> {
        let rate = sample_rate as f64;
        let nsamp_period = (rate / self.fmin).floor() as usize;
        let halfnsamp_period = nsamp_period / 2 + 1;

        let nsamp_window_raw = (self.periods_per_window / self.fmin * rate).floor() as usize;
        let halfnsamp_window = (nsamp_window_raw / 2).checked_sub(1)?;
        if halfnsamp_window < 2 {
            return None;
        }
        let nsamp_window = halfnsamp_window * 2;
        let maximum_lag = ((nsamp_window as f64 / self.periods_per_window).floor() as usize + 2)
            .min(nsamp_window);
        let brent_ixmax = nsamp_window / 2;

        let mut nsamp_fft = 1;
        while nsamp_fft < (nsamp_window as f64 * 1.5) as usize {
            nsamp_fft *= 2;
        }

        let window: Vec<f64> = (0..nsamp_window)
            .map(|i| 0.5 - 0.5 * (2.0 * PI * (i + 1) as f64 / (nsamp_window + 1) as f64).cos())
            .collect();

        let correlator = fft.insert(Autocorrelator::new(nsamp_fft));
        let raw = correlator.compute(&window, nsamp_window);
        let window_r = if raw[0] > 0.0 {
            raw.iter().map(|&v| v / raw[0]).collect()
        } else {
            vec![1.0; raw.len()]
        };

        Some(Geometry {
            nsamp_window,
            halfnsamp_window,
            nsamp_period,
            halfnsamp_period,
            maximum_lag,
            brent_ixmax,
            nsamp_fft,
            window,
            window_r,
        })
    }

    fn analyze_frame(
        &self,
        samples: &[f32],
        center: usize,
        rate: f64,
        global_peak: f64,
        geo: &Geometry,
        fft: &mut Autocorrelator,
    ) -> Frame {
        let len = samples.len() as isize;
        let center = center as isize;

        // Local mean over one longest period on each side
        let mean_start = (center - geo.nsamp_period as isize).max(0);
        let mean_end = (center + geo.nsamp_period as isize).min(len);
        let local_mean = if mean_end > mean_start {
            samples[mean_start as usize..mean_end as usize]
                .iter()
                .map(|&s| s as f64)
                .sum::<f64>()
                / (mean_end - mean_start) as f64
        } else {
            0.0
        };

        let first = center - geo.halfnsamp_window as isize;
        let mut data = vec![0.0; geo.nsamp_fft];
        for j in 0..geo.nsamp_window {
            let index = first + j as isize;
            if index >= 0 && index < len {
                data[j] = (samples[index as usize] as f64 - local_mean) * geo.window[j];
            }
        }

        let peak_start = geo.halfnsamp_window.saturating_sub(geo.halfnsamp_period);
        let peak_end = (geo.halfnsamp_window + geo.halfnsamp_period).min(geo.nsamp_window);
        let local_peak = data[peak_start..peak_end]
            .iter()
            .fold(0.0f64, |acc, &v| acc.max(v.abs()));
        let intensity = (local_peak / global_peak).min(1.0);

        let mut candidates = vec![Candidate::UNVOICED];
        if local_peak == 0.0 {
            return Frame {
                candidates,
                intensity,
            };
        }

        let ac = fft.compute(&data, geo.brent_ixmax + 1);
        if ac[0] <= 0.0 {
            return Frame {
                candidates,
                intensity,
            };
        }
        let mut r = vec![0.0; geo.brent_ixmax + 2];
        r[0] = 1.0;
        for i in 1..r.len().min(ac.len()).min(geo.window_r.len()) {
            if geo.window_r[i].abs() > 1e-10 {
                r[i] = ac[i] / (ac[0] * geo.window_r[i]);
            }
        }

        for i in 2..geo.maximum_lag.min(geo.brent_ixmax) {
            let (prev, cur, next) = (r[i - 1], r[i], r[i + 1]);
            if !(cur > 0.5 * self.voicing_threshold && cur > prev && cur >= next) {
                continue;
            }

            let dr = 0.5 * (next - prev);
            let d2r = 2.0 * cur - prev - next;
            if d2r <= 0.0 {
                continue;
            }

            let frequency = rate / (i as f64 + dr / d2r);
            let mut strength = cur + 0.5 * dr * dr / d2r;
            if strength > 1.0 {
                strength = 1.0 / strength;
            }
            let score = strength - self.octave_cost * (self.fmin / frequency).log2();

            if candidates.len() < self.max_candidates {
                candidates.push(Candidate {
                    frequency,
                    strength,
                });
                continue;
            }

            // Replace the weakest candidate if this one beats it
            let weakest = candidates
                .iter()
                .enumerate()
                .skip(1)
                .map(|(idx, c)| {
                    (
                        idx,
                        c.strength - self.octave_cost * (self.fmin / c.frequency).log2(),
                    )
                })
                .min_by(|a, b| a.1.total_cmp(&b.1));
            if let Some((idx, weakest_score)) = weakest {
                if score > weakest_score {
                    candidates[idx] = Candidate {
                        frequency,
                        strength,
                    };
                }
            }
        }

        Frame {
            candidates,
            intensity,
        }
    }

    /// Viterbi over candidates; returns the chosen candidate index per frame
    fn find_path(&self, frames: &[Frame], time_step: f64) -> Vec<usize> {
        if frames.is_empty() {
            return Vec::new();
        }

        let ceiling = self.fmax;
        let correction = 0.01 / time_step;
        let octave_jump_cost = self.octave_jump_cost * correction;
        let voiced_unvoiced_cost = self.voiced_unvoiced_cost * correction;
        let voiceless = |c: &Candidate| c.frequency <= 0.0 || c.frequency >= ceiling;

        let local_scores: Vec<Vec<f64>> = frames
            .iter()
            .map(|frame| {
                let unvoiced_strength = if self.silence_threshold <= 0.0 {
                    0.0
                } else {
                    self.voicing_threshold
                        + (2.0
                            - frame.intensity
                                / (self.silence_threshold / (1.0 + self.voicing_threshold)))
                            .max(0.0)
                };
                frame
                    .candidates
                    .iter()
                    .map(|c| {
                        if voiceless(c) {
                            unvoiced_strength
                        } else {
                            c.strength - self.octave_cost * (ceiling / c.frequency).log2()
                        }
                    })
                    .collect()
            })
            .collect();

        let mut delta = vec![local_scores[0].clone()];
        let mut psi: Vec<Vec<usize>> = vec![vec![0; frames[0].candidates.len()]];

        for iframe in 1..frames.len() {
            let prev = &frames[iframe - 1];
            let cur = &frames[iframe];
            let mut scores = Vec::with_capacity(cur.candidates.len());
            let mut back = Vec::with_capacity(cur.candidates.len());

            for (icand2, c2) in cur.candidates.iter().enumerate() {
                let mut best = f64::NEG_INFINITY;
                let mut place = 0;
                for (icand1, c1) in prev.candidates.iter().enumerate() {
                    let transition = match (voiceless(c1), voiceless(c2)) {
                        (true, true) => 0.0,
                        (false, false) => {
                            octave_jump_cost * (c1.frequency / c2.frequency).log2().abs()
                        }
                        _ => voiced_unvoiced_cost,
                    };
                    let value = delta[iframe - 1][icand1] - transition;
                    if value > best {
                        best = value;
                        place = icand1;
                    }
                }
                scores.push(best + local_scores[iframe][icand2]);
                back.push(place);
            }

            delta.push(scores);
            psi.push(back);
        }

        let last = delta.len() - 1;
        let mut place = delta[last]
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(idx, _)| idx)
            .unwrap_or(0);

        let mut path = vec![0; frames.len()];
        for iframe in (0..frames.len()).rev() {
            path[iframe] = place;
            place = psi[iframe][place];
        }

        path
    }
}

impl PitchTracker for PraatTracker {
    fn name(&self) -> &'static str {
        "praat"
    }

    fn track(&mut self, samples: &[f32], sample_rate: u32) -> Result<PitchContour> {
        let count = frame_count(samples.len(), self.hop_length);
        let times = frame_times(count, self.hop_length, sample_rate);
        if count == 0 {
            return Ok(PitchContour::default());
        }

        let mean = samples.iter().map(|&s| s as f64).sum::<f64>() / samples.len() as f64;
        let global_peak = samples
            .iter()
            .fold(0.0f64, |acc, &s| acc.max((s as f64 - mean).abs()));
        if global_peak == 0.0 {
            trace!("Signal is silent, skipping autocorrelation");
            return Ok(PitchContour::new(times, vec![None; count]));
        }

        let mut fft = None;
        let geo = self.geometry(sample_rate, &mut fft).ok_or_else(|| {
            MelodyError::Tracker(format!(
                "pitch floor {} Hz leaves no analysis window at {} Hz",
                self.fmin, sample_rate
            ))
        })?;
        let fft = fft.as_mut().ok_or_else(|| {
            MelodyError::Tracker("autocorrelation plan missing".to_string())
        })?;

        let rate = sample_rate as f64;
        let frames: Vec<Frame> = (0..count)
            .map(|i| self.analyze_frame(samples, i * self.hop_length, rate, global_peak, &geo, fft))
            .collect();

        let time_step = self.hop_length as f64 / rate;
        let path = self.find_path(&frames, time_step);

        let frequencies: Vec<Option<f64>> = frames
            .iter()
            .zip(path.iter())
            .map(|(frame, &place)| {
                let winner = frame.candidates[place];
                if winner.frequency <= 0.0 {
                    None
                } else {
                    in_range(winner.frequency, self.fmin, self.fmax)
                }
            })
            .collect();

        let contour = PitchContour::new(times, frequencies);
        debug!(
            "Praat AC: {} frames, {} voiced",
            contour.len(),
            contour.voiced_count()
        );

        Ok(contour)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_signals::{median_pitch, silence, sine};
    use super::*;

    #[test]
    fn tracks_a_steady_tone() {
        let config = AnalysisConfig::default();
        let mut tracker = PraatTracker::new(&config);
        let contour = tracker
            .track(&sine(220.0, config.sample_rate, 1.0), config.sample_rate)
            .unwrap();

        assert!(contour.voiced_count() > contour.len() / 2);
        let median = median_pitch(&contour).unwrap();
        assert!((median - 220.0).abs() < 220.0 * 0.02, "median {}", median);
    }

    #[test]
    fn silence_is_unvoiced() {
        let config = AnalysisConfig::default();
        let mut tracker = PraatTracker::new(&config);
        let contour = tracker
            .track(&silence(config.sample_rate, 0.5), config.sample_rate)
            .unwrap();

        assert!(!contour.is_empty());
        assert_eq!(contour.voiced_count(), 0);
    }

    #[test]
    fn autocorrelation_peaks_at_zero_lag() {
        let mut correlator = Autocorrelator::new(16);
        let ac = correlator.compute(&[1.0, -1.0, 1.0, -1.0], 3);
        assert!((ac[0] - 4.0).abs() < 1e-9);
        assert!((ac[1] + 3.0).abs() < 1e-9);
        assert!((ac[2] - 2.0).abs() < 1e-9);
    }
}
