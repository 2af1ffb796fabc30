//! # Pitch Detection Module
//!
//! This module implements the YIN fundamental frequency estimator used to
//! recognise the note played on the recorder.
//!
//! ## Stages
//! 1. Squared difference of the window with lagged copies of itself
//! 2. Cumulative mean normalized difference
//! 3. Absolute threshold search, descending to the bottom of the first dip
//! 4. Parabolic interpolation for sub-sample lag accuracy
//!
//! No filtering or noise gate is applied to the raw signal. The threshold and
//! the local-minimum search are the only noise rejection, so callers must
//! treat a confidence near 0 as unreliable whatever the frequency says.

/// Frequency reported when no periodicity was found.
pub const NO_PITCH_HZ: f64 = -1.0;

/// Tolerance used when comparing a frequency against [`NO_PITCH_HZ`].
pub const NO_PITCH_EPSILON: f64 = 1e-4;

/// Result of analysing one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchEstimate {
    /// Fundamental frequency in Hz, or [`NO_PITCH_HZ`].
    pub frequency: f64,
    /// Periodicity of the window (0.0 to 1.0).
    pub confidence: f64,
}

impl PitchEstimate {
    /// The no-pitch sentinel.
    pub const NONE: PitchEstimate = PitchEstimate {
        frequency: NO_PITCH_HZ,
        confidence: 0.0,
    };

    /// Whether this estimate carries a frequency.
    pub fn is_pitched(&self) -> bool {
        self.frequency + 1.0 > NO_PITCH_EPSILON
    }
}

/// YIN detector with its own scratch buffer.
///
/// The buffer is sized once for the window length and cleared at the start of
/// every run, so a detector can be reused from the audio callback without
/// allocating. A detector must not be shared between concurrent runs.
#[derive(Debug, Clone)]
pub struct YinDetector {
    window_size: usize,
    half_window: usize,
    yin_buffer: Vec<f64>,
    probability: f64,
    threshold: f64,
}

impl YinDetector {
    /// Threshold recommended by the YIN paper.
    pub const DEFAULT_THRESHOLD: f64 = 0.15;

    /// Creates a detector for windows of `window_size` samples.
    ///
    /// # Arguments
    /// * `window_size` - Number of samples per analysed window
    /// * `threshold` - Allowed aperiodicity (e.g. 0.05 reports pitches with ~95% periodicity)
    pub fn new(window_size: usize, threshold: f64) -> Self {
        let half_window = window_size / 2;
        Self {
            window_size,
            half_window,
            yin_buffer: vec![0.0; half_window],
            probability: 0.0,
            threshold,
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Confidence of the last run (0.0 when no pitch was found).
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Runs all four stages on one window.
    ///
    /// # Arguments
    /// * `window` - Exactly `window_size` mono samples
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Returns
    /// * `PitchEstimate` - Frequency and confidence, or [`PitchEstimate::NONE`]
    ///
    /// # Panics
    /// * If the window length is not equal to the configured window size
    pub fn detect(&mut self, window: &[f32], sample_rate: u32) -> PitchEstimate {
        if window.len() != self.window_size {
            panic!("Input window size must be equal to the detector window size");
        }

        self.yin_buffer.fill(0.0);
        self.probability = 0.0;

        self.difference(window);
        self.cumulative_mean_normalized_difference();

        match self.absolute_threshold() {
            Some(tau) => {
                let better_tau = self.parabolic_interpolation(tau);
                PitchEstimate {
                    frequency: sample_rate as f64 / better_tau,
                    confidence: self.probability,
                }
            }
            None => PitchEstimate::NONE,
        }
    }

    // --- Step 1: squared difference for every lag in [0, W/2) ---
    fn difference(&mut self, window: &[f32]) {
        let half = self.half_window;
        for (tau, slot) in self.yin_buffer.iter_mut().enumerate() {
            let mut sum = 0.0;
            for i in 0..half {
                let delta = window[i] as f64 - window[i + tau] as f64;
                sum += delta * delta;
            }
            *slot = sum;
        }
    }

    // --- Step 2: cumulative mean normalized difference ---
    fn cumulative_mean_normalized_difference(&mut self) {
        if self.yin_buffer.is_empty() {
            return;
        }
        let mut running_sum = 0.0;
        self.yin_buffer[0] = 1.0;
        for tau in 1..self.half_window {
            running_sum += self.yin_buffer[tau];
            if running_sum != 0.0 {
                self.yin_buffer[tau] *= tau as f64 / running_sum;
            } else {
                self.yin_buffer[tau] = 1.0;
            }
        }
    }

    // --- Step 3: first dip under the threshold, followed to its trough ---
    fn absolute_threshold(&mut self) -> Option<usize> {
        let half = self.half_window;
        // The first two lags are always skipped.
        let mut tau = 2;
        while tau < half {
            if self.yin_buffer[tau] < self.threshold {
                while tau + 1 < half && self.yin_buffer[tau + 1] < self.yin_buffer[tau] {
                    tau += 1;
                }
                // Periodicity is the complement of the residual aperiodicity.
                self.probability = 1.0 - self.yin_buffer[tau];
                return Some(tau);
            }
            tau += 1;
        }
        self.probability = 0.0;
        None
    }

    // --- Step 4: parabolic interpolation around the integer lag ---
    fn parabolic_interpolation(&self, tau: usize) -> f64 {
        let x0 = if tau < 1 { tau } else { tau - 1 };
        let x2 = if tau + 1 < self.half_window { tau + 1 } else { tau };
        let buf = &self.yin_buffer;

        if x0 == tau {
            if buf[tau] <= buf[x2] { tau as f64 } else { x2 as f64 }
        } else if x2 == tau {
            if buf[tau] <= buf[x0] { tau as f64 } else { x0 as f64 }
        } else {
            let (s0, s1, s2) = (buf[x0], buf[tau], buf[x2]);
            let denominator = 2.0 * (2.0 * s1 - s2 - s0);
            if denominator.abs() < f64::EPSILON {
                tau as f64
            } else {
                tau as f64 + (s2 - s0) / denominator
            }
        }
    }
}
