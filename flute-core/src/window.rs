//! # Sample Window Module
//!
//! Assembles the sample chunks delivered by the capture callback into fixed,
//! non-overlapping analysis windows and throttles how many of them reach the
//! pitch detector.
//!
//! The detector costs O((W/2)²) per window, so only one window out of every
//! `skipped + 1` is admitted. Skipped windows are still fully consumed, which
//! keeps the window boundaries aligned with the incoming stream.

use tracing::trace;

/// Fixed admit/skip pattern: admit one window, skip the next `skipped`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DutyCycle {
    skipped: usize,
    phase: usize,
}

impl DutyCycle {
    pub fn new(skipped: usize) -> Self {
        Self { skipped, phase: 0 }
    }

    /// Decides for the next full window and moves to the following phase.
    pub fn next_admits(&mut self) -> bool {
        let admit = self.phase == 0;
        self.phase = if self.phase >= self.skipped { 0 } else { self.phase + 1 };
        admit
    }

    pub fn reset(&mut self) {
        self.phase = 0;
    }
}

/// Buffers samples into windows of `window_size` and hands admitted windows
/// to a caller-supplied closure.
///
/// The window buffer is allocated once; `push` never allocates.
#[derive(Debug, Clone)]
pub struct WindowAccumulator {
    buffer: Vec<f32>,
    write_pos: usize,
    duty: DutyCycle,
    windows_seen: u64,
    windows_analyzed: u64,
}

impl WindowAccumulator {
    /// # Panics
    /// * If `window_size` is zero
    pub fn new(window_size: usize, skipped: usize) -> Self {
        assert!(window_size > 0, "window size must be positive");
        Self {
            buffer: vec![0.0; window_size],
            write_pos: 0,
            duty: DutyCycle::new(skipped),
            windows_seen: 0,
            windows_analyzed: 0,
        }
    }

    pub fn window_size(&self) -> usize {
        self.buffer.len()
    }

    /// Number of samples waiting in the current, not yet full, window.
    pub fn pending(&self) -> usize {
        self.write_pos
    }

    pub fn windows_seen(&self) -> u64 {
        self.windows_seen
    }

    pub fn windows_analyzed(&self) -> u64 {
        self.windows_analyzed
    }

    /// Copies `chunk` into the window buffer.
    ///
    /// Every time the buffer fills up the duty cycle is consulted; admitted
    /// windows are passed to `on_window` as a read-only slice. The write cursor
    /// returns to 0 after every full window, admitted or not. Chunks of any
    /// length are accepted, including ones that span several windows.
    ///
    /// # Returns
    /// * Number of windows admitted during this call
    pub fn push<F>(&mut self, chunk: &[f32], mut on_window: F) -> usize
    where
        F: FnMut(&[f32]),
    {
        let window_size = self.buffer.len();
        let mut admitted = 0;
        let mut rest = chunk;

        while !rest.is_empty() {
            let room = window_size - self.write_pos;
            let take = room.min(rest.len());
            self.buffer[self.write_pos..self.write_pos + take].copy_from_slice(&rest[..take]);
            self.write_pos += take;
            rest = &rest[take..];

            if self.write_pos == window_size {
                self.windows_seen += 1;
                if self.duty.next_admits() {
                    self.windows_analyzed += 1;
                    admitted += 1;
                    on_window(&self.buffer);
                } else {
                    trace!(window = self.windows_seen, "skipping window");
                }
                self.write_pos = 0;
            }
        }

        admitted
    }

    /// Drops any partial window and restarts the duty cycle.
    pub fn reset(&mut self) {
        self.write_pos = 0;
        self.duty.reset();
    }
}
