//! # Game Session Module
//!
//! Ties the pipeline together: sample windows go to the detector, the
//! detected pitch is classified, and every analysed window advances the
//! score by one tick.
//!
//! Per tick the order is fixed: classify, render the viewport, score the
//! alignment column, then advance the cursor. The frame handed out reflects
//! the viewport as judged, before the cursor moved.

use tracing::{debug, info, trace};

use crate::TickFrame;
use crate::composition::Composition;
use crate::config::GameConfig;
use crate::error::Result;
use crate::notes::{NoteId, classify};
use crate::pitch::{PitchEstimate, YinDetector};
use crate::raster::RasterGrid;
use crate::scoring::ScoringEngine;
use crate::scroll::{ScrollCursor, Viewport};
use crate::window::WindowAccumulator;

/// Commands the front end can send to a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Scroll the piece back to the start and clear the score.
    Restart,
}

/// Raster, cursor, viewport and score of one piece.
#[derive(Debug, Clone)]
pub struct Playfield {
    raster: RasterGrid,
    cursor: ScrollCursor,
    viewport: Viewport,
    scoring: ScoringEngine,
}

impl Playfield {
    pub fn new(composition: &Composition, viewport_width: usize, alignment: usize) -> Result<Self> {
        let raster = RasterGrid::build(composition)?;
        let cursor = ScrollCursor::new(viewport_width, alignment, raster.total_duration());
        Ok(Self {
            raster,
            cursor,
            viewport: Viewport::new(viewport_width, alignment),
            scoring: ScoringEngine::new(),
        })
    }

    /// Plays one tick with `note` as the note heard.
    pub fn step(&mut self, pitch: Option<PitchEstimate>, note: NoteId) -> TickFrame {
        let source_cursor = self.cursor.source();
        let target_cursor = self.cursor.target();

        self.viewport.render(&self.raster, &self.cursor);
        let score_delta = self.scoring.evaluate(&mut self.viewport, note);

        let frame = TickFrame {
            pitch,
            note,
            score: self.scoring.score(),
            score_delta,
            // One small copy per tick; the renderer gets an owned snapshot.
            viewport: self.viewport.clone(),
            source_cursor,
            target_cursor,
        };
        self.cursor.advance();
        frame
    }

    pub fn restart(&mut self) {
        self.cursor.reset();
        self.scoring.reset();
    }

    pub fn raster(&self) -> &RasterGrid {
        &self.raster
    }

    pub fn cursor(&self) -> &ScrollCursor {
        &self.cursor
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn score(&self) -> u32 {
        self.scoring.score()
    }
}

/// Everything one player needs, owned by the capture callback.
#[derive(Debug, Clone)]
pub struct GameSession {
    accumulator: WindowAccumulator,
    detector: YinDetector,
    playfield: Playfield,
    sample_rate: u32,
}

impl GameSession {
    /// Validates the settings and lays out the composition.
    ///
    /// # Arguments
    /// * `config` - Game settings; `config.sample_rate` must be the rate the samples arrive at
    /// * `composition` - The piece to play
    pub fn new(config: &GameConfig, composition: &Composition) -> Result<Self> {
        config.validate()?;
        let playfield = Playfield::new(composition, config.viewport_width, config.alignment_column)?;

        info!(
            name = %composition.name,
            ticks = playfield.raster().total_duration(),
            sample_rate = config.sample_rate,
            window_size = config.window_size,
            "session ready"
        );
        if !composition.description.is_empty() {
            info!("{}", composition.description);
        }

        Ok(Self {
            accumulator: WindowAccumulator::new(config.window_size, config.skipped_windows),
            detector: YinDetector::new(config.window_size, config.threshold),
            playfield,
            sample_rate: config.sample_rate,
        })
    }

    /// Feeds captured samples; `on_tick` gets a frame for every analysed window.
    ///
    /// # Returns
    /// * Number of ticks played during this call
    pub fn push_samples<F>(&mut self, chunk: &[f32], mut on_tick: F) -> usize
    where
        F: FnMut(TickFrame),
    {
        let Self {
            accumulator,
            detector,
            playfield,
            sample_rate,
            ..
        } = self;

        accumulator.push(chunk, |window| {
            let pitch = detector.detect(window, *sample_rate);
            let note = classify(pitch.frequency);
            trace!(frequency = pitch.frequency, confidence = pitch.confidence, %note, "window analysed");
            on_tick(playfield.step(Some(pitch), note));
        })
    }

    /// Analyses one full window directly, bypassing the duty cycle.
    ///
    /// # Panics
    /// * If the window length is not the configured window size
    pub fn analyze_window(&mut self, window: &[f32]) -> TickFrame {
        let pitch = self.detector.detect(window, self.sample_rate);
        self.playfield.step(Some(pitch), classify(pitch.frequency))
    }

    /// Plays one tick with a known note, without any audio.
    pub fn step(&mut self, note: NoteId) -> TickFrame {
        self.playfield.step(None, note)
    }

    pub fn restart(&mut self) {
        debug!(score = self.score(), "restarting piece");
        self.playfield.restart();
    }

    pub fn apply(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Restart => self.restart(),
        }
    }

    pub fn score(&self) -> u32 {
        self.playfield.score()
    }

    pub fn cursor(&self) -> &ScrollCursor {
        self.playfield.cursor()
    }

    pub fn viewport(&self) -> &Viewport {
        self.playfield.viewport()
    }

    pub fn raster(&self) -> &RasterGrid {
        self.playfield.raster()
    }

    pub fn windows_seen(&self) -> u64 {
        self.accumulator.windows_seen()
    }

    pub fn windows_analyzed(&self) -> u64 {
        self.accumulator.windows_analyzed()
    }
}
