//! # Scoring Module
//!
//! Judges the played note against the viewport column at the alignment line.

use tracing::trace;

use crate::notes::NoteId;
use crate::raster::{Cell, END_TRACK_ROW, FIRST_TRACK_ROW};
use crate::scroll::Viewport;

/// Points for each correct note.
pub const HIT_POINTS: u32 = 10;
/// Points taken for each missed note.
pub const MISS_PENALTY: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoringEngine {
    score: u32,
}

impl ScoringEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn reset(&mut self) {
        self.score = 0;
    }

    /// Scores one tick and marks the alignment column.
    ///
    /// Every track row is judged on its own. A note cell on the played note's
    /// row is a hit, except that the high Do only counts on its own start
    /// marker. A note cell on any other row is a miss. Cells without a note
    /// become part of the judgment line.
    ///
    /// # Returns
    /// * The change actually applied to the score; misses never take it below 0
    pub fn evaluate(&mut self, viewport: &mut Viewport, note: NoteId) -> i64 {
        let before = self.score;
        let column = viewport.alignment();
        let played_row = note.visual_row();

        for row in FIRST_TRACK_ROW..END_TRACK_ROW {
            let cell = viewport.cell(row, column);
            let mark = if !cell.is_note() {
                Cell::JudgmentLine
            } else if row == played_row && (!note.is_high() || cell == Cell::HighStart) {
                self.score += HIT_POINTS;
                Cell::Hit
            } else {
                self.score = self.score.saturating_sub(MISS_PENALTY);
                Cell::Miss
            };
            viewport.set_cell(row, column, mark);
        }

        let delta = self.score as i64 - before as i64;
        if delta != 0 {
            trace!(%note, delta, score = self.score, "scored");
        }
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::{Composition, PlayNote};
    use crate::raster::RasterGrid;
    use crate::scroll::ScrollCursor;

    const WIDTH: usize = 12;
    const ALIGN: usize = 2;

    /// Viewport with the first column of `notes` sitting on the alignment line.
    fn aligned(notes: Vec<PlayNote>) -> Viewport {
        let raster = RasterGrid::build(&Composition::new("t", "", notes)).unwrap();
        let mut cursor = ScrollCursor::new(WIDTH, ALIGN, raster.total_duration());
        while cursor.target() > ALIGN {
            cursor.advance();
        }
        let mut view = Viewport::new(WIDTH, ALIGN);
        view.render(&raster, &cursor);
        view
    }

    #[test]
    fn matching_start_marker_is_a_hit() {
        let mut view = aligned(vec![PlayNote::new(NoteId::Sol, 2)]);
        let mut scoring = ScoringEngine::new();
        assert_eq!(scoring.evaluate(&mut view, NoteId::Sol), 10);
        assert_eq!(scoring.score(), 10);
        assert_eq!(view.cell(NoteId::Sol.visual_row(), ALIGN), Cell::Hit);
        assert_eq!(view.cell(NoteId::Do.visual_row(), ALIGN), Cell::JudgmentLine);
    }

    #[test]
    fn wrong_note_is_a_miss_clamped_at_zero() {
        let mut view = aligned(vec![PlayNote::new(NoteId::Re, 1)]);
        let mut scoring = ScoringEngine::new();
        assert_eq!(scoring.evaluate(&mut view, NoteId::Mi), 0);
        assert_eq!(scoring.score(), 0);
        assert_eq!(view.cell(NoteId::Re.visual_row(), ALIGN), Cell::Miss);
        assert_eq!(view.cell(NoteId::Mi.visual_row(), ALIGN), Cell::JudgmentLine);
    }

    #[test]
    fn miss_takes_one_point() {
        let mut scoring = ScoringEngine::new();
        let mut view = aligned(vec![PlayNote::new(NoteId::Fa, 1)]);
        scoring.evaluate(&mut view, NoteId::Fa);

        let mut view = aligned(vec![PlayNote::new(NoteId::Fa, 1)]);
        assert_eq!(scoring.evaluate(&mut view, NoteId::Empty), -1);
        assert_eq!(scoring.score(), 9);
    }

    #[test]
    fn continuation_counts_as_hit() {
        let raster = RasterGrid::build(&Composition::new("t", "", vec![PlayNote::new(NoteId::La, 3)])).unwrap();
        let mut cursor = ScrollCursor::new(WIDTH, ALIGN, raster.total_duration());
        while cursor.target() > ALIGN {
            cursor.advance();
        }
        cursor.advance();
        let mut view = Viewport::new(WIDTH, ALIGN);
        view.render(&raster, &cursor);
        assert_eq!(view.cell(NoteId::La.visual_row(), ALIGN), Cell::Continuation);

        let mut scoring = ScoringEngine::new();
        assert_eq!(scoring.evaluate(&mut view, NoteId::La), 10);
    }

    #[test]
    fn high_do_needs_its_own_marker() {
        let mut scoring = ScoringEngine::new();

        let mut view = aligned(vec![PlayNote::new(NoteId::DoHigh, 1)]);
        assert_eq!(scoring.evaluate(&mut view, NoteId::DoHigh), 10);

        let mut view = aligned(vec![PlayNote::new(NoteId::La, 1)]);
        assert_eq!(scoring.evaluate(&mut view, NoteId::DoHigh), -1);
        assert_eq!(view.cell(NoteId::La.visual_row(), ALIGN), Cell::Miss);
        assert_eq!(scoring.score(), 9);

        // La played over the high Do marker shares the row and scores.
        let mut view = aligned(vec![PlayNote::new(NoteId::DoHigh, 1)]);
        assert_eq!(scoring.evaluate(&mut view, NoteId::La), 10);
    }

    #[test]
    fn blank_column_only_draws_the_line() {
        let mut view = aligned(vec![PlayNote::new(NoteId::Empty, 4)]);
        let mut scoring = ScoringEngine::new();
        assert_eq!(scoring.evaluate(&mut view, NoteId::Si), 0);
        for row in FIRST_TRACK_ROW..END_TRACK_ROW {
            assert_eq!(view.cell(row, ALIGN), Cell::JudgmentLine);
        }
        assert_eq!(view.cell(0, ALIGN), Cell::Margin);
    }

    #[test]
    fn reset_clears_the_score() {
        let mut view = aligned(vec![PlayNote::new(NoteId::Do, 1)]);
        let mut scoring = ScoringEngine::new();
        scoring.evaluate(&mut view, NoteId::Do);
        scoring.reset();
        assert_eq!(scoring.score(), 0);
    }
}
