//! # Composition Raster Module
//!
//! Expands a [`Composition`] into a grid with one row per fingering slot and
//! one column per tick. The grid is computed once when a session starts and is
//! read-only afterwards; scrolling and scoring work on a copy in the viewport.

use crate::composition::Composition;
use crate::error::Result;
use crate::notes::NoteId;

/// Rows in the raster and in the viewport.
pub const RASTER_ROWS: usize = 13;
/// First row that can hold a note (Si).
pub const FIRST_TRACK_ROW: usize = 3;
/// One past the last row that can hold a note (Do is on row 9).
pub const END_TRACK_ROW: usize = RASTER_ROWS - 3;

/// Contents of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    /// Outside the note tracks; drawn by the renderer (fingering area).
    #[default]
    Margin,
    /// Track cell without a note.
    Blank,
    /// First tick of a regular note.
    NoteStart,
    /// Following ticks of a note.
    Continuation,
    /// First tick of the high Do.
    HighStart,
    /// Judged at the alignment column: the right note was played.
    Hit,
    /// Judged at the alignment column: the note was missed.
    Miss,
    /// Judged at the alignment column with nothing to play.
    JudgmentLine,
}

impl Cell {
    /// Whether the cell still holds an unjudged note.
    pub fn is_note(self) -> bool {
        matches!(self, Cell::NoteStart | Cell::Continuation | Cell::HighStart)
    }

    pub fn glyph(self) -> char {
        match self {
            Cell::Margin => ' ',
            Cell::Blank => '.',
            Cell::NoteStart => 'S',
            Cell::Continuation => '_',
            Cell::HighStart => 'D',
            Cell::Hit => 'X',
            Cell::Miss => '@',
            Cell::JudgmentLine => '|',
        }
    }
}

/// Whether `row` is one of the note tracks.
pub fn is_track_row(row: usize) -> bool {
    (FIRST_TRACK_ROW..END_TRACK_ROW).contains(&row)
}

/// The precomputed score grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterGrid {
    rows: Vec<Vec<Cell>>,
    total_duration: usize,
}

impl RasterGrid {
    /// Expands a composition into its grid.
    ///
    /// # Returns
    /// * `Ok(grid)` - `RASTER_ROWS` rows of `total_duration` columns
    /// * `Err(e)` - The composition is empty or has a zero-length note
    pub fn build(composition: &Composition) -> Result<Self> {
        composition.validate()?;
        let total_duration = composition.total_duration();

        let mut rows = vec![vec![Cell::Margin; total_duration]; RASTER_ROWS];
        for row in rows[FIRST_TRACK_ROW..END_TRACK_ROW].iter_mut() {
            row.fill(Cell::Blank);
        }

        let mut cursor = 0;
        for play in &composition.notes {
            let duration = play.duration as usize;
            if play.note != NoteId::Empty {
                let track = &mut rows[play.note.visual_row()];
                track[cursor] = if play.note.is_high() {
                    Cell::HighStart
                } else {
                    Cell::NoteStart
                };
                track[cursor + 1..cursor + duration].fill(Cell::Continuation);
            }
            cursor += duration;
        }

        Ok(Self { rows, total_duration })
    }

    pub fn total_duration(&self) -> usize {
        self.total_duration
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, row: usize, column: usize) -> Cell {
        self.rows[row][column]
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        &self.rows[row]
    }

    /// Renders one row as text, e.g. `"S...D__"`.
    pub fn row_text(&self, row: usize) -> String {
        self.rows[row].iter().map(|c| c.glyph()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::PlayNote;
    use crate::error::FluteError;

    #[test]
    fn occupancy_of_note_rest_and_high_note() {
        let composition = Composition::new(
            "test",
            "",
            vec![
                PlayNote::new(NoteId::Si, 1),
                PlayNote::new(NoteId::Empty, 2),
                PlayNote::new(NoteId::DoHigh, 3),
            ],
        );
        let grid = RasterGrid::build(&composition).unwrap();
        assert_eq!(grid.total_duration(), 6);
        assert_eq!(grid.column_count(), 6);
        assert_eq!(grid.row_count(), RASTER_ROWS);

        let si = NoteId::Si.visual_row();
        let high = NoteId::DoHigh.visual_row();
        assert_eq!(grid.row_text(si), "S.....");
        assert_eq!(grid.row_text(high), "...D__");

        for column in 1..=2 {
            for row in FIRST_TRACK_ROW..END_TRACK_ROW {
                assert_eq!(grid.cell(row, column), Cell::Blank);
            }
        }
    }

    #[test]
    fn margins_are_not_tracks() {
        let grid = RasterGrid::build(&Composition::demo()).unwrap();
        for row in (0..FIRST_TRACK_ROW).chain(END_TRACK_ROW..RASTER_ROWS) {
            assert!(grid.row(row).iter().all(|&c| c == Cell::Margin));
        }
        assert!(!is_track_row(NoteId::Empty.visual_row()));
        assert!(is_track_row(NoteId::Do.visual_row()));
    }

    #[test]
    fn demo_piece_layout() {
        let grid = RasterGrid::build(&Composition::demo()).unwrap();
        assert_eq!(grid.column_count(), 28);
        assert_eq!(grid.row_text(NoteId::Si.visual_row()), format!("S.S..S____{}", ".".repeat(18)));
        assert_eq!(grid.row_text(NoteId::Do.visual_row()), format!("{}S_{}", ".".repeat(21), ".".repeat(5)));
        assert_eq!(grid.cell(NoteId::DoHigh.visual_row(), 27), Cell::HighStart);
    }

    #[test]
    fn malformed_composition_is_rejected() {
        let empty = Composition::new("empty", "", vec![]);
        assert!(matches!(RasterGrid::build(&empty), Err(FluteError::EmptyComposition)));
        let zero = Composition::new("zero", "", vec![PlayNote::new(NoteId::Re, 0)]);
        assert!(matches!(RasterGrid::build(&zero), Err(FluteError::ZeroDuration { index: 0 })));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn play_note() -> impl Strategy<Value = PlayNote> {
            (0u8..9, 1u32..12).prop_map(|(id, duration)| {
                PlayNote::new(NoteId::try_from(id).unwrap(), duration)
            })
        }

        proptest! {
            #[test]
            fn column_count_is_sum_of_durations(notes in prop::collection::vec(play_note(), 1..40)) {
                let expected: usize = notes.iter().map(|n| n.duration as usize).sum();
                let grid = RasterGrid::build(&Composition::new("p", "", notes.clone())).unwrap();
                prop_assert_eq!(grid.column_count(), expected);
                prop_assert_eq!(grid.total_duration(), expected);
            }

            #[test]
            fn every_note_starts_on_its_row(notes in prop::collection::vec(play_note(), 1..40)) {
                let grid = RasterGrid::build(&Composition::new("p", "", notes.clone())).unwrap();
                let mut column = 0;
                for play in &notes {
                    if !play.is_rest() {
                        let start = grid.cell(play.note.visual_row(), column);
                        prop_assert!(start == Cell::NoteStart || start == Cell::HighStart);
                    }
                    column += play.duration as usize;
                }
            }
        }
    }
}
