//! # Score Scrolling Module
//!
//! Walks the raster across a fixed-width viewport. The piece enters from the
//! right edge, slides left until its first column reaches the alignment
//! column, then the source cursor advances one raster column per tick until
//! the piece has passed completely, at which point everything starts again.

use tracing::debug;

use crate::raster::{Cell, END_TRACK_ROW, FIRST_TRACK_ROW, RASTER_ROWS, RasterGrid};

/// Position of the raster inside the viewport.
///
/// `source` is the first raster column shown, `target` the viewport column it
/// is drawn at. Both only move forward until the piece ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollCursor {
    viewport_width: usize,
    alignment: usize,
    total_duration: usize,
    source: usize,
    target: usize,
}

impl ScrollCursor {
    /// # Panics
    /// * If `alignment` is not left of the last viewport column
    pub fn new(viewport_width: usize, alignment: usize, total_duration: usize) -> Self {
        assert!(
            alignment + 1 < viewport_width,
            "alignment column {alignment} does not fit a viewport of width {viewport_width}"
        );
        Self {
            viewport_width,
            alignment,
            total_duration,
            source: 0,
            target: viewport_width - 1,
        }
    }

    pub fn source(&self) -> usize {
        self.source
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    pub fn viewport_width(&self) -> usize {
        self.viewport_width
    }

    pub fn total_duration(&self) -> usize {
        self.total_duration
    }

    /// Ticks in one full pass, from entering on the right to the restart.
    pub fn period(&self) -> usize {
        (self.viewport_width - 1 - self.alignment) + self.total_duration + 1
    }

    /// Moves one tick forward.
    ///
    /// # Returns
    /// * `true` - The piece had ended and the cursor went back to the start
    /// * `false` - The cursor moved within the current pass
    pub fn advance(&mut self) -> bool {
        self.check();
        if self.target > self.alignment {
            self.target -= 1;
            false
        } else if self.source < self.total_duration {
            self.source += 1;
            false
        } else {
            debug!(total_duration = self.total_duration, "end of piece, restarting");
            self.reset();
            true
        }
    }

    /// Back to the state the cursor was created in.
    pub fn reset(&mut self) {
        self.source = 0;
        self.target = self.viewport_width - 1;
    }

    fn check(&self) {
        if self.source > self.total_duration
            || self.target < self.alignment
            || self.target >= self.viewport_width
        {
            panic!(
                "scroll cursor out of range: source {} of {}, target {} in [{}, {})",
                self.source, self.total_duration, self.target, self.alignment, self.viewport_width
            );
        }
    }
}

/// The visible slice of the raster, `RASTER_ROWS` rows by the viewport width.
///
/// Rendered again from the raster every tick, so marks left by scoring only
/// live until the next render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    width: usize,
    alignment: usize,
    cells: Vec<Cell>,
}

impl Viewport {
    pub fn new(width: usize, alignment: usize) -> Self {
        Self {
            width,
            alignment,
            cells: vec![Cell::Margin; width * RASTER_ROWS],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Redraws the viewport for the current cursor position.
    ///
    /// # Panics
    /// * If the cursor points outside the raster or the viewport
    pub fn render(&mut self, raster: &RasterGrid, cursor: &ScrollCursor) {
        cursor.check();
        debug_assert_eq!(cursor.viewport_width(), self.width);

        for row in 0..RASTER_ROWS {
            for column in 0..self.width {
                let track = (FIRST_TRACK_ROW..END_TRACK_ROW).contains(&row);
                self.cells[row * self.width + column] = if track && column >= self.alignment {
                    Cell::Blank
                } else {
                    Cell::Margin
                };
            }
        }

        let total = raster.total_duration();
        for column in cursor.target()..self.width {
            let source = cursor.source() + (column - cursor.target());
            if source >= total {
                break;
            }
            for row in FIRST_TRACK_ROW..END_TRACK_ROW {
                self.cells[row * self.width + column] = raster.cell(row, source);
            }
        }
    }

    pub fn cell(&self, row: usize, column: usize) -> Cell {
        self.cells[row * self.width + column]
    }

    pub fn set_cell(&mut self, row: usize, column: usize, cell: Cell) {
        self.cells[row * self.width + column] = cell;
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        &self.cells[row * self.width..(row + 1) * self.width]
    }

    pub fn row_text(&self, row: usize) -> String {
        self.row(row).iter().map(|c| c.glyph()).collect()
    }
}
