// flute-core/src/lib.rs

//! The core of Galileu's Flute, a recorder rhythm game.
//! This crate turns microphone samples into notes with the YIN detector,
//! scrolls the composition past a judgment line and keeps the score.
//! It is completely headless and contains no GUI code.

pub mod audio;
pub mod composition;
pub mod config;
pub mod error;
pub mod notes;
pub mod pitch;
pub mod raster;
pub mod scoring;
pub mod scroll;
pub mod session;
pub mod window;

pub use composition::{Composition, PlayNote};
pub use config::GameConfig;
pub use error::{FluteError, Result};
pub use notes::NoteId;
pub use session::{GameSession, SessionCommand};

/// The outcome of one game tick, sent to the renderer.
#[derive(Debug, Clone)]
pub struct TickFrame {
    /// What the detector measured; `None` when the note was given directly.
    pub pitch: Option<pitch::PitchEstimate>,
    /// The note the player was judged on.
    pub note: NoteId,
    /// Score after this tick.
    pub score: u32,
    /// Change applied to the score by this tick.
    pub score_delta: i64,
    /// The viewport including this tick's judgment marks.
    pub viewport: scroll::Viewport,
    /// First raster column shown.
    pub source_cursor: usize,
    /// Viewport column the source column is drawn at.
    pub target_cursor: usize,
}
