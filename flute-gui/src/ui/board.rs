//! # Board Module
//!
//! The game board as monospace text: the fingering of the note just heard on
//! the left, the part of the score from the judgment line onward on the right.
//!
//! ```text
//!   ---
//!  | = |
//!  |   |
//!  | # | #  |.............................
//!  | O |    |.........S_D.................
//! ```

use flute_core::NoteId;
use flute_core::TickFrame;
use flute_core::raster::RASTER_ROWS;
use iced::widget::{container, text};
use iced::{Element, Font, Length};

/// Builds the board lines for a frame.
///
/// Without a frame the open fingering is shown next to an empty track.
///
/// # Arguments
/// * `frame` - Last frame from the audio thread, if any
/// * `viewport_width` - Width of the viewport in columns
/// * `alignment` - Judgment line column; the board starts there
pub fn compose_board(frame: Option<&TickFrame>, viewport_width: usize, alignment: usize) -> Vec<String> {
    let note = frame.map_or(NoteId::Empty, |f| f.note);
    let fingering = &note.reference().fingering;
    let track_width = viewport_width.saturating_sub(alignment);

    (0..RASTER_ROWS)
        .map(|row| {
            let track: String = match frame {
                Some(frame) => frame.viewport.row(row)[alignment..]
                    .iter()
                    .map(|cell| cell.glyph())
                    .collect(),
                None => " ".repeat(track_width),
            };
            format!("{} {}", fingering[row], track)
        })
        .collect()
}

/// Renders composed board lines.
pub fn view(lines: &[String]) -> Element<'static, crate::Message> {
    container(text(lines.join("\n")).font(Font::MONOSPACE).size(20))
        .width(Length::Fill)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flute_core::{Composition, GameConfig, GameSession, PlayNote};

    fn frames(count: usize) -> Vec<TickFrame> {
        let piece = Composition::new(
            "t",
            "",
            vec![PlayNote::new(NoteId::Si, 1), PlayNote::new(NoteId::DoHigh, 2)],
        );
        let mut session = GameSession::new(&GameConfig::default(), &piece).unwrap();
        (0..count).map(|_| session.step(NoteId::Si)).collect()
    }

    #[test]
    fn empty_board_has_open_fingering() {
        let lines = compose_board(None, 40, 10);
        assert_eq!(lines.len(), RASTER_ROWS);
        assert!(lines.iter().all(|line| line.chars().count() == 40));
        assert_eq!(lines[3], format!("{} {}", " | O | O ", " ".repeat(30)));
    }

    #[test]
    fn board_shows_the_judged_column() {
        let frames = frames(30);
        let lines = compose_board(frames.last(), 40, 10);

        // Si is held and judged a hit on its row, the high Do waits behind it.
        assert_eq!(lines[3], format!("{} X{}", " | # | # ", ".".repeat(29)));
        assert_eq!(lines[4], format!("{} |D_{}", " | O |   ", ".".repeat(27)));
        assert_eq!(lines[9], format!("{} |{}", " |O  |   ", ".".repeat(29)));
        assert_eq!(lines[0], format!("{} {}", "  ---    ", " ".repeat(30)));
    }
}
