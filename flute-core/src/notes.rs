//! # Recorder Notes Module
//!
//! The fixed table of recorder fingerings the game can recognise, and the
//! nearest-neighbour classifier that maps a detected frequency onto it.
//!
//! ## Reference frequencies
//! The table frequencies are the values measured on a real recorder through
//! the detector, not theoretical pitches. They sit a few percent away from the
//! equal temperament values and must be re-measured, not recomputed, if the
//! instrument changes.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::FluteError;
use crate::pitch::NO_PITCH_EPSILON;

/// Number of text lines in a fingering drawing.
pub const FINGERING_LINES: usize = 13;

/// Identifies one entry of the reference table.
///
/// Serialized as its integer index, which is the composition file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum NoteId {
    /// No holes covered; also used for rests and for "no pitch".
    Empty = 0,
    Do,
    Re,
    Mi,
    Fa,
    Sol,
    La,
    Si,
    DoHigh,
}

impl NoteId {
    pub const ALL: [NoteId; 9] = [
        NoteId::Empty,
        NoteId::Do,
        NoteId::Re,
        NoteId::Mi,
        NoteId::Fa,
        NoteId::Sol,
        NoteId::La,
        NoteId::Si,
        NoteId::DoHigh,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn reference(self) -> &'static ReferenceNote {
        &REFERENCE_NOTES[self.index()]
    }

    pub fn visual_row(self) -> usize {
        self.reference().visual_row
    }

    /// The high variant shares its row with La and is scored apart.
    pub fn is_high(self) -> bool {
        self == NoteId::DoHigh
    }

    /// Short name used in logs ("SI", "DO_HIGH", ...).
    fn name(self) -> &'static str {
        match self {
            NoteId::Empty => "EMPTY",
            NoteId::Do => "DO",
            NoteId::Re => "RE",
            NoteId::Mi => "MI",
            NoteId::Fa => "FA",
            NoteId::Sol => "SOL",
            NoteId::La => "LA",
            NoteId::Si => "SI",
            NoteId::DoHigh => "DO_HIGH",
        }
    }
}

impl TryFrom<u8> for NoteId {
    type Error = FluteError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        NoteId::ALL
            .get(value as usize)
            .copied()
            .ok_or(FluteError::UnknownNote(value))
    }
}

impl From<NoteId> for u8 {
    fn from(note: NoteId) -> u8 {
        note as u8
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One fingering of the recorder.
#[derive(Debug, Clone)]
pub struct ReferenceNote {
    pub id: NoteId,
    /// Human readable label shown next to the fingering.
    pub label: &'static str,
    /// Measured frequency in Hz.
    pub frequency: f64,
    /// Text drawing of the instrument with this fingering; `#` closed, `O` open.
    pub fingering: [String; FINGERING_LINES],
    /// Raster row where this note is drawn in the score.
    pub visual_row: usize,
}

/// Builds a drawing from the thumb hole and the seven front holes, top to bottom.
fn fingering(thumb: char, holes: [char; 7]) -> [String; FINGERING_LINES] {
    [
        "  ---    ".to_string(),
        " | = |   ".to_string(),
        " |   |   ".to_string(),
        format!(" | {} | {} ", holes[0], thumb),
        format!(" | {} |   ", holes[1]),
        format!(" | {} |   ", holes[2]),
        format!(" | {} |   ", holes[3]),
        format!(" | {} |   ", holes[4]),
        format!(" | {} |   ", holes[5]),
        format!(" |{}  |   ", holes[6]),
        "  | |    ".to_string(),
        " |   |   ".to_string(),
        "  ---    ".to_string(),
    ]
}

/// The reference table, indexed by [`NoteId`].
pub static REFERENCE_NOTES: Lazy<Vec<ReferenceNote>> = Lazy::new(|| {
    const C: char = '#';
    const O: char = 'O';
    vec![
        ReferenceNote {
            id: NoteId::Empty,
            label: "Recorder with no holes covered.",
            frequency: 1180.0,
            fingering: fingering(O, [O, O, O, O, O, O, O]),
            visual_row: 0,
        },
        // The true pitch would be 527 Hz.
        ReferenceNote {
            id: NoteId::Do,
            label: "Do",
            frequency: 521.0,
            fingering: fingering(C, [C, C, C, C, C, C, C]),
            visual_row: 9,
        },
        ReferenceNote {
            id: NoteId::Re,
            label: "Re ---A1#/B1b",
            frequency: 630.0,
            fingering: fingering(C, [C, C, C, C, C, C, O]),
            visual_row: 8,
        },
        ReferenceNote {
            id: NoteId::Mi,
            label: "Mi --- A1",
            frequency: 652.0,
            fingering: fingering(C, [C, C, C, C, C, O, O]),
            visual_row: 7,
        },
        ReferenceNote {
            id: NoteId::Fa,
            label: "Fá  --- G1",
            frequency: 700.0,
            fingering: fingering(C, [C, C, C, C, O, O, O]),
            visual_row: 6,
        },
        ReferenceNote {
            id: NoteId::Sol,
            label: "Sol --- F1",
            frequency: 780.0,
            fingering: fingering(C, [C, C, C, O, O, O, O]),
            visual_row: 5,
        },
        ReferenceNote {
            id: NoteId::La,
            label: "La --- E1",
            frequency: 882.0,
            fingering: fingering(C, [C, C, O, O, O, O, O]),
            visual_row: 4,
        },
        ReferenceNote {
            id: NoteId::Si,
            label: "Si ---- D1",
            frequency: 985.0,
            fingering: fingering(C, [C, O, O, O, O, O, O]),
            visual_row: 3,
        },
        ReferenceNote {
            id: NoteId::DoHigh,
            label: "Do high",
            frequency: 1040.0,
            fingering: fingering(C, [O, C, O, O, O, O, O]),
            visual_row: 4,
        },
    ]
});

/// Finds the reference note closest to a detected frequency.
///
/// A frequency equal to the no-pitch sentinel (within a small tolerance)
/// resolves to [`NoteId::Empty`]. Otherwise every entry, including the open
/// fingering, is compared by absolute distance; on a tie the lower index wins.
///
/// # Arguments
/// * `frequency` - Detected frequency in Hz, or the no-pitch sentinel
///
/// # Returns
/// * The closest [`NoteId`]
pub fn classify(frequency: f64) -> NoteId {
    if frequency + 1.0 <= NO_PITCH_EPSILON {
        return NoteId::Empty;
    }

    let mut best = NoteId::Empty;
    let mut lowest_delta = f64::INFINITY;
    for note in REFERENCE_NOTES.iter() {
        let delta = (frequency - note.frequency).abs();
        if delta < lowest_delta {
            lowest_delta = delta;
            best = note.id;
        }
    }
    best
}
