//! # Composition Module
//!
//! The symbolic score the player follows: an ordered list of notes, each held
//! for a whole number of ticks. Compositions are read from JSON files of the
//! form
//!
//! ```json
//! { "name": "...", "description": "...", "notesList": [ { "note": 7, "duration": 1 } ] }
//! ```
//!
//! where `note` is the [`NoteId`] index (0 is a rest).

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{FluteError, Result};
use crate::notes::NoteId;

/// One note of a composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayNote {
    /// The note to play; [`NoteId::Empty`] is a rest.
    pub note: NoteId,
    /// Number of ticks the note lasts.
    pub duration: u32,
}

impl PlayNote {
    pub fn new(note: NoteId, duration: u32) -> Self {
        Self { note, duration }
    }

    pub fn is_rest(&self) -> bool {
        self.note == NoteId::Empty
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "notesList")]
    pub notes: Vec<PlayNote>,
}

impl Composition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, notes: Vec<PlayNote>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            notes,
        }
    }

    /// Sum of all note durations, in ticks.
    pub fn total_duration(&self) -> usize {
        self.notes.iter().map(|n| n.duration as usize).sum()
    }

    /// Checks that a raster can be built from this composition.
    pub fn validate(&self) -> Result<()> {
        if let Some(index) = self.notes.iter().position(|n| n.duration == 0) {
            return Err(FluteError::ZeroDuration { index });
        }
        if self.total_duration() == 0 {
            return Err(FluteError::EmptyComposition);
        }
        Ok(())
    }

    /// Parses a composition from JSON. Unknown note ids are rejected.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the composition to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads and validates a composition file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let composition = Self::from_json_str(&data)?;
        composition.validate()?;
        Ok(composition)
    }

    /// Writes the composition as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// The piece played when no composition file is given.
    pub fn demo() -> Self {
        use NoteId::*;
        let notes = [
            (Si, 1),
            (Empty, 1),
            (Si, 1),
            (Empty, 2),
            (Si, 5),
            (La, 2),
            (Empty, 1),
            (Sol, 2),
            (Fa, 2),
            (Mi, 2),
            (Re, 2),
            (Do, 2),
            (Fa, 2),
            (La, 2),
            (DoHigh, 1),
        ]
        .into_iter()
        .map(|(note, duration)| PlayNote::new(note, duration))
        .collect();

        Self::new(
            "Music 01 !",
            "This is a music invented by me without much skill in music :-)",
            notes,
        )
    }
}
