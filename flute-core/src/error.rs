//! Error types for the game core

use thiserror::Error;

/// Errors raised while setting up a game session.
///
/// Nothing in the per-tick path returns these: a window without a usable
/// pitch is reported through the no-pitch sentinel instead.
#[derive(Error, Debug)]
pub enum FluteError {
    /// The composition has no notes or all of them add up to zero ticks
    #[error("composition has no playable duration")]
    EmptyComposition,

    /// A note in the composition lasts zero ticks
    #[error("note #{index} in the composition has zero duration")]
    ZeroDuration { index: usize },

    /// A note id outside the reference table
    #[error("unknown note id {0}")]
    UnknownNote(u8),

    /// Configuration value out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for the game core
pub type Result<T> = std::result::Result<T, FluteError>;
