//! # Error Types
//!
//! This module defines the error type shared by every part of the engine.
//!
//! ## Policy
//! - `InvalidPitch` is fatal: a letter outside A-G means the upstream song data
//!   is corrupt. It is surfaced to the caller and never retried.
//! - A song without tempo data is *not* an error. The clock simply never
//!   advances (see [`crate::clock::TickClock::advance`]).
//! - Unknown track indices are reported, not swallowed.
//!
//! ## Usage
//! ```rust
//! use keybard::{pitch, KeybardError};
//!
//! match pitch::translate_for_display("H", 4) {
//!     Ok(note) => println!("{}{}", note.pitch, note.octave),
//!     Err(KeybardError::InvalidPitch(p)) => eprintln!("bad pitch {}", p),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeybardError {
    /// A pitch string whose letter is outside A-G.
    ///
    /// # Example
    /// ```
    /// # use keybard::KeybardError;
    /// let err = KeybardError::InvalidPitch("H#".to_string());
    /// assert_eq!(err.to_string(), "Invalid pitch: H#");
    /// ```
    #[error("Invalid pitch: {0}")]
    InvalidPitch(String),

    /// A note in an ingested song document that cannot be brought into the
    /// canonical shape (missing octave, unknown letter, ...).
    #[error("Invalid note {note} in track {track}: {message}")]
    InvalidNote {
        track: usize,
        note: usize,
        message: String,
    },

    /// A track index that does not exist in the loaded song.
    ///
    /// # Example
    /// ```
    /// # use keybard::KeybardError;
    /// let err = KeybardError::UnknownTrack(7);
    /// assert_eq!(err.to_string(), "Unknown track: 7");
    /// ```
    #[error("Unknown track: {0}")]
    UnknownTrack(usize),

    /// A replacement settings list whose length differs from the song's track count.
    #[error("Expected settings for {expected} tracks, got {found}")]
    TrackCountMismatch { expected: usize, found: usize },

    /// A command that needs a loaded song was issued before one was loaded.
    #[error("No song loaded")]
    NoSongLoaded,

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Invalid engine configuration (YAML syntax or out-of-range values).
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Malformed song document.
    #[error("Invalid song document: {0}")]
    SongFormat(String),

    /// Failure while serialising a rendered frame.
    #[error("Render error: {0}")]
    RenderError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
