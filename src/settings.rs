//! Per-track display settings
//!
//! One entry per track, created when a song is loaded and changed by the user
//! afterwards: visibility, octave transposition and colors.

use serde::{Deserialize, Serialize};

use crate::colors::{ColorSet, TrackColorAssigner};
use crate::error::KeybardError;
use crate::song::Song;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSettings {
    pub display: bool,
    /// Octaves added to every note of the track before layout and playback
    pub octave_shift: i32,
    pub colors: ColorSet,
}

impl TrackSettings {
    /// Fresh settings for every track of `song`: all shown, untransposed,
    /// colored evenly around the wheel.
    pub fn for_song(song: &Song, assigner: &TrackColorAssigner) -> Vec<TrackSettings> {
        assigner
            .generate_color_sets(song.tracks.len())
            .into_iter()
            .map(|colors| TrackSettings {
                display: true,
                octave_shift: 0,
                colors,
            })
            .collect()
    }
}

/// Mutable access to one entry, [`KeybardError::UnknownTrack`] when out of range.
pub fn track_mut(
    settings: &mut [TrackSettings],
    index: usize,
) -> Result<&mut TrackSettings, KeybardError> {
    settings.get_mut(index).ok_or(KeybardError::UnknownTrack(index))
}

/// Check that a replacement list matches the song's track count.
pub fn check_len(song: &Song, settings: &[TrackSettings]) -> Result<(), KeybardError> {
    if song.tracks.len() != settings.len() {
        return Err(KeybardError::TrackCountMismatch {
            expected: song.tracks.len(),
            found: settings.len(),
        });
    }
    Ok(())
}
