//! Visible-note selection and note geometry

use crate::error::KeybardError;
use crate::pitch::{self, DisplayNote};
use crate::song::NoteEvent;
use crate::surface::Rect;

use super::types::Viewport;

/// Whether a note belongs in the frame at `current_tick`.
///
/// A note is visible when it starts inside `[current_tick, current_tick + window]`,
/// or when it started earlier and is still sounding at `current_tick`.
pub fn is_visible(ticks: u32, duration_ticks: u32, current_tick: f64, window: f64) -> bool {
    let start = ticks as f64;
    let end = start + duration_ticks as f64;
    let upcoming = start >= current_tick && start <= current_tick + window;
    let sustained = start < current_tick && end >= current_tick;
    upcoming || sustained
}

/// Apply the track's octave shift and the display-range filter, then respell
/// for the keyboard. `Ok(None)` means the note falls outside the keyboard range.
pub fn prepare(note: &NoteEvent, octave_shift: i32) -> Result<Option<DisplayNote>, KeybardError> {
    let shifted = pitch::shift_octave(note, octave_shift);
    if !pitch::in_display_range(&shifted) {
        return Ok(None);
    }
    pitch::translate_for_display(&shifted.pitch, shifted.octave).map(Some)
}

/// Screen rectangle of a note.
///
/// - width: half a white key for naturals, a quarter for accidentals
/// - height: one pixel per tick of duration
/// - bottom edge meets the top of the keyboard when the note starts
/// - sharps sit half a key right of their letter, flats half a key left
pub fn note_bounds(
    note: &DisplayNote,
    ticks: u32,
    duration_ticks: u32,
    current_tick: f64,
    viewport: Viewport,
    key_width: f32,
    keyboard_height: f32,
) -> Result<Rect, KeybardError> {
    let sharp = note.is_sharp();
    let flat = note.is_flat();

    let width = if sharp || flat {
        key_width / 4.0
    } else {
        key_width / 2.0
    };
    let height = duration_ticks as f32;
    let y = viewport.height - keyboard_height - height - (ticks as f64 - current_tick) as f32;

    let column = pitch::white_key_position(note.natural()?, note.octave);
    let mut x = column as f32 * key_width + key_width / 2.0 - width / 2.0;
    if sharp {
        x += key_width / 2.0;
    } else if flat {
        x -= key_width / 2.0;
    }

    Ok(Rect::new(x, y, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(pitch: &str, octave: i32) -> DisplayNote {
        DisplayNote {
            pitch: pitch.to_string(),
            octave,
        }
    }

    #[test]
    fn test_visibility_window() {
        // Starts inside the window
        assert!(is_visible(120, 10, 100.0, 50.0));
        assert!(is_visible(100, 10, 100.0, 50.0));
        assert!(is_visible(150, 10, 100.0, 50.0));
        // Starts past the window
        assert!(!is_visible(151, 10, 100.0, 50.0));
        // Ended before the playhead
        assert!(!is_visible(50, 40, 100.0, 50.0));
        // Sustained across the playhead
        assert!(is_visible(50, 60, 100.0, 50.0));
        assert!(is_visible(50, 50, 100.0, 50.0));
    }

    #[test]
    fn test_natural_bounds() {
        let viewport = Viewport {
            width: 880.0,
            height: 600.0,
        };
        // key width 40: D3 is column 1
        let rect = note_bounds(&display("D", 3), 200, 50, 100.0, viewport, 40.0, 100.0).unwrap();
        assert_eq!(rect.width, 20.0);
        assert_eq!(rect.height, 50.0);
        assert_eq!(rect.x, 40.0 + 20.0 - 10.0);
        assert_eq!(rect.y, 600.0 - 100.0 - 50.0 - 100.0);
    }

    #[test]
    fn test_accidental_bounds() {
        let viewport = Viewport {
            width: 880.0,
            height: 600.0,
        };
        let sharp = note_bounds(&display("C#", 4), 0, 10, 0.0, viewport, 40.0, 100.0).unwrap();
        // C4 is column 7
        assert_eq!(sharp.width, 10.0);
        assert_eq!(sharp.x, 7.0 * 40.0 + 20.0 - 5.0 + 20.0);

        let flat = note_bounds(&display("E♭", 4), 0, 10, 0.0, viewport, 40.0, 100.0).unwrap();
        assert_eq!(flat.x, 9.0 * 40.0 + 20.0 - 5.0 - 20.0);
    }

    #[test]
    fn test_note_touches_keyboard_at_its_tick() {
        let viewport = Viewport {
            width: 880.0,
            height: 600.0,
        };
        let rect = note_bounds(&display("A", 4), 480, 240, 480.0, viewport, 40.0, 100.0).unwrap();
        assert_eq!(rect.bottom(), 500.0);
    }

    #[test]
    fn test_prepare_filters_range() {
        let note = NoteEvent {
            pitch: "D#".to_string(),
            octave: 2,
            name: "D#2".to_string(),
            ticks: 0,
            duration_ticks: 10,
            time: 0.0,
            duration: 0.1,
            velocity: 1.0,
        };
        assert_eq!(prepare(&note, 0).unwrap(), None);
        assert_eq!(prepare(&note, 1).unwrap(), Some(display("E♭", 3)));
        assert_eq!(prepare(&note, 5).unwrap(), None);
    }
}
