//! # Pitch Model
//!
//! Letter names, the fixed keyboard key table, enharmonic translation and
//! octave transposition.
//!
//! ## Keyboard
//! The rendered keyboard spans C3 to C6: three full octaves of white keys plus
//! a trailing C6, 22 white keys in total. Only five accidental spellings have a
//! key of their own on the image: `C#`, `E♭`, `F#`, `G#` and `B♭`.
//!
//! ## Spellings
//! - Sharps are written `#`.
//! - Flats are written `♭` on display and may arrive as ASCII `b` from song data.
//! - A pitch string is a letter `A`-`G` followed by at most one accidental.
//!
//! ## Enharmonic Translation
//! Notes with a spelling the keyboard does not show are respelled one scale step
//! away with the opposite accidental (`D#` becomes `E♭`, `G♭` becomes `F#`).
//! Where no black key sits between the two letters (`E`/`F` and `B`/`C`) the
//! respelling is the plain neighbouring natural: `E#` is `F`, `F♭` is `E`.
//! Stepping forward past `B` moves up an octave; stepping back past `C` moves down.

use std::fmt;
use std::sync::OnceLock;

use crate::error::KeybardError;
use crate::song::NoteEvent;

pub const SHARP: char = '#';
pub const FLAT: char = '♭';
const ASCII_FLAT: char = 'b';

/// Lowest octave shown on the keyboard
pub const FIRST_OCTAVE: i32 = 3;
/// Highest octave accepted by the display-range filter
pub const LAST_OCTAVE: i32 = 6;

/// Note names in scale order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteName {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteName {
    pub const ALL: [NoteName; 7] = [
        NoteName::C,
        NoteName::D,
        NoteName::E,
        NoteName::F,
        NoteName::G,
        NoteName::A,
        NoteName::B,
    ];

    /// Position in the scale, C = 0 through B = 6
    pub fn index(self) -> usize {
        match self {
            NoteName::C => 0,
            NoteName::D => 1,
            NoteName::E => 2,
            NoteName::F => 3,
            NoteName::G => 4,
            NoteName::A => 5,
            NoteName::B => 6,
        }
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 7]
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'C' => Some(NoteName::C),
            'D' => Some(NoteName::D),
            'E' => Some(NoteName::E),
            'F' => Some(NoteName::F),
            'G' => Some(NoteName::G),
            'A' => Some(NoteName::A),
            'B' => Some(NoteName::B),
            _ => None,
        }
    }

    /// Parse a bare letter. Anything other than exactly one of `A`-`G` is rejected.
    pub fn from_letter(letter: &str) -> Option<Self> {
        let mut chars = letter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::D => "D",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::G => "G",
            NoteName::A => "A",
            NoteName::B => "B",
        }
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One key of the keyboard image
///
/// Exactly one of `sharp`/`flat` is set for accidental keys, neither for
/// white keys. `natural` is always the bare letter the key is built on.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    pub note: NoteName,
    pub octave: i32,
    /// Display spelling without octave, e.g. `"E♭"`
    pub pitch: String,
    pub sharp: bool,
    pub flat: bool,
    pub natural: NoteName,
}

impl Key {
    fn white(note: NoteName, octave: i32) -> Self {
        Key {
            note,
            octave,
            pitch: note.to_string(),
            sharp: false,
            flat: false,
            natural: note,
        }
    }

    fn accidental(note: NoteName, octave: i32, marker: char) -> Self {
        Key {
            note,
            octave,
            pitch: format!("{}{}", note, marker),
            sharp: marker == SHARP,
            flat: marker == FLAT,
            natural: note,
        }
    }

    pub fn is_white(&self) -> bool {
        !self.sharp && !self.flat
    }
}

/// The fixed key table, C3 up to C6, in keyboard order.
pub fn key_table() -> &'static [Key] {
    static KEYS: OnceLock<Vec<Key>> = OnceLock::new();
    KEYS.get_or_init(|| {
        let mut keys = Vec::with_capacity(37);
        for octave in FIRST_OCTAVE..LAST_OCTAVE {
            for note in NoteName::ALL {
                if note == NoteName::E || note == NoteName::B {
                    keys.push(Key::accidental(note, octave, FLAT));
                }
                keys.push(Key::white(note, octave));
                if matches!(note, NoteName::C | NoteName::F | NoteName::G) {
                    keys.push(Key::accidental(note, octave, SHARP));
                }
            }
        }
        keys.push(Key::white(NoteName::C, LAST_OCTAVE));
        keys
    })
}

/// Number of white keys on the keyboard image (22).
pub fn white_key_count() -> usize {
    key_table().iter().filter(|k| k.is_white()).count()
}

/// Column of a natural letter among the white keys, counted from C3.
///
/// Notes above C6 yield columns past the last key.
pub fn white_key_position(note: NoteName, octave: i32) -> i32 {
    (octave - FIRST_OCTAVE) * 7 + note.index() as i32
}

/// True iff the last character of `pitch` is the sharp marker.
pub fn is_sharp(pitch: &str) -> bool {
    pitch.ends_with(SHARP)
}

/// True iff the last character of `pitch` is a flat marker (`♭`, or `b` after a letter).
pub fn is_flat(pitch: &str) -> bool {
    pitch.ends_with(FLAT) || (pitch.len() > 1 && pitch.ends_with(ASCII_FLAT))
}

/// Strip a trailing accidental marker.
pub fn natural(pitch: &str) -> &str {
    if is_sharp(pitch) || is_flat(pitch) {
        let mut chars = pitch.chars();
        chars.next_back();
        chars.as_str()
    } else {
        pitch
    }
}

/// A pitch spelled the way the keyboard shows it
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayNote {
    pub pitch: String,
    pub octave: i32,
}

impl DisplayNote {
    pub fn is_sharp(&self) -> bool {
        is_sharp(&self.pitch)
    }

    pub fn is_flat(&self) -> bool {
        is_flat(&self.pitch)
    }

    pub fn natural(&self) -> Result<NoteName, KeybardError> {
        NoteName::from_letter(natural(&self.pitch))
            .ok_or_else(|| KeybardError::InvalidPitch(self.pitch.clone()))
    }
}

impl fmt::Display for DisplayNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch, self.octave)
    }
}

fn is_display_spelling(pitch: &str) -> bool {
    key_table()
        .iter()
        .take(12)
        .any(|key| key.pitch == pitch)
}

/// Semitone gap between `letter` and the next letter up
fn has_black_key_above(letter: NoteName) -> bool {
    !matches!(letter, NoteName::E | NoteName::B)
}

/// Respell a pitch so it matches a key on the keyboard.
///
/// Natural letters and the five keyboard accidentals are returned unchanged
/// (with ASCII `b` normalised to `♭`). Other sharps move one scale step up and
/// become flats; other flats move one step down and become sharps. `E#`, `B#`,
/// `F♭` and `C♭` become the neighbouring natural.
///
/// # Errors
/// [`KeybardError::InvalidPitch`] when the letter is not `A`-`G`.
///
/// # Example
/// ```
/// use keybard::pitch::translate_for_display;
///
/// let note = translate_for_display("D#", 4).unwrap();
/// assert_eq!(note.to_string(), "E♭4");
///
/// let note = translate_for_display("D", 4).unwrap();
/// assert_eq!(note.to_string(), "D4");
/// ```
pub fn translate_for_display(pitch: &str, octave: i32) -> Result<DisplayNote, KeybardError> {
    let letter = NoteName::from_letter(natural(pitch))
        .ok_or_else(|| KeybardError::InvalidPitch(pitch.to_string()))?;

    let spelled = if is_flat(pitch) {
        format!("{}{}", letter, FLAT)
    } else {
        pitch.to_string()
    };

    if is_display_spelling(&spelled) {
        return Ok(DisplayNote {
            pitch: spelled,
            octave,
        });
    }

    if is_sharp(pitch) {
        let next = letter.index() + 1;
        let octave = if next == 7 { octave + 1 } else { octave };
        let marker = if has_black_key_above(letter) { FLAT.to_string() } else { String::new() };
        Ok(DisplayNote {
            pitch: format!("{}{}", NoteName::from_index(next), marker),
            octave,
        })
    } else if is_flat(pitch) {
        let (prev, octave) = if letter.index() == 0 {
            (6, octave - 1)
        } else {
            (letter.index() - 1, octave)
        };
        let below = NoteName::from_index(prev);
        let marker = if has_black_key_above(below) { SHARP.to_string() } else { String::new() };
        Ok(DisplayNote {
            pitch: format!("{}{}", below, marker),
            octave,
        })
    } else {
        Err(KeybardError::InvalidPitch(pitch.to_string()))
    }
}

/// Derived copy of `note` moved by `amount` octaves, display name regenerated.
///
/// The original note is never modified.
pub fn shift_octave(note: &NoteEvent, amount: i32) -> NoteEvent {
    let octave = note.octave + amount;
    NoteEvent {
        name: format!("{}{}", note.pitch, octave),
        octave,
        ..note.clone()
    }
}

/// Whether a note may be rendered or played.
///
/// Octaves 3 through 6 inclusive, or exactly `C6`. Everything else is dropped.
pub fn in_display_range(note: &NoteEvent) -> bool {
    (note.octave >= FIRST_OCTAVE && note.octave <= LAST_OCTAVE) || note.name == "C6"
}

/// Pitch and octave of a MIDI note number, sharps preferred (60 = C4).
pub fn from_midi(number: u8) -> (&'static str, i32) {
    const NAMES: [&str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];
    let octave = number as i32 / 12 - 1;
    (NAMES[number as usize % 12], octave)
}

/// Split a note name such as `"C#4"`, `"Eb3"` or `"A-1"` into pitch and octave.
///
/// Returns `None` when the letter is unknown or the octave digits are missing.
pub fn parse_note_name(name: &str) -> Option<(String, i32)> {
    let mut chars = name.char_indices();
    let (_, letter) = chars.next()?;
    NoteName::from_char(letter)?;

    let mut split = letter.len_utf8();
    if let Some((i, c)) = chars.next() {
        if c == SHARP || c == FLAT || c == ASCII_FLAT {
            split = i + c.len_utf8();
        }
    }

    let (pitch, digits) = name.split_at(split);
    if digits.is_empty() {
        return None;
    }
    let octave = digits.parse::<i32>().ok()?;
    Some((pitch.to_string(), octave))
}
