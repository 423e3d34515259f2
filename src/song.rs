//! # Song Model
//!
//! The parsed performance the engine reads from: tracks of timed notes plus a
//! tempo map that converts ticks to milliseconds.
//!
//! ## Ingestion
//! Song documents are JSON in the shape produced by common MIDI-to-JSON tools:
//!
//! ```text
//! {
//!   "header": { "ppq": 480, "tempos": [{ "ticks": 0, "bpm": 120 }] },
//!   "tracks": [
//!     { "name": "Piano", "notes": [
//!         { "name": "C#4", "ticks": 0, "durationTicks": 480, "time": 0, "duration": 0.5, "velocity": 0.8 },
//!         { "pitch": "E", "octave": 4, "ticks": 480, "durationTicks": 240 }
//!     ] }
//!   ]
//! }
//! ```
//!
//! A note may carry its pitch as a `pitch`/`octave` pair, as a combined `name`
//! string, or only as a `midi` number. All three are unified here into one
//! canonical [`NoteEvent`]; nothing downstream looks at the raw shape.
//!
//! Missing `time`/`duration` seconds are derived from the tempo map.

use serde::Deserialize;

use crate::error::KeybardError;
use crate::pitch;

/// One note of a track in canonical shape
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvent {
    /// Letter plus optional accidental, e.g. `"C#"` or `"Eb"`
    pub pitch: String,
    pub octave: i32,
    /// Pitch and octave combined, e.g. `"C#4"`
    pub name: String,
    /// Start in ticks
    pub ticks: u32,
    pub duration_ticks: u32,
    /// Start in seconds
    pub time: f64,
    /// Duration in seconds
    pub duration: f64,
    /// Normalised 0.0 - 1.0
    pub velocity: f64,
}

impl NoteEvent {
    pub fn end_ticks(&self) -> u64 {
        self.ticks as u64 + self.duration_ticks as u64
    }

    pub fn end_time(&self) -> f64 {
        self.time + self.duration
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub name: String,
    pub notes: Vec<NoteEvent>,
}

impl Track {
    /// Tick of the earliest note, used to jump the view to this track.
    pub fn first_tick(&self) -> Option<u32> {
        self.notes.iter().map(|n| n.ticks).min()
    }
}

/// Tempo change at a tick
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TempoEvent {
    pub ticks: u32,
    pub bpm: f64,
}

/// Tick to wall-clock conversion
///
/// Tempo is piecewise constant between events. Ticks before the first event
/// run at 120 BPM.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    pub ppq: u16,
    tempos: Vec<TempoEvent>,
}

const DEFAULT_BPM: f64 = 120.0;
const DEFAULT_PPQ: u16 = 480;

impl TempoMap {
    pub fn new(ppq: u16, mut tempos: Vec<TempoEvent>) -> Self {
        tempos.sort_by_key(|t| t.ticks);
        Self { ppq, tempos }
    }

    /// A map without tempo data. [`time_from_ticks`](Self::time_from_ticks) always yields `None`.
    pub fn empty(ppq: u16) -> Self {
        Self {
            ppq,
            tempos: Vec::new(),
        }
    }

    /// Shorthand for a single tempo starting at tick 0
    pub fn constant(ppq: u16, bpm: f64) -> Self {
        Self::new(ppq, vec![TempoEvent { ticks: 0, bpm }])
    }

    fn ticks_to_ms(&self, ticks: f64, bpm: f64) -> f64 {
        ticks * 60_000.0 / (bpm * self.ppq as f64)
    }

    /// Milliseconds from the start of the song to `tick`.
    ///
    /// Returns `None` when the song carries no tempo data.
    ///
    /// # Example
    /// ```
    /// use keybard::song::TempoMap;
    ///
    /// // 120 BPM, 480 ticks per quarter: one quarter note lasts 500 ms
    /// let tempo = TempoMap::constant(480, 120.0);
    /// assert_eq!(tempo.time_from_ticks(480.0), Some(500.0));
    /// assert_eq!(TempoMap::empty(480).time_from_ticks(480.0), None);
    /// ```
    pub fn time_from_ticks(&self, tick: f64) -> Option<f64> {
        if self.tempos.is_empty() || self.ppq == 0 {
            return None;
        }

        let mut elapsed = 0.0;
        let mut segment_start = 0.0;
        let mut bpm = DEFAULT_BPM;
        for tempo in &self.tempos {
            let at = tempo.ticks as f64;
            if at > tick {
                break;
            }
            elapsed += self.ticks_to_ms(at - segment_start, bpm);
            segment_start = at;
            bpm = tempo.bpm;
        }
        elapsed += self.ticks_to_ms(tick - segment_start, bpm);
        Some(elapsed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub name: Option<String>,
    pub tempo: TempoMap,
    pub tracks: Vec<Track>,
}

impl Song {
    pub fn new(tempo: TempoMap, tracks: Vec<Track>) -> Self {
        Self {
            name: None,
            tempo,
            tracks,
        }
    }

    /// Parse a JSON song document into the canonical model.
    pub fn from_json(source: &str) -> Result<Self, KeybardError> {
        let raw: RawSong =
            serde_json::from_str(source).map_err(|e| KeybardError::SongFormat(e.to_string()))?;

        for tempo in &raw.header.tempos {
            if !(tempo.bpm > 0.0) {
                return Err(KeybardError::SongFormat(format!(
                    "Tempo at tick {} must be positive, got {}",
                    tempo.ticks, tempo.bpm
                )));
            }
        }

        let tempo = TempoMap::new(raw.header.ppq, raw.header.tempos);
        let tracks = raw
            .tracks
            .into_iter()
            .enumerate()
            .map(|(index, track)| track.into_track(index, &tempo))
            .collect::<Result<Vec<_>, _>>()?;

        log::info!(
            "Loaded song {:?}: {} tracks, {} notes",
            raw.header.name,
            tracks.len(),
            tracks.iter().map(|t| t.notes.len()).sum::<usize>()
        );

        Ok(Self {
            name: raw.header.name,
            tempo,
            tracks,
        })
    }

    pub fn time_from_ticks(&self, tick: f64) -> Option<f64> {
        self.tempo.time_from_ticks(tick)
    }

    pub fn track(&self, index: usize) -> Result<&Track, KeybardError> {
        self.tracks.get(index).ok_or(KeybardError::UnknownTrack(index))
    }

    /// Last tick reached by any note (slider upper bound).
    pub fn duration_ticks(&self) -> u64 {
        self.notes().map(NoteEvent::end_ticks).max().unwrap_or(0)
    }

    pub fn duration_seconds(&self) -> f64 {
        self.notes().map(NoteEvent::end_time).fold(0.0, f64::max)
    }

    fn notes(&self) -> impl Iterator<Item = &NoteEvent> {
        self.tracks.iter().flat_map(|t| t.notes.iter())
    }
}

#[derive(Deserialize, Debug, Default)]
struct RawSong {
    #[serde(default)]
    header: RawHeader,
    #[serde(default)]
    tracks: Vec<RawTrack>,
}

#[derive(Deserialize, Debug)]
struct RawHeader {
    #[serde(default)]
    name: Option<String>,
    #[serde(default = "default_ppq")]
    ppq: u16,
    #[serde(default)]
    tempos: Vec<TempoEvent>,
}

impl Default for RawHeader {
    fn default() -> Self {
        Self {
            name: None,
            ppq: DEFAULT_PPQ,
            tempos: Vec::new(),
        }
    }
}

fn default_ppq() -> u16 {
    DEFAULT_PPQ
}

#[derive(Deserialize, Debug)]
struct RawTrack {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    notes: Vec<RawNote>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawNote {
    pitch: Option<String>,
    octave: Option<i32>,
    name: Option<String>,
    midi: Option<u8>,
    ticks: u32,
    #[serde(default)]
    duration_ticks: u32,
    time: Option<f64>,
    duration: Option<f64>,
    #[serde(default = "default_velocity")]
    velocity: f64,
}

fn default_velocity() -> f64 {
    1.0
}

impl RawTrack {
    fn into_track(self, index: usize, tempo: &TempoMap) -> Result<Track, KeybardError> {
        let notes = self
            .notes
            .into_iter()
            .enumerate()
            .map(|(note, raw)| {
                raw.into_note(tempo).map_err(|message| KeybardError::InvalidNote {
                    track: index,
                    note,
                    message,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Track {
            name: self.name.unwrap_or_else(|| format!("Track {}", index + 1)),
            notes,
        })
    }
}

impl RawNote {
    fn into_note(self, tempo: &TempoMap) -> Result<NoteEvent, String> {
        let (pitch, octave) = match (&self.pitch, self.octave, &self.name, self.midi) {
            (Some(pitch), Some(octave), _, _) => {
                // Validate the pitch by round-tripping through the name parser
                let (pitch, _) = pitch::parse_note_name(&format!("{}{}", pitch, octave))
                    .ok_or_else(|| format!("unknown pitch '{}'", pitch))?;
                (pitch, octave)
            }
            (_, _, Some(name), _) => pitch::parse_note_name(name)
                .ok_or_else(|| format!("cannot read note name '{}'", name))?,
            (_, _, _, Some(midi)) => {
                let (pitch, octave) = pitch::from_midi(midi);
                (pitch.to_string(), octave)
            }
            _ => return Err("note has no pitch, name or midi number".to_string()),
        };

        let seconds = |tick: f64| tempo.time_from_ticks(tick).map(|ms| ms / 1000.0);
        let time = self
            .time
            .or_else(|| seconds(self.ticks as f64))
            .unwrap_or(0.0);
        let duration = self
            .duration
            .or_else(|| {
                let end = seconds(self.ticks as f64 + self.duration_ticks as f64)?;
                Some(end - time)
            })
            .unwrap_or(0.0);

        Ok(NoteEvent {
            name: format!("{}{}", pitch, octave),
            pitch,
            octave,
            ticks: self.ticks,
            duration_ticks: self.duration_ticks,
            time,
            duration,
            velocity: self.velocity,
        })
    }
}
