//! # Playback Module
//!
//! Audible playback kept in step with the tick clock.
//!
//! ## Purpose
//! The scheduler decides *what* to play *when*; sound itself comes from an
//! external [`AudioBackend`]. On start every eligible note is handed to a voice
//! with an absolute trigger time, so nothing needs servicing per frame apart
//! from [`PlaybackScheduler::poll`] noticing the end of the song.
//!
//! ## Sub-modules
//! - `types` - backend traits, triggers and the completion signal
//! - `scheduler` - trigger scheduling, stop/pause and completion
//! - `recorder` - an in-memory backend with a manual clock
//!
//! ## Timing
//! With `offset = time_from_ticks(start_tick)` in seconds and `now` the backend
//! clock at start:
//! - a note starting at `time >= offset` triggers at `now + (time - offset)`
//! - notes starting before `offset` are skipped, including ones still sounding
//! - playback completes `song_end - offset` seconds after start, where
//!   `song_end` is the latest `time + duration` among scheduled notes
//!
//! Seeking while audio plays means a full stop and a fresh start at the new
//! tick; there is no incremental rescheduling.
//!
//! ## Example
//! ```rust
//! use keybard::config::EngineConfig;
//! use keybard::playback::{CompletionState, PlaybackScheduler, RecordingBackend};
//! use keybard::song::Song;
//! use keybard::settings::TrackSettings;
//! use keybard::colors::TrackColorAssigner;
//!
//! let song = Song::from_json(r#"{
//!     "header": { "ppq": 480, "tempos": [{ "ticks": 0, "bpm": 120 }] },
//!     "tracks": [{ "name": "Piano", "notes": [
//!         { "name": "C4", "ticks": 0, "durationTicks": 480 },
//!         { "name": "E4", "ticks": 480, "durationTicks": 480 }
//!     ] }]
//! }"#).unwrap();
//! let settings = TrackSettings::for_song(&song, &TrackColorAssigner::default());
//!
//! let backend = RecordingBackend::new();
//! let mut scheduler = PlaybackScheduler::new(backend.clone(), &EngineConfig::default());
//! let done = scheduler.start(&song, &settings, 0.0).unwrap();
//! assert_eq!(backend.triggers().len(), 2);
//! assert_eq!(scheduler.song_end(), 1.0);
//!
//! backend.set_now(1.0);
//! assert!(scheduler.poll());
//! assert_eq!(done.state(), CompletionState::Resolved);
//! ```

mod recorder;
mod scheduler;
mod types;

#[cfg(test)]
mod tests;

pub use recorder::{RecordingBackend, RecordingVoice};
pub use scheduler::PlaybackScheduler;
pub use types::{AudioBackend, Completion, CompletionState, ScheduledTrigger, Voice};
