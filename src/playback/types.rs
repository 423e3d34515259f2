//! Audio backend seam and scheduler result types

use std::cell::Cell;

use flume::{Receiver, TryRecvError};
use serde::Serialize;

use crate::config::Envelope;

/// One polyphonic instrument created per displayed track
pub trait Voice {
    /// Schedule a note: `pitch` is a name such as `"C#4"`, `when` is an
    /// absolute time on the backend clock in seconds.
    fn trigger_attack_release(&mut self, pitch: &str, duration: f64, when: f64, velocity: f64);

    /// Release the voice. Triggers still pending on it are cancelled.
    fn dispose(self);
}

/// The external synthesis engine
pub trait AudioBackend {
    type Voice: Voice;

    /// Current time on the audio clock, in seconds
    fn now(&self) -> f64;

    fn create_voice(&mut self, envelope: &Envelope, polyphony: usize) -> Self::Voice;

    /// Flip the global transport between running and halted.
    fn toggle_transport(&mut self);
}

/// A note handed to a voice
///
/// # Fields
/// - `voice`: creation index of the voice it was scheduled on
/// - `pitch`: note name after the track's octave shift, e.g. `"Eb4"`
/// - `duration`: seconds
/// - `when`: absolute backend time in seconds
/// - `velocity`: 0.0 - 1.0
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTrigger {
    pub voice: usize,
    pub pitch: String,
    pub duration: f64,
    pub when: f64,
    pub velocity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    /// Playback still running
    Pending,
    /// Playback reached the end of the song on its own
    Resolved,
    /// Stopped before the end; will never resolve
    Cancelled,
}

/// Signal returned by [`PlaybackScheduler::start`](super::PlaybackScheduler::start)
///
/// Resolves once when playback runs to the end of the song. An explicit stop
/// beforehand cancels it permanently.
#[derive(Debug)]
pub struct Completion {
    rx: Receiver<()>,
    resolved: Cell<bool>,
}

impl Completion {
    pub(super) fn new(rx: Receiver<()>) -> Self {
        Self {
            rx,
            resolved: Cell::new(false),
        }
    }

    pub fn state(&self) -> CompletionState {
        if self.resolved.get() {
            return CompletionState::Resolved;
        }
        match self.rx.try_recv() {
            Ok(()) => {
                self.resolved.set(true);
                CompletionState::Resolved
            }
            Err(TryRecvError::Empty) => CompletionState::Pending,
            Err(TryRecvError::Disconnected) => CompletionState::Cancelled,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.state() == CompletionState::Resolved
    }
}
