//! Audio trigger scheduling
//!
//! Converts a song's note times into absolute trigger times on the backend
//! clock, one voice per displayed track, and tracks when the last note ends.

use flume::Sender;

use crate::config::{Envelope, EngineConfig};
use crate::error::KeybardError;
use crate::pitch;
use crate::settings::{self, TrackSettings};
use crate::song::Song;

use super::types::{AudioBackend, Completion, Voice};

pub struct PlaybackScheduler<B: AudioBackend> {
    backend: B,
    envelope: Envelope,
    polyphony: usize,
    voices: Vec<B::Voice>,
    completion: Option<Sender<()>>,
    /// Backend time at which the last note ends
    deadline: f64,
    song_end: f64,
    paused_at: Option<f64>,
}

impl<B: AudioBackend> PlaybackScheduler<B> {
    pub fn new(backend: B, config: &EngineConfig) -> Self {
        Self {
            backend,
            envelope: config.envelope,
            polyphony: config.polyphony,
            voices: Vec::new(),
            completion: None,
            deadline: 0.0,
            song_end: 0.0,
            paused_at: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Playback started and neither stopped nor completed
    pub fn is_active(&self) -> bool {
        self.completion.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// End of the last eligible note of the current playback, in song seconds
    pub fn song_end(&self) -> f64 {
        self.song_end
    }

    /// Schedule every eligible note from `start_tick` onward.
    ///
    /// A note is eligible when its track is displayed, its octave-shifted form
    /// lies in the keyboard range, and it starts at or after `start_tick`.
    /// Any playback already running is stopped first.
    pub fn start(
        &mut self,
        song: &Song,
        settings: &[TrackSettings],
        start_tick: f64,
    ) -> Result<Completion, KeybardError> {
        settings::check_len(song, settings)?;
        if self.is_active() {
            self.stop();
        }

        let reference_now = self.backend.now();
        let start_offset = song
            .time_from_ticks(start_tick)
            .map(|ms| ms / 1000.0)
            .unwrap_or(0.0);

        let mut song_end = start_offset;
        let mut scheduled = 0;

        for (track, setting) in song.tracks.iter().zip(settings) {
            if !setting.display {
                continue;
            }
            let mut voice = self.backend.create_voice(&self.envelope, self.polyphony);

            for note in &track.notes {
                let shifted = pitch::shift_octave(note, setting.octave_shift);
                if !pitch::in_display_range(&shifted) || note.time < start_offset {
                    continue;
                }
                voice.trigger_attack_release(
                    &shifted.name,
                    note.duration,
                    reference_now + (note.time - start_offset),
                    note.velocity,
                );
                song_end = song_end.max(note.end_time());
                scheduled += 1;
            }

            self.voices.push(voice);
        }

        self.song_end = song_end;
        self.deadline = reference_now + (song_end - start_offset);
        self.paused_at = None;

        let (tx, rx) = flume::bounded(1);
        self.completion = Some(tx);

        log::info!(
            "Scheduled {} notes on {} voices from {:.3}s, song ends at {:.3}s",
            scheduled,
            self.voices.len(),
            start_offset,
            song_end
        );
        Ok(Completion::new(rx))
    }

    /// Dispose every voice. The pending completion, if any, never resolves.
    pub fn stop(&mut self) {
        for voice in self.voices.drain(..) {
            voice.dispose();
        }
        if self.paused_at.take().is_some() {
            self.backend.toggle_transport();
        }
        if self.completion.take().is_some() {
            log::debug!("Playback stopped before song end");
        }
    }

    /// Toggle the audio transport. Voices stay alive; time spent paused is
    /// added to the completion deadline. Does nothing without active playback.
    pub fn pause(&mut self) {
        if !self.is_active() {
            return;
        }
        let now = self.backend.now();
        match self.paused_at.take() {
            Some(since) => {
                self.deadline += now - since;
                log::debug!("Playback resumed");
            }
            None => {
                self.paused_at = Some(now);
                log::debug!("Playback paused");
            }
        }
        self.backend.toggle_transport();
    }

    /// Check the backend clock against the song end. Once reached, stops
    /// playback, resolves the completion and returns true.
    pub fn poll(&mut self) -> bool {
        if !self.is_active() || self.is_paused() || self.backend.now() < self.deadline {
            return false;
        }

        let completion = self.completion.take();
        self.stop();
        if let Some(tx) = completion {
            // Receiver may already be gone
            let _ = tx.send(());
        }
        log::info!("Playback complete");
        true
    }
}
