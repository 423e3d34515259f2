//! # Engine
//!
//! Host-facing façade tying the clock, the piano roll and audio playback
//! together.
//!
//! ## Frame contract
//! The host owns the frame pump and calls [`Engine::frame`] once per frame with
//! its wall-clock time in milliseconds. Each frame:
//! 1. the tick clock advances
//! 2. the scheduler is polled; playback that reached the end stops the clock
//! 3. the piano roll is laid out and drawn at the resulting tick
//!
//! Rendering therefore never sees a tick that is still being updated.
//!
//! ## Clocks
//! The visual clock runs on the host's frame timestamps; audio triggers run on
//! the backend's own clock. They are aligned only at start, seek and resume.
//!
//! ## Commands
//! Transport: [`start`](Engine::start), [`pause`](Engine::pause),
//! [`stop`](Engine::stop), [`seek`](Engine::seek).
//! Tracks: [`set_track_settings`](Engine::set_track_settings) and the per-track
//! setters, [`jump_to_track`](Engine::jump_to_track).
//! View: [`resize`](Engine::resize).
//!
//! Outputs are published on an [`EventBus`]; see [`Engine::subscribe`].

use flume::Receiver;

use crate::clock::{ClockState, TickClock};
use crate::colors::{self, ColorSet, TrackColorAssigner};
use crate::config::EngineConfig;
use crate::error::KeybardError;
use crate::events::{EngineEvent, EventBus};
use crate::playback::{AudioBackend, Completion, PlaybackScheduler};
use crate::roll::{FrameStats, NoteLayoutEngine};
use crate::settings::{self, TrackSettings};
use crate::song::Song;
use crate::surface::Surface;

pub struct Engine<B: AudioBackend> {
    config: EngineConfig,
    colors: TrackColorAssigner,
    clock: TickClock,
    roll: NoteLayoutEngine,
    scheduler: PlaybackScheduler<B>,
    completion: Option<Completion>,
    song: Option<Song>,
    settings: Vec<TrackSettings>,
    events: EventBus,
    audio_enabled: bool,
}

impl<B: AudioBackend> Engine<B> {
    pub fn new(backend: B, config: EngineConfig) -> Result<Self, KeybardError> {
        config.validate()?;
        Ok(Self {
            colors: TrackColorAssigner::new(config.saturation, config.lightness),
            clock: TickClock::new(),
            roll: NoteLayoutEngine::new(&config),
            scheduler: PlaybackScheduler::new(backend, &config),
            completion: None,
            song: None,
            settings: Vec::new(),
            events: EventBus::new(),
            audio_enabled: config.play_audio,
            config,
        })
    }

    pub fn subscribe(&mut self) -> Receiver<EngineEvent> {
        self.events.subscribe()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn song(&self) -> Option<&Song> {
        self.song.as_ref()
    }

    pub fn track_settings(&self) -> &[TrackSettings] {
        &self.settings
    }

    pub fn state(&self) -> ClockState {
        self.clock.state()
    }

    pub fn current_tick(&self) -> f64 {
        self.clock.current_tick()
    }

    pub fn roll(&self) -> &NoteLayoutEngine {
        &self.roll
    }

    pub fn scheduler(&self) -> &PlaybackScheduler<B> {
        &self.scheduler
    }

    pub fn audio_enabled(&self) -> bool {
        self.audio_enabled
    }

    /// Position of the playhead in seconds, 0 without a song or tempo data
    pub fn current_time_seconds(&self) -> f64 {
        self.song
            .as_ref()
            .and_then(|song| song.time_from_ticks(self.clock.current_tick()))
            .map(|ms| ms / 1000.0)
            .unwrap_or(0.0)
    }

    /// Replace the current song. Playback stops and every track gets fresh
    /// settings.
    pub fn load_song(&mut self, song: Song) {
        self.halt();
        self.clock.set_tempo(&song);
        self.settings = TrackSettings::for_song(&song, &self.colors);
        let tracks = song.tracks.len();
        self.song = Some(song);
        log::info!("Song loaded with {} tracks", tracks);
        self.events.publish(EngineEvent::SongLoaded { tracks });
    }

    pub fn unload_song(&mut self) {
        self.halt();
        self.song = None;
        self.settings.clear();
        log::info!("Song unloaded");
    }

    /// Begin playback at the current tick, or resume from pause.
    pub fn start(&mut self, now: f64) -> Result<(), KeybardError> {
        if self.song.is_none() {
            return Err(KeybardError::NoSongLoaded);
        }

        match self.clock.state() {
            ClockState::Playing => return Ok(()),
            ClockState::Paused => {
                self.clock.start(now);
                if self.scheduler.is_paused() {
                    self.scheduler.pause();
                } else if self.audio_enabled {
                    self.start_audio()?;
                }
            }
            ClockState::Stopped => {
                self.clock.start(now);
                if self.audio_enabled {
                    self.start_audio()?;
                }
            }
        }

        self.events.publish(EngineEvent::PlayStarted);
        Ok(())
    }

    pub fn pause(&mut self) {
        if !self.clock.is_playing() {
            return;
        }
        self.clock.pause();
        if self.scheduler.is_active() && !self.scheduler.is_paused() {
            self.scheduler.pause();
        }
        self.events.publish(EngineEvent::Paused);
    }

    pub fn stop(&mut self) {
        self.halt();
        self.events.publish(EngineEvent::Stopped);
    }

    /// Jump to `tick`. Active audio is stopped and rescheduled from the new
    /// position; paused audio is dropped and rescheduled on resume.
    pub fn seek(&mut self, tick: f64) -> Result<(), KeybardError> {
        self.clock.seek(tick);

        if self.scheduler.is_active() {
            let resume = !self.scheduler.is_paused();
            self.stop_audio();
            if resume {
                self.start_audio()?;
            }
        }

        self.events
            .publish(EngineEvent::TickChanged(self.clock.current_tick()));
        Ok(())
    }

    pub fn resize(&mut self, width: f32, height: f32, surface: &mut dyn Surface) {
        self.roll.resize(width, height, surface);
    }

    /// Advance the clock, settle playback, then draw.
    pub fn frame(&mut self, now: f64, surface: &mut dyn Surface) -> Result<FrameStats, KeybardError> {
        if self.clock.advance(now) {
            self.events
                .publish(EngineEvent::TickChanged(self.clock.current_tick()));
        }

        if self.scheduler.poll() {
            self.completion = None;
            self.clock.stop();
            self.events.publish(EngineEvent::Stopped);
        } else if self.completion.is_none() && self.clock.is_playing() && self.past_end() {
            // Silent playback has no completion signal
            self.clock.stop();
            self.events.publish(EngineEvent::Stopped);
        }

        match &self.song {
            Some(song) => self
                .roll
                .render(song, &self.settings, self.clock.current_tick(), surface),
            None => Ok(self.roll.render_empty(surface)),
        }
    }

    pub fn set_track_settings(&mut self, list: Vec<TrackSettings>) -> Result<(), KeybardError> {
        let song = self.song.as_ref().ok_or(KeybardError::NoSongLoaded)?;
        settings::check_len(song, &list)?;
        self.settings = list;
        Ok(())
    }

    pub fn set_track_display(&mut self, index: usize, display: bool) -> Result<(), KeybardError> {
        settings::track_mut(&mut self.settings, index)?.display = display;
        Ok(())
    }

    pub fn set_track_octave(&mut self, index: usize, shift: i32) -> Result<(), KeybardError> {
        settings::track_mut(&mut self.settings, index)?.octave_shift = shift;
        Ok(())
    }

    /// Override a track's colors. The contrast color is recomputed from the
    /// new background.
    pub fn set_track_colors(
        &mut self,
        index: usize,
        background: &str,
        foreground: &str,
    ) -> Result<(), KeybardError> {
        colors::parse_hex(foreground)?;
        let colors = ColorSet {
            background: background.to_string(),
            foreground: foreground.to_string(),
            black_or_white: colors::invert_bw(background)?,
        };
        settings::track_mut(&mut self.settings, index)?.colors = colors;
        Ok(())
    }

    pub fn set_all_tracks_display(&mut self, display: bool) {
        for setting in &mut self.settings {
            setting.display = display;
        }
    }

    /// Seek to the first note of a track.
    pub fn jump_to_track(&mut self, index: usize) -> Result<(), KeybardError> {
        let song = self.song.as_ref().ok_or(KeybardError::NoSongLoaded)?;
        let tick = song.track(index)?.first_tick().unwrap_or(0);
        self.seek(tick as f64)
    }

    /// Turn audible playback on or off. Takes effect immediately while playing.
    pub fn set_audio_enabled(&mut self, enabled: bool) -> Result<(), KeybardError> {
        self.audio_enabled = enabled;
        if !enabled {
            self.stop_audio();
        } else if self.clock.is_playing() && !self.scheduler.is_active() {
            self.start_audio()?;
        }
        Ok(())
    }

    fn start_audio(&mut self) -> Result<(), KeybardError> {
        let song = self.song.as_ref().ok_or(KeybardError::NoSongLoaded)?;
        let completion = self
            .scheduler
            .start(song, &self.settings, self.clock.current_tick())?;
        self.completion = Some(completion);
        Ok(())
    }

    fn stop_audio(&mut self) {
        self.scheduler.stop();
        self.completion = None;
    }

    fn halt(&mut self) {
        self.clock.stop();
        self.stop_audio();
    }

    fn past_end(&self) -> bool {
        self.song
            .as_ref()
            .map(|song| self.clock.current_tick() >= song.duration_ticks() as f64)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::RecordingBackend;
    use crate::surface::RecordingSurface;

    /// 120 BPM at 480 ppq: 0.96 ticks per ms
    const SONG: &str = r#"{
        "header": { "ppq": 480, "tempos": [{ "ticks": 0, "bpm": 120 }] },
        "tracks": [
            { "name": "Right", "notes": [
                { "name": "C4", "ticks": 0, "durationTicks": 480 },
                { "name": "E4", "ticks": 480, "durationTicks": 480 }
            ] },
            { "name": "Left", "notes": [
                { "name": "C3", "ticks": 960, "durationTicks": 960 }
            ] }
        ]
    }"#;

    fn engine() -> (Engine<RecordingBackend>, RecordingBackend, RecordingSurface) {
        let backend = RecordingBackend::new();
        let mut engine = Engine::new(backend.clone(), EngineConfig::default()).unwrap();
        let mut surface = RecordingSurface::new();
        engine.resize(880.0, 600.0, &mut surface);
        engine.load_song(Song::from_json(SONG).unwrap());
        (engine, backend, surface)
    }

    #[test]
    fn test_start_requires_song() {
        let mut engine = Engine::new(RecordingBackend::new(), EngineConfig::default()).unwrap();
        assert!(matches!(engine.start(0.0), Err(KeybardError::NoSongLoaded)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            keyboard_height: 0.0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            Engine::new(RecordingBackend::new(), config),
            Err(KeybardError::ConfigError(_))
        ));
    }

    #[test]
    fn test_load_song_publishes_and_assigns_settings() {
        let backend = RecordingBackend::new();
        let mut engine = Engine::new(backend, EngineConfig::default()).unwrap();
        let events = engine.subscribe();
        engine.load_song(Song::from_json(SONG).unwrap());

        assert_eq!(engine.track_settings().len(), 2);
        assert_eq!(engine.track_settings()[0].colors.background, "#df2020");
        assert_eq!(events.try_recv(), Ok(EngineEvent::SongLoaded { tracks: 2 }));
    }

    #[test]
    fn test_frame_advances_then_renders() {
        let (mut engine, _, mut surface) = engine();
        let events = engine.subscribe();

        engine.start(1000.0).unwrap();
        let stats = engine.frame(1250.0, &mut surface).unwrap();

        assert!((engine.current_tick() - 240.0).abs() < 1e-6);
        // C4 sounding across the playhead, E4 upcoming, C3 beyond the window
        assert_eq!(stats.visible_notes, 2);

        let received: Vec<_> = events.try_iter().collect();
        assert_eq!(received[0], EngineEvent::PlayStarted);
        assert!(matches!(received[1], EngineEvent::TickChanged(_)));
    }

    #[test]
    fn test_pause_freezes_and_resume_toggles_transport() {
        let (mut engine, backend, mut surface) = engine();
        engine.start(0.0).unwrap();
        engine.frame(100.0, &mut surface).unwrap();

        engine.pause();
        assert_eq!(engine.state(), ClockState::Paused);
        assert!(!backend.transport_running());
        let tick = engine.current_tick();

        engine.frame(5000.0, &mut surface).unwrap();
        assert_eq!(engine.current_tick(), tick);

        engine.start(5000.0).unwrap();
        assert!(backend.transport_running());
        // No rescheduling on resume
        assert_eq!(backend.voices_created(), 2);

        engine.frame(5100.0, &mut surface).unwrap();
        assert!(engine.current_tick() > tick);
    }

    #[test]
    fn test_stop_resets() {
        let (mut engine, backend, mut surface) = engine();
        engine.start(0.0).unwrap();
        engine.frame(300.0, &mut surface).unwrap();
        engine.stop();

        assert_eq!(engine.state(), ClockState::Stopped);
        assert_eq!(engine.current_tick(), 0.0);
        assert_eq!(backend.live_voices(), 0);
        assert!(!engine.scheduler().is_active());
    }

    #[test]
    fn test_seek_restarts_audio() {
        let (mut engine, backend, mut surface) = engine();
        backend.set_now(2.0);
        engine.start(0.0).unwrap();
        assert_eq!(backend.triggers().len(), 3);

        engine.seek(960.0).unwrap();
        assert_eq!(engine.current_tick(), 960.0);
        assert_eq!(backend.voices_created(), 4);
        assert_eq!(backend.live_voices(), 2);

        // Only C3 starts at or after one second
        let rescheduled = &backend.triggers()[3..];
        assert_eq!(rescheduled.len(), 1);
        assert_eq!(rescheduled[0].pitch, "C3");
        assert_eq!(rescheduled[0].when, 2.0);

        // The seek frame shows exactly the requested tick
        engine.frame(40.0, &mut surface).unwrap();
        assert_eq!(engine.current_tick(), 960.0);
        engine.frame(50.0, &mut surface).unwrap();
        assert!(engine.current_tick() > 960.0);
    }

    #[test]
    fn test_completion_stops_clock() {
        let (mut engine, backend, mut surface) = engine();
        let events = engine.subscribe();
        engine.start(0.0).unwrap();

        backend.set_now(2.0);
        engine.frame(2000.0, &mut surface).unwrap();

        assert_eq!(engine.state(), ClockState::Stopped);
        assert_eq!(engine.current_tick(), 0.0);
        assert!(events.try_iter().any(|e| e == EngineEvent::Stopped));
    }

    #[test]
    fn test_silent_playback_stops_at_end() {
        let (mut engine, backend, mut surface) = engine();
        engine.set_audio_enabled(false).unwrap();
        engine.start(0.0).unwrap();
        assert!(backend.triggers().is_empty());

        engine.frame(1000.0, &mut surface).unwrap();
        assert!(engine.current_tick() > 0.0);
        engine.frame(3000.0, &mut surface).unwrap();
        assert_eq!(engine.state(), ClockState::Stopped);
    }

    #[test]
    fn test_enable_audio_while_playing() {
        let (mut engine, backend, _) = engine();
        engine.set_audio_enabled(false).unwrap();
        engine.start(0.0).unwrap();
        engine.set_audio_enabled(true).unwrap();
        assert_eq!(backend.voices_created(), 2);
        engine.set_audio_enabled(false).unwrap();
        assert_eq!(backend.live_voices(), 0);
    }

    #[test]
    fn test_track_commands() {
        let (mut engine, _, _) = engine();

        engine.set_track_display(1, false).unwrap();
        engine.set_track_octave(0, -1).unwrap();
        engine.set_track_colors(0, "#ffffff", "#000000").unwrap();
        let settings = engine.track_settings();
        assert!(!settings[1].display);
        assert_eq!(settings[0].octave_shift, -1);
        assert_eq!(settings[0].colors.black_or_white, "#000000");

        engine.set_all_tracks_display(true);
        assert!(engine.track_settings().iter().all(|s| s.display));

        assert!(matches!(
            engine.set_track_display(5, true),
            Err(KeybardError::UnknownTrack(5))
        ));
        assert!(matches!(
            engine.set_track_colors(0, "red", "#000000"),
            Err(KeybardError::InvalidColor(_))
        ));
        assert!(matches!(
            engine.set_track_settings(Vec::new()),
            Err(KeybardError::TrackCountMismatch {
                expected: 2,
                found: 0
            })
        ));
    }

    #[test]
    fn test_jump_to_track() {
        let (mut engine, _, _) = engine();
        engine.jump_to_track(1).unwrap();
        assert_eq!(engine.current_tick(), 960.0);
        assert!((engine.current_time_seconds() - 1.0).abs() < 1e-9);
        assert!(matches!(
            engine.jump_to_track(2),
            Err(KeybardError::UnknownTrack(2))
        ));
    }

    #[test]
    fn test_unload_song_drops_settings_and_audio() {
        let (mut engine, backend, mut surface) = engine();
        engine.start(0.0).unwrap();
        engine.frame(300.0, &mut surface).unwrap();
        assert_eq!(backend.live_voices(), 2);

        engine.unload_song();
        assert!(engine.song().is_none());
        assert!(engine.track_settings().is_empty());
        assert_eq!(engine.state(), ClockState::Stopped);
        assert_eq!(backend.live_voices(), 0);
        assert!(matches!(engine.start(0.0), Err(KeybardError::NoSongLoaded)));

        let stats = engine.frame(400.0, &mut surface).unwrap();
        assert_eq!(stats.visible_notes, 0);
    }

    #[test]
    fn test_frame_without_song() {
        let mut engine = Engine::new(RecordingBackend::new(), EngineConfig::default()).unwrap();
        let mut surface = RecordingSurface::new();
        engine.resize(880.0, 600.0, &mut surface);
        let stats = engine.frame(0.0, &mut surface).unwrap();
        assert_eq!(stats.visible_notes, 0);
        assert_eq!(surface.lines().count(), 21);
    }
}
