use super::*;
use crate::colors::TrackColorAssigner;
use crate::config::{EngineConfig, Envelope};
use crate::error::KeybardError;
use crate::settings::TrackSettings;
use crate::song::Song;

/// 120 BPM at 480 ppq: 480 ticks = 0.5s
const SONG: &str = r#"{
    "header": { "ppq": 480, "tempos": [{ "ticks": 0, "bpm": 120 }] },
    "tracks": [
        { "name": "Melody", "notes": [
            { "name": "C4", "ticks": 0, "durationTicks": 480, "velocity": 0.8 },
            { "name": "Eb4", "ticks": 480, "durationTicks": 480 },
            { "name": "G4", "ticks": 960, "durationTicks": 960 }
        ] },
        { "name": "Bass", "notes": [
            { "name": "C2", "ticks": 0, "durationTicks": 1920 },
            { "name": "C3", "ticks": 960, "durationTicks": 480 }
        ] }
    ]
}"#;

fn setup() -> (Song, Vec<TrackSettings>, RecordingBackend, PlaybackScheduler<RecordingBackend>) {
    let song = Song::from_json(SONG).unwrap();
    let settings = TrackSettings::for_song(&song, &TrackColorAssigner::default());
    let backend = RecordingBackend::new();
    let scheduler = PlaybackScheduler::new(backend.clone(), &EngineConfig::default());
    (song, settings, backend, scheduler)
}

fn pitches(triggers: &[ScheduledTrigger]) -> Vec<&str> {
    triggers.iter().map(|t| t.pitch.as_str()).collect()
}

#[test]
fn test_schedule_from_start() {
    let (song, settings, backend, mut scheduler) = setup();
    backend.set_now(10.0);

    scheduler.start(&song, &settings, 0.0).unwrap();
    let triggers = backend.triggers();

    // C2 is below the keyboard and never scheduled
    assert_eq!(pitches(&triggers), vec!["C4", "Eb4", "G4", "C3"]);
    assert_eq!(triggers[0].when, 10.0);
    assert_eq!(triggers[0].velocity, 0.8);
    assert_eq!(triggers[1].when, 10.5);
    assert_eq!(triggers[2].when, 11.0);
    assert_eq!(triggers[2].duration, 1.0);
    assert_eq!(triggers[3].voice, 1);
    assert_eq!(scheduler.song_end(), 2.0);
    assert_eq!(backend.live_voices(), 2);
}

#[test]
fn test_voice_config() {
    let (song, settings, backend, mut scheduler) = setup();
    scheduler.start(&song, &settings, 0.0).unwrap();
    let configs = backend.voice_configs();
    assert_eq!(configs.len(), 2);
    assert_eq!(configs[0], (Envelope::default(), 4));
}

#[test]
fn test_schedule_from_offset() {
    let (song, settings, backend, mut scheduler) = setup();
    backend.set_now(3.0);

    scheduler.start(&song, &settings, 480.0).unwrap();
    let triggers = backend.triggers();

    // C4 started before the offset and is skipped even though it is sounding
    assert_eq!(pitches(&triggers), vec!["Eb4", "G4", "C3"]);
    assert_eq!(triggers[0].when, 3.0);
    assert_eq!(triggers[1].when, 3.5);
}

#[test]
fn test_hidden_track_gets_no_voice() {
    let (song, mut settings, backend, mut scheduler) = setup();
    settings[0].display = false;

    scheduler.start(&song, &settings, 0.0).unwrap();
    assert_eq!(backend.voices_created(), 1);
    assert_eq!(pitches(&backend.triggers()), vec!["C3"]);
    assert_eq!(scheduler.song_end(), 1.5);
}

#[test]
fn test_octave_shift_applies_to_audio() {
    let (song, mut settings, backend, mut scheduler) = setup();
    settings[1].octave_shift = 1;

    scheduler.start(&song, &settings, 0.0).unwrap();
    let triggers = backend.triggers();
    assert_eq!(pitches(&triggers), vec!["C4", "Eb4", "G4", "C3", "C4"]);
    // C2 shifted to C3 now sustains to the end of the song
    assert_eq!(scheduler.song_end(), 2.0);
}

#[test]
fn test_completion_resolves_at_song_end() {
    let (song, settings, backend, mut scheduler) = setup();
    let done = scheduler.start(&song, &settings, 0.0).unwrap();

    backend.set_now(1.9);
    assert!(!scheduler.poll());
    assert_eq!(done.state(), CompletionState::Pending);

    backend.set_now(2.0);
    assert!(scheduler.poll());
    assert!(done.is_resolved());
    assert!(!scheduler.is_active());
    assert_eq!(backend.live_voices(), 0);

    // Resolution is sticky
    assert!(done.is_resolved());
    assert!(!scheduler.poll());
}

#[test]
fn test_stop_before_end_never_resolves() {
    let (song, settings, backend, mut scheduler) = setup();
    let done = scheduler.start(&song, &settings, 0.0).unwrap();

    backend.set_now(0.75);
    scheduler.stop();
    assert_eq!(done.state(), CompletionState::Cancelled);
    assert_eq!(backend.live_voices(), 0);
    assert!(backend.pending_triggers().is_empty());

    backend.set_now(100.0);
    assert!(!scheduler.poll());
    assert_eq!(done.state(), CompletionState::Cancelled);
}

#[test]
fn test_pause_toggles_transport_and_extends_deadline() {
    let (song, settings, backend, mut scheduler) = setup();
    let done = scheduler.start(&song, &settings, 0.0).unwrap();

    backend.set_now(1.0);
    scheduler.pause();
    assert!(scheduler.is_paused());
    assert!(!backend.transport_running());
    assert_eq!(backend.live_voices(), 2);

    // Deadline ignored while paused
    backend.advance(4.0);
    assert!(!scheduler.poll());

    scheduler.pause();
    assert!(!scheduler.is_paused());
    assert!(backend.transport_running());

    backend.set_now(5.9);
    assert!(!scheduler.poll());
    backend.set_now(6.0);
    assert!(scheduler.poll());
    assert!(done.is_resolved());
}

#[test]
fn test_stop_while_paused_restores_transport() {
    let (song, settings, backend, mut scheduler) = setup();
    scheduler.start(&song, &settings, 0.0).unwrap();
    scheduler.pause();
    scheduler.stop();
    assert!(backend.transport_running());
    assert!(!scheduler.is_paused());
}

#[test]
fn test_pause_without_playback_is_ignored() {
    let (song, settings, backend, mut scheduler) = setup();
    scheduler.pause();
    assert!(!scheduler.is_paused());
    assert!(backend.transport_running());

    scheduler.start(&song, &settings, 0.0).unwrap();
    assert!(backend.transport_running());

    // Completed playback leaves nothing to pause either
    backend.set_now(2.0);
    assert!(scheduler.poll());
    scheduler.pause();
    assert!(backend.transport_running());
}

#[test]
fn test_restart_replaces_previous_playback() {
    let (song, settings, backend, mut scheduler) = setup();
    let first = scheduler.start(&song, &settings, 0.0).unwrap();
    let second = scheduler.start(&song, &settings, 960.0).unwrap();

    assert_eq!(first.state(), CompletionState::Cancelled);
    assert_eq!(second.state(), CompletionState::Pending);
    assert_eq!(backend.voices_created(), 4);
    assert_eq!(backend.live_voices(), 2);
}

#[test]
fn test_past_end_completes_immediately() {
    let (song, settings, _backend, mut scheduler) = setup();
    let done = scheduler.start(&song, &settings, 5000.0).unwrap();
    assert!(scheduler.poll());
    assert!(done.is_resolved());
}

#[test]
fn test_settings_length_checked() {
    let (song, settings, _backend, mut scheduler) = setup();
    let result = scheduler.start(&song, &settings[..1], 0.0);
    assert!(matches!(
        result,
        Err(KeybardError::TrackCountMismatch {
            expected: 2,
            found: 1
        })
    ));
}
