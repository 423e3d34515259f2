pub mod clock;
pub mod colors;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod format;
pub mod pitch;
pub mod playback;
pub mod roll;
pub mod settings;
pub mod song;
pub mod surface;
pub mod svg;

pub use clock::{ClockState, TickClock};
pub use colors::{ColorSet, TrackColorAssigner};
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::*;
pub use events::EngineEvent;
pub use playback::{AudioBackend, PlaybackScheduler, RecordingBackend, Voice};
pub use roll::NoteLayoutEngine;
pub use settings::TrackSettings;
pub use song::{NoteEvent, Song, TempoMap, Track};
pub use surface::{RecordingSurface, Surface};

/// Render a single frame of `song` at `tick` to an SVG document.
/// This is the main entry point for snapshots.
pub fn render_svg(
    song: Song,
    config: EngineConfig,
    width: f32,
    height: f32,
    tick: f64,
) -> Result<String, KeybardError> {
    let mut surface = RecordingSurface::new();
    let mut engine = Engine::new(RecordingBackend::new(), config)?;
    engine.resize(width, height, &mut surface);
    engine.load_song(song);
    engine.seek(tick)?;
    engine.frame(0.0, &mut surface)?;
    svg::to_svg(&surface, width, height)
}
