//! # Piano Roll
//!
//! Per-frame layout of the notes falling toward the keyboard.
//!
//! ## Frame
//! For every displayed track, in track order:
//! 1. Select notes starting within one viewport height above the playhead, or
//!    still sounding across it
//! 2. Apply the track's octave shift and drop notes outside the keyboard range
//! 3. Respell for the keyboard and compute screen bounds (1 tick = 1 pixel)
//! 4. Draw a rounded rectangle in the track's background color
//! 5. Label it from the shared label pool in the track's foreground color
//!
//! Grid lines are redrawn underneath every frame. Keyboard geometry only
//! changes on [`NoteLayoutEngine::resize`].
//!
//! ## Sub-modules
//! - `types` - viewport, visible-note and style types
//! - `notes` - visibility test and note geometry
//! - `labels` - the recycled label pool
//! - `keyboard` - key width, grid, sprite and static key labels
//!
//! ## Example
//! ```rust
//! use keybard::config::EngineConfig;
//! use keybard::roll::NoteLayoutEngine;
//! use keybard::song::{NoteEvent, Song, TempoMap, Track};
//! use keybard::settings::TrackSettings;
//! use keybard::colors::TrackColorAssigner;
//! use keybard::surface::RecordingSurface;
//!
//! let note = NoteEvent {
//!     pitch: "C".to_string(), octave: 4, name: "C4".to_string(),
//!     ticks: 100, duration_ticks: 50, time: 0.1, duration: 0.05, velocity: 1.0,
//! };
//! let song = Song::new(TempoMap::constant(480, 120.0), vec![Track { name: "Piano".into(), notes: vec![note] }]);
//! let settings = TrackSettings::for_song(&song, &TrackColorAssigner::default());
//!
//! let mut surface = RecordingSurface::new();
//! let mut roll = NoteLayoutEngine::new(&EngineConfig::default());
//! roll.resize(880.0, 600.0, &mut surface);
//! let stats = roll.render(&song, &settings, 0.0, &mut surface).unwrap();
//! assert_eq!(stats.visible_notes, 1);
//! ```

mod keyboard;
mod labels;
mod notes;
mod types;


pub use keyboard::KeyboardLayout;
pub use labels::LabelPool;
pub use notes::{is_visible, note_bounds};
pub use types::{FrameStats, RollStyle, Viewport, VisibleNote};

use crate::config::EngineConfig;
use crate::error::KeybardError;
use crate::settings::TrackSettings;
use crate::song::Song;
use crate::surface::{Surface, TextStyle};

/// Gap between a note label and the bottom of its rectangle
const LABEL_PADDING: f32 = 2.0;
const NOTE_STROKE_WIDTH: f32 = 1.0;

#[derive(Debug, Clone)]
pub struct NoteLayoutEngine {
    style: RollStyle,
    viewport: Viewport,
    keyboard: KeyboardLayout,
    labels: LabelPool,
    visible: Vec<VisibleNote>,
    peak_visible: usize,
}

impl NoteLayoutEngine {
    pub fn new(config: &EngineConfig) -> Self {
        let style = RollStyle::from(config);
        Self {
            labels: LabelPool::new(style.note_label.clone()),
            style,
            viewport: Viewport::default(),
            keyboard: KeyboardLayout::new(),
            visible: Vec::new(),
            peak_visible: 0,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn key_width(&self) -> f32 {
        self.keyboard.key_width()
    }

    pub fn keyboard(&self) -> &KeyboardLayout {
        &self.keyboard
    }

    /// Notes placed by the most recent frame
    pub fn visible_notes(&self) -> &[VisibleNote] {
        &self.visible
    }

    pub fn label_pool_len(&self) -> usize {
        self.labels.len()
    }

    /// Largest number of notes on screen in any frame so far
    pub fn peak_visible(&self) -> usize {
        self.peak_visible
    }

    pub fn resize(&mut self, width: f32, height: f32, surface: &mut dyn Surface) {
        self.viewport = Viewport { width, height };
        self.keyboard.resize(self.viewport, &self.style, surface);
        log::debug!(
            "Resized to {}x{}, key width {}",
            width,
            height,
            self.keyboard.key_width()
        );
    }

    /// Compute the visible notes for `current_tick` without drawing.
    pub fn layout(
        &mut self,
        song: &Song,
        settings: &[TrackSettings],
        current_tick: f64,
    ) -> Result<&[VisibleNote], KeybardError> {
        self.visible.clear();
        let window = self.viewport.height as f64;

        for (index, (track, setting)) in song.tracks.iter().zip(settings).enumerate() {
            if !setting.display {
                continue;
            }
            for note in &track.notes {
                if !notes::is_visible(note.ticks, note.duration_ticks, current_tick, window) {
                    continue;
                }
                let Some(display) = notes::prepare(note, setting.octave_shift)? else {
                    continue;
                };
                let bounds = notes::note_bounds(
                    &display,
                    note.ticks,
                    note.duration_ticks,
                    current_tick,
                    self.viewport,
                    self.keyboard.key_width(),
                    self.style.keyboard_height,
                )?;
                self.visible.push(VisibleNote {
                    track: index,
                    note: display,
                    ticks: note.ticks,
                    bounds,
                });
            }
        }

        self.peak_visible = self.peak_visible.max(self.visible.len());
        Ok(&self.visible)
    }

    /// Lay out and draw one frame.
    pub fn render(
        &mut self,
        song: &Song,
        settings: &[TrackSettings],
        current_tick: f64,
        surface: &mut dyn Surface,
    ) -> Result<FrameStats, KeybardError> {
        self.layout(song, settings, current_tick)?;

        self.draw_background(current_tick, surface);

        for visible in &self.visible {
            let colors = &settings[visible.track].colors;
            surface.fill_rounded_rect(visible.bounds, self.style.corner_radius, &colors.background);
            surface.stroke_rounded_rect(
                visible.bounds,
                self.style.corner_radius,
                NOTE_STROKE_WIDTH,
                &colors.background,
            );
        }

        self.labels.begin_frame(surface);
        for visible in &self.visible {
            let text = &visible.note.pitch;
            let style = self.labels.style();
            let x = visible.bounds.center_x() - surface.text_width(text, style) / 2.0;
            let y = visible.bounds.bottom() - style.font_size - LABEL_PADDING;
            let color = &settings[visible.track].colors.foreground;
            self.labels.assign(surface, text, x, y, color);
        }

        log::trace!(
            "Frame at tick {}: {} notes, {} labels",
            current_tick,
            self.visible.len(),
            self.labels.len()
        );

        Ok(FrameStats {
            visible_notes: self.visible.len(),
            label_pool: self.labels.len(),
        })
    }

    /// Draw a frame with no song: grid only, all note labels hidden.
    pub fn render_empty(&mut self, surface: &mut dyn Surface) -> FrameStats {
        self.visible.clear();
        self.draw_background(0.0, surface);
        self.labels.begin_frame(surface);
        FrameStats {
            visible_notes: 0,
            label_pool: self.labels.len(),
        }
    }

    fn draw_background(&self, current_tick: f64, surface: &mut dyn Surface) {
        surface.clear();
        for line in self.keyboard.grid() {
            surface.stroke_line(*line, self.style.grid_line_width, &self.style.grid_color);
        }

        if self.style.show_info {
            let info = TextStyle {
                font_size: self.style.note_label.font_size,
                color: self.style.black_label.color.clone(),
            };
            surface.draw_text(10.0, 10.0, &format!("Tick: {:.0}", current_tick), &info);
        }
    }
}
