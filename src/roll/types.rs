//! Piano-roll layout types

use crate::config::EngineConfig;
use crate::pitch::DisplayNote;
use crate::surface::{Rect, TextStyle};

/// Size of the drawing area in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// One note placed on screen for the current frame
///
/// # Fields
/// - `track`: index of the owning track
/// - `note`: respelled pitch after the track's octave shift
/// - `ticks`: start tick of the source note
/// - `bounds`: screen rectangle; height equals the duration in ticks
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleNote {
    pub track: usize,
    pub note: DisplayNote,
    pub ticks: u32,
    pub bounds: Rect,
}

/// What a frame produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub visible_notes: usize,
    pub label_pool: usize,
}

/// The subset of [`EngineConfig`] the layout engine reads
#[derive(Debug, Clone, PartialEq)]
pub struct RollStyle {
    pub keyboard_height: f32,
    pub corner_radius: f32,
    pub grid_color: String,
    pub grid_line_width: f32,
    pub white_label: TextStyle,
    pub black_label: TextStyle,
    pub note_label: TextStyle,
    pub show_info: bool,
}

impl From<&EngineConfig> for RollStyle {
    fn from(config: &EngineConfig) -> Self {
        let style = |color: &str| TextStyle {
            font_size: config.label_font_size,
            color: color.to_string(),
        };
        Self {
            keyboard_height: config.keyboard_height,
            corner_radius: config.note_corner_radius,
            grid_color: config.grid_color.clone(),
            grid_line_width: config.grid_line_width,
            white_label: style(&config.white_label_color),
            black_label: style(&config.black_label_color),
            note_label: style(&config.black_label_color),
            show_info: config.show_info,
        }
    }
}
