//! Keyboard geometry: key width, grid lines, the keyboard sprite and the
//! static key-name labels. Recomputed whenever the viewport is resized.

use crate::pitch::{self, FIRST_OCTAVE, LAST_OCTAVE};
use crate::surface::{Line, Rect, Sprite, Surface, TextHandle, TextStyle};

use super::types::{RollStyle, Viewport};

/// Accidental label slots of one octave, one per white key; empty slots have
/// no black key to their right.
const BLACK_LABEL_SLOTS: [&str; 7] = ["C#", "E♭", "", "F#", "G#", "B♭", ""];

/// Horizontal nudges keeping accidental labels clear of neighbouring keys
const BLACK_LABEL_NUDGES: [f32; 7] = [0.0, 4.0, 0.0, -4.0, 0.0, 6.0, 0.0];

/// Distance of each label row above the bottom edge
const WHITE_LABEL_RISE: f32 = 25.0;
const BLACK_LABEL_RISE: f32 = 75.0;

#[derive(Debug, Clone)]
struct StaticLabel {
    handle: TextHandle,
    text: String,
    slot: usize,
}

#[derive(Debug, Clone)]
pub struct KeyboardLayout {
    white_keys: usize,
    key_width: f32,
    grid: Vec<Line>,
    sprite: Rect,
    white_labels: Vec<StaticLabel>,
    black_labels: Vec<StaticLabel>,
}

impl Default for KeyboardLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardLayout {
    pub fn new() -> Self {
        Self {
            white_keys: pitch::white_key_count(),
            key_width: 0.0,
            grid: Vec::new(),
            sprite: Rect::default(),
            white_labels: Vec::new(),
            black_labels: Vec::new(),
        }
    }

    pub fn white_keys(&self) -> usize {
        self.white_keys
    }

    pub fn key_width(&self) -> f32 {
        self.key_width
    }

    /// Vertical lines on every white-key boundary
    pub fn grid(&self) -> &[Line] {
        &self.grid
    }

    pub fn sprite(&self) -> Rect {
        self.sprite
    }

    /// Recompute everything that depends on the viewport size and push it to
    /// the surface. Static labels are created on the first call.
    pub fn resize(&mut self, viewport: Viewport, style: &RollStyle, surface: &mut dyn Surface) {
        self.key_width = viewport.width / self.white_keys as f32;

        // Full width, anchored to the bottom edge
        self.sprite = Rect::new(
            0.0,
            viewport.height - style.keyboard_height,
            viewport.width,
            style.keyboard_height,
        );
        surface.place_sprite(Sprite::Keyboard, self.sprite);

        self.grid = (1..self.white_keys)
            .map(|i| Line::vertical(self.key_width * i as f32, 0.0, viewport.height))
            .collect();

        if self.white_labels.is_empty() {
            self.create_labels(style, surface);
        }

        let white_y = viewport.height - WHITE_LABEL_RISE;
        for label in &self.white_labels {
            let x = self.slot_x(label, &style.white_label, surface);
            surface.update_text(label.handle, &label.text, x, white_y, &style.white_label.color);
        }

        let black_y = viewport.height - BLACK_LABEL_RISE;
        for label in &self.black_labels {
            let x = self.slot_x(label, &style.black_label, surface)
                + self.key_width / 2.0
                + BLACK_LABEL_NUDGES[label.slot % 7];
            surface.update_text(label.handle, &label.text, x, black_y, &style.black_label.color);
        }
    }

    /// Left edge of a label centred on its white-key slot
    fn slot_x(&self, label: &StaticLabel, style: &TextStyle, surface: &dyn Surface) -> f32 {
        label.slot as f32 * self.key_width + self.key_width / 2.0
            - surface.text_width(&label.text, style) / 2.0
    }

    fn create_labels(&mut self, style: &RollStyle, surface: &mut dyn Surface) {
        let octaves = (LAST_OCTAVE - FIRST_OCTAVE) as usize;

        for octave in 0..octaves {
            for (i, letter) in pitch::NoteName::ALL.iter().enumerate() {
                let slot = octave * 7 + i;
                self.white_labels
                    .push(Self::static_label(letter.as_str(), slot, &style.white_label, surface));

                let accidental = BLACK_LABEL_SLOTS[i];
                if !accidental.is_empty() {
                    self.black_labels
                        .push(Self::static_label(accidental, slot, &style.black_label, surface));
                }
            }
        }

        self.white_labels.push(Self::static_label(
            "C6",
            octaves * 7,
            &style.white_label,
            surface,
        ));
    }

    fn static_label(
        text: &str,
        slot: usize,
        style: &TextStyle,
        surface: &mut dyn Surface,
    ) -> StaticLabel {
        let handle = surface.create_text(style);
        surface.set_text_visible(handle, true);
        StaticLabel {
            handle,
            text: text.to_string(),
            slot,
        }
    }
}
