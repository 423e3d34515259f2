//! Engine configuration
//!
//! Read from YAML with kebab-case keys. Every key is optional:
//!
//! ```yaml
//! keyboard-height: 100
//! note-corner-radius: 8
//! saturation: 0.75
//! lightness: 0.5
//! grid-color: "#3b3b3b"
//! show-info: true
//! envelope:
//!   attack: 0.02
//!   release: 1.0
//! ```

use serde::Deserialize;

use crate::colors;
use crate::error::KeybardError;

/// ADSR envelope handed to the audio backend for every voice
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Envelope {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            attack: 0.02,
            decay: 0.1,
            sustain: 0.3,
            release: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct EngineConfig {
    /// Display height of the keyboard sprite in pixels
    pub keyboard_height: f32,
    pub note_corner_radius: f32,
    pub saturation: f64,
    pub lightness: f64,
    pub grid_color: String,
    pub grid_line_width: f32,
    pub label_font_size: f32,
    pub white_label_color: String,
    pub black_label_color: String,
    /// Draw the tick readout in the top-left corner
    pub show_info: bool,
    /// Simultaneous notes per voice
    pub polyphony: usize,
    pub envelope: Envelope,
    /// Schedule audio alongside the visual clock
    pub play_audio: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            keyboard_height: 100.0,
            note_corner_radius: 8.0,
            saturation: colors::DEFAULT_SATURATION,
            lightness: colors::DEFAULT_LIGHTNESS,
            grid_color: "#3b3b3b".to_string(),
            grid_line_width: 2.0,
            label_font_size: 12.0,
            white_label_color: "#000000".to_string(),
            black_label_color: "#FFFFFF".to_string(),
            show_info: false,
            polyphony: 4,
            envelope: Envelope::default(),
            play_audio: true,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a YAML document. An empty document yields the defaults.
    pub fn from_yaml(content: &str) -> Result<Self, KeybardError> {
        let config: EngineConfig = if content.trim().is_empty() {
            EngineConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| KeybardError::ConfigError(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), KeybardError> {
        let positive = [
            ("keyboard-height", self.keyboard_height),
            ("grid-line-width", self.grid_line_width),
            ("label-font-size", self.label_font_size),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(KeybardError::ConfigError(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        if self.note_corner_radius < 0.0 {
            return Err(KeybardError::ConfigError(format!(
                "note-corner-radius cannot be negative, got {}",
                self.note_corner_radius
            )));
        }

        for (name, value) in [("saturation", self.saturation), ("lightness", self.lightness)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(KeybardError::ConfigError(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )));
            }
        }

        if self.polyphony == 0 {
            return Err(KeybardError::ConfigError(
                "polyphony must be at least 1".to_string(),
            ));
        }

        for color in [&self.grid_color, &self.white_label_color, &self.black_label_color] {
            colors::parse_hex(color)
                .map_err(|_| KeybardError::ConfigError(format!("invalid color '{}'", color)))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(EngineConfig::from_yaml("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_yaml() {
        let config = EngineConfig::from_yaml(
            "keyboard-height: 80\nshow-info: true\nenvelope:\n  release: 2.5\n",
        )
        .unwrap();
        assert_eq!(config.keyboard_height, 80.0);
        assert!(config.show_info);
        assert_eq!(config.envelope.release, 2.5);
        assert_eq!(config.envelope.attack, 0.02);
        assert_eq!(config.note_corner_radius, 8.0);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let result = EngineConfig::from_yaml("saturation: 1.5");
        assert!(matches!(result, Err(KeybardError::ConfigError(_))));

        let result = EngineConfig::from_yaml("keyboard-height: 0");
        if let Err(KeybardError::ConfigError(message)) = result {
            assert!(message.contains("keyboard-height"));
        } else {
            panic!("Expected ConfigError but got: {:?}", result);
        }
    }

    #[test]
    fn test_rejects_bad_color_and_unknown_keys() {
        assert!(EngineConfig::from_yaml("grid-color: purple").is_err());
        assert!(EngineConfig::from_yaml("white-key-count: 30").is_err());
    }
}
