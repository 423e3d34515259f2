//! # Track Colors
//!
//! Evenly spaced hues on the color wheel, one per track, each paired with a
//! black or white label color that stays readable on top of it.
//!
//! Generation is deterministic: the same track count always yields the same
//! ordered list of colors.

use serde::{Deserialize, Serialize};

use crate::error::KeybardError;

pub const DEFAULT_SATURATION: f64 = 0.75;
pub const DEFAULT_LIGHTNESS: f64 = 0.5;

/// Relative-luminance cut-off between black and white text
const BW_THRESHOLD: f64 = 0.179_128_784_747_792;

/// Colors for one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSet {
    pub background: String,
    pub foreground: String,
    pub black_or_white: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackColorAssigner {
    pub saturation: f64,
    pub lightness: f64,
}

impl Default for TrackColorAssigner {
    fn default() -> Self {
        Self {
            saturation: DEFAULT_SATURATION,
            lightness: DEFAULT_LIGHTNESS,
        }
    }
}

impl TrackColorAssigner {
    pub fn new(saturation: f64, lightness: f64) -> Self {
        Self {
            saturation,
            lightness,
        }
    }

    /// `amount` hex colors with hues `i * 360 / amount` degrees apart.
    ///
    /// # Example
    /// ```
    /// use keybard::colors::TrackColorAssigner;
    ///
    /// let colors = TrackColorAssigner::default().generate_colors(3);
    /// assert_eq!(colors, vec!["#df2020", "#20df20", "#2020df"]);
    /// ```
    pub fn generate_colors(&self, amount: usize) -> Vec<String> {
        hues(amount)
            .into_iter()
            .map(|hue| {
                let [r, g, b] = hsl_to_rgb(hue / 360.0, self.saturation, self.lightness);
                rgb_to_hex(r, g, b)
            })
            .collect()
    }

    /// Colors plus a contrast-safe label color for each.
    pub fn generate_color_sets(&self, amount: usize) -> Vec<ColorSet> {
        self.generate_colors(amount)
            .into_iter()
            .map(|background| {
                // Generated colors are always well-formed hex
                let label = invert_bw(&background).unwrap_or_else(|_| "#ffffff".to_string());
                ColorSet {
                    foreground: label.clone(),
                    black_or_white: label,
                    background,
                }
            })
            .collect()
    }
}

/// Hue in degrees for each of `amount` evenly spaced colors.
pub fn hues(amount: usize) -> Vec<f64> {
    (0..amount)
        .map(|i| (i as f64 * (360.0 / amount as f64)) % 360.0)
        .collect()
}

/// HSL (all components 0-1) to 8-bit RGB.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [u8; 3] {
    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        )
    };

    [
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    ]
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Parse `#rrggbb` or `#rgb` (leading `#` optional).
pub fn parse_hex(color: &str) -> Result<[u8; 3], KeybardError> {
    let digits = color.strip_prefix('#').unwrap_or(color);
    let invalid = || KeybardError::InvalidColor(color.to_string());

    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return Err(invalid()),
    };
    if !expanded.is_ascii() {
        return Err(invalid());
    }

    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| invalid());
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

/// Full channel inversion, `#102030` becomes `#efdfcf`.
pub fn invert(color: &str) -> Result<String, KeybardError> {
    let [r, g, b] = parse_hex(color)?;
    Ok(rgb_to_hex(255 - r, 255 - g, 255 - b))
}

/// Pure black or pure white, whichever reads better on `color`.
pub fn invert_bw(color: &str) -> Result<String, KeybardError> {
    let rgb = parse_hex(color)?;
    Ok(if luminance(rgb) > BW_THRESHOLD {
        "#000000".to_string()
    } else {
        "#ffffff".to_string()
    })
}

/// WCAG relative luminance
fn luminance(rgb: [u8; 3]) -> f64 {
    let linear = |c: u8| {
        let x = c as f64 / 255.0;
        if x <= 0.03928 {
            x / 12.92
        } else {
            ((x + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * linear(rgb[0]) + 0.7152 * linear(rgb[1]) + 0.0722 * linear(rgb[2])
}
