//! # Rendering Surface
//!
//! The engine never rasterises anything itself. It issues a small set of
//! drawing primitives to a host-supplied [`Surface`]:
//!
//! - immediate primitives, cleared by [`Surface::clear`] every frame: lines,
//!   rounded rectangles and positioned text
//! - retained text objects addressed by [`TextHandle`], repositioned or hidden
//!   frame to frame (key labels, note labels)
//! - placement of the keyboard sprite
//!
//! [`RecordingSurface`] keeps everything it receives in memory. The CLI
//! serialises it to SVG; tests inspect it directly.

use std::collections::HashMap;

/// Axis-aligned rectangle, origin top-left
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Line {
    pub fn vertical(x: f32, y1: f32, y2: f32) -> Self {
        Self { x1: x, y1, x2: x, y2 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    pub color: String,
}

/// Identifies a retained text object on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextHandle(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sprite {
    Keyboard,
}

pub trait Surface {
    /// Drop all immediate primitives from the previous frame.
    fn clear(&mut self);

    fn stroke_line(&mut self, line: Line, width: f32, color: &str);

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: &str);

    fn stroke_rounded_rect(&mut self, rect: Rect, radius: f32, width: f32, color: &str);

    /// Immediate text at a position, gone after the next `clear`.
    fn draw_text(&mut self, x: f32, y: f32, text: &str, style: &TextStyle);

    /// Allocate a retained text object, initially empty and hidden.
    fn create_text(&mut self, style: &TextStyle) -> TextHandle;

    fn update_text(&mut self, handle: TextHandle, text: &str, x: f32, y: f32, color: &str);

    fn set_text_visible(&mut self, handle: TextHandle, visible: bool);

    fn place_sprite(&mut self, sprite: Sprite, rect: Rect);

    /// Rendered width of `text`, used to centre labels.
    fn text_width(&self, text: &str, style: &TextStyle) -> f32 {
        text.chars().count() as f32 * style.font_size * 0.6
    }
}

/// An immediate primitive received by [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Line {
        line: Line,
        width: f32,
        color: String,
    },
    FillRoundedRect {
        rect: Rect,
        radius: f32,
        color: String,
    },
    StrokeRoundedRect {
        rect: Rect,
        radius: f32,
        width: f32,
        color: String,
    },
    Text {
        x: f32,
        y: f32,
        text: String,
        style: TextStyle,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextObject {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub color: String,
    pub font_size: f32,
    pub visible: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    texts: Vec<TextObject>,
    sprites: HashMap<Sprite, Rect>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primitives drawn since the last `clear`
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Every text object ever created, visible or not
    pub fn texts(&self) -> &[TextObject] {
        &self.texts
    }

    pub fn text(&self, handle: TextHandle) -> Option<&TextObject> {
        self.texts.get(handle.0)
    }

    pub fn visible_texts(&self) -> impl Iterator<Item = &TextObject> {
        self.texts.iter().filter(|t| t.visible)
    }

    pub fn sprite(&self, sprite: Sprite) -> Option<Rect> {
        self.sprites.get(&sprite).copied()
    }

    pub fn filled_rects(&self) -> impl Iterator<Item = (&Rect, &str)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::FillRoundedRect { rect, color, .. } => Some((rect, color.as_str())),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Line { line, .. } => Some(line),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.commands.clear();
    }

    fn stroke_line(&mut self, line: Line, width: f32, color: &str) {
        self.commands.push(DrawCommand::Line {
            line,
            width,
            color: color.to_string(),
        });
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: &str) {
        self.commands.push(DrawCommand::FillRoundedRect {
            rect,
            radius,
            color: color.to_string(),
        });
    }

    fn stroke_rounded_rect(&mut self, rect: Rect, radius: f32, width: f32, color: &str) {
        self.commands.push(DrawCommand::StrokeRoundedRect {
            rect,
            radius,
            width,
            color: color.to_string(),
        });
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            x,
            y,
            text: text.to_string(),
            style: style.clone(),
        });
    }

    fn create_text(&mut self, style: &TextStyle) -> TextHandle {
        self.texts.push(TextObject {
            text: String::new(),
            x: 0.0,
            y: 0.0,
            color: style.color.clone(),
            font_size: style.font_size,
            visible: false,
        });
        TextHandle(self.texts.len() - 1)
    }

    fn update_text(&mut self, handle: TextHandle, text: &str, x: f32, y: f32, color: &str) {
        if let Some(object) = self.texts.get_mut(handle.0) {
            object.text.clear();
            object.text.push_str(text);
            object.x = x;
            object.y = y;
            object.color.clear();
            object.color.push_str(color);
        }
    }

    fn set_text_visible(&mut self, handle: TextHandle, visible: bool) {
        if let Some(object) = self.texts.get_mut(handle.0) {
            object.visible = visible;
        }
    }

    fn place_sprite(&mut self, sprite: Sprite, rect: Rect) {
        self.sprites.insert(sprite, rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_keeps_text_objects() {
        let mut surface = RecordingSurface::new();
        let style = TextStyle {
            font_size: 12.0,
            color: "#ffffff".to_string(),
        };
        let handle = surface.create_text(&style);
        surface.update_text(handle, "C", 5.0, 6.0, "#000000");
        surface.set_text_visible(handle, true);
        surface.stroke_line(Line::vertical(1.0, 0.0, 10.0), 2.0, "#3b3b3b");
        surface.draw_text(0.0, 0.0, "info", &style);

        surface.clear();
        assert!(surface.commands().is_empty());
        let text = surface.text(handle).unwrap();
        assert_eq!(text.text, "C");
        assert_eq!(text.color, "#000000");
        assert!(text.visible);
    }

    #[test]
    fn test_default_text_width() {
        let surface = RecordingSurface::new();
        let style = TextStyle {
            font_size: 10.0,
            color: "#000000".to_string(),
        };
        assert!((surface.text_width("E♭", &style) - 12.0).abs() < 1e-4);
    }
}
