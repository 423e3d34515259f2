//! SVG snapshot of a recorded frame
//!
//! Paint order: background, immediate primitives (grid, notes, info text), the
//! keyboard sprite, then every visible retained text object (key and note
//! labels) on top. The keyboard sprite is drawn procedurally from the key
//! table into the rectangle it was placed at.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::KeybardError;
use crate::pitch;
use crate::surface::{DrawCommand, RecordingSurface, Rect, Sprite};

const BACKGROUND: &str = "#000000";
const WHITE_KEY: &str = "#ffffff";
const BLACK_KEY: &str = "#111111";
const KEY_OUTLINE: &str = "#000000";
/// Black key height relative to the keyboard
const BLACK_KEY_DEPTH: f32 = 0.6;

type XmlWriter = Writer<Vec<u8>>;

fn render_error<E: std::fmt::Display>(e: E) -> KeybardError {
    KeybardError::RenderError(e.to_string())
}

fn empty(writer: &mut XmlWriter, name: &str, attrs: &[(&str, String)]) -> Result<(), KeybardError> {
    let mut element = BytesStart::new(name);
    for (key, value) in attrs {
        element.push_attribute((*key, value.as_str()));
    }
    writer.write_event(Event::Empty(element)).map_err(render_error)
}

fn text(
    writer: &mut XmlWriter,
    x: f32,
    y: f32,
    size: f32,
    color: &str,
    content: &str,
) -> Result<(), KeybardError> {
    let mut element = BytesStart::new("text");
    // Surface text positions are top-left; SVG anchors on the baseline
    let baseline = y + size;
    element.push_attribute(("x", x.to_string().as_str()));
    element.push_attribute(("y", baseline.to_string().as_str()));
    element.push_attribute(("font-size", size.to_string().as_str()));
    element.push_attribute(("font-family", "sans-serif"));
    element.push_attribute(("fill", color));
    writer.write_event(Event::Start(element)).map_err(render_error)?;
    writer
        .write_event(Event::Text(BytesText::new(content)))
        .map_err(render_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("text")))
        .map_err(render_error)
}

fn rect_attrs(rect: &Rect, radius: f32) -> Vec<(&'static str, String)> {
    vec![
        ("x", rect.x.to_string()),
        ("y", rect.y.to_string()),
        ("width", rect.width.to_string()),
        ("height", rect.height.to_string()),
        ("rx", radius.to_string()),
    ]
}

fn command(writer: &mut XmlWriter, command: &DrawCommand) -> Result<(), KeybardError> {
    match command {
        DrawCommand::Line { line, width, color } => empty(
            writer,
            "line",
            &[
                ("x1", line.x1.to_string()),
                ("y1", line.y1.to_string()),
                ("x2", line.x2.to_string()),
                ("y2", line.y2.to_string()),
                ("stroke", color.clone()),
                ("stroke-width", width.to_string()),
            ],
        ),
        DrawCommand::FillRoundedRect {
            rect,
            radius,
            color,
        } => {
            let mut attrs = rect_attrs(rect, *radius);
            attrs.push(("fill", color.clone()));
            empty(writer, "rect", &attrs)
        }
        DrawCommand::StrokeRoundedRect {
            rect,
            radius,
            width,
            color,
        } => {
            let mut attrs = rect_attrs(rect, *radius);
            attrs.push(("fill", "none".to_string()));
            attrs.push(("stroke", color.clone()));
            attrs.push(("stroke-width", width.to_string()));
            empty(writer, "rect", &attrs)
        }
        DrawCommand::Text { x, y, text: content, style } => {
            text(writer, *x, *y, style.font_size, &style.color, content)
        }
    }
}

fn keyboard(writer: &mut XmlWriter, area: Rect) -> Result<(), KeybardError> {
    let white_keys = pitch::white_key_count();
    let key_width = area.width / white_keys as f32;

    for slot in 0..white_keys {
        let key = Rect::new(area.x + slot as f32 * key_width, area.y, key_width, area.height);
        let mut attrs = rect_attrs(&key, 0.0);
        attrs.push(("fill", WHITE_KEY.to_string()));
        attrs.push(("stroke", KEY_OUTLINE.to_string()));
        attrs.push(("stroke-width", "1".to_string()));
        empty(writer, "rect", &attrs)?;
    }

    let black_width = key_width / 2.0;
    for key in pitch::key_table().iter().filter(|k| !k.is_white()) {
        let column = pitch::white_key_position(key.natural, key.octave) as f32;
        let mut center = column * key_width + key_width / 2.0;
        if key.sharp {
            center += key_width / 2.0;
        } else {
            center -= key_width / 2.0;
        }
        let rect = Rect::new(
            area.x + center - black_width / 2.0,
            area.y,
            black_width,
            area.height * BLACK_KEY_DEPTH,
        );
        let mut attrs = rect_attrs(&rect, 0.0);
        attrs.push(("fill", BLACK_KEY.to_string()));
        empty(writer, "rect", &attrs)?;
    }
    Ok(())
}

/// Serialise the current contents of `surface` as a `width`×`height` SVG document.
pub fn to_svg(surface: &RecordingSurface, width: f32, height: f32) -> Result<String, KeybardError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(render_error)?;

    let mut root = BytesStart::new("svg");
    root.push_attribute(("xmlns", "http://www.w3.org/2000/svg"));
    root.push_attribute(("width", width.to_string().as_str()));
    root.push_attribute(("height", height.to_string().as_str()));
    root.push_attribute(("viewBox", format!("0 0 {} {}", width, height).as_str()));
    writer.write_event(Event::Start(root)).map_err(render_error)?;

    empty(
        &mut writer,
        "rect",
        &[
            ("width", width.to_string()),
            ("height", height.to_string()),
            ("fill", BACKGROUND.to_string()),
        ],
    )?;

    for cmd in surface.commands() {
        command(&mut writer, cmd)?;
    }

    if let Some(area) = surface.sprite(Sprite::Keyboard) {
        keyboard(&mut writer, area)?;
    }

    for label in surface.visible_texts() {
        text(&mut writer, label.x, label.y, label.font_size, &label.color, &label.text)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("svg")))
        .map_err(render_error)?;

    String::from_utf8(writer.into_inner()).map_err(render_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Line, Surface, TextStyle};

    #[test]
    fn test_empty_surface() {
        let surface = RecordingSurface::new();
        let svg = to_svg(&surface, 200.0, 100.0).unwrap();
        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(svg.contains("viewBox=\"0 0 200 100\""));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<rect").count(), 1);
    }

    #[test]
    fn test_primitives_and_labels() {
        let mut surface = RecordingSurface::new();
        let style = TextStyle {
            font_size: 12.0,
            color: "#FFFFFF".to_string(),
        };
        surface.stroke_line(Line::vertical(40.0, 0.0, 600.0), 2.0, "#3b3b3b");
        surface.fill_rounded_rect(Rect::new(10.0, 20.0, 30.0, 40.0), 8.0, "#df2020");
        let hidden = surface.create_text(&style);
        surface.update_text(hidden, "hidden", 0.0, 0.0, "#FFFFFF");
        let shown = surface.create_text(&style);
        surface.update_text(shown, "E♭", 5.0, 6.0, "#20df20");
        surface.set_text_visible(shown, true);

        let svg = to_svg(&surface, 880.0, 600.0).unwrap();
        assert!(svg.contains("stroke=\"#3b3b3b\""));
        assert!(svg.contains("rx=\"8\""));
        assert!(svg.contains("fill=\"#df2020\""));
        assert!(svg.contains(">E♭</text>"));
        assert!(!svg.contains("hidden"));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut surface = RecordingSurface::new();
        let style = TextStyle {
            font_size: 10.0,
            color: "#000000".to_string(),
        };
        surface.draw_text(0.0, 0.0, "a<b", &style);
        let svg = to_svg(&surface, 10.0, 10.0).unwrap();
        assert!(svg.contains("a&lt;b"));
    }

    #[test]
    fn test_keyboard_sprite() {
        let mut surface = RecordingSurface::new();
        surface.place_sprite(Sprite::Keyboard, Rect::new(0.0, 500.0, 880.0, 100.0));
        let svg = to_svg(&surface, 880.0, 600.0).unwrap();
        // background + 22 white keys + 15 black keys
        assert_eq!(svg.matches("<rect").count(), 1 + 22 + 15);
        assert_eq!(svg.matches(BLACK_KEY).count(), 15);
    }
}
