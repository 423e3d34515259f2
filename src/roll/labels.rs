//! Reusable note labels
//!
//! One flat pool of text objects shared by all tracks. Each frame every entry
//! is hidden and the first K are reassigned to the K visible notes, so the pool
//! only ever grows to the largest number of notes seen on screen at once.

use crate::surface::{Surface, TextHandle, TextStyle};

#[derive(Debug, Clone)]
pub struct LabelPool {
    handles: Vec<TextHandle>,
    style: TextStyle,
    active: usize,
}

impl LabelPool {
    pub fn new(style: TextStyle) -> Self {
        Self {
            handles: Vec::new(),
            style,
            active: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Labels assigned since the last `begin_frame`
    pub fn active(&self) -> usize {
        self.active
    }

    /// Hide every label ahead of reassignment.
    pub fn begin_frame(&mut self, surface: &mut dyn Surface) {
        for handle in &self.handles {
            surface.set_text_visible(*handle, false);
        }
        self.active = 0;
    }

    /// Show the next label with `text` at (`x`, `y`), allocating only when the
    /// pool is exhausted.
    pub fn assign(&mut self, surface: &mut dyn Surface, text: &str, x: f32, y: f32, color: &str) {
        if self.active == self.handles.len() {
            self.handles.push(surface.create_text(&self.style));
            log::debug!("Label pool grew to {}", self.handles.len());
        }
        let handle = self.handles[self.active];
        surface.update_text(handle, text, x, y, color);
        surface.set_text_visible(handle, true);
        self.active += 1;
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    fn pool() -> LabelPool {
        LabelPool::new(TextStyle {
            font_size: 12.0,
            color: "#ffffff".to_string(),
        })
    }

    #[test]
    fn test_pool_grows_to_peak_only() {
        let mut surface = RecordingSurface::new();
        let mut labels = pool();

        for count in [3, 5, 2, 4, 5, 1] {
            labels.begin_frame(&mut surface);
            for i in 0..count {
                labels.assign(&mut surface, "C", i as f32, 0.0, "#000000");
            }
            assert_eq!(labels.active(), count);
            assert!(labels.len() <= 5);
            assert_eq!(surface.visible_texts().count(), count);
        }
        assert_eq!(labels.len(), 5);
        assert_eq!(surface.texts().len(), 5);
    }

    #[test]
    fn test_empty_frame_hides_all() {
        let mut surface = RecordingSurface::new();
        let mut labels = pool();
        labels.begin_frame(&mut surface);
        labels.assign(&mut surface, "D", 0.0, 0.0, "#000000");
        labels.begin_frame(&mut surface);
        assert_eq!(surface.visible_texts().count(), 0);
        assert_eq!(labels.len(), 1);
    }
}
