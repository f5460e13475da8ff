//! Text overlay that writes to the log

use presentation_engine::presentation::TextOverlay;
use std::collections::BTreeMap;

/// Keeps status text by position and logs every change
pub struct ConsoleOverlay {
    width: u32,
    height: u32,
    texts: BTreeMap<(u32, u32), String>,
}

impl ConsoleOverlay {
    /// Create an overlay for a virtual viewport
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            texts: BTreeMap::new(),
        }
    }

    /// Text currently shown, top to bottom
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.texts.values().map(String::as_str)
    }
}

impl TextOverlay for ConsoleOverlay {
    fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_text(&mut self, x: u32, y: u32, text: &str) {
        let changed = self.texts.get(&(x, y)).map_or(true, |old| old != text);
        if changed {
            log::info!("[{x},{y}] {text}");
        }
        self.texts.insert((x, y), text.to_string());
    }

    fn remove_text(&mut self, x: u32, y: u32) {
        self.texts.remove(&(x, y));
    }
}
