//! Pixel <-> document coordinate mapping
//!
//! The layout engine owns the real mapping; the editing core only needs the
//! four conversions below. x runs along the keyboard, y along time.

use crate::models::core::Document;

/// Converts between editor pixels and (pitch, time)
pub trait CoordinateMapper {
    fn pitch_to_x(&self, pitch: i32) -> f64;
    fn time_to_y(&self, time: f64) -> f64;
    /// Nearest key for an x position; may lie off the keyboard
    fn x_to_pitch(&self, x: f64) -> i32;
    fn y_to_time(&self, y: f64) -> f64;
}

/// A plain piano-roll layout: equal key widths, time flowing downwards
#[derive(Clone, Debug, PartialEq)]
pub struct PianoRollMapper {
    /// x of key 1
    pub origin_x: f64,
    /// y of tick 0
    pub origin_y: f64,
    pub key_width: f64,
    pub pixels_per_tick: f64,
}

impl PianoRollMapper {
    pub fn new(origin_x: f64, origin_y: f64, key_width: f64, pixels_per_tick: f64) -> Self {
        assert!(key_width > 0.0, "key width must be positive");
        assert!(pixels_per_tick > 0.0, "pixels per tick must be positive");
        Self { origin_x, origin_y, key_width, pixels_per_tick }
    }

    /// Mapper using the document's zoom setting
    pub fn for_document(document: &Document, key_width: f64) -> Self {
        let settings = &document.file_settings;
        Self::new(0.0, 0.0, key_width, settings.zoom_pixels_quarter / settings.quarter_note_unit)
    }
}

impl CoordinateMapper for PianoRollMapper {
    fn pitch_to_x(&self, pitch: i32) -> f64 {
        self.origin_x + f64::from(pitch - 1) * self.key_width
    }

    fn time_to_y(&self, time: f64) -> f64 {
        self.origin_y + time * self.pixels_per_tick
    }

    fn x_to_pitch(&self, x: f64) -> i32 {
        ((x - self.origin_x) / self.key_width).round() as i32 + 1
    }

    fn y_to_time(&self, y: f64) -> f64 {
        (y - self.origin_y) / self.pixels_per_tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_mappings() {
        let mapper = PianoRollMapper::new(20.0, 50.0, 10.0, 0.5);
        assert_eq!(mapper.pitch_to_x(40), 410.0);
        assert_eq!(mapper.x_to_pitch(410.0), 40);
        assert_eq!(mapper.x_to_pitch(414.0), 40);
        assert_eq!(mapper.time_to_y(256.0), 178.0);
        assert_eq!(mapper.y_to_time(178.0), 256.0);
    }

    #[test]
    fn test_document_zoom() {
        let doc = Document::new();
        let mapper = PianoRollMapper::for_document(&doc, 8.0);
        // 100 px per quarter note of 256 ticks
        assert_eq!(mapper.time_to_y(512.0), 200.0);
    }
}
