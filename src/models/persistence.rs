//! JSON save/load for documents

use std::fs;
use std::path::Path;

use thiserror::Error;

use super::core::Document;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("file i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid score json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FileError>;

impl Document {
    /// Serialize to pretty-printed JSON. Inherit sentinels are written as `null`.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document, re-assert its invariants and renumber ids from 1
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut document: Document = serde_json::from_str(json)?;
        document.repair();
        document.renumber_ids();
        log::info!(
            "loaded score with {} staves and {} elements",
            document.stave_count(),
            document.element_count()
        );
        Ok(document)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json_string()?)?;
        log::info!("saved score to {}", path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::events::{EventKind, Note};
    use crate::models::inherit::Inherit;

    #[test]
    fn test_top_level_keys() {
        let json: serde_json::Value = serde_json::from_str(&Document::new().to_json_string().unwrap()).unwrap();
        for key in ["metaInfo", "header", "properties", "fileSettings", "baseGrid", "lineBreak", "stave"] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(json["lineBreak"][0]["type"], "locked");
        assert_eq!(json["fileSettings"]["quarterNoteUnit"], 256.0);
        assert_eq!(json["baseGrid"][0]["measureAmount"], 8);
    }

    #[test]
    fn test_empty_object_loads_with_defaults() {
        let doc = Document::from_json_str("{}").unwrap();
        assert_eq!(doc.stave_count(), 1);
        assert_eq!(doc.time_signatures().len(), 1);
        assert_eq!(doc.line_breaks().len(), 1);
        assert_eq!(doc.line_breaks()[0].id, 1);
    }

    #[test]
    fn test_empty_lists_are_repaired() {
        let doc = Document::from_json_str(r#"{"stave": [], "baseGrid": [], "lineBreak": []}"#).unwrap();
        assert_eq!(doc.stave_count(), 1);
        assert_eq!(doc.total_length_ticks(), 8192.0);
        assert!(doc.line_breaks()[0].is_locked());
    }

    #[test]
    fn test_zero_meter_blocks_are_dropped() {
        let json = r#"{"baseGrid": [
            {"numerator": 4, "denominator": 0, "measureAmount": 8},
            {"numerator": 3, "denominator": 4, "measureAmount": 2}
        ]}"#;
        let doc = Document::from_json_str(json).unwrap();
        assert_eq!(doc.time_signatures().len(), 1);
        assert_eq!(doc.total_length_ticks(), 1536.0);

        let doc = Document::from_json_str(r#"{"baseGrid": [{"numerator": 0, "denominator": 0}]}"#).unwrap();
        assert_eq!(doc.time_signatures()[0], crate::models::TimeSignature::default());
        assert!(doc.total_length_ticks().is_finite());
    }

    #[test]
    fn test_bad_zoom_and_unit_are_reset() {
        let doc = Document::from_json_str(r#"{"fileSettings": {"zoomPixelsQuarter": 0, "quarterNoteUnit": -1}}"#)
            .unwrap();
        assert_eq!(doc.file_settings.zoom_pixels_quarter, 100.0);
        assert_eq!(doc.file_settings.quarter_note_unit, 256.0);

        let doc = Document::from_json_str(r#"{"fileSettings": {"zoomPixelsQuarter": -40.5}}"#).unwrap();
        assert_eq!(doc.file_settings.zoom_pixels_quarter, 100.0);
    }

    #[test]
    fn test_duplicate_locked_breaks_collapse() {
        let json = r#"{"lineBreak": [
            {"id": 7, "time": 0, "type": "locked"},
            {"id": 8, "time": 300, "type": "locked"},
            {"id": 9, "time": 1024, "type": "manual"}
        ]}"#;
        let doc = Document::from_json_str(json).unwrap();
        let kinds: Vec<bool> = doc.line_breaks().iter().map(|lb| lb.is_locked()).collect();
        assert_eq!(kinds, vec![true, false]);
        assert_eq!(doc.line_breaks()[0].time, 0.0);
    }

    #[test]
    fn test_load_sorts_notes_and_renumbers() {
        let json = r#"{"stave": [{"name": "S", "scale": 1.0, "event": {
            "note": [{"id": 50, "time": 512}, {"id": 50, "time": 0}],
            "tempo": [{"id": 3, "time": 0, "bpm": 90}]
        }}]}"#;
        let doc = Document::from_json_str(json).unwrap();
        let notes: Vec<(u64, f64)> = doc.stave(0).notes().map(|n| (n.id, n.time)).collect();
        assert_eq!(notes, vec![(2, 0.0), (3, 512.0)]);
        assert_eq!(doc.stave(0).events_of(EventKind::Tempo).next().unwrap().id(), 4);
    }

    #[test]
    fn test_literal_null_stays_sentinel() {
        let mut doc = Document::new();
        doc.new_note(0, Note { color: Inherit::Explicit("#123456".into()), ..Note::default() });
        doc.new_note(0, Note { time: 256.0, ..Note::default() });
        let back = Document::from_json_str(&doc.to_json_string().unwrap()).unwrap();
        let colors: Vec<Inherit<String>> = back.stave(0).notes().map(|n| n.color.clone()).collect();
        assert_eq!(colors, vec![Inherit::Explicit("#123456".to_string()), Inherit::Inherit]);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(Document::from_json_str("{ nope"), Err(FileError::Json(_))));
        assert!(matches!(Document::load("/nonexistent/score.pianotab"), Err(FileError::Io(_))));
    }
}
