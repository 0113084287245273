//! Clipboard snapshots
//!
//! A copy stores owned event values, never ids into the live document, so
//! later edits to the originals do not leak into a paste.

use crate::models::{Document, Event};

use super::SelectionEntry;

#[derive(Clone, Debug, PartialEq)]
pub struct ClipboardEntry {
    /// Stave the event was copied from
    pub stave: usize,
    pub event: Event,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Clipboard {
    entries: Vec<ClipboardEntry>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with snapshots of the selected elements.
    /// Entries whose element has disappeared are skipped. When nothing is
    /// left to snapshot the old contents stay. Returns the number captured.
    pub fn capture(&mut self, document: &Document, selection: &[SelectionEntry]) -> usize {
        let entries: Vec<ClipboardEntry> = selection
            .iter()
            .filter_map(|entry| {
                document.event(entry.id).map(|event| ClipboardEntry {
                    stave: entry.stave,
                    event: event.clone(),
                })
            })
            .collect();
        let count = entries.len();
        if count > 0 {
            self.entries = entries;
        }
        count
    }

    pub fn entries(&self) -> &[ClipboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Earliest start time over all snapshots
    pub fn earliest_time(&self) -> Option<f64> {
        self.entries.iter().map(|e| e.event.time()).reduce(f64::min)
    }
}
