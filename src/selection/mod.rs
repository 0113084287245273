//! Selection and clipboard engine
//!
//! Holds the current selection and clipboard and applies batch edits to a
//! document passed in by the caller. Every mutating operation validates the
//! whole batch first; a rejected batch leaves the document untouched.

pub mod clipboard;
pub mod errors;

pub use clipboard::{Clipboard, ClipboardEntry};
pub use errors::{EditError, EditOutcome, EditResult};

use std::collections::BTreeSet;

use crate::coords::CoordinateMapper;
use crate::models::{Anchor, Document, ElementId, Event, EventKind, Hand};

/// Slack allowed on the score bounds, in ticks
pub const TIME_EPSILON: f64 = 1e-6;

/// One selected element
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionEntry {
    pub id: ElementId,
    pub kind: EventKind,
    pub stave: usize,
}

/// Axis-aligned rectangle in editor pixels, normalized so min <= max
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            min_x: x1.min(x2),
            min_y: y1.min(y2),
            max_x: x1.max(x2),
            max_y: y1.max(y2),
        }
    }

    /// Edges count as inside
    pub fn contains(&self, anchor: Anchor) -> bool {
        match anchor {
            Anchor::Point { x, y } => {
                (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
            }
            Anchor::Row { y } => (self.min_y..=self.max_y).contains(&y),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SelectionEngine {
    selection: Vec<SelectionEntry>,
    clipboard: Clipboard,
    time_epsilon: f64,
}

impl Default for SelectionEngine {
    fn default() -> Self {
        Self::new(TIME_EPSILON)
    }
}

impl SelectionEngine {
    pub fn new(time_epsilon: f64) -> Self {
        Self { selection: Vec::new(), clipboard: Clipboard::new(), time_epsilon }
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.selection
    }

    pub fn ids(&self) -> Vec<ElementId> {
        self.selection.iter().map(|e| e.id).collect()
    }

    pub fn len(&self) -> usize {
        self.selection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.selection.iter().any(|e| e.id == id)
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn clear(&mut self) {
        self.selection.clear();
    }

    /// Add one element to the selection; false if unknown or already selected
    pub fn select(&mut self, document: &Document, id: ElementId) -> bool {
        if self.contains(id) {
            return false;
        }
        match document.locate(id) {
            Some((stave, index)) => {
                let kind = document.stave(stave).events()[index].kind();
                self.selection.push(SelectionEntry { id, kind, stave });
                true
            }
            None => false,
        }
    }

    /// Replace the selection with every element of the rendered stave whose
    /// anchor lies inside the rectangle. Returns the number selected.
    pub fn select_in_rectangle(
        &mut self,
        document: &Document,
        mapper: &dyn CoordinateMapper,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    ) -> usize {
        let rect = Rect::from_corners(x1, y1, x2, y2);
        let stave = document.rendered_stave();

        self.selection = document
            .stave(stave)
            .events()
            .iter()
            .filter(|event| rect.contains(event.anchor(mapper)))
            .map(|event| SelectionEntry { id: event.id(), kind: event.kind(), stave })
            .collect();

        log::debug!("rectangle {:?} selected {} elements on stave {}", rect, self.selection.len(), stave);
        self.selection.len()
    }

    /// Selected events that still exist in the document
    fn live_events<'a>(&'a self, document: &'a Document) -> impl Iterator<Item = &'a Event> + 'a {
        self.selection.iter().filter_map(move |entry| document.event(entry.id))
    }

    fn check_window(&self, start: f64, end: f64, total: f64) -> Result<(), EditError> {
        if start < -self.time_epsilon || end > total + self.time_epsilon {
            log::warn!("rejected edit: window {}..{} outside 0..{}", start, end, total);
            return Err(EditError::OutOfBounds { start, end, total });
        }
        Ok(())
    }

    /// Remove every selected element. The selection is cleared only when
    /// something was actually removed.
    pub fn delete_selected(&mut self, document: &mut Document) -> EditOutcome {
        let removed = self.selection.iter().filter(|entry| document.delete_by_id(entry.id)).count();
        if removed > 0 {
            self.selection.clear();
            log::info!("deleted {} elements", removed);
        }
        EditOutcome::from_count(removed)
    }

    /// Shift every selected element by `delta` ticks
    pub fn move_selected_in_time(&mut self, document: &mut Document, delta: f64) -> EditResult {
        let (start, end) = match self
            .live_events(document)
            .map(Event::time_span)
            .reduce(|(s0, e0), (s1, e1)| (s0.min(s1), e0.max(e1)))
        {
            Some(window) => window,
            None => return Ok(EditOutcome::NothingToDo),
        };

        self.check_window(start + delta, end + delta, document.total_length_ticks())?;

        let mut touched = BTreeSet::new();
        let mut moved = 0;
        for entry in &self.selection {
            let Some((stave, _)) = document.locate(entry.id) else {
                continue;
            };
            if let Some(event) = document.event_in_stave_mut(stave, entry.id) {
                event.shift_time(delta);
                touched.insert(stave);
                moved += 1;
            }
        }
        for stave in touched {
            document.sort_notes(stave);
        }

        log::info!("moved {} elements by {} ticks", moved, delta);
        Ok(EditOutcome::from_count(moved))
    }

    /// Transpose every selected pitch-bearing element by `delta` semitones
    pub fn transpose_selected(&mut self, document: &mut Document, delta: i32) -> EditResult {
        let mut pitched = 0;
        for event in self.live_events(document) {
            if event.pitches().is_empty() {
                continue;
            }
            if !event.can_transpose(delta) {
                let pitch = event
                    .pitches()
                    .into_iter()
                    .map(|p| p + delta)
                    .find(|p| !(crate::models::MIN_PITCH..=crate::models::MAX_PITCH).contains(p))
                    .unwrap_or(delta);
                log::warn!("rejected transpose by {}: element {} would reach pitch {}", delta, event.id(), pitch);
                return Err(EditError::PitchOutOfRange { id: event.id(), pitch });
            }
            pitched += 1;
        }
        if pitched == 0 {
            return Ok(EditOutcome::NothingToDo);
        }

        for entry in &self.selection {
            if let Some(event) = document.event_in_stave_mut(entry.stave, entry.id) {
                event.transpose(delta);
            }
        }

        log::info!("transposed {} elements by {}", pitched, delta);
        Ok(EditOutcome::Applied { count: pitched })
    }

    /// Set the hand of every selected note and beam
    pub fn assign_hand(&mut self, document: &mut Document, hand: Hand) -> EditOutcome {
        let mut count = 0;
        for entry in &self.selection {
            if let Some(event) = document.event_in_stave_mut(entry.stave, entry.id) {
                if event.set_hand(hand) {
                    count += 1;
                }
            }
        }
        if count > 0 {
            log::info!("assigned {} elements to the {:?} hand", count, hand);
        }
        EditOutcome::from_count(count)
    }

    /// Snapshot the selected elements into the clipboard.
    /// An empty selection leaves the clipboard as it was.
    pub fn copy(&mut self, document: &Document) -> EditOutcome {
        if self.selection.is_empty() {
            return EditOutcome::NothingToDo;
        }
        let count = self.clipboard.capture(document, &self.selection);
        log::debug!("copied {} elements", count);
        EditOutcome::from_count(count)
    }

    pub fn cut(&mut self, document: &mut Document) -> EditOutcome {
        match self.copy(document) {
            EditOutcome::NothingToDo => EditOutcome::NothingToDo,
            EditOutcome::Applied { .. } => self.delete_selected(document),
        }
    }

    /// Re-create the clipboard contents so the earliest snapshot lands on
    /// `cursor_time`. The new elements become the selection.
    pub fn paste(&mut self, document: &mut Document, cursor_time: f64) -> EditResult {
        let earliest = match self.clipboard.earliest_time() {
            Some(time) => time,
            None => return Ok(EditOutcome::NothingToDo),
        };
        let offset = cursor_time - earliest;

        let live: Vec<&ClipboardEntry> = self
            .clipboard
            .entries()
            .iter()
            .filter(|entry| {
                let exists = document.has_stave(entry.stave);
                if !exists {
                    log::warn!("skipping pasted {:?}: stave {} no longer exists", entry.event.kind(), entry.stave);
                }
                exists
            })
            .collect();

        let (start, end) = match live
            .iter()
            .map(|entry| entry.event.time_span())
            .reduce(|(s0, e0), (s1, e1)| (s0.min(s1), e0.max(e1)))
        {
            Some(window) => window,
            None => return Ok(EditOutcome::NothingToDo),
        };
        self.check_window(start + offset, end + offset, document.total_length_ticks())?;

        let mut pasted = Vec::with_capacity(live.len());
        for entry in live {
            let mut event = entry.event.clone();
            event.shift_time(offset);
            let kind = event.kind();
            let id = document.insert_event(entry.stave, event);
            pasted.push(SelectionEntry { id, kind, stave: entry.stave });
        }

        log::info!("pasted {} elements at {}", pasted.len(), cursor_time);
        self.selection = pasted;
        Ok(EditOutcome::Applied { count: self.selection.len() })
    }
}
