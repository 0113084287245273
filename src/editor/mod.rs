//! Editor controller
//!
//! Owns one document together with its selection, the gesture recognizer and
//! the coordinate mapper, and routes host pointer and key input to them.

pub mod keymap;

pub use keymap::{KeyCommand, Keymap};

use crate::config::EditorConfig;
use crate::coords::{CoordinateMapper, PianoRollMapper};
use crate::gesture::{Gesture, GestureRecognizer, MouseButton, Point};
use crate::models::{Document, ElementId, Hand, Note, MAX_PITCH, MIN_PITCH};
use crate::selection::{EditOutcome, EditResult, Rect, SelectionEngine};

/// Default key width for [`Editor::with_document`], in pixels
const DEFAULT_KEY_WIDTH: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tool {
    /// Rectangle selection; a click clears the selection
    #[default]
    Select,
    /// Press places a note, dragging sizes it
    Note,
}

/// A note placed by the note tool whose gesture is still running
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingNote {
    pub id: ElementId,
    pub start: f64,
}

pub struct Editor {
    document: Document,
    selection: SelectionEngine,
    gestures: GestureRecognizer,
    mapper: Box<dyn CoordinateMapper>,
    config: EditorConfig,
    tool: Tool,
    pointer: Point,
    pending_note: Option<PendingNote>,
    rubber_band: Option<Rect>,
}

impl Editor {
    pub fn new(document: Document, mapper: Box<dyn CoordinateMapper>, config: EditorConfig) -> Self {
        Self {
            selection: SelectionEngine::new(config.time_epsilon),
            gestures: GestureRecognizer::new(config.gesture_config()),
            document,
            mapper,
            config,
            tool: Tool::Select,
            pointer: Point::default(),
            pending_note: None,
            rubber_band: None,
        }
    }

    /// Editor over `document` with a piano-roll mapper and default config
    pub fn with_document(document: Document) -> Self {
        let mapper = PianoRollMapper::for_document(&document, DEFAULT_KEY_WIDTH);
        Self::new(document, Box::new(mapper), EditorConfig::default())
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Hand the document back, e.g. to save it
    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn selection(&self) -> &SelectionEngine {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionEngine {
        &mut self.selection
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn mapper(&self) -> &dyn CoordinateMapper {
        self.mapper.as_ref()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Rectangle being dragged, for display
    pub fn rubber_band(&self) -> Option<Rect> {
        self.rubber_band
    }

    pub fn pending_note(&self) -> Option<PendingNote> {
        self.pending_note
    }

    pub fn pointer(&self) -> Point {
        self.pointer
    }

    /// Switch tools. Any gesture in progress is abandoned.
    pub fn set_tool(&mut self, tool: Tool) {
        if tool == self.tool {
            return;
        }
        self.cancel_gesture();
        self.tool = tool;
        let rectangle_button = match tool {
            Tool::Select => self.config.rectangle_button,
            Tool::Note => None,
        };
        self.gestures.set_rectangle_button(rectangle_button);
        log::debug!("tool switched to {:?}", tool);
    }

    /// Snap step in ticks
    pub fn grid_step(&self) -> f64 {
        self.config.grid_step_ticks.unwrap_or_else(|| self.document.ticks_per_quarter())
    }

    /// Snap down to the grid and clamp into the score
    pub fn snap_time(&self, time: f64) -> f64 {
        let step = self.grid_step();
        ((time / step).floor() * step).clamp(0.0, self.document.total_length_ticks())
    }

    /// Where a paste would land: the pointer's time, snapped
    pub fn paste_time(&self) -> f64 {
        self.snap_time(self.mapper.y_to_time(self.pointer.y))
    }

    pub fn set_shift(&mut self, shift: bool) {
        self.gestures.set_shift(shift);
    }

    pub fn pointer_press(&mut self, button: MouseButton, x: f64, y: f64, timestamp_ms: u64) -> Vec<Gesture> {
        self.pointer = Point::new(x, y);
        let gestures = self.gestures.press(button, x, y, timestamp_ms);
        self.dispatch(&gestures);
        gestures
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Vec<Gesture> {
        self.pointer = Point::new(x, y);
        let gestures = self.gestures.motion(x, y);
        self.dispatch(&gestures);
        gestures
    }

    pub fn pointer_release(&mut self, button: MouseButton, x: f64, y: f64) -> Vec<Gesture> {
        self.pointer = Point::new(x, y);
        let gestures = self.gestures.release(button, x, y);
        self.dispatch(&gestures);
        gestures
    }

    /// Abandon the running gesture; an uncommitted note is removed
    pub fn cancel_gesture(&mut self) -> Vec<Gesture> {
        let gestures = self.gestures.cancel();
        self.dispatch(&gestures);
        // A pending note without a recognizer gesture still has to go
        self.discard_pending_note();
        self.rubber_band = None;
        gestures
    }

    /// Run the command bound to `key`; `None` when the key is unbound
    pub fn key_press(&mut self, key: &str) -> Option<EditResult> {
        let command = self.config.keymap.lookup(key)?;
        log::debug!("key {} -> {:?}", key, command);
        Some(self.execute(command))
    }

    pub fn execute(&mut self, command: KeyCommand) -> EditResult {
        let step = self.grid_step();
        let paste_time = self.paste_time();
        let doc = &mut self.document;
        match command {
            KeyCommand::DeleteSelection => Ok(self.selection.delete_selected(doc)),
            KeyCommand::Copy => Ok(self.selection.copy(doc)),
            KeyCommand::Cut => Ok(self.selection.cut(doc)),
            KeyCommand::Paste => self.selection.paste(doc, paste_time),
            KeyCommand::ClearSelection => {
                let count = self.selection.len();
                self.selection.clear();
                Ok(EditOutcome::from_count(count))
            }
            KeyCommand::MoveEarlier => self.selection.move_selected_in_time(doc, -step),
            KeyCommand::MoveLater => self.selection.move_selected_in_time(doc, step),
            KeyCommand::TransposeDown => self.selection.transpose_selected(doc, -1),
            KeyCommand::TransposeUp => self.selection.transpose_selected(doc, 1),
            KeyCommand::AssignLeftHand => Ok(self.selection.assign_hand(doc, Hand::Left)),
            KeyCommand::AssignRightHand => Ok(self.selection.assign_hand(doc, Hand::Right)),
        }
    }

    fn dispatch(&mut self, gestures: &[Gesture]) {
        for gesture in gestures {
            match self.tool {
                Tool::Select => self.select_tool(gesture),
                Tool::Note => self.note_tool(gesture),
            }
        }
    }

    fn select_tool(&mut self, gesture: &Gesture) {
        match *gesture {
            Gesture::Click { button: MouseButton::Left, .. } => self.selection.clear(),
            Gesture::RectangleStart { .. } => {
                self.selection.clear();
                self.rubber_band = None;
            }
            Gesture::RectangleUpdate { rect } => self.rubber_band = Some(rect),
            Gesture::RectangleSelect { rect } => {
                self.rubber_band = None;
                self.selection.select_in_rectangle(
                    &self.document,
                    self.mapper.as_ref(),
                    rect.min_x,
                    rect.min_y,
                    rect.max_x,
                    rect.max_y,
                );
            }
            Gesture::Cancelled { .. } => self.rubber_band = None,
            _ => {}
        }
    }

    fn note_tool(&mut self, gesture: &Gesture) {
        match *gesture {
            Gesture::Press { button: MouseButton::Left, at } => self.place_note(at),
            Gesture::DragStart { button: MouseButton::Left, at, .. }
            | Gesture::Drag { button: MouseButton::Left, at, .. } => self.size_pending_note(at),
            Gesture::Click { button: MouseButton::Left, .. }
            | Gesture::DragEnd { button: MouseButton::Left, .. } => {
                if let Some(pending) = self.pending_note.take() {
                    log::info!("placed note {}", pending.id);
                }
            }
            Gesture::Cancelled { button: MouseButton::Left } => self.discard_pending_note(),
            _ => {}
        }
    }

    fn place_note(&mut self, at: Point) {
        // A press while a note is pending means the release was lost
        self.discard_pending_note();

        let step = self.grid_step();
        let total = self.document.total_length_ticks();
        if total < step {
            log::warn!("score is shorter than one grid step, no note placed");
            return;
        }
        let pitch = self.mapper.x_to_pitch(at.x).clamp(MIN_PITCH, MAX_PITCH) as u8;
        let time = self.snap_time(self.mapper.y_to_time(at.y)).min(total - step);

        let stave = self.document.rendered_stave();
        let id = self.document.new_note(stave, Note { time, pitch, duration: step, ..Note::default() });
        self.selection.clear();
        self.selection.select(&self.document, id);
        self.pending_note = Some(PendingNote { id, start: time });
    }

    fn size_pending_note(&mut self, at: Point) {
        let Some(pending) = self.pending_note else {
            return;
        };
        let step = self.grid_step();
        let total = self.document.total_length_ticks();
        let pointer_time = self.mapper.y_to_time(at.y);
        let end = ((pointer_time / step).ceil() * step).min(total);
        let duration = (end - pending.start).max(step);

        if let Some(note) = self.document.event_mut(pending.id).and_then(|e| e.as_note_mut()) {
            note.duration = duration;
        }
    }

    fn discard_pending_note(&mut self) {
        if let Some(pending) = self.pending_note.take() {
            self.document.delete_by_id(pending.id);
            self.selection.clear();
            log::debug!("discarded pending note {}", pending.id);
        }
    }
}
