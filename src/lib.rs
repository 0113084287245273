//! PianoTab editing core
//!
//! The score document model for PianoTab piano tablature, plus the selection
//! and gesture machinery an editor front end drives it with. Rendering and
//! page layout live outside this crate; the only thing it needs from them is
//! a [`coords::CoordinateMapper`].

pub mod config;
pub mod coords;
pub mod editor;
pub mod gesture;
pub mod models;
pub mod selection;

// Re-export commonly used types
pub use config::{ConfigError, EditorConfig};
pub use coords::{CoordinateMapper, PianoRollMapper};
pub use editor::{Editor, KeyCommand, Keymap, Tool};
pub use gesture::{Gesture, GestureRecognizer, MouseButton};
pub use models::{
    Articulation, Beam, CountLine, Document, ElementId, ElementRef, EndRepeat, Event, EventKind,
    FileError, GlobalProperties, GraceNote, Hand, Inherit, LineBreak, LineBreakKind, Note, Section,
    Side, Slur, StartRepeat, Stave, StaveRange, StyleValue, Tempo, Text, TimeSignature,
};
pub use selection::{EditError, EditOutcome, EditResult, SelectionEngine, SelectionEntry};
