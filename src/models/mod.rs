//! Models module for the PianoTab editor
//!
//! This module contains the score document, its events, the global style
//! registry and the inheritance rules that tie them together.

pub mod core;
pub mod events;
pub mod ids;
pub mod inherit;
pub mod persistence;
pub mod properties;
pub mod serde_helpers;

// Re-export commonly used types
pub use self::core::*;
pub use events::*;
pub use ids::{ElementId, IdAllocator};
pub use inherit::{Inherit, InheritPath, InheritRule, StyleValue};
pub use persistence::FileError;
pub use properties::*;
