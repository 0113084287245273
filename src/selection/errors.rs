//! Error types for selection edits
//!
//! Every variant is a validation rejection: the edit was refused and the
//! document is exactly as it was before the call.

use thiserror::Error;

use crate::models::ElementId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    /// The edited time window would leave the score
    #[error("events would span {start}..{end} ticks, outside the score (0..{total})")]
    OutOfBounds { start: f64, end: f64, total: f64 },

    /// A pitch would leave the keyboard
    #[error("element {id} would move to pitch {pitch}, outside 1..=88")]
    PitchOutOfRange { id: ElementId, pitch: i32 },
}

/// What an accepted edit did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// `count` elements were changed, removed or created
    Applied { count: usize },
    /// Empty selection or clipboard
    NothingToDo,
}

impl EditOutcome {
    pub(crate) fn from_count(count: usize) -> Self {
        if count == 0 {
            EditOutcome::NothingToDo
        } else {
            EditOutcome::Applied { count }
        }
    }

    pub fn count(self) -> usize {
        match self {
            EditOutcome::Applied { count } => count,
            EditOutcome::NothingToDo => 0,
        }
    }
}

pub type EditResult = std::result::Result<EditOutcome, EditError>;
