//! Identifier allocation for score elements
//!
//! Every line break and every event in a document draws its id from one
//! allocator, so ids are unique across the whole document.

/// Identifier carried by line breaks and events
pub type ElementId = u64;

/// Issues monotonically increasing ids
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdAllocator {
    next: ElementId,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl IdAllocator {
    /// Create an allocator whose first issued id is `start`
    pub fn new(start: ElementId) -> Self {
        Self { next: start }
    }

    /// Issue the next id
    pub fn next(&mut self) -> ElementId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Restart issuing at `start`.
    ///
    /// Uniqueness against ids already present in a document is the caller's
    /// responsibility; `Document::renumber_ids` is the safe way to compact.
    pub fn reset(&mut self, start: ElementId) {
        self.next = start;
    }

    /// The id that `next()` would return
    pub fn peek(&self) -> ElementId {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase() {
        let mut ids = IdAllocator::default();
        let a = ids.next();
        let b = ids.next();
        let c = ids.next();
        assert_eq!((a, b, c), (1, 2, 3));
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let mut ids = IdAllocator::default();
        ids.next();
        ids.next();
        ids.reset(10);
        assert_eq!(ids.peek(), 10);
        assert_eq!(ids.next(), 10);
        assert_eq!(ids.next(), 11);
    }
}
