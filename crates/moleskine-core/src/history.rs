//! Per-page undo/redo history.

use crate::elements::Element;

/// Maximum number of snapshots kept per page.
pub const MAX_HISTORY: usize = 50;

/// Bounded list of element-list snapshots with a cursor.
///
/// The snapshot under the cursor always equals the page's live element
/// list. Undo and redo only move the cursor; only [`History::commit`]
/// allocates a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    snapshots: Vec<Vec<Element>>,
    cursor: usize,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl History {
    /// Start a history whose only snapshot is `initial`.
    pub fn new(initial: Vec<Element>) -> Self {
        Self::with_capacity(initial, MAX_HISTORY)
    }

    /// History with a custom snapshot bound (at least one).
    pub fn with_capacity(initial: Vec<Element>, capacity: usize) -> Self {
        Self {
            snapshots: vec![initial],
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Record a new element list, discarding any redo future.
    pub fn commit(&mut self, elements: Vec<Element>) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(elements);
        if self.snapshots.len() > self.capacity {
            let excess = self.snapshots.len() - self.capacity;
            self.snapshots.drain(..excess);
        }
        self.cursor = self.snapshots.len() - 1;
    }

    /// Step back. Returns the snapshot to restore, or `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&[Element]> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(&self.snapshots[self.cursor])
    }

    /// Step forward. Returns the snapshot to restore, or `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&[Element]> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        Some(&self.snapshots[self.cursor])
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Snapshot under the cursor.
    pub fn current(&self) -> &[Element] {
        &self.snapshots[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{SerializableColor, ShapeElement};

    fn rect(x: f64) -> Element {
        Element::Rectangle(ShapeElement::new(SerializableColor::black(), 1.0, x, 0.0, x + 10.0, 10.0))
    }

    #[test]
    fn test_initial_state() {
        let h = History::default();
        assert_eq!(h.len(), 1);
        assert_eq!(h.cursor(), 0);
        assert!(!h.can_undo());
        assert!(!h.can_redo());
        assert!(h.current().is_empty());
    }

    #[test]
    fn test_commit_undo_redo() {
        let mut h = History::default();
        let a = vec![rect(0.0)];
        let b = vec![rect(0.0), rect(20.0)];
        h.commit(a.clone());
        h.commit(b.clone());
        assert_eq!(h.current(), b.as_slice());

        assert_eq!(h.undo(), Some(a.as_slice()));
        assert_eq!(h.undo(), Some(&[][..]));
        assert_eq!(h.undo(), None);
        assert_eq!(h.cursor(), 0);

        assert_eq!(h.redo(), Some(a.as_slice()));
        assert_eq!(h.redo(), Some(b.as_slice()));
        assert_eq!(h.redo(), None);
        // Moving the cursor never allocates.
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn test_commit_truncates_future() {
        let mut h = History::default();
        h.commit(vec![rect(0.0)]);
        h.commit(vec![rect(1.0)]);
        h.undo();
        h.commit(vec![rect(2.0)]);
        assert_eq!(h.len(), 3);
        assert!(!h.can_redo());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut h = History::default();
        for i in 0..(MAX_HISTORY + 10) {
            h.commit(vec![rect(i as f64)]);
        }
        assert_eq!(h.len(), MAX_HISTORY);
        assert_eq!(h.cursor(), MAX_HISTORY - 1);
        let mut undos = 0;
        while h.undo().is_some() {
            undos += 1;
        }
        assert_eq!(undos, MAX_HISTORY - 1);
        // Oldest surviving snapshot is commit #10.
        assert_eq!(h.current().len(), 1);
        assert!((h.current()[0].bounds().x0 - 10.0).abs() < f64::EPSILON);
    }
}
