//! History tags returned by mutating operations, and the undo stack that consumes them.

use serde::{Deserialize, Serialize};

/// Default maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Whether a mutation starts a new undo checkpoint.
///
/// `Record` carries the state from before the mutation. `Skip` marks an
/// in-gesture update that belongs to an already recorded checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryAction<T> {
    Record(T),
    Skip,
}

impl<T> HistoryAction<T> {
    pub fn is_skip(&self) -> bool {
        matches!(self, HistoryAction::Skip)
    }

    /// The pre-mutation state, if this action records one.
    pub fn into_previous(self) -> Option<T> {
        match self {
            HistoryAction::Record(previous) => Some(previous),
            HistoryAction::Skip => None,
        }
    }
}

/// Checkpoint captured when a gesture starts and handed out once, on the first mutation.
#[derive(Debug, Clone)]
pub struct Checkpoint<T> {
    pending: Option<T>,
}

impl<T> Default for Checkpoint<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> Checkpoint<T> {
    /// Arm the checkpoint with the pre-gesture state.
    pub fn arm(&mut self, previous: T) {
        self.pending = Some(previous);
    }

    /// `Record` the first time after `arm`, `Skip` afterwards.
    pub fn take(&mut self) -> HistoryAction<T> {
        match self.pending.take() {
            Some(previous) => HistoryAction::Record(previous),
            None => HistoryAction::Skip,
        }
    }

    /// Drop an unused checkpoint (a press that never moved).
    pub fn disarm(&mut self) {
        self.pending = None;
    }
}

/// Bounded undo/redo stacks of whole-value snapshots.
#[derive(Debug, Clone)]
pub struct UndoStack<T> {
    undo_stack: Vec<T>,
    redo_stack: Vec<T>,
    capacity: usize,
}

impl<T> Default for UndoStack<T> {
    fn default() -> Self {
        Self::new(MAX_UNDO_HISTORY)
    }
}

impl<T> UndoStack<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Push a pre-mutation snapshot. Clears the redo stack.
    pub fn push(&mut self, previous: T) {
        self.undo_stack.push(previous);
        self.redo_stack.clear();

        if self.undo_stack.len() > self.capacity {
            self.undo_stack.remove(0);
        }
    }

    /// Consume a history tag, pushing only `Record` actions.
    pub fn apply(&mut self, action: HistoryAction<T>) {
        if let Some(previous) = action.into_previous() {
            self.push(previous);
        }
    }

    /// Undo: swaps `current` with the most recent snapshot.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self, current: &mut T) -> bool {
        match self.undo_stack.pop() {
            Some(previous) => {
                let now = std::mem::replace(current, previous);
                self.redo_stack.push(now);
                true
            }
            None => false,
        }
    }

    /// Redo the last undone change.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self, current: &mut T) -> bool {
        match self.redo_stack.pop() {
            Some(next) => {
                let now = std::mem::replace(current, next);
                self.undo_stack.push(now);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_records_once() {
        let mut cp = Checkpoint::default();
        cp.arm(vec![1]);
        assert_eq!(cp.take(), HistoryAction::Record(vec![1]));
        assert_eq!(cp.take(), HistoryAction::Skip);
        cp.arm(vec![2]);
        cp.disarm();
        assert_eq!(cp.take(), HistoryAction::Skip);
    }

    #[test]
    fn test_undo_redo_swaps() {
        let mut stack = UndoStack::default();
        let mut current = 2;
        stack.apply(HistoryAction::Record(1));
        stack.apply(HistoryAction::Skip);
        assert_eq!(stack.len(), 1);

        assert!(stack.undo(&mut current));
        assert_eq!(current, 1);
        assert!(!stack.undo(&mut current));

        assert!(stack.redo(&mut current));
        assert_eq!(current, 2);
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut stack = UndoStack::default();
        let mut current = "b";
        stack.push("a");
        stack.undo(&mut current);
        assert!(stack.can_redo());
        stack.push("c");
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_capacity_limit() {
        let mut stack = UndoStack::new(3);
        for i in 0..10 {
            stack.push(i);
        }
        assert_eq!(stack.len(), 3);
        let mut current = 10;
        stack.undo(&mut current);
        assert_eq!(current, 9);
    }
}
