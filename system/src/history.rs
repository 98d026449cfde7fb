use crate::types::Snapshot;

/// Canvas state to show after an undo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restore {
    /// Nothing left in history, the canvas is blank.
    Blank,
    Snapshot(Snapshot),
}

impl Restore {
    pub fn into_snapshot(self) -> Option<Snapshot> {
        match self {
            Self::Blank => None,
            Self::Snapshot(snapshot) => Some(snapshot),
        }
    }
}

/// Shared undo/redo stacks.
///
/// Every entry of `undo_stack` is the canvas as it was right *before* the n-th recorded action.
/// Undoing action n therefore reveals the entry below the popped one, while redo hands back
/// exactly what it pops. There is a single linear history: recording anything new drops the
/// redo stack.
#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether anything was recorded. Absent or empty snapshots leave both stacks alone.
    pub fn record(&mut self, before: Option<Snapshot>) -> bool {
        match Snapshot::present(before) {
            Some(snapshot) => {
                self.undo_stack.push(snapshot);
                self.redo_stack.clear();
                true
            }
            None => false,
        }
    }

    /// `None` when there is nothing to undo; stacks are untouched in that case.
    pub fn undo(&mut self) -> Option<Restore> {
        let undone = self.undo_stack.pop()?;
        self.redo_stack.push(undone);
        Some(match self.undo_stack.last() {
            Some(top) => Restore::Snapshot(top.clone()),
            None => Restore::Blank,
        })
    }

    /// `None` when there is nothing to redo; stacks are untouched in that case.
    pub fn redo(&mut self) -> Option<Snapshot> {
        let restored = self.redo_stack.pop()?;
        self.undo_stack.push(restored.clone());
        Some(restored)
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn undo_entries(&self) -> &[Snapshot] {
        &self.undo_stack
    }

    pub fn redo_entries(&self) -> &[Snapshot] {
        &self.redo_stack
    }
}
