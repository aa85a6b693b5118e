use crate::document::Document;

use super::{UndoAccumulator, UndoMode, UndoRecord};

/// Records that undo and redo as one step.
///
/// Children are stored in the order they were pushed. Undo walks them
/// newest first and redo oldest first, so the order never has to be
/// rearranged.
#[derive(Debug, Clone, Default)]
pub struct UndoGroup {
    children: Vec<UndoRecord>,
}

impl UndoGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_child(&mut self, record: UndoRecord) {
        self.children.push(record);
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Children oldest first
    pub fn children(&self) -> &[UndoRecord] {
        &self.children
    }

    /// The most recently pushed child
    pub fn head(&self) -> Option<&UndoRecord> {
        self.children.last()
    }

    pub fn head_mut(&mut self) -> Option<&mut UndoRecord> {
        self.children.last_mut()
    }

    pub fn apply(&mut self, mode: UndoMode, doc: &mut Document, accum: &mut UndoAccumulator) {
        match mode {
            UndoMode::Undo => {
                for child in self.children.iter_mut().rev() {
                    child.apply(mode, doc, accum);
                }
            }
            UndoMode::Redo => {
                for child in self.children.iter_mut() {
                    child.apply(mode, doc, accum);
                }
            }
        }
    }

    pub fn free(&mut self, mode: UndoMode) {
        for mut child in self.children.drain(..) {
            child.free(mode);
        }
    }

    pub fn memsize(&self) -> usize {
        self.children.iter().map(UndoRecord::memsize).sum()
    }
}
