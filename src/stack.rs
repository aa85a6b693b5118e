use crate::document::Document;
use crate::undo::{UndoAccumulator, UndoId, UndoMode, UndoRecord};

/// LIFO of records, head last.
///
/// Freeing from the bottom is the only access that is not at the head.
#[derive(Debug, Default)]
pub struct UndoStack {
    records: Vec<UndoRecord>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: UndoRecord) {
        self.records.push(record);
    }

    /// Take the head off and apply it to `doc`
    pub fn pop(
        &mut self,
        mode: UndoMode,
        doc: &mut Document,
        accum: &mut UndoAccumulator,
    ) -> Option<UndoRecord> {
        let mut record = self.records.pop()?;
        record.apply(mode, doc, accum);
        Some(record)
    }

    pub fn peek(&self) -> Option<&UndoRecord> {
        self.records.last()
    }

    pub fn peek_mut(&mut self) -> Option<&mut UndoRecord> {
        self.records.last_mut()
    }

    /// Remove and free the oldest record. It is never applied.
    pub fn free_bottom(&mut self, mode: UndoMode) -> Option<UndoRecord> {
        if self.records.is_empty() {
            return None;
        }

        let mut record = self.records.remove(0);
        record.free(mode);
        Some(record)
    }

    /// Number of records on the stack; group children do not count
    pub fn depth(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn memsize(&self) -> usize {
        self.records.iter().map(UndoRecord::memsize).sum()
    }

    /// Free everything, oldest first
    pub fn clear(&mut self, mode: UndoMode) {
        for mut record in self.records.drain(..) {
            record.free(mode);
        }
    }

    /// Records head first
    pub fn iter(&self) -> impl Iterator<Item = &UndoRecord> {
        self.records.iter().rev()
    }

    pub fn get(&self, id: UndoId) -> Option<&UndoRecord> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn get_mut(&mut self, id: UndoId) -> Option<&mut UndoRecord> {
        self.records.iter_mut().find(|record| record.id() == id)
    }
}
