pub mod event;
pub mod preview;
pub mod push;

use thiserror::Error;
use tracing::{debug, error, trace};

use crate::config::HistoryConfig;
use crate::dirty::DirtyMask;
use crate::document::Document;
use crate::stack::UndoStack;
use crate::undo::{
    UndoAccumulator, UndoClass, UndoId, UndoKind, UndoMode, UndoPayload, UndoRecord,
};

pub use event::{Listener, ListenerId, Listeners, UndoEvent};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("history is frozen")]
    Frozen,

    #[error("history is not frozen")]
    NotFrozen,

    #[error("an undo group is open")]
    GroupOpen,

    #[error("no undo group is open")]
    NoOpenGroup,

    #[error("{0:?} is not a group kind")]
    NotAGroup(UndoKind),

    #[error("{0:?} is a group kind and cannot be pushed as a single edit")]
    GroupKind(UndoKind),

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,
}

/// Undo and redo history of one document
#[derive(Debug)]
pub struct History {
    config: HistoryConfig,
    undo_stack: UndoStack,
    redo_stack: UndoStack,
    freeze_count: u32,
    group_count: u32,
    pushing_group: Option<UndoKind>,
    next_id: u64,
    listeners: Listeners,
    /// Records waiting for a deferred preview, oldest request first
    pending_previews: Vec<UndoId>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl History {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            config,
            undo_stack: UndoStack::new(),
            redo_stack: UndoStack::new(),
            freeze_count: 0,
            group_count: 0,
            pushing_group: None,
            next_id: 1,
            listeners: Listeners::new(),
            pending_previews: Vec::new(),
        }
    }

    fn allocate_id(&mut self) -> UndoId {
        let id = UndoId(self.next_id);
        self.next_id += 1;
        id
    }

    // === Listeners ===

    /// Get told about every history event
    pub fn connect(&mut self, listener: Listener) -> ListenerId {
        self.listeners.connect(listener)
    }

    pub fn disconnect(&mut self, id: ListenerId) -> bool {
        self.listeners.disconnect(id)
    }

    // === Groups ===

    /// Open a group; everything pushed until the matching `group_end`
    /// undoes as one step.
    ///
    /// Nested calls only deepen the current group. The outermost call marks
    /// the document dirty even when history is frozen.
    pub fn group_start(
        &mut self,
        doc: &mut Document,
        kind: UndoKind,
        name: Option<&str>,
    ) -> Result<(), HistoryError> {
        if !kind.is_group() {
            error!(?kind, "group_start called with a non-group kind");
            return Err(HistoryError::NotAGroup(kind));
        }

        let dirty_mask = kind.dirty_mask();
        if self.group_count == 0 && !dirty_mask.is_empty() {
            doc.dirty.mark_dirty(dirty_mask);
        }

        if self.is_frozen() {
            debug!(?kind, "history frozen, group not started");
            return Err(HistoryError::Frozen);
        }

        self.group_count += 1;
        if self.group_count > 1 {
            trace!(?kind, depth = self.group_count, "nested group");
            return Ok(());
        }

        self.free_redo(doc);

        let id = self.allocate_id();
        self.undo_stack.push(UndoRecord::group(id, kind, name));
        self.pushing_group = Some(kind);
        debug!(%id, ?kind, "group started");

        Ok(())
    }

    /// Close the innermost open group
    pub fn group_end(&mut self, doc: &mut Document) -> Result<(), HistoryError> {
        if self.is_frozen() {
            debug!("history frozen, group not ended");
            return Err(HistoryError::Frozen);
        }

        if self.group_count == 0 {
            error!("group_end called with no open group");
            return Err(HistoryError::NoOpenGroup);
        }

        self.group_count -= 1;
        if self.group_count > 0 {
            return Ok(());
        }

        self.pushing_group = None;
        if let Some(group) = self.undo_stack.peek() {
            debug!(id = %group.id(), kind = ?group.kind(), "group closed");
            self.listeners.emit(&UndoEvent::Pushed(group));
        }
        self.free_space();

        Ok(())
    }

    // === Recording ===

    /// Record an edit whose "before" state is in `payload`.
    ///
    /// A non-empty `dirty_mask` marks the document dirty even while
    /// history is frozen. Returns the new record's id, or `None` if nothing
    /// was recorded or the record was dropped again right away to stay
    /// within the configured limits.
    pub fn push(
        &mut self,
        doc: &mut Document,
        kind: UndoKind,
        name: Option<&str>,
        dirty_mask: DirtyMask,
        payload: UndoPayload,
    ) -> Option<UndoId> {
        if kind.is_group() {
            error!(?kind, "push called with a group kind");
            return None;
        }

        if !dirty_mask.is_empty() {
            doc.dirty.mark_dirty(dirty_mask);
        }

        if self.is_frozen() {
            trace!(?kind, "history frozen, edit not recorded");
            return None;
        }

        let id = self.allocate_id();
        let record = UndoRecord::new(id, kind, name, dirty_mask, payload);

        self.free_redo(doc);

        if self.group_count > 0 {
            if let Some(group) = self.undo_stack.peek_mut().and_then(UndoRecord::as_group_mut) {
                trace!(%id, ?kind, "added to open group");
                group.push_child(record);
                return Some(id);
            }
            error!(%id, "open group missing from the undo stack, pushing on its own");
        }

        debug!(%id, ?kind, "pushed");
        self.undo_stack.push(record);
        if let Some(record) = self.undo_stack.peek() {
            self.listeners.emit(&UndoEvent::Pushed(record));
        }

        self.free_space();

        self.undo_stack
            .peek()
            .filter(|record| record.id() == id)
            .map(UndoRecord::id)
    }

    /// Like [`History::push`], but refuses a group kind with an error
    pub fn try_push(
        &mut self,
        doc: &mut Document,
        kind: UndoKind,
        name: Option<&str>,
        dirty_mask: DirtyMask,
        payload: UndoPayload,
    ) -> Result<Option<UndoId>, HistoryError> {
        if kind.is_group() {
            error!(?kind, "push called with a group kind");
            return Err(HistoryError::GroupKind(kind));
        }
        Ok(self.push(doc, kind, name, dirty_mask, payload))
    }

    /// The undo head, if the caller may fold a new edit of `kind` and
    /// `class` into it instead of pushing another record.
    ///
    /// Only safe while the document is dirty and nothing can be redone.
    pub fn can_compress(
        &mut self,
        doc: &Document,
        class: UndoClass,
        kind: UndoKind,
    ) -> Option<&mut UndoRecord> {
        if !doc.dirty.is_dirty() || !self.redo_stack.is_empty() {
            return None;
        }

        self.undo_stack
            .peek_mut()
            .filter(|record| record.kind() == kind && record.class() == class)
    }

    // === Undo and redo ===

    pub fn undo(&mut self, doc: &mut Document) -> Result<(), HistoryError> {
        self.pop_stack(doc, UndoMode::Undo)
    }

    pub fn redo(&mut self, doc: &mut Document) -> Result<(), HistoryError> {
        self.pop_stack(doc, UndoMode::Redo)
    }

    /// Undo, then keep undoing while the newly exposed head is weak
    pub fn strong_undo(&mut self, doc: &mut Document) -> Result<(), HistoryError> {
        self.undo(doc)?;
        while self.undo_stack.peek().is_some_and(UndoRecord::is_weak) {
            self.undo(doc)?;
        }
        Ok(())
    }

    /// Redo, then keep redoing while the newly exposed head is weak
    pub fn strong_redo(&mut self, doc: &mut Document) -> Result<(), HistoryError> {
        self.redo(doc)?;
        while self.redo_stack.peek().is_some_and(UndoRecord::is_weak) {
            self.redo(doc)?;
        }
        Ok(())
    }

    fn pop_stack(&mut self, doc: &mut Document, mode: UndoMode) -> Result<(), HistoryError> {
        if self.group_count > 0 {
            error!(?mode, "undo or redo requested while a group is open");
            return Err(HistoryError::GroupOpen);
        }

        if self.is_frozen() {
            debug!(?mode, "history frozen, nothing popped");
            return Err(HistoryError::Frozen);
        }

        let (from, to, empty) = match mode {
            UndoMode::Undo => (
                &mut self.undo_stack,
                &mut self.redo_stack,
                HistoryError::NothingToUndo,
            ),
            UndoMode::Redo => (
                &mut self.redo_stack,
                &mut self.undo_stack,
                HistoryError::NothingToRedo,
            ),
        };

        let mut accum = UndoAccumulator::default();
        let Some(record) = from.pop(mode, doc, &mut accum) else {
            debug!(?mode, "stack empty");
            return Err(empty);
        };

        debug!(id = %record.id(), kind = ?record.kind(), ?mode, "popped");
        to.push(record);

        if accum.mode_changed {
            self.listeners.emit(&UndoEvent::ModeChanged);
        }
        if accum.precision_changed {
            self.listeners.emit(&UndoEvent::PrecisionChanged);
        }
        if let Some(change) = accum.size_changed {
            self.listeners.emit(&UndoEvent::SizeChanged(change));
        }
        if accum.resolution_changed {
            self.listeners.emit(&UndoEvent::ResolutionChanged);
        }
        if accum.unit_changed {
            self.listeners.emit(&UndoEvent::UnitChanged);
        }

        if let Some(record) = to.peek() {
            let event = match mode {
                UndoMode::Undo => UndoEvent::Undone {
                    record,
                    effects: &accum,
                },
                UndoMode::Redo => UndoEvent::Redone {
                    record,
                    effects: &accum,
                },
            };
            self.listeners.emit(&event);
        }

        Ok(())
    }

    /// The edit a fade operation may act on: the undo head, or the newest
    /// child of a two-record paint group at the head. Only a pixel edit that
    /// still has the applied pixels qualifies.
    pub fn fadeable(&self) -> Option<&UndoRecord> {
        let mut record = self.undo_stack.peek()?;

        if record.kind() == UndoKind::GroupPaint {
            if let Some(group) = record.as_group().filter(|group| group.len() == 2) {
                record = group.head()?;
            }
        }

        record
            .as_drawable()
            .is_some_and(|undo| undo.applied_buffer.is_some())
            .then_some(record)
    }

    pub fn fadeable_mut(&mut self) -> Option<&mut UndoRecord> {
        let head = self.undo_stack.peek_mut()?;

        let is_paint_pair = head.kind() == UndoKind::GroupPaint
            && head.as_group().is_some_and(|group| group.len() == 2);
        let record = if is_paint_pair {
            head.as_group_mut()?.head_mut()?
        } else {
            head
        };

        let fadeable = record
            .as_drawable()
            .is_some_and(|undo| undo.applied_buffer.is_some());
        fadeable.then_some(record)
    }

    // === Freezing ===

    pub fn freeze(&mut self) {
        self.freeze_count += 1;
        if self.freeze_count == 1 {
            debug!("history frozen");
            self.listeners.emit(&UndoEvent::Frozen);
        }
    }

    pub fn thaw(&mut self) -> Result<(), HistoryError> {
        if self.freeze_count == 0 {
            error!("thaw called on history that is not frozen");
            return Err(HistoryError::NotFrozen);
        }

        self.freeze_count -= 1;
        if self.freeze_count == 0 {
            debug!("history thawed");
            self.listeners.emit(&UndoEvent::Thawed);
        }
        Ok(())
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze_count > 0
    }

    /// Drop all history, then thaw
    pub fn enable(&mut self, doc: &mut Document) -> Result<(), HistoryError> {
        self.clear_all(doc);
        self.thaw()
    }

    pub fn disable(&mut self) {
        self.freeze();
    }

    pub fn is_enabled(&self) -> bool {
        self.freeze_count == 0
    }

    // === Freeing ===

    /// Drop both stacks.
    ///
    /// A document that could only have become clean again by redoing is
    /// dirty for good afterwards.
    pub fn clear_all(&mut self, doc: &mut Document) {
        self.listeners.emit(&UndoEvent::Cleared);

        self.undo_stack.clear(UndoMode::Undo);
        self.redo_stack.clear(UndoMode::Redo);
        self.group_count = 0;
        self.pushing_group = None;
        self.pending_previews.clear();

        doc.dirty.history_discarded();
        debug!("history cleared");
    }

    /// Drop the oldest undo steps while over the step or memory limits,
    /// never going below `levels_of_undo`
    fn free_space(&mut self) {
        let min_levels = self.config.levels_of_undo;

        if self.undo_stack.depth() <= min_levels {
            return;
        }

        while self.undo_stack.memsize() > self.config.undo_size
            || self.undo_stack.depth() > self.config.max_levels
        {
            let Some(freed) = self.undo_stack.free_bottom(UndoMode::Undo) else {
                break;
            };

            trace!(
                id = %freed.id(),
                depth = self.undo_stack.depth(),
                bytes = self.undo_stack.memsize(),
                "undo step expired"
            );
            self.pending_previews.retain(|&id| id != freed.id());
            self.listeners.emit(&UndoEvent::UndoExpired(&freed));

            if self.undo_stack.depth() <= min_levels {
                break;
            }
        }
    }

    /// Drop every redo step; a fresh edit has made them unreachable
    fn free_redo(&mut self, doc: &mut Document) {
        if self.redo_stack.is_empty() {
            return;
        }

        while let Some(freed) = self.redo_stack.free_bottom(UndoMode::Redo) {
            trace!(id = %freed.id(), "redo step expired");
            self.pending_previews.retain(|&id| id != freed.id());
            self.listeners.emit(&UndoEvent::RedoExpired(&freed));
        }

        // the counter was already bumped for the edit that got us here
        doc.dirty.redo_discarded();
    }

    // === Accessors ===

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo_stack
    }

    pub fn redo_stack(&self) -> &UndoStack {
        &self.redo_stack
    }

    pub fn undo_head(&self) -> Option<&UndoRecord> {
        self.undo_stack.peek()
    }

    pub fn redo_head(&self) -> Option<&UndoRecord> {
        self.redo_stack.peek()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.depth()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn group_count(&self) -> u32 {
        self.group_count
    }

    /// Kind of the outermost open group
    pub fn pushing_group(&self) -> Option<UndoKind> {
        self.pushing_group
    }

    pub fn freeze_count(&self) -> u32 {
        self.freeze_count
    }

    /// Find a record on either stack
    pub fn record(&self, id: UndoId) -> Option<&UndoRecord> {
        self.undo_stack.get(id).or_else(|| self.redo_stack.get(id))
    }
}
