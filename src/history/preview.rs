//! History thumbnails.
//!
//! Previews are cosmetic: they never affect what undo and redo do. A
//! deferred request is only honoured if its record is still the undo head
//! when [`History::run_idle`] gets to it.

use tracing::trace;

use crate::document::Document;
use crate::undo::{UndoId, UndoKind, UndoRecord};

use super::History;

/// Thumbnail dimensions for an image of `width` x `height`: the image's
/// own size if it fits in `preview_size`, else scaled so the longer side is
/// `preview_size`
pub fn preview_size(width: u32, height: u32, preview_size: u32) -> (u32, u32) {
    if width <= preview_size && height <= preview_size {
        return (width, height);
    }

    if width > height {
        let scaled = (height as u64 * preview_size as u64 / width as u64) as u32;
        (preview_size, scaled.max(1))
    } else {
        let scaled = (width as u64 * preview_size as u64 / height as u64) as u32;
        (scaled.max(1), preview_size)
    }
}

fn render_preview(doc: &Document, record: &mut UndoRecord, size: u32) {
    let (width, height) = preview_size(doc.width, doc.height, size);

    let pixels = match record.kind() {
        UndoKind::Mask | UndoKind::GroupMask | UndoKind::GroupImageQuickMask => {
            doc.selection_thumbnail(width, height)
        }
        _ => doc.thumbnail(width, height),
    };

    trace!(id = %record.id(), width, height, "preview rendered");
    record.set_preview(pixels);
}

impl History {
    fn record_mut(&mut self, id: UndoId) -> Option<&mut UndoRecord> {
        match self.undo_stack.get_mut(id) {
            Some(record) => Some(record),
            None => self.redo_stack.get_mut(id),
        }
    }

    pub fn has_pending_preview(&self, id: UndoId) -> bool {
        self.pending_previews.contains(&id)
    }

    /// Ask for a record's thumbnail, rendered right away or on the next
    /// [`History::run_idle`].
    ///
    /// Does nothing if the record already has one or a request is pending.
    /// Returns whether anything was rendered or queued.
    pub fn create_preview(&mut self, doc: &Document, id: UndoId, now: bool) -> bool {
        if self.has_pending_preview(id) {
            return false;
        }

        let size = self.config.undo_preview_size;
        let Some(record) = self.record_mut(id) else {
            return false;
        };
        if record.preview().is_some() {
            return false;
        }

        if now {
            render_preview(doc, record, size);
        } else {
            self.pending_previews.push(id);
        }
        true
    }

    /// Throw away a record's thumbnail and queue a new one
    pub fn refresh_preview(&mut self, id: UndoId) {
        if self.has_pending_preview(id) {
            return;
        }

        let had_preview = self
            .record_mut(id)
            .and_then(UndoRecord::take_preview)
            .is_some();
        if had_preview {
            self.pending_previews.push(id);
        }
    }

    /// Render queued previews whose record is still the undo head.
    /// Every other request is dropped. Returns how many were rendered.
    pub fn run_idle(&mut self, doc: &Document) -> usize {
        let size = self.config.undo_preview_size;
        let mut rendered = 0;

        for id in std::mem::take(&mut self.pending_previews) {
            match self.undo_stack.peek_mut() {
                Some(head) if head.id() == id && head.preview().is_none() => {
                    render_preview(doc, head, size);
                    rendered += 1;
                }
                _ => trace!(%id, "preview request dropped, record is not the undo head"),
            }
        }

        rendered
    }
}
