use bitflags::bitflags;
use chrono::{DateTime, Utc};

/// Counter value a document is pinned to once it can no longer get back to
/// its clean state through undo or redo
pub const DIRTY_SENTINEL: i32 = 100_000;

bitflags! {
    /// Coarse regions of a document an edit touches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DirtyMask: u32 {
        const IMAGE           = 1 << 0;
        const IMAGE_SIZE      = 1 << 1;
        const IMAGE_META      = 1 << 2;
        const IMAGE_STRUCTURE = 1 << 3;
        const ITEM            = 1 << 4;
        const ITEM_META       = 1 << 5;
        const DRAWABLE        = 1 << 6;
        const VECTORS         = 1 << 7;
        const SELECTION       = 1 << 8;
        const ACTIVE_DRAWABLE = 1 << 9;
        const ALL             = 0xffff;
    }
}

/// Unsaved-changes bookkeeping for one document.
///
/// The counter goes up for every dirtying edit or redo and down for every
/// undo. Zero is the clean point; a negative value means redoing could bring
/// the document back to clean.
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    dirty: i32,
    export_dirty: i32,
    dirty_time: Option<DateTime<Utc>>,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one dirtying step, returns the new counter
    pub fn mark_dirty(&mut self, mask: DirtyMask) -> i32 {
        if mask.is_empty() {
            return self.dirty;
        }

        self.dirty = (self.dirty + 1).min(DIRTY_SENTINEL);
        self.export_dirty = (self.export_dirty + 1).min(DIRTY_SENTINEL);

        if self.dirty_time.is_none() {
            self.dirty_time = Some(Utc::now());
        }

        self.dirty
    }

    /// Count one cleaning step (an undo), returns the new counter
    pub fn mark_clean(&mut self, mask: DirtyMask) -> i32 {
        if mask.is_empty() {
            return self.dirty;
        }

        self.dirty -= 1;
        self.export_dirty -= 1;
        self.dirty
    }

    /// The document was saved: this is the new clean point
    pub fn clean_all(&mut self) {
        self.dirty = 0;
        self.dirty_time = None;
    }

    /// The document was exported
    pub fn export_clean_all(&mut self) {
        self.export_dirty = 0;
    }

    pub fn dirty(&self) -> i32 {
        self.dirty
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty != 0
    }

    pub fn is_export_dirty(&self) -> bool {
        self.export_dirty != 0
    }

    /// When the document first became dirty after its last clean point
    pub fn dirty_time(&self) -> Option<DateTime<Utc>> {
        self.dirty_time
    }

    /// Redo steps were destroyed. The counter has already been bumped for
    /// the edit that destroyed them, so anything at or below zero could only
    /// have become clean again through those redo steps.
    pub fn redo_discarded(&mut self) {
        if self.dirty <= 0 {
            self.dirty = DIRTY_SENTINEL;
        }
    }

    /// All history was destroyed
    pub fn history_discarded(&mut self) {
        if self.dirty < 0 {
            self.dirty = DIRTY_SENTINEL;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_mask_does_not_count() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_dirty(DirtyMask::empty());
        assert!(!tracker.is_dirty());
        assert!(tracker.dirty_time().is_none());

        tracker.mark_clean(DirtyMask::empty());
        assert_eq!(tracker.dirty(), 0);
    }

    #[test]
    fn test_dirty_then_clean() {
        let mut tracker = DirtyTracker::new();
        assert_eq!(tracker.mark_dirty(DirtyMask::ITEM_META), 1);
        assert!(tracker.is_dirty());
        assert!(tracker.dirty_time().is_some());

        assert_eq!(tracker.mark_clean(DirtyMask::ITEM_META), 0);
        assert!(!tracker.is_dirty());
    }

    #[test]
    fn test_counter_goes_negative_past_clean_point() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_dirty(DirtyMask::IMAGE);
        tracker.clean_all();

        tracker.mark_clean(DirtyMask::IMAGE);
        assert_eq!(tracker.dirty(), -1);
        assert!(tracker.is_dirty());
    }

    #[test]
    fn test_saturates_at_sentinel() {
        let mut tracker = DirtyTracker::new();
        tracker.redo_discarded();
        assert_eq!(tracker.dirty(), DIRTY_SENTINEL);

        tracker.mark_dirty(DirtyMask::ALL);
        assert_eq!(tracker.dirty(), DIRTY_SENTINEL);
    }

    #[test]
    fn test_redo_discarded_clamps_at_or_below_zero() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_dirty(DirtyMask::IMAGE);
        tracker.redo_discarded();
        assert_eq!(tracker.dirty(), 1);

        tracker.mark_clean(DirtyMask::IMAGE);
        tracker.redo_discarded();
        assert_eq!(tracker.dirty(), DIRTY_SENTINEL);
    }

    #[test]
    fn test_history_discarded_only_clamps_negative() {
        let mut tracker = DirtyTracker::new();
        tracker.history_discarded();
        assert_eq!(tracker.dirty(), 0);

        tracker.mark_clean(DirtyMask::IMAGE);
        tracker.history_discarded();
        assert_eq!(tracker.dirty(), DIRTY_SENTINEL);
    }

    #[test]
    fn test_export_dirty_is_independent() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_dirty(DirtyMask::DRAWABLE);
        tracker.clean_all();
        assert!(!tracker.is_dirty());
        assert!(tracker.is_export_dirty());

        tracker.export_clean_all();
        assert!(!tracker.is_export_dirty());
    }
}
