use crate::undo::{SizeChange, UndoAccumulator, UndoRecord};

/// Something that happened to a document's history
#[derive(Debug, Clone, Copy)]
pub enum UndoEvent<'a> {
    /// Recording was switched off
    Frozen,
    /// Recording was switched back on
    Thawed,
    /// All history is about to be dropped
    Cleared,
    Pushed(&'a UndoRecord),
    Undone {
        record: &'a UndoRecord,
        effects: &'a UndoAccumulator,
    },
    Redone {
        record: &'a UndoRecord,
        effects: &'a UndoAccumulator,
    },
    /// Dropped from the bottom of the undo stack to stay within limits
    UndoExpired(&'a UndoRecord),
    /// Dropped because a new edit replaced the redo history
    RedoExpired(&'a UndoRecord),
    ModeChanged,
    PrecisionChanged,
    SizeChanged(SizeChange),
    ResolutionChanged,
    UnitChanged,
}

impl UndoEvent<'_> {
    /// Short name, for logs
    pub fn name(&self) -> &'static str {
        match self {
            UndoEvent::Frozen => "frozen",
            UndoEvent::Thawed => "thawed",
            UndoEvent::Cleared => "cleared",
            UndoEvent::Pushed(_) => "pushed",
            UndoEvent::Undone { .. } => "undone",
            UndoEvent::Redone { .. } => "redone",
            UndoEvent::UndoExpired(_) => "undo-expired",
            UndoEvent::RedoExpired(_) => "redo-expired",
            UndoEvent::ModeChanged => "mode-changed",
            UndoEvent::PrecisionChanged => "precision-changed",
            UndoEvent::SizeChanged(_) => "size-changed",
            UndoEvent::ResolutionChanged => "resolution-changed",
            UndoEvent::UnitChanged => "unit-changed",
        }
    }

    /// The record the event is about, if there is one
    pub fn record(&self) -> Option<&UndoRecord> {
        match self {
            UndoEvent::Pushed(record)
            | UndoEvent::UndoExpired(record)
            | UndoEvent::RedoExpired(record)
            | UndoEvent::Undone { record, .. }
            | UndoEvent::Redone { record, .. } => Some(*record),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener = Box<dyn FnMut(&UndoEvent)>;

/// Callbacks told about every history event, in connection order
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Returns false if `id` was not connected
    pub fn disconnect(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(other, _)| *other != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn emit(&mut self, event: &UndoEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}
