use crate::message::ClientEvent;

/// Who gets the outbound counterpart of an inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipients {
    /// Everyone but the sender, who already drew it locally.
    Others,
    /// Everyone including the sender, so the sender reconciles to the canonical canvas too.
    Everyone,
    Nobody,
}

/// How the history is affected by an inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEffect {
    None,
    /// Pushes the attached "before" snapshot, if any.
    Record,
    Undo,
    Redo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub history: HistoryEffect,
    pub recipients: Recipients,
}

impl Route {
    /// The routing table for every inbound event.
    pub fn of(event: &ClientEvent) -> Self {
        use HistoryEffect as H;
        use Recipients as R;

        let (history, recipients) = match event {
            ClientEvent::Down(_) => (H::None, R::Others),
            ClientEvent::Draw(_) => (H::None, R::Others),
            ClientEvent::Shape(_) => (H::Record, R::Others),
            ClientEvent::Clear(_) => (H::Record, R::Others),
            ClientEvent::Commit(_) => (H::Record, R::Nobody),
            ClientEvent::Undo => (H::Undo, R::Everyone),
            ClientEvent::Redo => (H::Redo, R::Everyone),
        };
        Self {
            history,
            recipients,
        }
    }
}
