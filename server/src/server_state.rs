use std::num::Wrapping;
use system::{ParticipantId, SessionStore};

use crate::admin::SessionDescription;

/// Everything the server loop owns besides the connection senders.
pub struct ServerState {
    participant_id_source: Wrapping<ParticipantId>,
    pub store: SessionStore,
}

impl ServerState {
    pub fn with_store(store: SessionStore) -> Self {
        Self {
            participant_id_source: Wrapping(0),
            store,
        }
    }

    /// Allocates an id not used by any current participant and joins it to the session.
    /// Returns `None` only when every id is taken.
    pub fn connect(&mut self) -> Option<ParticipantId> {
        for _ in 0..=ParticipantId::MAX {
            self.participant_id_source += Wrapping(1);
            let participant_id = self.participant_id_source.0;
            if !self.store.contains(&participant_id) {
                self.store.add_participant(participant_id);
                return Some(participant_id);
            }
        }
        None
    }

    pub fn disconnect(&mut self, participant_id: &ParticipantId) {
        self.store.remove_participant(participant_id);
    }

    pub fn describe(&self) -> SessionDescription {
        SessionDescription {
            participants: self.store.participants().copied().collect(),
            history_depth: self.store.history().undo_depth(),
            redo_depth: self.store.history().redo_depth(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_allocates_distinct_ids() {
        let mut state = ServerState::with_store(SessionStore::new());
        let a = state.connect().unwrap();
        let b = state.connect().unwrap();
        assert_ne!(a, b);
        assert_eq!(state.describe().participants, vec![a, b]);
    }

    #[test]
    fn it_skips_ids_still_in_use_after_wrapping() {
        let mut state = ServerState::with_store(SessionStore::new());
        let first = state.connect().unwrap();
        state.participant_id_source = Wrapping(first - 1);
        let next = state.connect().unwrap();
        assert_ne!(next, first);
        assert_eq!(next, first + 1);
    }

    #[test]
    fn it_forgets_disconnected_participants() {
        let mut state = ServerState::with_store(SessionStore::new());
        let a = state.connect().unwrap();
        state.disconnect(&a);
        assert!(state.describe().participants.is_empty());
    }
}
