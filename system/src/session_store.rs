use std::collections::BTreeSet;

use crate::history::History;
use crate::message::{ClientEvent, Position, ServerEvent};
use crate::routing::{HistoryEffect, Recipients, Route};
use crate::types::{ParticipantId, Snapshot};

/// One outbound event and the participants it goes to.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub event: ServerEvent,
    pub to: Vec<ParticipantId>,
}

/// Canonical shared state of the whiteboard: who is connected, and the shared history.
///
/// All inbound events go through [`SessionStore::process`] one at a time; the caller is
/// expected to serialize them (the server runs a single loop for this).
#[derive(Debug, Default)]
pub struct SessionStore {
    participants: BTreeSet<ParticipantId>,
    history: History,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_participant(&mut self, participant_id: ParticipantId) {
        if self.participants.insert(participant_id) {
            log::info!("Participant {} joined", participant_id);
        }
    }

    /// Removing an unknown participant is a no-op. History is never touched.
    pub fn remove_participant(&mut self, participant_id: &ParticipantId) {
        if self.participants.remove(participant_id) {
            log::info!("Participant {} left", participant_id);
        }
    }

    pub fn contains(&self, participant_id: &ParticipantId) -> bool {
        self.participants.contains(participant_id)
    }

    pub fn participants(&self) -> impl Iterator<Item = &ParticipantId> + '_ {
        self.participants.iter()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Applies one inbound event and returns what has to be sent to whom.
    ///
    /// `None` when nothing goes out: commits, or undo/redo with nothing to move.
    pub fn process(&mut self, from: ParticipantId, event: ClientEvent) -> Option<Dispatch> {
        let route = Route::of(&event);
        log::debug!("{} from {}: {:?}", event.name(), from, route);

        let outbound = match route.history {
            HistoryEffect::None => relayed(event),
            HistoryEffect::Record => {
                self.history.record(recorded_snapshot(&event));
                relayed(event)
            }
            HistoryEffect::Undo => self
                .history
                .undo()
                .map(|restore| ServerEvent::Undo(restore.into_snapshot())),
            HistoryEffect::Redo => self.history.redo().map(ServerEvent::Redo),
        }?;

        let to = match route.recipients {
            Recipients::Others => self
                .participants
                .iter()
                .filter(|participant_id| **participant_id != from)
                .cloned()
                .collect(),
            Recipients::Everyone => self.participants.iter().cloned().collect(),
            Recipients::Nobody => return None,
        };
        Some(Dispatch {
            event: outbound,
            to,
        })
    }
}

/// The snapshot a history-recording event carries. `down.before` is not one of them: a stroke
/// is recorded by the `oncommit` its sender issues afterwards.
fn recorded_snapshot(event: &ClientEvent) -> Option<Snapshot> {
    match event {
        ClientEvent::Shape(shape) => shape.before.clone(),
        ClientEvent::Clear(before) => before.clone(),
        ClientEvent::Commit(commit) => commit.before.clone(),
        _ => None,
    }
}

fn relayed(event: ClientEvent) -> Option<ServerEvent> {
    match event {
        ClientEvent::Down(down) => Some(ServerEvent::Down(Position {
            x: down.x,
            y: down.y,
        })),
        ClientEvent::Draw(draw) => Some(ServerEvent::Draw(draw)),
        ClientEvent::Shape(shape) => Some(ServerEvent::Shape(shape)),
        ClientEvent::Clear(_) => Some(ServerEvent::Clear),
        ClientEvent::Commit(_) | ClientEvent::Undo | ClientEvent::Redo => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::message::*;

    fn s(name: &str) -> Snapshot {
        Snapshot::new(name)
    }

    fn store_with(participants: &[ParticipantId]) -> SessionStore {
        let mut store = SessionStore::new();
        for participant_id in participants {
            store.add_participant(*participant_id);
        }
        store
    }

    fn commit(before: &str) -> ClientEvent {
        ClientEvent::Commit(CommitPayload {
            before: Some(s(before)),
        })
    }

    #[test]
    fn it_removes_participants_idempotently() {
        let mut store = store_with(&[1, 2]);
        store.process(1, commit("s0"));

        store.remove_participant(&2);
        store.remove_participant(&2);
        store.remove_participant(&42);

        assert_eq!(store.participants().cloned().collect::<Vec<_>>(), vec![1]);
        assert_eq!(store.history().undo_entries(), &[s("s0")]);
    }

    #[test]
    fn it_relays_stroke_start_without_snapshot() {
        let mut store = store_with(&[1, 2, 3]);
        let dispatch = store
            .process(
                2,
                ClientEvent::Down(DownPayload {
                    before: Some(s("ignored")),
                    ..DownPayload::at(4.0, 5.0)
                }),
            )
            .unwrap();
        assert_eq!(dispatch.event, ServerEvent::Down(Position::new(4.0, 5.0)));
        assert_eq!(dispatch.to, vec![1, 3]);
        assert_eq!(store.history().undo_depth(), 0);
    }

    #[test]
    fn it_relays_only_the_position_of_a_stroke_start() {
        let mut store = store_with(&[1, 2]);
        let dispatch = store
            .process(
                1,
                ClientEvent::Down(DownPayload {
                    y: None,
                    ..DownPayload::at(4.0, 5.0)
                }),
            )
            .unwrap();
        assert_eq!(
            dispatch.event.encode().unwrap(),
            r#"{"event":"ondown","data":{"x":4.0}}"#
        );
    }

    #[test]
    fn it_records_and_relays_an_incomplete_shape() {
        let mut store = store_with(&[1, 2]);
        let shape = ShapePayload {
            end_y: None,
            ..ShapePayload::new(
                ShapeKind::Rectangle,
                Point::new(0.0, 0.0),
                Point::new(3.0, 4.0),
                "red",
                Some(s("s0")),
            )
        };
        let dispatch = store.process(1, ClientEvent::Shape(shape.clone())).unwrap();
        assert_eq!(dispatch.event, ServerEvent::Shape(shape));
        assert_eq!(dispatch.to, vec![2]);
        assert_eq!(store.history().undo_entries(), &[s("s0")]);
    }

    #[test]
    fn it_records_clear_and_relays_it_without_payload() {
        let mut store = store_with(&[1, 2]);
        let dispatch = store.process(1, ClientEvent::Clear(Some(s("s0")))).unwrap();
        assert_eq!(dispatch.event, ServerEvent::Clear);
        assert_eq!(dispatch.to, vec![2]);
        assert_eq!(store.history().undo_entries(), &[s("s0")]);
    }

    #[test]
    fn it_sends_nothing_for_commits() {
        let mut store = store_with(&[1, 2]);
        assert_eq!(store.process(1, commit("s0")), None);
        assert_eq!(store.history().undo_depth(), 1);
    }

    #[test]
    fn it_sends_nothing_when_there_is_nothing_to_undo_or_redo() {
        let mut store = store_with(&[1, 2]);
        assert_eq!(store.process(1, ClientEvent::Undo), None);
        assert_eq!(store.process(1, ClientEvent::Redo), None);
    }

    #[test]
    fn it_broadcasts_undo_and_redo_to_everyone() {
        let mut store = store_with(&[1, 2, 3]);
        store.process(1, commit("s1"));
        store.process(2, commit("s2"));

        let undo = store.process(3, ClientEvent::Undo).unwrap();
        assert_eq!(undo.event, ServerEvent::Undo(Some(s("s1"))));
        assert_eq!(undo.to, vec![1, 2, 3]);

        let undo = store.process(3, ClientEvent::Undo).unwrap();
        assert_eq!(undo.event, ServerEvent::Undo(None));

        let redo = store.process(1, ClientEvent::Redo).unwrap();
        assert_eq!(redo.event, ServerEvent::Redo(s("s1")));
        assert_eq!(redo.to, vec![1, 2, 3]);
    }

    #[test]
    fn it_clears_redo_when_anyone_records_after_undo() {
        let mut store = store_with(&[1, 2]);
        store.process(1, commit("s1"));
        store.process(1, commit("s2"));
        store.process(1, ClientEvent::Undo);
        assert_eq!(store.history().redo_depth(), 1);

        store.process(2, ClientEvent::Clear(Some(s("s3"))));
        assert_eq!(store.history().redo_depth(), 0);
        assert_eq!(store.process(1, ClientEvent::Redo), None);
    }
}
