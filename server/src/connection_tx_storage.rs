use crate::connection::ConnectionEvent;
use std::collections::HashMap;
use system::ParticipantId;

pub type ConnectionTx = tokio::sync::mpsc::UnboundedSender<ConnectionEvent>;

pub struct ConnectionTxStorage {
    connection_txs: HashMap<ParticipantId, ConnectionTx>,
}

impl ConnectionTxStorage {
    pub fn new() -> Self {
        Self {
            connection_txs: HashMap::new(),
        }
    }

    pub fn insert(&mut self, participant_id: ParticipantId, tx: ConnectionTx) {
        self.connection_txs.insert(participant_id, tx);
    }

    /// A closed receiver means the connection is already going away; its Disconnect follows.
    pub fn send(&self, to: &ParticipantId, event: ConnectionEvent) {
        match self.connection_txs.get(to) {
            Some(tx) => {
                if tx.send(event).is_err() {
                    log::debug!("Connection {} is closing, dropped event", to);
                }
            }
            None => log::warn!("No connection for participant {}", to),
        }
    }

    pub fn remove(&mut self, participant_id: &ParticipantId) -> Option<ConnectionTx> {
        self.connection_txs.remove(participant_id)
    }

    /// Removes every connection whose receiver is gone, returning their ids.
    /// A connection can close before it ever learns its id, and then no Disconnect follows.
    pub fn take_closed(&mut self) -> Vec<ParticipantId> {
        let closed: Vec<ParticipantId> = self
            .connection_txs
            .iter()
            .filter(|(_, tx)| tx.is_closed())
            .map(|(participant_id, _)| *participant_id)
            .collect();
        for participant_id in &closed {
            self.connection_txs.remove(participant_id);
        }
        closed
    }

    pub fn len(&self) -> usize {
        self.connection_txs.len()
    }
}
