use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use system::{ClientEvent, Dispatch, ParticipantId, SessionStore};

use crate::admin::AdminCommand;
use crate::connection::{ConnectionCommand, ConnectionEvent};
use crate::connection_tx_storage::{ConnectionTx, ConnectionTxStorage};
use crate::server_state::ServerState;

#[derive(Debug)]
pub enum ServerCommand {
    Connection(ConnectionCommand),
    Admin(AdminCommand),
}

pub type ServerTx = UnboundedSender<ServerCommand>;

/// Owns the session and handles one command at a time, so every participant observes
/// history changes in the same order.
struct Server {
    server_state: ServerState,
    connections: ConnectionTxStorage,
}

impl Server {
    fn new(server_state: ServerState) -> Self {
        Self {
            server_state,
            connections: ConnectionTxStorage::new(),
        }
    }

    fn handle_command(&mut self, command: ServerCommand) {
        self.forget_closed_connections();
        match command {
            ServerCommand::Connection(command) => self.handle_connection_command(command),
            ServerCommand::Admin(command) => self.handle_admin_command(command),
        }
    }

    fn handle_connection_command(&mut self, command: ConnectionCommand) {
        match command {
            ConnectionCommand::Connect { tx } => self.connect(tx),
            ConnectionCommand::Disconnect { from } => {
                self.server_state.disconnect(&from);
                self.connections.remove(&from);
            }
            ConnectionCommand::ClientEvent { from, event } => self.handle_client_event(from, event),
        }
    }

    fn forget_closed_connections(&mut self) {
        for participant_id in self.connections.take_closed() {
            log::info!("Connection of participant {} closed", participant_id);
            self.server_state.disconnect(&participant_id);
        }
    }

    fn connect(&mut self, tx: ConnectionTx) {
        match self.server_state.connect() {
            Some(participant_id) => {
                if tx.send(ConnectionEvent::Connected { participant_id }).is_err() {
                    log::info!("Connection closed before joining as {}", participant_id);
                    self.server_state.disconnect(&participant_id);
                    return;
                }
                self.connections.insert(participant_id, tx);
            }
            None => {
                log::error!("No participant id left, rejecting connection");
                let _ = tx.send(ConnectionEvent::Disconnected);
            }
        }
    }

    fn handle_client_event(&mut self, from: ParticipantId, event: ClientEvent) {
        if !self.server_state.store.contains(&from) {
            log::warn!("Event {} from unknown participant {}", event.name(), from);
            return;
        }
        log::debug!("Ingress {} from {}", event.name(), from);
        if let Some(dispatch) = self.server_state.store.process(from, event) {
            self.dispatch(dispatch);
        }
    }

    fn dispatch(&self, Dispatch { event, to }: Dispatch) {
        let frame = match event.encode() {
            Ok(frame) => frame,
            Err(error) => {
                log::error!("Failed to encode {}: {}", event.name(), error);
                return;
            }
        };
        log::debug!("Egress {} to {} participants", event.name(), to.len());
        for participant_id in &to {
            self.connections
                .send(participant_id, ConnectionEvent::Frame(frame.clone()));
        }
    }

    fn handle_admin_command(&self, command: AdminCommand) {
        match command {
            AdminCommand::DescribeSession { tx } => {
                if tx.send(self.server_state.describe()).is_err() {
                    log::warn!("Admin requester went away");
                }
            }
        }
    }
}

pub fn spawn_server() -> ServerTx {
    spawn_server_with(SessionStore::new())
}

/// Starts the server loop over an existing session. Must be called within a tokio runtime.
pub fn spawn_server_with(store: SessionStore) -> ServerTx {
    let (srv_tx, mut srv_rx) = unbounded_channel::<ServerCommand>();

    tokio::spawn(async move {
        let mut server = Server::new(ServerState::with_store(store));

        while let Some(command) = srv_rx.recv().await {
            server.handle_command(command);
        }
        log::info!(
            "Server loop terminated with {} connections",
            server.connections.len()
        );
    });

    srv_tx
}
