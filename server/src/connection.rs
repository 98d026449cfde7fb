use actix::{Actor, ActorContext, AsyncContext, Handler, Message, Running, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;

use system::{ClientEvent, ParticipantId};
use tokio::sync::oneshot;

use crate::config::ServerConfig;
use crate::connection_tx_storage::ConnectionTx;
use crate::server::{ServerCommand, ServerTx};

#[derive(Debug)]
pub enum ConnectionCommand {
    Connect {
        tx: ConnectionTx,
    },
    Disconnect {
        from: ParticipantId,
    },
    ClientEvent {
        from: ParticipantId,
        event: ClientEvent,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    Connected { participant_id: ParticipantId },
    /// An encoded server event, ready to be written as a text frame.
    Frame(String),
    Disconnected,
}

#[derive(Message)]
#[rtype(result = "()")]
struct ConnectionActorMessage(ConnectionEvent);

enum ConnectionState {
    Idle,
    Connected(ParticipantId),
}

struct ConnectionActor {
    state: ConnectionState,
    srv_tx: ServerTx,
    // Arrived before the server assigned an id
    pending: Vec<ClientEvent>,
    // Dropping it ends the relay task, which closes this connection's receiver. The server
    // forgets participants whose receiver is closed, even ones that never saw `Connected`.
    relay_guard: Option<oneshot::Sender<()>>,
}

impl ConnectionActor {
    fn new(srv_tx: ServerTx) -> Self {
        Self {
            state: ConnectionState::Idle,
            srv_tx,
            pending: Vec::new(),
            relay_guard: None,
        }
    }

    fn forward(&mut self, event: ClientEvent, ctx: &mut ws::WebsocketContext<Self>) {
        let from = match self.state {
            ConnectionState::Connected(from) => from,
            ConnectionState::Idle => {
                self.pending.push(event);
                return;
            }
        };
        let command = ServerCommand::Connection(ConnectionCommand::ClientEvent { from, event });
        if self.srv_tx.send(command).is_err() {
            log::error!("Server loop is gone, closing connection {}", from);
            ctx.stop();
        }
    }
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ConnectionEvent>();

        let connect = ServerCommand::Connection(ConnectionCommand::Connect { tx });
        if self.srv_tx.send(connect).is_err() {
            log::error!("Server loop is gone, refusing connection");
            ctx.stop();
            return;
        }

        let addr = ctx.address().recipient();
        let (guard, mut stopped) = oneshot::channel::<()>();
        self.relay_guard = Some(guard);

        tokio::spawn(async move {
            log::debug!("connection relay - started");
            loop {
                tokio::select! {
                    event = rx.recv() => match event {
                        Some(event) => addr.do_send(ConnectionActorMessage(event)),
                        None => break,
                    },
                    _ = &mut stopped => break,
                }
            }
            log::debug!("connection relay - terminated");
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        self.relay_guard.take();
        if let ConnectionState::Connected(from) = self.state {
            let _ = self
                .srv_tx
                .send(ServerCommand::Connection(ConnectionCommand::Disconnect {
                    from,
                }));
            self.state = ConnectionState::Idle;
        }

        Running::Stop
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Text(text)) => match ClientEvent::decode(&text) {
                Ok(event) => self.forward(event, ctx),
                Err(error) => log::warn!("Dropping malformed frame: {}", error),
            },
            Ok(ws::Message::Binary(bin)) => {
                log::warn!("Ignoring binary frame of {} bytes", bin.len())
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(error) => {
                log::warn!("Websocket protocol error: {}", error);
                ctx.stop();
            }
            _ => (),
        }
    }
}

/// Egress
impl Handler<ConnectionActorMessage> for ConnectionActor {
    type Result = ();

    fn handle(
        &mut self,
        msg: ConnectionActorMessage,
        ctx: &mut ws::WebsocketContext<Self>,
    ) -> Self::Result {
        match msg.0 {
            ConnectionEvent::Connected { participant_id } => {
                log::info!("Connection became participant {}", participant_id);
                self.state = ConnectionState::Connected(participant_id);
                for event in std::mem::take(&mut self.pending) {
                    self.forward(event, ctx);
                }
            }
            ConnectionEvent::Frame(frame) => ctx.text(frame),
            ConnectionEvent::Disconnected => {
                ctx.close(None);
                ctx.stop();
            }
        }
    }
}

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    srv_tx: web::Data<ServerTx>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, Error> {
    ws::WsResponseBuilder::new(ConnectionActor::new(srv_tx.get_ref().clone()), &req, stream)
        .frame_size(config.max_frame_size)
        .start()
}
