use std::time::Duration;

use actix_web::{web, App, HttpServer};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use server::admin::{AdminCommand, SessionDescription};
use server::config::ServerConfig;
use server::handlers;
use server::server::{spawn_server, spawn_server_with, ServerCommand, ServerTx};
use system::{ClientEvent, CommitPayload, ParticipantId, ServerEvent, SessionStore, Snapshot};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

/// Serves the real routes on a free local port and returns the websocket url.
fn serve(srv_tx: &ServerTx) -> String {
    let app_tx = srv_tx.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_tx.clone()))
            .app_data(web::Data::new(ServerConfig::default()))
            .configure(handlers::root)
    })
    .workers(1)
    .disable_signals()
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("ws://{}/ws/", addr)
}

async fn open(url: &str) -> Socket {
    let (socket, _) = connect_async(url).await.unwrap();
    socket
}

async fn send(socket: &mut Socket, event: ClientEvent) {
    socket
        .send(Message::text(event.encode().unwrap()))
        .await
        .unwrap();
}

async fn next_message(socket: &mut Socket) -> Option<Message> {
    tokio::time::timeout(WAIT, socket.next())
        .await
        .expect("no message in time")
        .map(|message| message.unwrap())
}

async fn next_event(socket: &mut Socket) -> ServerEvent {
    match next_message(socket).await {
        Some(Message::Text(text)) => ServerEvent::decode(text.as_str()).unwrap(),
        other => panic!("expected a text frame, got {:?}", other),
    }
}

async fn describe(srv_tx: &ServerTx) -> SessionDescription {
    let (tx, rx) = oneshot::channel();
    srv_tx
        .send(ServerCommand::Admin(AdminCommand::DescribeSession { tx }))
        .unwrap();
    rx.await.unwrap()
}

/// Connections join and leave asynchronously, so poll the session until it settles.
async fn wait_for_participants(srv_tx: &ServerTx, count: usize) -> SessionDescription {
    for _ in 0..250 {
        let description = describe(srv_tx).await;
        if description.participants.len() == count {
            return description;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("session never reached {} participants", count);
}

fn commit(snapshot: &str) -> ClientEvent {
    ClientEvent::Commit(CommitPayload {
        before: Some(Snapshot::new(snapshot)),
    })
}

#[actix_web::test]
async fn it_forwards_frames_sent_right_after_the_handshake() {
    let srv_tx = spawn_server();
    let url = serve(&srv_tx);
    let mut watcher = open(&url).await;
    wait_for_participants(&srv_tx, 1).await;

    // Nothing waits for the id, so these usually reach the actor before it has one.
    let mut drawer = open(&url).await;
    send(&mut drawer, commit("s0")).await;
    send(&mut drawer, ClientEvent::Undo).await;

    assert_eq!(next_event(&mut drawer).await, ServerEvent::Undo(None));
    assert_eq!(next_event(&mut watcher).await, ServerEvent::Undo(None));

    let description = describe(&srv_tx).await;
    assert_eq!(description.history_depth, 0);
    assert_eq!(description.redo_depth, 1);
}

#[actix_web::test]
async fn it_drops_malformed_frames_and_keeps_the_connection() {
    let srv_tx = spawn_server();
    let url = serve(&srv_tx);
    let mut socket = open(&url).await;

    for frame in &["not json", r#"{"event":"onfly","data":{}}"#, r#"{"data":{}}"#] {
        socket.send(Message::text(*frame)).await.unwrap();
    }
    socket
        .send(Message::Binary(vec![1, 2, 3].into()))
        .await
        .unwrap();
    socket.send(Message::Ping(vec![7].into())).await.unwrap();
    assert_eq!(
        next_message(&mut socket).await,
        Some(Message::Pong(vec![7].into()))
    );

    send(&mut socket, commit("s0")).await;
    send(&mut socket, ClientEvent::Undo).await;
    assert_eq!(next_event(&mut socket).await, ServerEvent::Undo(None));

    let description = wait_for_participants(&srv_tx, 1).await;
    assert_eq!(description.redo_depth, 1);
}

#[actix_web::test]
async fn it_forgets_a_participant_when_its_socket_closes() {
    let srv_tx = spawn_server();
    let url = serve(&srv_tx);
    let mut stays = open(&url).await;
    let mut leaves = open(&url).await;
    wait_for_participants(&srv_tx, 2).await;

    send(&mut leaves, commit("s0")).await;
    leaves.close(None).await.unwrap();
    wait_for_participants(&srv_tx, 1).await;

    // History outlives the participant who wrote it.
    send(&mut stays, ClientEvent::Undo).await;
    assert_eq!(next_event(&mut stays).await, ServerEvent::Undo(None));
}

#[actix_web::test]
async fn it_forgets_a_socket_dropped_right_after_the_handshake() {
    let srv_tx = spawn_server();
    let url = serve(&srv_tx);

    for _ in 0..5 {
        drop(open(&url).await);
    }

    wait_for_participants(&srv_tx, 0).await;
    assert!(describe(&srv_tx).await.participants.is_empty());
}

#[actix_web::test]
async fn it_closes_the_socket_when_no_id_is_left() {
    let mut store = SessionStore::new();
    for participant_id in 0..=ParticipantId::MAX {
        store.add_participant(participant_id);
    }
    let srv_tx = spawn_server_with(store);
    let url = serve(&srv_tx);
    let mut socket = open(&url).await;

    match tokio::time::timeout(WAIT, socket.next()).await {
        Ok(Some(Ok(Message::Close(_)))) | Ok(Some(Err(_))) | Ok(None) => (),
        other => panic!("expected the socket to close, got {:?}", other),
    }
    assert_eq!(
        describe(&srv_tx).await.participants.len(),
        ParticipantId::MAX as usize + 1
    );
}
