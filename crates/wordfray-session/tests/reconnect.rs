//! Connection manager behavior over the in-memory transport.
//!
//! All tests run on a paused clock, so keepalive and reconnection delays
//! elapse instantly and deterministically.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::timeout;
use wordfray_protocol::{ClientMessage, GameOptions, ServerMessage};
use wordfray_session::{
    ConnectionManager, ConnectionState, Endpoint, SessionConfig, SessionError, SessionEvent,
};
use wordfray_transport::{
    Connection, ConnectionId, Connector, MemoryConnection, MemoryConnector, MemoryPeer,
    TransportError,
};

const ADDRESS: &str = "game.test:4268";

fn manager(connector: &MemoryConnector) -> ConnectionManager<MemoryConnector> {
    ConnectionManager::new(connector.clone(), ADDRESS, SessionConfig::default())
}

/// The `type` field of every frame the peer has received so far.
fn kinds(peer: &mut MemoryPeer) -> Vec<String> {
    peer.drain()
        .iter()
        .map(|frame| {
            let value: serde_json::Value = serde_json::from_str(frame).unwrap();
            value["type"].as_str().unwrap().to_string()
        })
        .collect()
}

fn word(w: &str) -> ClientMessage {
    ClientMessage::Word { word: w.into() }
}

/// A host session with a known room code and its accepted peer.
async fn hosted(connector: &MemoryConnector) -> (ConnectionManager<MemoryConnector>, MemoryPeer) {
    let mut mgr = manager(connector);
    mgr.connect(Endpoint::CreateRoom).await.unwrap();
    mgr.set_room_code("zatouki");
    let peer = connector.accept().await.unwrap();
    (mgr, peer)
}

// =========================================================================
// Bootstrap
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_create_room_connects_as_host() {
    let connector = MemoryConnector::new();
    let mut mgr = manager(&connector);

    mgr.connect(Endpoint::CreateRoom).await.unwrap();
    let peer = connector.accept().await.unwrap();

    assert_eq!(peer.url(), "ws://game.test:4268/create-room");
    assert_eq!(mgr.state(), ConnectionState::Connected);
    assert!(mgr.session().is_host);
    assert_eq!(mgr.session().room_code, None);
}

#[tokio::test(start_paused = true)]
async fn test_join_room_records_code_as_guest() {
    let connector = MemoryConnector::new();
    let mut mgr = manager(&connector);

    mgr.connect(Endpoint::JoinRoom("zatouki".into())).await.unwrap();
    let peer = connector.accept().await.unwrap();

    assert_eq!(peer.url(), "ws://game.test:4268/join-room/zatouki");
    assert!(!mgr.session().is_host);
    assert_eq!(mgr.session().room_code.as_deref(), Some("zatouki"));
}

#[tokio::test(start_paused = true)]
async fn test_initial_connect_failure_is_not_retried() {
    let connector = MemoryConnector::new();
    connector.set_reachable(false);
    let mut mgr = manager(&connector);

    let result = mgr.connect(Endpoint::CreateRoom).await;
    assert!(matches!(result, Err(SessionError::ConnectFailed(_))));
    assert_eq!(mgr.state(), ConnectionState::Disconnected);

    // Nothing happens on its own afterwards.
    assert!(timeout(Duration::from_secs(10), mgr.next_event()).await.is_err());
    assert_eq!(connector.attempts(), 1);
}

// =========================================================================
// Keepalive and inbound
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_keepalive_pings_every_interval() {
    let connector = MemoryConnector::new();
    let (mut mgr, mut peer) = hosted(&connector).await;

    assert!(timeout(Duration::from_millis(2500), mgr.next_event()).await.is_err());

    assert_eq!(kinds(&mut peer), vec!["ping", "ping"]);
    assert!(mgr.last_sent().is_none(), "pings are not tracked for replay");
}

#[tokio::test(start_paused = true)]
async fn test_malformed_and_unknown_frames_are_skipped() {
    let connector = MemoryConnector::new();
    let (mut mgr, peer) = hosted(&connector).await;

    peer.send("definitely not json");
    peer.send(r#"{"type":"chat","content":"hi"}"#);
    peer.send(r#"{"type":"room-code","content":"zatouki"}"#);

    let event = mgr.next_event().await;
    assert_eq!(event, SessionEvent::Inbound(ServerMessage::RoomCode("zatouki".into())));
    assert_eq!(mgr.state(), ConnectionState::Connected);
}

// =========================================================================
// Outbound
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_send_while_connected_writes_and_tracks_last_sent() {
    let connector = MemoryConnector::new();
    let (mut mgr, mut peer) = hosted(&connector).await;

    mgr.send(word("CRANE")).await.unwrap();

    assert_eq!(kinds(&mut peer), vec!["word"]);
    assert_eq!(mgr.last_sent(), Some(&word("CRANE")));
    assert_eq!(mgr.queued().count(), 0);
}

// =========================================================================
// Reconnection and replay
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_drop_reports_lost_then_reconnects_with_role_url() {
    let connector = MemoryConnector::new();
    let (mut mgr, peer) = hosted(&connector).await;

    drop(peer);
    assert_eq!(mgr.next_event().await, SessionEvent::ConnectionLost);
    assert_eq!(mgr.state(), ConnectionState::ReconnectPending);

    assert_eq!(mgr.next_event().await, SessionEvent::Reconnected);
    let peer = connector.accept().await.unwrap();
    assert_eq!(peer.url(), "ws://game.test:4268/reconnect/zatouki/host");
    assert_eq!(mgr.state(), ConnectionState::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_guest_reconnects_on_guest_endpoint() {
    let connector = MemoryConnector::new();
    let mut mgr = manager(&connector);
    mgr.connect(Endpoint::JoinRoom("zatouki".into())).await.unwrap();
    drop(connector.accept().await.unwrap());

    assert_eq!(mgr.next_event().await, SessionEvent::ConnectionLost);
    assert_eq!(mgr.next_event().await, SessionEvent::Reconnected);

    let peer = connector.accept().await.unwrap();
    assert_eq!(peer.url(), "ws://game.test:4268/reconnect/zatouki/guest");
}

#[tokio::test(start_paused = true)]
async fn test_replay_resends_last_then_queue_in_order() {
    let connector = MemoryConnector::new();
    let (mut mgr, peer) = hosted(&connector).await;

    mgr.send(word("CRANE")).await.unwrap();
    drop(peer);
    assert_eq!(mgr.next_event().await, SessionEvent::ConnectionLost);

    mgr.send(ClientMessage::Sabotage { id: 3 }).await.unwrap();
    mgr.send(ClientMessage::RestartReady {}).await.unwrap();
    assert_eq!(mgr.queued().count(), 2);

    assert_eq!(mgr.next_event().await, SessionEvent::Reconnected);
    let mut peer = connector.accept().await.unwrap();

    assert_eq!(kinds(&mut peer), vec!["word", "sabotage", "restart-ready"]);
    assert_eq!(mgr.queued().count(), 0);
    assert_eq!(mgr.last_sent(), Some(&ClientMessage::RestartReady {}));
}

#[tokio::test(start_paused = true)]
async fn test_failed_send_is_replayed_exactly_once_before_later_messages() {
    let connector = MemoryConnector::new();
    let (mut mgr, peer) = hosted(&connector).await;

    mgr.send(word("CRANE")).await.unwrap();
    drop(peer);

    // The write fails on the dead transport; the message must not be lost.
    mgr.send(ClientMessage::Sabotage { id: 1 }).await.unwrap();
    assert_eq!(mgr.state(), ConnectionState::ReconnectPending);
    mgr.send(ClientMessage::GameOptions { options: GameOptions { timer: 10 } })
        .await
        .unwrap();

    assert_eq!(mgr.next_event().await, SessionEvent::ConnectionLost);
    assert_eq!(mgr.next_event().await, SessionEvent::Reconnected);

    let mut peer = connector.accept().await.unwrap();
    let sent = kinds(&mut peer);
    assert_eq!(sent, vec!["word", "sabotage", "game-options"]);
    assert_eq!(sent.iter().filter(|k| *k == "sabotage").count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_retries_until_server_is_back() {
    let connector = MemoryConnector::new();
    let (mut mgr, peer) = hosted(&connector).await;

    connector.set_reachable(false);
    drop(peer);
    assert_eq!(mgr.next_event().await, SessionEvent::ConnectionLost);

    // Attempts at +1s, +2s, +3s all fail.
    assert!(timeout(Duration::from_millis(3500), mgr.next_event()).await.is_err());
    assert_eq!(connector.attempts(), 4);
    assert_eq!(mgr.state(), ConnectionState::ReconnectPending);

    connector.set_reachable(true);
    assert_eq!(mgr.next_event().await, SessionEvent::Reconnected);
    assert_eq!(connector.attempts(), 5);

    let urls = connector.attempted_urls().await;
    assert!(urls[1..].iter().all(|u| u.ends_with("/reconnect/zatouki/host")));
}

#[tokio::test(start_paused = true)]
async fn test_sends_while_pending_schedule_a_single_attempt() {
    let connector = MemoryConnector::new();
    let (mut mgr, peer) = hosted(&connector).await;

    drop(peer);
    assert_eq!(mgr.next_event().await, SessionEvent::ConnectionLost);

    for id in 0..3 {
        mgr.send(ClientMessage::Sabotage { id }).await.unwrap();
    }
    assert_eq!(mgr.next_event().await, SessionEvent::Reconnected);
    assert_eq!(connector.attempts(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_drop_before_room_code_is_unrecoverable() {
    let connector = MemoryConnector::new();
    let mut mgr = manager(&connector);
    mgr.connect(Endpoint::CreateRoom).await.unwrap();
    drop(connector.accept().await.unwrap());

    assert_eq!(mgr.next_event().await, SessionEvent::ConnectionLost);
    assert_eq!(mgr.next_event().await, SessionEvent::Unrecoverable);
    assert_eq!(mgr.state(), ConnectionState::Disconnected);
    assert_eq!(connector.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reset_cancels_pending_reconnection() {
    let connector = MemoryConnector::new();
    let (mut mgr, peer) = hosted(&connector).await;

    mgr.send(word("CRANE")).await.unwrap();
    drop(peer);
    assert_eq!(mgr.next_event().await, SessionEvent::ConnectionLost);

    mgr.reset().await;

    assert!(timeout(Duration::from_secs(5), mgr.next_event()).await.is_err());
    assert_eq!(connector.attempts(), 1);
    assert_eq!(mgr.state(), ConnectionState::Disconnected);
    assert!(mgr.last_sent().is_none());
    assert_eq!(mgr.session().room_code, None);
}

// =========================================================================
// Cancellation
// =========================================================================

/// Memory transport whose writes wait for a permit, so a test can hold a
/// replay in the middle of a write.
#[derive(Clone)]
struct GatedConnector {
    inner: MemoryConnector,
    gate: Arc<Semaphore>,
}

struct GatedConnection {
    inner: MemoryConnection,
    gate: Arc<Semaphore>,
}

impl Connector for GatedConnector {
    type Connection = GatedConnection;

    async fn connect(&self, url: &str) -> Result<Self::Connection, TransportError> {
        let inner = self.inner.connect(url).await?;
        Ok(GatedConnection { inner, gate: Arc::clone(&self.gate) })
    }
}

impl Connection for GatedConnection {
    async fn send(&self, frame: &str) -> Result<(), TransportError> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| TransportError::ConnectionClosed("gate closed".into()))?;
        self.inner.send(frame).await
    }

    async fn recv(&self) -> Result<Option<String>, TransportError> {
        self.inner.recv().await
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.inner.close().await
    }

    fn id(&self) -> ConnectionId {
        self.inner.id()
    }
}

#[tokio::test(start_paused = true)]
async fn test_reconnected_survives_cancelled_replay() {
    let memory = MemoryConnector::new();
    let gate = Arc::new(Semaphore::new(1));
    let connector = GatedConnector { inner: memory.clone(), gate: Arc::clone(&gate) };
    let mut mgr = ConnectionManager::new(connector, ADDRESS, SessionConfig::default());

    mgr.connect(Endpoint::CreateRoom).await.unwrap();
    mgr.set_room_code("zatouki");
    let peer = memory.accept().await.unwrap();
    mgr.send(word("CRANE")).await.unwrap();

    // Hold every write, then lose the connection.
    let held = Arc::clone(&gate).acquire_owned().await.unwrap();
    drop(peer);
    assert_eq!(mgr.next_event().await, SessionEvent::ConnectionLost);

    // The reconnect lands at 1s and the replay blocks; give up at 2s.
    assert!(timeout(Duration::from_secs(2), mgr.next_event()).await.is_err());
    assert_eq!(mgr.state(), ConnectionState::Connected);
    assert_eq!(memory.attempts(), 2);

    drop(held);
    assert_eq!(mgr.next_event().await, SessionEvent::Reconnected);

    // The interrupted replay still goes out first.
    let mut peer = memory.accept().await.unwrap();
    mgr.send(word("TRACE")).await.unwrap();
    assert_eq!(kinds(&mut peer), vec!["word", "word"]);
    assert_eq!(mgr.last_sent(), Some(&word("TRACE")));
}
