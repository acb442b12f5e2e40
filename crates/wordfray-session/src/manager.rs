//! The connection manager: one transport, kept alive and replayed.
//!
//! Delivery guarantee: **at least once**. After any reconnection the last
//! message written is sent again (the drop may have eaten it), followed by
//! every message queued during the outage in FIFO order. The server and the
//! turn layer both tolerate the duplicate.

use std::collections::VecDeque;
use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use wordfray_protocol::{ClientMessage, Codec, JsonCodec, ProtocolError, ServerMessage};
use wordfray_transport::{Connection, Connector, TransportError};

use crate::error::SessionError;
use crate::session::{ConnectionState, Endpoint, Session, SessionConfig};

/// What the manager reports to the layer above.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A decoded, known message from the server.
    Inbound(ServerMessage),
    /// The established connection dropped; reconnection has been scheduled.
    ConnectionLost,
    /// Reconnection succeeded and the replay has been written.
    Reconnected,
    /// The connection dropped before the server assigned a room code, so
    /// there is nothing to reconnect to. The manager is `Disconnected`.
    Unrecoverable,
}

/// A message together with the frame it encodes to.
#[derive(Debug, Clone)]
struct Outbound {
    msg: ClientMessage,
    frame: String,
}

/// What woke the connected branch of [`ConnectionManager::next_event`].
enum Wake {
    Frame(Result<Option<String>, TransportError>),
    Keepalive,
}

/// Owns the single transport to the game server.
///
/// The manager is driven by its owner: outbound traffic goes through
/// [`send`](Self::send), and everything time- or network-driven (inbound
/// frames, keepalive pings, reconnection attempts) happens inside
/// [`next_event`](Self::next_event). `next_event` is cancel-safe, so it can
/// sit in a `tokio::select!` next to other event sources: a message is only
/// dropped from the replay queue after its write completed.
pub struct ConnectionManager<C: Connector, K: Codec = JsonCodec> {
    connector: C,
    codec: K,
    address: String,
    config: SessionConfig,
    session: Session,
    state: ConnectionState,
    connection: Option<C::Connection>,
    keepalive: Option<Interval>,

    queue: VecDeque<Outbound>,
    last_sent: Option<Outbound>,
    /// `last_sent` still has to be written again on the current transport.
    resend_last: bool,

    reconnect_at: Option<Instant>,
    reconnect_attempts: u32,
    /// A drop was detected outside `next_event` and not reported yet.
    lost_unreported: bool,
    /// A reconnection succeeded but `Reconnected` was not returned yet,
    /// e.g. because `next_event` was cancelled during the replay.
    reconnected_unreported: bool,
}

impl<C: Connector> ConnectionManager<C> {
    /// Creates a manager for the server at `address` using the JSON codec.
    pub fn new(connector: C, address: impl Into<String>, config: SessionConfig) -> Self {
        Self::with_codec(connector, JsonCodec, address, config)
    }
}

impl<C: Connector, K: Codec> ConnectionManager<C, K> {
    pub fn with_codec(
        connector: C,
        codec: K,
        address: impl Into<String>,
        config: SessionConfig,
    ) -> Self {
        Self {
            connector,
            codec,
            address: address.into(),
            config,
            session: Session::default(),
            state: ConnectionState::Disconnected,
            connection: None,
            keepalive: None,
            queue: VecDeque::new(),
            last_sent: None,
            resend_last: false,
            reconnect_at: None,
            reconnect_attempts: 0,
            lost_unreported: false,
            reconnected_unreported: false,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Records the room code the server assigned.
    pub fn set_room_code(&mut self, code: impl Into<String>) {
        self.session.room_code = Some(code.into());
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Changes the server address used by the next connection attempt.
    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = address.into();
    }

    /// The last message written to a transport, if any.
    pub fn last_sent(&self) -> Option<&ClientMessage> {
        self.last_sent.as_ref().map(|out| &out.msg)
    }

    /// Messages waiting for a live transport, oldest first.
    pub fn queued(&self) -> impl Iterator<Item = &ClientMessage> {
        self.queue.iter().map(|out| &out.msg)
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Opens a new session on a bootstrap endpoint.
    ///
    /// Anything left from a previous session is discarded first. `CreateRoom`
    /// makes this client the host; `JoinRoom` records the room code.
    ///
    /// # Errors
    /// `SessionError::ConnectFailed` if the server can't be reached. The
    /// manager stays `Disconnected` and does not retry.
    pub async fn connect(&mut self, endpoint: Endpoint) -> Result<(), SessionError> {
        self.reset().await;

        match &endpoint {
            Endpoint::CreateRoom => self.session.is_host = true,
            Endpoint::JoinRoom(code) => {
                self.session.is_host = false;
                self.session.room_code = Some(code.clone());
            }
            Endpoint::Reconnect { is_host, room_code } => {
                self.session.is_host = *is_host;
                self.session.room_code = Some(room_code.clone());
            }
        }

        let url = endpoint.url(&self.address);
        self.state = ConnectionState::Connecting;
        tracing::info!(%url, "connecting");

        match self.connector.connect(&url).await {
            Ok(conn) => {
                tracing::info!(conn_id = %conn.id(), is_host = self.session.is_host, "connected");
                self.on_connected(conn);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "initial connection failed");
                self.state = ConnectionState::Disconnected;
                Err(SessionError::ConnectFailed(e))
            }
        }
    }

    /// Closes the transport and forgets the session, including any pending
    /// reconnection and every queued message.
    pub async fn reset(&mut self) {
        if let Some(conn) = self.connection.take() {
            if let Err(e) = conn.close().await {
                tracing::debug!(error = %e, "close during reset failed");
            }
        }
        self.keepalive = None;
        self.state = ConnectionState::Disconnected;
        self.session = Session::default();
        self.queue.clear();
        self.last_sent = None;
        self.resend_last = false;
        self.reconnect_at = None;
        self.reconnect_attempts = 0;
        self.lost_unreported = false;
        self.reconnected_unreported = false;
    }

    fn on_connected(&mut self, conn: C::Connection) {
        self.connection = Some(conn);
        self.state = ConnectionState::Connected;
        self.reconnect_at = None;
        self.reconnect_attempts = 0;
        self.keepalive = self.start_keepalive();
    }

    fn start_keepalive(&self) -> Option<Interval> {
        let period = self.config.keepalive_interval;
        if period.is_zero() {
            return None;
        }
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Some(interval)
    }

    // -----------------------------------------------------------------------
    // Outbound
    // -----------------------------------------------------------------------

    /// Sends a message, or queues it for the next live transport.
    ///
    /// Never fails because of the network: a failed write queues the
    /// message and schedules reconnection. While earlier messages are still
    /// waiting, new ones queue behind them so order is kept.
    ///
    /// # Errors
    /// `SessionError::Protocol` if the message can't be encoded.
    pub async fn send(&mut self, msg: ClientMessage) -> Result<(), SessionError> {
        let frame = self.codec.encode_client(&msg)?;
        let out = Outbound { msg, frame };

        if out.msg.is_ping() {
            self.send_ping(&out.frame).await;
            return Ok(());
        }

        if self.state == ConnectionState::Connected && !self.replay_pending() {
            match self.transmit(&out.frame).await {
                Ok(()) => {
                    tracing::debug!(kind = out.msg.kind(), "sent");
                    self.last_sent = Some(out);
                }
                Err(e) => {
                    tracing::warn!(kind = out.msg.kind(), error = %e, "send failed, queued for replay");
                    self.queue.push_back(out);
                    self.begin_reconnect();
                }
            }
            return Ok(());
        }

        tracing::debug!(kind = out.msg.kind(), queued = self.queue.len() + 1, "queued");
        self.queue.push_back(out);
        if self.state == ConnectionState::Connected {
            self.flush().await;
        } else {
            self.begin_reconnect();
        }
        Ok(())
    }

    fn replay_pending(&self) -> bool {
        self.resend_last || !self.queue.is_empty()
    }

    async fn transmit(&self, frame: &str) -> Result<(), TransportError> {
        match &self.connection {
            Some(conn) => conn.send(frame).await,
            None => Err(TransportError::ConnectionClosed("no live transport".into())),
        }
    }

    async fn send_ping(&mut self, frame: &str) {
        if self.state != ConnectionState::Connected {
            return;
        }
        match self.transmit(frame).await {
            Ok(()) => tracing::trace!("keepalive ping"),
            Err(e) => {
                tracing::warn!(error = %e, "keepalive failed");
                self.begin_reconnect();
            }
        }
    }

    /// Writes the replay: `last_sent` again if flagged, then the queue.
    ///
    /// Each message leaves the queue only after its write succeeded and
    /// becomes the new `last_sent`. A failed write schedules reconnection
    /// and leaves the rest in place.
    async fn flush(&mut self) {
        if self.resend_last {
            if let Some(frame) = self.last_sent.as_ref().map(|out| out.frame.clone()) {
                if let Err(e) = self.transmit(&frame).await {
                    tracing::warn!(error = %e, "resend of last message failed");
                    self.begin_reconnect();
                    return;
                }
            }
            self.resend_last = false;
        }

        while let Some(frame) = self.queue.front().map(|out| out.frame.clone()) {
            if let Err(e) = self.transmit(&frame).await {
                tracing::warn!(error = %e, remaining = self.queue.len(), "replay interrupted");
                self.begin_reconnect();
                return;
            }
            self.last_sent = self.queue.pop_front();
        }
    }

    // -----------------------------------------------------------------------
    // Reconnection
    // -----------------------------------------------------------------------

    /// Drops the transport and schedules a reconnection attempt.
    /// Does nothing if one is already pending.
    fn begin_reconnect(&mut self) {
        if self.state == ConnectionState::ReconnectPending {
            return;
        }
        self.keepalive = None;
        self.connection = None;
        self.state = ConnectionState::ReconnectPending;
        self.lost_unreported = true;
        self.schedule_attempt();
    }

    fn schedule_attempt(&mut self) {
        let jitter = self.config.reconnect_jitter.as_millis() as u64;
        let extra = if jitter > 0 {
            Duration::from_millis(rand::rng().random_range(0..=jitter))
        } else {
            Duration::ZERO
        };
        self.reconnect_at = Some(Instant::now() + self.config.reconnect_delay + extra);
    }

    /// One reconnection attempt. Success is reported through
    /// `reconnected_unreported`; `Some` is only returned when the session
    /// cannot be recovered.
    async fn attempt_reconnect(&mut self) -> Option<SessionEvent> {
        let Some(room_code) = self.session.room_code.clone() else {
            tracing::error!("connection lost before a room code was assigned");
            self.reset().await;
            return Some(SessionEvent::Unrecoverable);
        };

        let endpoint = Endpoint::Reconnect { is_host: self.session.is_host, room_code };
        let url = endpoint.url(&self.address);
        self.reconnect_attempts += 1;
        let attempt = self.reconnect_attempts;
        tracing::info!(%url, attempt, "reconnecting");

        match self.connector.connect(&url).await {
            Ok(conn) => {
                self.on_connected(conn);
                self.resend_last = self.last_sent.is_some();
                self.reconnected_unreported = true;
                let replaying = self.queue.len() + usize::from(self.resend_last);
                tracing::info!(attempt, replaying, "reconnected");
                self.flush().await;
                None
            }
            Err(e) => {
                tracing::warn!(attempt, error = %e, "reconnect failed");
                self.schedule_attempt();
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Event loop
    // -----------------------------------------------------------------------

    /// Waits for the next thing the layer above needs to know about.
    ///
    /// While connected this reads frames and sends keepalive pings; while
    /// reconnecting it sleeps until the next attempt and dials. Malformed
    /// frames and unknown message types are logged and skipped. When there
    /// is no session this never resolves.
    pub async fn next_event(&mut self) -> SessionEvent {
        loop {
            if self.reconnected_unreported {
                self.reconnected_unreported = false;
                return SessionEvent::Reconnected;
            }
            if self.lost_unreported {
                self.lost_unreported = false;
                return SessionEvent::ConnectionLost;
            }

            match self.state {
                ConnectionState::Connected => {
                    if self.replay_pending() {
                        self.flush().await;
                        continue;
                    }

                    let wake = match self.connection.as_ref() {
                        Some(conn) => tokio::select! {
                            frame = conn.recv() => Wake::Frame(frame),
                            _ = tick(self.keepalive.as_mut()) => Wake::Keepalive,
                        },
                        None => Wake::Frame(Ok(None)),
                    };

                    match wake {
                        Wake::Frame(Ok(Some(frame))) => {
                            if let Some(msg) = self.decode(&frame) {
                                return SessionEvent::Inbound(msg);
                            }
                        }
                        Wake::Frame(Ok(None)) => {
                            tracing::info!("connection closed by server");
                            self.begin_reconnect();
                        }
                        Wake::Frame(Err(e)) => {
                            tracing::warn!(error = %e, "receive failed");
                            self.begin_reconnect();
                        }
                        Wake::Keepalive => match self.codec.encode_client(&ClientMessage::Ping {}) {
                            Ok(frame) => self.send_ping(&frame).await,
                            Err(e) => tracing::error!(error = %e, "could not encode ping"),
                        },
                    }
                }
                ConnectionState::ReconnectPending => {
                    let deadline = self.reconnect_at.unwrap_or_else(Instant::now);
                    time::sleep_until(deadline).await;
                    if let Some(event) = self.attempt_reconnect().await {
                        return event;
                    }
                }
                ConnectionState::Disconnected | ConnectionState::Connecting => {
                    std::future::pending::<()>().await;
                }
            }
        }
    }

    fn decode(&self, frame: &str) -> Option<ServerMessage> {
        match self.codec.decode_server(frame) {
            Ok(msg) => {
                tracing::debug!(kind = msg.kind(), "received");
                Some(msg)
            }
            Err(ProtocolError::UnknownType(kind)) => {
                tracing::warn!(%kind, "ignoring unknown message type");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, %frame, "dropping malformed frame");
                None
            }
        }
    }
}

async fn tick(keepalive: Option<&mut Interval>) {
    match keepalive {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
