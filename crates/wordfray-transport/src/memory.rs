//! In-process transport for tests.
//!
//! Every successful [`MemoryConnector::connect`] produces a
//! [`MemoryConnection`] for the client and a matching [`MemoryPeer`] that a
//! test picks up with [`MemoryConnector::accept`] and drives as if it were
//! the server. Dropping the peer looks like the server hanging up.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use tokio::sync::{Mutex, mpsc};

use crate::{Connection, ConnectionId, Connector, TransportError};

static NEXT_MEMORY_ID: AtomicU64 = AtomicU64::new(1);

struct Inner {
    reachable: AtomicBool,
    attempts: AtomicUsize,
    urls: Mutex<Vec<String>>,
    peers_tx: mpsc::UnboundedSender<MemoryPeer>,
    peers_rx: Mutex<mpsc::UnboundedReceiver<MemoryPeer>>,
}

/// A [`Connector`] whose connections terminate in the same process.
///
/// Cheap to clone; clones share the same accept queue and switches.
#[derive(Clone)]
pub struct MemoryConnector {
    inner: Arc<Inner>,
}

impl MemoryConnector {
    /// Creates a reachable connector with no pending peers.
    pub fn new() -> Self {
        let (peers_tx, peers_rx) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(Inner {
                reachable: AtomicBool::new(true),
                attempts: AtomicUsize::new(0),
                urls: Mutex::new(Vec::new()),
                peers_tx,
                peers_rx: Mutex::new(peers_rx),
            }),
        }
    }

    /// Makes subsequent connects succeed (`true`) or fail (`false`).
    pub fn set_reachable(&self, reachable: bool) {
        self.inner.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Total connect attempts so far, successful or not.
    pub fn attempts(&self) -> usize {
        self.inner.attempts.load(Ordering::SeqCst)
    }

    /// Every URL passed to `connect`, in call order.
    pub async fn attempted_urls(&self) -> Vec<String> {
        self.inner.urls.lock().await.clone()
    }

    /// Waits for the server side of the next successful connect.
    pub async fn accept(&self) -> Option<MemoryPeer> {
        self.inner.peers_rx.lock().await.recv().await
    }
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for MemoryConnector {
    type Connection = MemoryConnection;

    async fn connect(&self, url: &str) -> Result<Self::Connection, TransportError> {
        self.inner.attempts.fetch_add(1, Ordering::SeqCst);
        self.inner.urls.lock().await.push(url.to_string());

        if !self.inner.reachable.load(Ordering::SeqCst) {
            return Err(TransportError::ConnectFailed {
                url: url.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "memory endpoint unreachable",
                ),
            });
        }

        let id = ConnectionId::new(NEXT_MEMORY_ID.fetch_add(1, Ordering::Relaxed));
        let (to_peer, from_client) = mpsc::unbounded_channel();
        let (to_client, from_peer) = mpsc::unbounded_channel();

        let peer = MemoryPeer {
            id,
            url: url.to_string(),
            tx: to_client,
            rx: from_client,
        };
        // Nobody accepting is fine: the peer drops and the client sees a close.
        let _ = self.inner.peers_tx.send(peer);

        Ok(MemoryConnection {
            id,
            tx: Mutex::new(Some(to_peer)),
            rx: Mutex::new(from_peer),
        })
    }
}

/// Client side of an in-memory connection.
pub struct MemoryConnection {
    id: ConnectionId,
    tx: Mutex<Option<mpsc::UnboundedSender<String>>>,
    rx: Mutex<mpsc::UnboundedReceiver<String>>,
}

impl Connection for MemoryConnection {
    async fn send(&self, frame: &str) -> Result<(), TransportError> {
        let tx = self.tx.lock().await;
        let Some(tx) = tx.as_ref() else {
            return Err(TransportError::ConnectionClosed("closed locally".into()));
        };
        tx.send(frame.to_owned())
            .map_err(|_| TransportError::ConnectionClosed("peer hung up".into()))
    }

    async fn recv(&self) -> Result<Option<String>, TransportError> {
        Ok(self.rx.lock().await.recv().await)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.tx.lock().await.take();
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

/// Server side of an in-memory connection, driven by the test.
pub struct MemoryPeer {
    id: ConnectionId,
    url: String,
    tx: mpsc::UnboundedSender<String>,
    rx: mpsc::UnboundedReceiver<String>,
}

impl MemoryPeer {
    /// The URL the client dialed.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Matches the client's [`Connection::id`].
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Pushes a frame to the client. Returns `false` if the client is gone.
    pub fn send(&self, frame: impl Into<String>) -> bool {
        self.tx.send(frame.into()).is_ok()
    }

    /// Waits for the next frame from the client; `None` once it closed.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Takes every frame the client has already written.
    pub fn drain(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.rx.try_recv() {
            frames.push(frame);
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frames_flow_both_ways() {
        let connector = MemoryConnector::new();
        let conn = connector.connect("mem://room").await.unwrap();
        let mut peer = connector.accept().await.unwrap();

        assert_eq!(peer.url(), "mem://room");
        assert_eq!(peer.id(), conn.id());

        conn.send("hello").await.unwrap();
        assert_eq!(peer.recv().await.as_deref(), Some("hello"));

        assert!(peer.send("welcome"));
        assert_eq!(conn.recv().await.unwrap().as_deref(), Some("welcome"));
    }

    #[tokio::test]
    async fn test_dropping_peer_closes_client() {
        let connector = MemoryConnector::new();
        let conn = connector.connect("mem://room").await.unwrap();
        let peer = connector.accept().await.unwrap();
        drop(peer);

        assert!(conn.recv().await.unwrap().is_none());
        assert!(conn.send("late").await.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_connector_counts_attempts() {
        let connector = MemoryConnector::new();
        connector.set_reachable(false);

        assert!(connector.connect("mem://a").await.is_err());
        assert!(connector.connect("mem://b").await.is_err());

        assert_eq!(connector.attempts(), 2);
        assert_eq!(connector.attempted_urls().await, vec!["mem://a", "mem://b"]);
    }

    #[tokio::test]
    async fn test_close_is_seen_by_peer() {
        let connector = MemoryConnector::new();
        let conn = connector.connect("mem://room").await.unwrap();
        let mut peer = connector.accept().await.unwrap();

        conn.close().await.unwrap();
        assert!(peer.recv().await.is_none());
        assert!(conn.send("after close").await.is_err());
    }
}
