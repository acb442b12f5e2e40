//! Connection lifecycle for the Wordfray client.
//!
//! This crate keeps one transport to the game server alive:
//!
//! 1. **Bootstrap**: open the create-room or join-room endpoint
//!    ([`ConnectionManager::connect`])
//! 2. **Keepalive**: a `ping` on a fixed interval while connected
//! 3. **Reconnection**: after a drop, wait, dial the reconnect endpoint,
//!    and replay what may not have arrived (the last message sent, then
//!    everything queued during the outage, in order)
//!
//! # How it fits in the stack
//!
//! ```text
//! Turn layer (above)  ← consumes ServerMessages, produces ClientMessages
//!     ↕
//! Session layer (this crate)  ← delivery guarantees, lifecycle events
//!     ↕
//! Protocol + Transport (below)  ← frames and the codec that reads them
//! ```

mod error;
mod manager;
mod session;

pub use error::SessionError;
pub use manager::{ConnectionManager, SessionEvent};
pub use session::{ConnectionState, Endpoint, Session, SessionConfig};
