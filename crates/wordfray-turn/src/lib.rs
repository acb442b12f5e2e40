//! Turn logic for the Wordfray client.
//!
//! The [`TurnMachine`] owns the authoritative game state of one client: the
//! current phase, the rows typed so far, and everything learned about the
//! letters. It never touches the network. Local actions return the
//! [`ClientMessage`](wordfray_protocol::ClientMessage) to send, inbound
//! messages are fed in through [`TurnMachine::handle_message`], and every
//! visible effect goes through a [`Presenter`].
//!
//! # Key types
//!
//! - [`TurnMachine`]: phase transitions for local actions and inbound messages
//! - [`Phase`]: who may act right now
//! - [`HintAggregator`]: monotonic per-letter knowledge
//! - [`Presenter`]: the calls made into the presentation layer
//! - [`WordChecker`]: local dictionary check before a word is sent

mod error;
mod hints;
mod machine;
mod phase;
mod presenter;
mod words;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::TurnError;
pub use hints::HintAggregator;
pub use machine::{PendingReveal, TurnConfig, TurnMachine, TurnState};
pub use phase::Phase;
pub use presenter::{ActiveGrid, Banner, GridSide, Panel, Presenter, Toast};
pub use words::{AcceptAll, WordChecker, WordList};
