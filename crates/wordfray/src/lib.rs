//! # Wordfray
//!
//! Client core for Wordfray, a two-player word guessing duel.
//!
//! Both players guess the same hidden word on their own grid. After each
//! round they see each other's guess and may blank out one letter of it
//! before the hints arrive. The client keeps one connection to the game
//! server alive through drops, and replays what may have been lost.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wordfray::prelude::*;
//!
//! # async fn demo() -> Result<(), WordfrayError> {
//! let store = ConfigStore::new("wordfray.json");
//! let config = store.load().await?;
//!
//! let (mut client, inputs) = GameClientBuilder::new()
//!     .config(config)
//!     .store(store)
//!     .build(WebSocketConnector::new(), TracingPresenter, AcceptAll);
//!
//! let _ = inputs.send(UserInput::CreateRoom).await;
//! client.run().await;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod presenter;

pub use client::{Flow, GameClient, GameClientBuilder, UserInput};
pub use config::{ClientConfig, ConfigStore, DEFAULT_ENDPOINT};
pub use error::{ConfigError, WordfrayError};
pub use presenter::TracingPresenter;

pub mod prelude {
    pub use crate::{
        ClientConfig, ConfigError, ConfigStore, Flow, GameClient, GameClientBuilder,
        TracingPresenter, UserInput, WordfrayError,
    };
    pub use wordfray_protocol::{ClientMessage, GameOptions, HintColor, ServerMessage};
    pub use wordfray_session::{ConnectionState, SessionConfig, SessionEvent};
    pub use wordfray_transport::WebSocketConnector;
    pub use wordfray_turn::{
        AcceptAll, ActiveGrid, Banner, GridSide, Panel, Phase, Presenter, Toast, TurnConfig,
        WordChecker, WordList,
    };
}
