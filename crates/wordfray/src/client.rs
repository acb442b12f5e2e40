//! `GameClient` builder and event loop.
//!
//! This ties the layers together: user input and server events come in,
//! the turn machine decides, the connection manager delivers.

use tokio::sync::mpsc;
use tokio::time;
use wordfray_protocol::{ClientMessage, GameOptions, ServerMessage};
use wordfray_session::{ConnectionManager, ConnectionState, Endpoint, SessionConfig, SessionEvent};
use wordfray_transport::Connector;
use wordfray_turn::{
    AcceptAll, Panel, PendingReveal, Presenter, Toast, TurnConfig, TurnMachine, WordChecker,
};

use crate::{ClientConfig, ConfigStore, WordfrayError};

/// Capacity of the user input channel.
const INPUT_BUFFER: usize = 64;

/// Something the player did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    CreateRoom,
    /// Join by code; surrounding whitespace and case are ignored.
    JoinRoom(String),
    Letter(char),
    Backspace,
    Enter,
    /// Hide one letter of the opponent's row; `row` defaults to the
    /// current one.
    Sabotage { column: usize, row: Option<usize> },
    ConfirmRestart,
    /// Change the turn timer, in seconds.
    SetTimer(u32),
    /// Change the server address for the next connection.
    SetEndpoint(String),
    /// Leave the room and return to the start panel.
    BackToStart,
    Quit,
}

/// Whether [`GameClient::step`] wants to be called again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// What woke [`GameClient::step`].
enum Wake {
    Input(Option<UserInput>),
    Session(SessionEvent),
    Reveal(u64),
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring a [`GameClient`].
///
/// # Example
///
/// ```rust,ignore
/// let (mut client, inputs) = GameClientBuilder::new()
///     .config(config)
///     .store(ConfigStore::new("wordfray.json"))
///     .build(WebSocketConnector::new(), TracingPresenter, AcceptAll);
/// inputs.send(UserInput::CreateRoom).await?;
/// client.run().await;
/// ```
pub struct GameClientBuilder {
    config: ClientConfig,
    session_config: SessionConfig,
    turn_config: TurnConfig,
    store: Option<ConfigStore>,
}

impl GameClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            session_config: SessionConfig::default(),
            turn_config: TurnConfig::default(),
            store: None,
        }
    }

    /// Sets the persisted settings (endpoint and game options).
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets keepalive and reconnection timing.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Sets the visual reveal delay.
    pub fn turn_config(mut self, config: TurnConfig) -> Self {
        self.turn_config = config;
        self
    }

    /// Saves settings changes to `store`. Without one, changes last only
    /// for this run.
    pub fn store(mut self, store: ConfigStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Builds the client and the sender its input is read from.
    pub fn build<C, P, W>(
        self,
        connector: C,
        presenter: P,
        words: W,
    ) -> (GameClient<C, P, W>, mpsc::Sender<UserInput>)
    where
        C: Connector,
        P: Presenter,
        W: WordChecker,
    {
        let (tx, rx) = mpsc::channel(INPUT_BUFFER);
        let session =
            ConnectionManager::new(connector, self.config.endpoint.clone(), self.session_config);
        let turn = TurnMachine::with_words(presenter, words, self.turn_config);

        let client = GameClient {
            session,
            turn,
            config: self.config,
            store: self.store,
            inputs: rx,
        };
        (client, tx)
    }
}

impl Default for GameClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// GameClient
// ---------------------------------------------------------------------------

/// One player's client: a connection, a game, and an input queue.
///
/// Everything runs on the task that calls [`run`](Self::run) (or
/// [`step`](Self::step)); handlers never overlap.
pub struct GameClient<C: Connector, P: Presenter, W: WordChecker = AcceptAll> {
    session: ConnectionManager<C>,
    turn: TurnMachine<P, W>,
    config: ClientConfig,
    store: Option<ConfigStore>,
    inputs: mpsc::Receiver<UserInput>,
}

impl<C: Connector, P: Presenter, W: WordChecker> GameClient<C, P, W> {
    pub fn session(&self) -> &ConnectionManager<C> {
        &self.session
    }

    pub fn turn(&self) -> &TurnMachine<P, W> {
        &self.turn
    }

    pub fn presenter(&self) -> &P {
        self.turn.presenter()
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        self.turn.presenter_mut()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Processes events until the player quits or every input sender is
    /// dropped. Errors from individual events are logged, never fatal.
    pub async fn run(&mut self) {
        tracing::info!(endpoint = %self.config.endpoint, "client running");
        loop {
            match self.step().await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(WordfrayError::Turn(e)) => tracing::debug!(error = %e, "ignored"),
                Err(e) => tracing::warn!(error = %e, "event failed"),
            }
        }
        tracing::info!("client stopped");
    }

    /// Waits for and handles exactly one event: a user input, something
    /// from the server or the connection, or the visual reveal firing.
    pub async fn step(&mut self) -> Result<Flow, WordfrayError> {
        let reveal = self.turn.pending_reveal();
        let wake = tokio::select! {
            input = self.inputs.recv() => Wake::Input(input),
            event = self.session.next_event() => Wake::Session(event),
            token = reveal_elapsed(reveal) => Wake::Reveal(token),
        };

        match wake {
            Wake::Input(None) => {
                tracing::debug!("input closed");
                self.session.reset().await;
                Ok(Flow::Quit)
            }
            Wake::Input(Some(input)) => self.handle_input(input).await,
            Wake::Session(event) => {
                self.handle_event(event).await?;
                Ok(Flow::Continue)
            }
            Wake::Reveal(token) => {
                self.turn.on_reveal_elapsed(token);
                Ok(Flow::Continue)
            }
        }
    }

    // -----------------------------------------------------------------------
    // User input
    // -----------------------------------------------------------------------

    async fn handle_input(&mut self, input: UserInput) -> Result<Flow, WordfrayError> {
        match input {
            UserInput::CreateRoom => self.create_room().await?,
            UserInput::JoinRoom(code) => self.join_room(&code).await?,
            UserInput::Letter(letter) => {
                self.turn.type_letter(letter);
            }
            UserInput::Backspace => {
                self.turn.backspace();
            }
            UserInput::Enter => {
                let msg = self.turn.submit()?;
                self.session.send(msg).await?;
            }
            UserInput::Sabotage { column, row } => {
                let row = row.unwrap_or_else(|| self.turn.state().row());
                let msg = self.turn.sabotage(column, row)?;
                self.session.send(msg).await?;
            }
            UserInput::ConfirmRestart => {
                let msg = self.turn.confirm_restart()?;
                self.session.send(msg).await?;
            }
            UserInput::SetTimer(timer) => self.set_options(GameOptions { timer }).await?,
            UserInput::SetEndpoint(endpoint) => {
                tracing::info!(%endpoint, "endpoint changed");
                self.session.set_address(endpoint.clone());
                self.config.endpoint = endpoint;
                self.persist().await?;
            }
            UserInput::BackToStart => self.leave().await,
            UserInput::Quit => {
                self.session.reset().await;
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    async fn create_room(&mut self) -> Result<(), WordfrayError> {
        self.turn.reset_session();
        if let Err(e) = self.session.connect(Endpoint::CreateRoom).await {
            self.turn.presenter_mut().show_toast(Toast::RoomCreationFailed);
            return Err(e.into());
        }
        self.session
            .send(ClientMessage::GameOptions { options: self.config.options })
            .await?;
        Ok(())
    }

    async fn join_room(&mut self, code: &str) -> Result<(), WordfrayError> {
        let code = code.trim().to_lowercase();
        if code.is_empty() {
            self.turn.presenter_mut().show_toast(Toast::RoomJoinFailed);
            return Ok(());
        }

        self.turn.reset_session();
        if let Err(e) = self.session.connect(Endpoint::JoinRoom(code)).await {
            self.turn.presenter_mut().show_toast(Toast::RoomJoinFailed);
            return Err(e.into());
        }
        self.turn.start_game();
        Ok(())
    }

    async fn set_options(&mut self, options: GameOptions) -> Result<(), WordfrayError> {
        let options = options.validated();
        self.config.options = options;
        if self.session.state() != ConnectionState::Disconnected {
            self.session.send(ClientMessage::GameOptions { options }).await?;
        }
        self.persist().await
    }

    async fn leave(&mut self) {
        tracing::info!("leaving room");
        self.session.reset().await;
        self.turn.reset_session();
        self.turn.presenter_mut().show_panel(Panel::Start);
    }

    async fn persist(&self) -> Result<(), WordfrayError> {
        if let Some(store) = &self.store {
            store.save(&self.config).await?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Session events
    // -----------------------------------------------------------------------

    async fn handle_event(&mut self, event: SessionEvent) -> Result<(), WordfrayError> {
        match event {
            SessionEvent::Inbound(msg) => {
                if let ServerMessage::RoomCode(code) = &msg {
                    self.session.set_room_code(code.clone());
                }
                self.turn.handle_message(msg)?;
            }
            SessionEvent::ConnectionLost => {
                self.turn.presenter_mut().show_toast(Toast::ConnectionLost);
            }
            SessionEvent::Reconnected => {
                self.turn.presenter_mut().show_toast(Toast::Reconnected);
            }
            SessionEvent::Unrecoverable => {
                self.turn.presenter_mut().show_toast(Toast::ConnectionLost);
                self.leave().await;
            }
        }
        Ok(())
    }
}

async fn reveal_elapsed(reveal: Option<PendingReveal>) -> u64 {
    match reveal {
        Some(reveal) => {
            time::sleep_until(reveal.deadline).await;
            reveal.token
        }
        None => std::future::pending().await,
    }
}
