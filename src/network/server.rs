//! WebSocket Game Server
//!
//! Async WebSocket server for multiplayer connections.
//! Handles joins, message routing and event fan-out to every client.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, RwLock, broadcast};
use tokio::sync::broadcast::error::RecvError;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use futures_util::{SinkExt, StreamExt};
use tracing::{info, warn, error, debug, instrument};
use uuid::Uuid;

use crate::core::rng::{DeterministicRng, RandomSource};
use crate::game::mode::{GameMode, GameModeKind};
use crate::game::state::{GameConfig, GameError, PlayerId};
use crate::network::protocol::{ClientMessage, ErrorCode, ServerError, ServerMessage};
use crate::network::session::{GameSession, SessionConfig, SessionError};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connections.
    pub max_connections: usize,
    /// Game rules to run.
    pub mode: GameModeKind,
    /// Word list and round budget.
    pub game: GameConfig,
    /// Countdown and scoreboard settings.
    pub session: SessionConfig,
    /// RNG seed. Drawn from the OS when absent.
    pub seed: Option<u64>,
    /// Server version string.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_connections: 1000,
            mode: GameModeKind::Standard,
            game: GameConfig::default(),
            session: SessionConfig::default(),
            seed: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Malformed configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable could not be parsed.
    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
        /// Parse failure.
        reason: String,
    },

    /// Word file could not be read.
    #[error("cannot read word file {path:?}: {source}")]
    WordFile {
        /// Configured path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl ServerConfig {
    /// Load configuration from `WORDLE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    /// Unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = parse_var(&lookup, "WORDLE_BIND_ADDR")? {
            config.bind_addr = addr;
        }
        if let Some(max) = parse_var(&lookup, "WORDLE_MAX_CONNECTIONS")? {
            config.max_connections = max;
        }
        if let Some(mode) = parse_var(&lookup, "WORDLE_MODE")? {
            config.mode = mode;
        }
        if let Some(rounds) = parse_var::<u32, _>(&lookup, "WORDLE_MAX_ROUNDS")? {
            if rounds == 0 {
                return Err(ConfigError::Invalid {
                    var: "WORDLE_MAX_ROUNDS",
                    value: rounds.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            config.game.max_rounds = rounds;
        }
        if let Some(secs) = parse_var(&lookup, "WORDLE_COUNTDOWN_SECS")? {
            config.session.countdown_secs = secs;
        }
        if let Some(limit) = parse_var(&lookup, "WORDLE_SCOREBOARD_LIMIT")? {
            config.session.scoreboard_limit = limit;
        }
        if let Some(seed) = parse_var(&lookup, "WORDLE_SEED")? {
            config.seed = Some(seed);
        }

        // The file wins over the inline list
        if let Some(path) = lookup("WORDLE_WORD_FILE") {
            let path = PathBuf::from(path);
            let contents = std::fs::read_to_string(&path)
                .map_err(|source| ConfigError::WordFile { path, source })?;
            config.game.word_list = split_words(contents.lines());
        } else if let Some(words) = lookup("WORDLE_WORDS") {
            config.game.word_list = split_words(words.split(','));
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid { var, reason: e.to_string(), value }),
    }
}

fn split_words<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<String> {
    parts
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// ERRORS
// =============================================================================

/// Game server errors.
#[derive(Debug, thiserror::Error)]
pub enum GameServerError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    BindFailed(#[from] std::io::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Configuration rejected.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Game could not be built from the configuration.
    #[error("Game setup failed: {0}")]
    Game(#[from] GameError),
}

// =============================================================================
// SERVER
// =============================================================================

/// Player bound to a connection by `join`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct JoinedPlayer {
    player_id: PlayerId,
    display_name: String,
}

/// Connected client state.
struct ConnectedClient {
    /// Connection identifier, for logs.
    connection_id: Uuid,
    /// Player after `join`.
    player_id: Option<PlayerId>,
    /// Connection time.
    connected_at: Instant,
}

/// The game server.
pub struct GameServer {
    /// Server configuration.
    config: ServerConfig,
    /// The one game session.
    session: Arc<GameSession>,
    /// Connected clients.
    clients: Arc<RwLock<BTreeMap<SocketAddr, ConnectedClient>>>,
    /// Shutdown signal.
    shutdown_tx: broadcast::Sender<()>,
}

impl GameServer {
    /// Create a new game server and its game.
    pub fn new(config: ServerConfig) -> Result<Self, GameServerError> {
        let rng: Box<dyn RandomSource> = match config.seed {
            Some(seed) => Box::new(DeterministicRng::new(seed)),
            None => Box::new(DeterministicRng::from_entropy()),
        };
        let game = GameMode::new(config.mode, &config.game, rng)?;
        let session = Arc::new(GameSession::new(game, config.session.clone()));
        Ok(Self::with_session(config, session))
    }

    /// Create a server around an existing session.
    pub fn with_session(config: ServerConfig, session: Arc<GameSession>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            session,
            clients: Arc::new(RwLock::new(BTreeMap::new())),
            shutdown_tx,
        }
    }

    /// Bind and run the server until shutdown.
    pub async fn run(&self) -> Result<(), GameServerError> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Run the accept loop on an already bound listener.
    #[instrument(skip(self, listener))]
    pub async fn serve(&self, listener: TcpListener) -> Result<(), GameServerError> {
        info!(
            "Game server v{} listening on {} ({} mode)",
            self.config.version,
            listener.local_addr()?,
            self.config.mode
        );

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            let Some(connection_id) = self.reserve_slot(addr).await else {
                                warn!("Connection limit reached, rejecting {}", addr);
                                continue;
                            };

                            info!("New connection from {} ({})", addr, connection_id);
                            self.handle_connection(stream, addr, connection_id);
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.session.shutdown().await;
        Ok(())
    }

    /// Claim a client slot, or None at the connection cap.
    ///
    /// The slot is held from accept onwards so handshakes in flight count
    /// against the cap.
    async fn reserve_slot(&self, addr: SocketAddr) -> Option<Uuid> {
        let mut clients = self.clients.write().await;
        if clients.len() >= self.config.max_connections {
            return None;
        }

        let connection_id = Uuid::new_v4();
        clients.insert(addr, ConnectedClient {
            connection_id,
            player_id: None,
            connected_at: Instant::now(),
        });
        Some(connection_id)
    }

    /// Handle a new WebSocket connection.
    fn handle_connection(&self, stream: TcpStream, addr: SocketAddr, connection_id: Uuid) {
        let clients = self.clients.clone();
        let session = self.session.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let ws_stream = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    error!("WebSocket handshake failed for {} ({}): {}", addr, connection_id, e);
                    clients.write().await.remove(&addr);
                    return;
                }
            };

            let (mut ws_sender, mut ws_receiver) = ws_stream.split();
            let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(64);
            let mut events = session.subscribe();
            let mut joined: Option<JoinedPlayer> = None;

            // Spawn message sender task
            let sender_task = tokio::spawn(async move {
                while let Some(msg) = msg_rx.recv().await {
                    let text = match msg.to_json() {
                        Ok(t) => t,
                        Err(e) => {
                            error!("Failed to serialize message: {}", e);
                            continue;
                        }
                    };
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
            });

            loop {
                tokio::select! {
                    msg = ws_receiver.next() => {
                        match msg {
                            Some(Ok(Message::Text(text))) => {
                                let reply = match ClientMessage::from_json(&text) {
                                    Ok(client_msg) => {
                                        let reply = Self::handle_client_message(
                                            &session,
                                            &mut joined,
                                            client_msg,
                                        ).await;
                                        if let ServerMessage::Joined { player_id, .. } = &reply {
                                            if let Some(client) = clients.write().await.get_mut(&addr) {
                                                client.player_id = Some(player_id.clone());
                                            }
                                        }
                                        reply
                                    }
                                    Err(e) => {
                                        debug!("Invalid message from {}: {}", addr, e);
                                        ServerMessage::Error(ServerError::new(
                                            ErrorCode::InvalidInput,
                                            "Invalid message format",
                                        ))
                                    }
                                };
                                if msg_tx.send(reply).await.is_err() {
                                    break;
                                }
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                debug!("Client {} disconnected", addr);
                                break;
                            }
                            Some(Err(e)) => {
                                error!("WebSocket error for {}: {}", addr, e);
                                break;
                            }
                            _ => {}
                        }
                    }
                    event = events.recv() => {
                        match event {
                            Ok(event) => {
                                let me = joined.as_ref().map(|p| p.player_id.as_str());
                                if event.is_for(me)
                                    && msg_tx.try_send(ServerMessage::Event { event }).is_err()
                                {
                                    debug!("Dropping event for slow client {}", addr);
                                }
                            }
                            Err(RecvError::Lagged(skipped)) => {
                                warn!("Client {} lagged, skipped {} events", addr, skipped);
                            }
                            Err(RecvError::Closed) => break,
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        let _ = msg_tx.send(ServerMessage::Shutdown {
                            reason: "Server shutting down".to_string(),
                        }).await;
                        break;
                    }
                }
            }

            // Let queued replies flush before the writer goes away
            drop(msg_tx);
            let _ = sender_task.await;

            if let Some(client) = clients.write().await.remove(&addr) {
                info!(
                    "Client {} ({}) cleaned up after {:?}, player {:?}",
                    addr,
                    client.connection_id,
                    client.connected_at.elapsed(),
                    client.player_id
                );
            }
        });
    }

    /// Handle a client message and produce the reply.
    async fn handle_client_message(
        session: &GameSession,
        joined: &mut Option<JoinedPlayer>,
        msg: ClientMessage,
    ) -> ServerMessage {
        match Self::dispatch(session, joined, msg).await {
            Ok(reply) => reply,
            Err(e) => {
                match &e {
                    SessionError::Game(game) if game.is_internal() => {
                        error!("Internal game error: {}", game)
                    }
                    _ => debug!("Request rejected: {}", e),
                }
                ServerMessage::Error(ServerError::from(&e))
            }
        }
    }

    async fn dispatch(
        session: &GameSession,
        joined: &mut Option<JoinedPlayer>,
        msg: ClientMessage,
    ) -> Result<ServerMessage, SessionError> {
        Ok(match msg {
            ClientMessage::Join { player_id, display_name } => {
                Self::handle_join(session, joined, player_id, display_name).await
            }
            ClientMessage::Ping { timestamp } => ServerMessage::Pong {
                timestamp,
                server_time: chrono::Utc::now().timestamp_millis().max(0) as u64,
            },
            ClientMessage::Guess { guess } => {
                let player = Self::require_joined(joined)?;
                ServerMessage::GuessResult(
                    session
                        .handle_guess(&player.player_id, &player.display_name, &guess)
                        .await?,
                )
            }
            ClientMessage::Status => {
                let player = Self::require_joined(joined)?;
                ServerMessage::Status(session.status(&player.player_id).await)
            }
            ClientMessage::Scoreboard { limit } => {
                Self::require_joined(joined)?;
                ServerMessage::Scoreboard { scores: session.top_scores(limit).await }
            }
            ClientMessage::UserScore => {
                let player = Self::require_joined(joined)?;
                ServerMessage::UserScore(session.user_score(&player.player_id).await?)
            }
            ClientMessage::Restart => {
                let player = Self::require_joined(joined)?;
                info!("Restart requested by {}", player.player_id);
                session.restart().await;
                ServerMessage::Restarted
            }
        })
    }

    fn require_joined(joined: &Option<JoinedPlayer>) -> Result<&JoinedPlayer, SessionError> {
        joined.as_ref().ok_or(SessionError::NotJoined)
    }

    /// Bind the connection to a player. A blank display name falls back to the id.
    async fn handle_join(
        session: &GameSession,
        joined: &mut Option<JoinedPlayer>,
        player_id: String,
        display_name: String,
    ) -> ServerMessage {
        let player_id = player_id.trim().to_string();
        if player_id.is_empty() {
            return ServerMessage::Error(ServerError::new(
                ErrorCode::InvalidInput,
                "player_id must not be empty",
            ));
        }

        let display_name = match display_name.trim() {
            "" => player_id.clone(),
            name => name.to_string(),
        };
        info!("Player {} joined as {:?}", player_id, display_name);
        *joined = Some(JoinedPlayer { player_id: player_id.clone(), display_name });

        ServerMessage::Joined {
            player_id,
            game_id: session.game_id().await,
            mode: session.mode().await,
        }
    }

    /// Signal shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Get connection count.
    pub async fn connection_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// The game session.
    pub fn session(&self) -> &Arc<GameSession> {
        &self.session
    }
}
