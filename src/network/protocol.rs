//! Protocol Messages
//!
//! Wire format for client-server communication over WebSocket.
//! Every frame is a JSON text message tagged by `type`.

use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::game::events::GameEvent;
use crate::game::mode::GameModeKind;
use crate::game::outcome::LetterOutcome;
use crate::game::scoreboard::PlayerScore;
use crate::game::state::{GameError, GuessRecord, PlayerStatus};
use crate::network::session::SessionError;

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Bind this connection to a player. Must come first.
    Join {
        /// Stable player identifier.
        player_id: String,
        /// Name shown to other players.
        display_name: String,
    },

    /// Submit a guess.
    Guess {
        /// Word to guess; case-insensitive.
        guess: String,
    },

    /// Request the player's current status.
    Status,

    /// Request the top scores.
    Scoreboard {
        /// Falls back to the server default when absent.
        #[serde(default)]
        limit: Option<usize>,
    },

    /// Request the player's own score.
    UserScore,

    /// Administrative restart.
    Restart,

    /// Ping for latency measurement.
    Ping {
        /// Client clock, echoed back in the pong.
        timestamp: u64,
    },
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Join accepted.
    Joined {
        /// Player bound to this connection.
        player_id: String,
        /// Current game lifetime.
        game_id: Uuid,
        /// Rule set being played.
        mode: GameModeKind,
    },

    /// Result of a guess.
    GuessResult(GuessResponse),

    /// Current status.
    Status(GuessResponse),

    /// Top scores, best first.
    Scoreboard {
        /// Ranked entries.
        scores: Vec<PlayerScore>,
    },

    /// The requesting player's score.
    UserScore(PlayerScore),

    /// Administrative restart done.
    Restarted,

    /// Broadcast game event.
    Event {
        /// The broadcast payload.
        event: GameEvent,
    },

    /// Pong response.
    Pong {
        /// Timestamp from the matching ping.
        timestamp: u64,
        /// Server clock in milliseconds since the Unix epoch.
        server_time: u64,
    },

    /// Error message.
    Error(ServerError),

    /// Server is shutting down.
    Shutdown {
        /// Why the server is going away.
        reason: String,
    },
}

/// Player-facing view after a guess or status request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessResponse {
    /// The scored guess; empty for status requests.
    pub guess: String,
    /// Outcomes of the scored guess; absent for status requests.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub results: Option<Vec<LetterOutcome>>,
    /// Every guess this game lifetime, oldest first.
    pub guess_history: Vec<GuessRecord>,
    /// Round the next guess would be.
    pub current_round: u32,
    /// Rounds left.
    pub remaining_rounds: u32,
    /// Configured budget.
    pub max_rounds: u32,
    /// Someone won.
    pub game_over: bool,
    /// This player won.
    pub win: bool,
    /// This player ran out of rounds.
    pub lost: bool,
    /// Length of every word.
    pub word_length: usize,
    /// Revealed answer, only once the game is over.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub answer: Option<String>,
}

impl GuessResponse {
    /// Response for a freshly scored guess.
    pub fn for_guess(record: GuessRecord, status: PlayerStatus) -> Self {
        let mut response = Self::for_status(status);
        response.guess = record.guess;
        response.results = Some(record.results);
        response
    }

    /// Response for a status request.
    pub fn for_status(status: PlayerStatus) -> Self {
        Self {
            guess: String::new(),
            results: None,
            guess_history: status.guess_history,
            current_round: status.current_round,
            remaining_rounds: status.remaining_rounds,
            max_rounds: status.max_rounds,
            game_over: status.game_over,
            win: status.win,
            lost: status.lost,
            word_length: status.word_length,
            answer: status.answer.filter(|_| status.game_over),
        }
    }
}

/// Server error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerError {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Wrong length or non-letter characters.
    InvalidFormat,
    /// Word is not in the allowed list.
    NotInWordList,
    /// Game already won; wait for the restart.
    GameAlreadyOver,
    /// Player used every round.
    NoRoundsLeft,
    /// Operation needs a prior `join`.
    NotJoined,
    /// No scoreboard entry for the player.
    ScoreNotFound,
    /// Malformed message.
    InvalidInput,
    /// Internal error.
    InternalError,
}

impl From<&GameError> for ErrorCode {
    fn from(err: &GameError) -> Self {
        match err {
            GameError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            GameError::NotInWordList => ErrorCode::NotInWordList,
            GameError::GameAlreadyOver => ErrorCode::GameAlreadyOver,
            GameError::NoRoundsLeft => ErrorCode::NoRoundsLeft,
            GameError::InvalidWordList(_) | GameError::NoCandidatesLeft => ErrorCode::InternalError,
        }
    }
}

impl From<&SessionError> for ServerError {
    fn from(err: &SessionError) -> Self {
        let code = match err {
            SessionError::Game(e) => ErrorCode::from(e),
            SessionError::NotJoined => ErrorCode::NotJoined,
            SessionError::ScoreNotFound(_) => ErrorCode::ScoreNotFound,
        };
        // Internal faults are not described to clients
        let message = if code == ErrorCode::InternalError {
            "internal server error".to_string()
        } else {
            err.to_string()
        };
        Self { code, message }
    }
}

impl ServerError {
    /// Error with an explicit code.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
