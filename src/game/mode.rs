//! Game Mode Dispatch
//!
//! Closed set of game modes behind one interface. The session layer only
//! ever talks to `GameMode`.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::core::rng::RandomSource;
use crate::game::absurdle::AbsurdleGame;
use crate::game::standard::StandardGame;
use crate::game::state::{GameConfig, GameError, GameState, GuessRecord, PlayerStatus};

/// Which rule set a game runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameModeKind {
    /// Shared fixed answer.
    #[default]
    Standard,
    /// Adversarial per-player candidate elimination.
    Absurdle,
}

impl fmt::Display for GameModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameModeKind::Standard => write!(f, "standard"),
            GameModeKind::Absurdle => write!(f, "absurdle"),
        }
    }
}

impl FromStr for GameModeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(GameModeKind::Standard),
            "absurdle" => Ok(GameModeKind::Absurdle),
            other => Err(format!("unknown game mode: {other}")),
        }
    }
}

/// A running game.
pub enum GameMode {
    /// Standard Wordle.
    Standard(StandardGame),
    /// Absurdle.
    Absurdle(AbsurdleGame),
}

impl GameMode {
    /// Build a game of the given kind.
    pub fn new(
        kind: GameModeKind,
        config: &GameConfig,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, GameError> {
        Ok(match kind {
            GameModeKind::Standard => GameMode::Standard(StandardGame::new(config, rng)?),
            GameModeKind::Absurdle => GameMode::Absurdle(AbsurdleGame::new(config, rng)?),
        })
    }

    /// Rule set of this game.
    pub fn kind(&self) -> GameModeKind {
        match self {
            GameMode::Standard(_) => GameModeKind::Standard,
            GameMode::Absurdle(_) => GameModeKind::Absurdle,
        }
    }

    /// Score a guess. All-or-nothing: on error nothing was recorded.
    pub fn guess(&mut self, player_id: &str, word: &str) -> Result<GuessRecord, GameError> {
        match self {
            GameMode::Standard(g) => g.guess(player_id, word),
            GameMode::Absurdle(g) => g.guess(player_id, word),
        }
    }

    /// Start a new game lifetime.
    pub fn restart_game(&mut self) {
        match self {
            GameMode::Standard(g) => g.restart_game(),
            GameMode::Absurdle(g) => g.restart_game(),
        }
    }

    /// Status for one player.
    pub fn status(&self, player_id: &str) -> PlayerStatus {
        match self {
            GameMode::Standard(g) => g.status(player_id),
            GameMode::Absurdle(g) => g.status(player_id),
        }
    }

    /// Shared state.
    pub fn state(&self) -> &GameState {
        match self {
            GameMode::Standard(g) => g.state(),
            GameMode::Absurdle(g) => g.state(),
        }
    }

    /// Current game lifetime.
    pub fn game_id(&self) -> Uuid {
        self.state().game_id()
    }

    /// Whether someone has won.
    pub fn is_game_over(&self) -> bool {
        self.state().is_game_over()
    }
}
