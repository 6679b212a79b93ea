//! Game State Definitions
//!
//! Shared state and value types used by both game modes.
//! Player maps use BTreeMap for deterministic iteration order.

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use thiserror::Error;
use uuid::Uuid;

use crate::core::words::{WordList, WordListError};
use crate::game::ledger::PlayerRoundLedger;
use crate::game::outcome::{is_win, LetterOutcome};

/// Opaque player identifier supplied by the transport.
pub type PlayerId = String;

// =============================================================================
// ERRORS
// =============================================================================

/// Errors raised by game operations.
///
/// A failed guess never leaves a partial mutation behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Word list rejected at construction.
    #[error("invalid word list: {0}")]
    InvalidWordList(#[from] WordListError),

    /// Guess has the wrong length or non-letter characters.
    #[error("guess must be exactly {word_length} English letters")]
    InvalidFormat {
        /// Expected word length.
        word_length: usize,
    },

    /// Guess is not a recognized word.
    #[error("guess must be in the allowed word list")]
    NotInWordList,

    /// Guess submitted after the game ended.
    #[error("game is already over")]
    GameAlreadyOver,

    /// Player exhausted their round budget.
    #[error("player has no more rounds left")]
    NoRoundsLeft,

    /// Absurdle candidate set emptied. Internal invariant breach.
    #[error("no candidates left after guess")]
    NoCandidatesLeft,
}

impl GameError {
    /// True for server-side faults not attributable to the guess itself.
    pub fn is_internal(&self) -> bool {
        matches!(self, GameError::NoCandidatesLeft)
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Engine configuration, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Allowed words (also the answer pool).
    pub word_list: Vec<String>,
    /// Per-player round budget.
    pub max_rounds: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            word_list: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

/// Default per-player round budget.
pub const DEFAULT_MAX_ROUNDS: u32 = 6;

/// Built-in word list used when none is configured.
pub const DEFAULT_WORDS: [&str; 8] = [
    "HELLO", "WORLD", "QUITE", "FANCY", "FRESH", "PANIC", "CRAZY", "BUGGY",
];

// =============================================================================
// GUESS RECORD
// =============================================================================

/// One scored guess. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessRecord {
    /// Normalized (uppercase) guess.
    pub guess: String,
    /// One outcome per letter.
    pub results: Vec<LetterOutcome>,
    /// All letters were Hits.
    pub is_win: bool,
}

impl GuessRecord {
    /// Build a record, deriving `is_win` from the outcomes.
    pub fn new(guess: String, results: Vec<LetterOutcome>) -> Self {
        let is_win = is_win(&results);
        Self { guess, results, is_win }
    }
}

// =============================================================================
// PLAYER STATUS
// =============================================================================

/// Derived per-player view of the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatus {
    /// Game lifetime this status belongs to.
    pub game_id: Uuid,
    /// Round the player's next guess would be.
    pub current_round: u32,
    /// Rounds left for this player.
    pub remaining_rounds: u32,
    /// Configured budget.
    pub max_rounds: u32,
    /// Game-wide over flag.
    pub game_over: bool,
    /// This player has an all-Hit guess.
    pub win: bool,
    /// This player used every round without winning.
    pub lost: bool,
    /// Length of every word.
    pub word_length: usize,
    /// Revealed only once the game is over.
    pub answer: Option<String>,
    /// The player's guesses, oldest first.
    pub guess_history: Vec<GuessRecord>,
}

// =============================================================================
// GAME STATE
// =============================================================================

/// State shared by every game mode.
///
/// Only mutated through the owning mode's `guess` and `restart_game`.
#[derive(Debug, Clone)]
pub struct GameState {
    /// Allowed words.
    pub(crate) word_list: WordList,
    /// Per-player round budget.
    pub(crate) max_rounds: u32,
    /// Identifies the current game lifetime. Regenerated on restart.
    pub(crate) game_id: Uuid,
    /// Someone won.
    pub(crate) is_game_over: bool,
    /// When the game ended.
    pub(crate) game_over_at: Option<DateTime<Utc>>,
    /// First winner, set at most once per lifetime.
    pub(crate) first_winner_id: Option<PlayerId>,
    /// Answer revealed to everyone once the game is over.
    pub(crate) revealed_answer: Option<String>,
}

impl GameState {
    /// Validate the config and build a fresh state.
    pub fn new(config: &GameConfig) -> Result<Self, GameError> {
        let word_list = WordList::new(&config.word_list)?;

        Ok(Self {
            word_list,
            max_rounds: config.max_rounds,
            game_id: Uuid::new_v4(),
            is_game_over: false,
            game_over_at: None,
            first_winner_id: None,
            revealed_answer: None,
        })
    }

    /// Shared guess preamble: normalize, check format, membership and
    /// game-over. Returns the uppercase guess and its word-list index.
    pub fn validate_guess(&self, word: &str) -> Result<(String, usize), GameError> {
        let normalized = word.to_ascii_uppercase();
        let word_length = self.word_list.word_length();

        if normalized.len() != word_length || !normalized.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(GameError::InvalidFormat { word_length });
        }

        let index = self
            .word_list
            .index_of(&normalized)
            .ok_or(GameError::NotInWordList)?;

        if self.is_game_over {
            return Err(GameError::GameAlreadyOver);
        }

        Ok((normalized, index))
    }

    /// Record a win. The first winner and revealed answer stick until restart.
    pub(crate) fn handle_win(&mut self, player_id: &str, answer: &str) {
        if self.first_winner_id.is_none() {
            self.first_winner_id = Some(player_id.to_string());
            self.revealed_answer = Some(answer.to_string());
        }
        self.is_game_over = true;
        self.game_over_at.get_or_insert_with(Utc::now);
    }

    /// Reset flags and start a new lifetime.
    pub(crate) fn reset(&mut self) {
        self.game_id = Uuid::new_v4();
        self.is_game_over = false;
        self.game_over_at = None;
        self.first_winner_id = None;
        self.revealed_answer = None;
    }

    /// Derive a player's status. Players without a ledger get defaults.
    pub fn status_for(&self, ledger: Option<&PlayerRoundLedger>) -> PlayerStatus {
        let (current_round, remaining_rounds, win, lost, guess_history) = match ledger {
            Some(l) => (
                l.current_round(),
                l.remaining_rounds(),
                l.is_won(),
                l.is_lost(),
                l.records().to_vec(),
            ),
            None => (1, self.max_rounds, false, false, Vec::new()),
        };

        PlayerStatus {
            game_id: self.game_id,
            current_round,
            remaining_rounds,
            max_rounds: self.max_rounds,
            game_over: self.is_game_over,
            win,
            lost,
            word_length: self.word_length(),
            answer: self.revealed_answer().map(str::to_string),
            guess_history,
        }
    }

    /// Allowed words.
    pub fn word_list(&self) -> &WordList {
        &self.word_list
    }

    /// Length of every word.
    pub fn word_length(&self) -> usize {
        self.word_list.word_length()
    }

    /// Per-player round budget.
    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Current game lifetime.
    pub fn game_id(&self) -> Uuid {
        self.game_id
    }

    /// Whether the game is over.
    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    /// When the game ended, if it has.
    pub fn game_over_at(&self) -> Option<DateTime<Utc>> {
        self.game_over_at
    }

    /// First winner of this lifetime.
    pub fn first_winner_id(&self) -> Option<&str> {
        self.first_winner_id.as_deref()
    }

    /// Answer, only once the game is over.
    pub fn revealed_answer(&self) -> Option<&str> {
        if self.is_game_over {
            self.revealed_answer.as_deref()
        } else {
            None
        }
    }
}
