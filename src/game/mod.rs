//! Game Logic Module
//!
//! Pure game engine. No I/O, no async; the session layer wraps it in locks.
//!
//! ## Module Structure
//!
//! - `outcome`: Per-letter scoring
//! - `ledger`: Per-player round history
//! - `state`: Shared game state, errors, config
//! - `standard`: Shared-answer mode
//! - `absurdle`: Adversarial candidate-elimination mode
//! - `mode`: Dispatch over the two modes
//! - `scoreboard`: Process-lifetime tallies
//! - `events`: Broadcast events

pub mod outcome;
pub mod ledger;
pub mod state;
pub mod standard;
pub mod absurdle;
pub mod mode;
pub mod scoreboard;
pub mod events;

// Re-export key types
pub use outcome::{score, LetterOutcome, OutcomeCounts};
pub use ledger::PlayerRoundLedger;
pub use state::{GameConfig, GameError, GameState, GuessRecord, PlayerId, PlayerStatus};
pub use standard::StandardGame;
pub use absurdle::{AbsurdleGame, CandidateSet};
pub use mode::{GameMode, GameModeKind};
pub use scoreboard::{PlayerScore, Scoreboard};
pub use events::GameEvent;
