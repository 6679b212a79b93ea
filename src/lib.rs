//! # Wordle Arena
//!
//! Multiplayer Wordle and Absurdle engine with a WebSocket front end.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    WORDLE ARENA SERVER                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                                │
//! │  ├── rng.rs      - Xorshift128+ PRNG behind RandomSource     │
//! │  └── words.rs    - Validated, indexed word list              │
//! │                                                              │
//! │  game/           - Game engine (sync, no I/O)                │
//! │  ├── outcome.rs  - Letter scoring                            │
//! │  ├── ledger.rs   - Per-player round history                  │
//! │  ├── state.rs    - Shared state, errors, config              │
//! │  ├── standard.rs - Shared-answer mode                        │
//! │  ├── absurdle.rs - Adversarial candidate elimination         │
//! │  ├── mode.rs     - Mode dispatch                             │
//! │  ├── scoreboard.rs - Process-lifetime tallies                │
//! │  └── events.rs   - Broadcast events                          │
//! │                                                              │
//! │  network/        - Networking (async)                        │
//! │  ├── server.rs   - WebSocket server, env config              │
//! │  ├── protocol.rs - Message types                             │
//! │  └── session.rs  - Locks, broadcast, win countdown           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! The engine in `game/` is plain synchronous code with `&mut self`
//! mutation. `network::GameSession` serializes access to it behind a
//! `tokio::sync::RwLock`, keeps the scoreboard behind its own lock, and owns
//! the single countdown task that restarts the game after a win.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use core::rng::{DeterministicRng, RandomSource};
pub use core::words::WordList;
pub use game::{GameConfig, GameError, GameMode, GameModeKind, GuessRecord, LetterOutcome, PlayerStatus};
pub use network::{GameServer, GameSession, ServerConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
