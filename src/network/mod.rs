//! Network Layer
//!
//! WebSocket server and the shared game session.
//! All game rules live in `game/`; this layer adds locking, broadcast and I/O.

pub mod protocol;
pub mod session;
pub mod server;

pub use protocol::{ClientMessage, ServerMessage, GuessResponse, ServerError, ErrorCode};
pub use session::{GameSession, SessionConfig, SessionError, CountdownStatus};
pub use server::{GameServer, ServerConfig, GameServerError, ConfigError};
