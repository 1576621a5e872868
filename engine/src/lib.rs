//! Link to an external UCI-style chess engine process.
//!
//! [`LineChannel`] turns the child's pipes into a non-blocking line channel,
//! [`EngineSession`] owns the child and drives its lifecycle, and [`uci`]
//! parses the responses worth interpreting.

pub mod channel;
pub mod error;
pub mod session;
pub mod uci;

pub use channel::{LineChannel, PollState};
pub use error::{ChannelError, EngineError};
pub use session::{
    EngineSession, SessionState, ShutdownOutcome, DEFAULT_HANDSHAKE_POLL_INTERVAL,
    DEFAULT_WRITE_TIMEOUT,
};
pub use uci::{EngineInfo, Score, UciError, UciMessage};

/// Token an engine sends when it has finished identifying itself.
pub const HANDSHAKE_TOKEN: &str = "uciok";
