//! LOTR Chess board viewer.
//!
//! A terminal chessboard that decodes a FEN position, lets the user select
//! pieces with the mouse, and drives an external engine through
//! [`bridge::UiBridge`] without ever blocking the UI loop on the engine.

pub mod app;
pub mod bridge;
pub mod config;
pub mod engine_log;
pub mod geometry;
pub mod transcript;
pub mod ui;

pub use app::{Input, ViewerState};
pub use bridge::{EngineAnnotations, UiBridge, UserAction};
pub use config::{EngineLaunch, ViewerConfig};
pub use engine_log::{Direction, EngineLog, LogEntry};
pub use geometry::BoardGeometry;
pub use transcript::{save_transcript, Transcript, TranscriptError};
