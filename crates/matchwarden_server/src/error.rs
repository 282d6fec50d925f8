//! Error types for the match server.

use crate::ids::MatchId;
use derive_more::{Display, Error};
use tracing::instrument;

/// Why a move request was dropped.
///
/// None of these reach the offending client; the caller logs and moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Error)]
pub enum Rejection {
    /// No session under the given match id.
    #[display("Unknown match")]
    UnknownMatch,
    /// The session already reached a terminal state.
    #[display("Match is already over")]
    MatchOver,
    /// The session is still waiting for its second player.
    ///
    /// Narrows the out-of-turn case for a session with an unbound seat: it is
    /// checked before [`OutOfTurn`](Self::OutOfTurn), so any mover in an
    /// awaiting session gets this reason, including a client that holds no
    /// seat at all. Like every other rejection it is silent to clients.
    #[display("Match has not started")]
    NotStarted,
    /// The client is not the current turn holder.
    #[display("Out of turn")]
    OutOfTurn,
    /// Target cell is taken or the index is outside the board.
    #[display("Cell occupied or index invalid")]
    CellOccupiedOrInvalidIndex,
}

/// Error joining a match by explicit id.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum JoinError {
    /// Both seats are already bound to other clients.
    #[display("Match {} already has two players", _0)]
    MatchFull(#[error(not(source))] MatchId),
    /// The session was opened by tier pairing and only fills through it.
    #[display("Match {} is reserved for tier pairing", _0)]
    TierPaired(#[error(not(source))] MatchId),
}

/// The outbound collaborator can no longer accept notifications.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Dispatch failed: {}", message)]
pub struct DispatchError {
    /// What went wrong.
    pub message: String,
}

impl DispatchError {
    /// Creates a dispatch error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Configuration error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new config error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("Failed to read config file: {}", err))
    }
}

impl From<toml::de::Error> for ConfigError {
    #[track_caller]
    fn from(err: toml::de::Error) -> Self {
        Self::new(format!("Failed to parse config: {}", err))
    }
}
