//! Error types shared across the state and service layers.

use thiserror::Error;

use crate::{
    dao::storage::StorageError,
    state::session::{SessionKind, SessionPlayerId, UserId},
};

/// Recoverable, user-facing refusals of a session operation.
///
/// Every variant is an expected outcome the transport layer turns into user
/// feedback (or silently ignores); none of them indicates a fault and none of
/// them leaves the registry in an inconsistent state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// A session already occupies the channel, so a new one cannot start.
    #[error("channel already has an active session")]
    ChannelBusy,
    /// The operation targets a channel with no active session.
    #[error("no active session in this channel")]
    SessionNotFound,
    /// A lobby-only operation hit a game, or vice versa.
    #[error("operation requires a {expected} session but found a {actual}")]
    WrongSessionKind {
        /// Kind the operation is defined for.
        expected: SessionKind,
        /// Kind actually live in the channel.
        actual: SessionKind,
    },
    /// The acting user is not one of the seated participants.
    #[error("user `{0}` is not part of this session")]
    PlayerNotInSession(UserId),
    /// A fifth distinct player tried to join a full lobby.
    #[error("the lobby is already full")]
    LobbyFull,
    /// Promotion was attempted before four ready players were seated.
    #[error("the lobby does not have four ready players")]
    LobbyNotFull,
    /// A set win was declared without meeting the score-and-margin threshold.
    #[error("score {blue}:{red} does not satisfy the win condition")]
    NotWinnable {
        /// Blue team score at the time of the declaration.
        blue: u32,
        /// Red team score at the time of the declaration.
        red: u32,
    },
    /// A goal was recorded against a roster entry that does not exist.
    #[error("no roster entry `{0}` in this game")]
    PlayerNotFound(SessionPlayerId),
}

/// Errors surfaced by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The operation was refused; in-memory state is unchanged or consistently
    /// advanced, never half-transitioned.
    #[error(transparent)]
    Rejected(#[from] Rejection),
    /// The durable store failed; in-memory invariants still hold and the
    /// caller decides whether to retry or surface the fault.
    #[error("storage failure")]
    Storage(#[from] StorageError),
}

impl ServiceError {
    /// Borrow the rejection when the error is one.
    pub fn as_rejection(&self) -> Option<&Rejection> {
        match self {
            ServiceError::Rejected(rejection) => Some(rejection),
            ServiceError::Storage(_) => None,
        }
    }
}
