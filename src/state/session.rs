//! Shared value types for channel sessions.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::Rejection,
    state::{game::GameSession, lobby::LobbySession},
};

/// Identifier of the game row allocated by the persistence layer.
pub type GameId = Uuid;
/// Durable identifier of a known player.
pub type PlayerId = Uuid;
/// Identifier of one roster entry (player seated in one specific game).
pub type SessionPlayerId = Uuid;

/// External grouping key under which at most one session may be active.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ChannelId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Identifier of a user as known to the external messaging platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Opaque reference to the rendered session message, owned by the transport.
///
/// The transport sets it once after the first render so later updates can
/// target the same message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef(pub String);

impl From<&str> for MessageRef {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// One of the two fixed sides of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    /// The blue side.
    Blue,
    /// The red side.
    Red,
}

impl Team {
    /// The other side.
    pub fn opponent(self) -> Team {
        match self {
            Team::Blue => Team::Red,
            Team::Red => Team::Blue,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Blue => write!(f, "blue"),
            Team::Red => write!(f, "red"),
        }
    }
}

/// Seat a player occupies within a team; a full team has one of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    /// Defends the goal.
    Goalie,
    /// Plays the offensive rods.
    Forward,
}

impl Position {
    /// The seat this one swaps with.
    pub fn swapped(self) -> Position {
        match self {
            Position::Goalie => Position::Forward,
            Position::Forward => Position::Goalie,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Goalie => write!(f, "goalie"),
            Position::Forward => write!(f, "forward"),
        }
    }
}

/// Discriminant of a [`ChannelSession`], used in rejections and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// Pre-game roster-building phase.
    Lobby,
    /// In-progress scoring phase.
    Game,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Lobby => write!(f, "lobby"),
            SessionKind::Game => write!(f, "game"),
        }
    }
}

/// The single live session a channel can hold.
///
/// A channel is either idle (no entry in the registry), forming a lobby, or
/// running a game. The registry upholds the one-variant-per-channel invariant;
/// this enum makes the remaining states unrepresentable.
#[derive(Debug, Clone)]
pub enum ChannelSession {
    /// Roster-building phase, up to four players.
    Lobby(LobbySession),
    /// Fixed four-player roster with running scores.
    Game(GameSession),
}

impl ChannelSession {
    /// Which variant this session is.
    pub fn kind(&self) -> SessionKind {
        match self {
            ChannelSession::Lobby(_) => SessionKind::Lobby,
            ChannelSession::Game(_) => SessionKind::Game,
        }
    }

    /// Channel the session belongs to.
    pub fn channel_id(&self) -> &ChannelId {
        match self {
            ChannelSession::Lobby(lobby) => lobby.channel_id(),
            ChannelSession::Game(game) => game.channel_id(),
        }
    }

    /// Borrow the lobby or reject with the actual kind.
    pub fn as_lobby(&self) -> Result<&LobbySession, Rejection> {
        match self {
            ChannelSession::Lobby(lobby) => Ok(lobby),
            ChannelSession::Game(_) => Err(Rejection::WrongSessionKind {
                expected: SessionKind::Lobby,
                actual: SessionKind::Game,
            }),
        }
    }

    /// Mutably borrow the lobby or reject with the actual kind.
    pub fn as_lobby_mut(&mut self) -> Result<&mut LobbySession, Rejection> {
        match self {
            ChannelSession::Lobby(lobby) => Ok(lobby),
            ChannelSession::Game(_) => Err(Rejection::WrongSessionKind {
                expected: SessionKind::Lobby,
                actual: SessionKind::Game,
            }),
        }
    }

    /// Borrow the game or reject with the actual kind.
    pub fn as_game(&self) -> Result<&GameSession, Rejection> {
        match self {
            ChannelSession::Game(game) => Ok(game),
            ChannelSession::Lobby(_) => Err(Rejection::WrongSessionKind {
                expected: SessionKind::Game,
                actual: SessionKind::Lobby,
            }),
        }
    }

    /// Mutably borrow the game or reject with the actual kind.
    pub fn as_game_mut(&mut self) -> Result<&mut GameSession, Rejection> {
        match self {
            ChannelSession::Game(game) => Ok(game),
            ChannelSession::Lobby(_) => Err(Rejection::WrongSessionKind {
                expected: SessionKind::Game,
                actual: SessionKind::Lobby,
            }),
        }
    }

    /// Record the transport's message reference; the first write wins.
    pub fn set_message_ref(&mut self, message_ref: MessageRef) {
        match self {
            ChannelSession::Lobby(lobby) => lobby.set_message_ref(message_ref),
            ChannelSession::Game(game) => game.set_message_ref(message_ref),
        }
    }
}
