//! Traits the durable store implements for the session layer.
//!
//! The core never calls these inside a registry guard: services sequence
//! "detach session, then persist, then reinstall" so a slow or failing
//! backend cannot wedge a channel.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    dao::storage::StorageResult,
    state::session::{ChannelId, GameId, PlayerId, Position, SessionPlayerId, Team, UserId},
};

/// Terminal (or initial) durable status of a game row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Roster created, match still being played.
    InProgress,
    /// Match finished normally.
    Completed,
    /// Match abandoned before completion.
    Cancelled,
}

/// Durable record of games, rosters, and goals.
pub trait PersistenceGateway: Send + Sync {
    /// Allocate a new in-progress game row for the channel.
    fn create_game(&self, channel_id: ChannelId) -> BoxFuture<'static, StorageResult<GameId>>;

    /// Seat a known player in a game, returning the roster-entry id.
    fn add_roster_entry(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        team: Team,
        position: Position,
    ) -> BoxFuture<'static, StorageResult<SessionPlayerId>>;

    /// Credit one durable goal to a roster entry.
    fn record_goal(
        &self,
        session_player_id: SessionPlayerId,
    ) -> BoxFuture<'static, StorageResult<()>>;

    /// Close a game row with its final status and time span.
    fn finalize_game(
        &self,
        game_id: GameId,
        status: GameStatus,
        started_at: OffsetDateTime,
        ended_at: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<()>>;
}

/// Durable directory of players keyed by their external user id.
pub trait PlayerDirectory: Send + Sync {
    /// Look up or create the durable player for an external user.
    ///
    /// Idempotent: concurrent duplicate creates must converge on the same
    /// durable player (backends retry the lookup on an insert conflict).
    fn resolve_or_create(
        &self,
        user_id: UserId,
        display_name: String,
    ) -> BoxFuture<'static, StorageResult<PlayerId>>;
}
