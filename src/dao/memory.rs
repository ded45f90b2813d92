//! In-memory backend for tests and deployments without a durable store.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    dao::{
        gateway::{GameStatus, PersistenceGateway, PlayerDirectory},
        storage::{StorageError, StorageResult},
    },
    state::session::{ChannelId, GameId, PlayerId, Position, SessionPlayerId, Team, UserId},
};

/// Durable image of one game row.
#[derive(Debug, Clone)]
pub struct GameRecord {
    /// Channel the game was played in.
    pub channel_id: ChannelId,
    /// Current durable status.
    pub status: GameStatus,
    /// Start of the recorded time span, set on finalization.
    pub started_at: Option<OffsetDateTime>,
    /// End of the recorded time span, set on finalization.
    pub ended_at: Option<OffsetDateTime>,
}

/// Durable image of one roster entry.
#[derive(Debug, Clone)]
pub struct RosterRecord {
    /// Game the entry belongs to.
    pub game_id: GameId,
    /// Durable player seated here.
    pub player_id: PlayerId,
    /// Side the player was seated on.
    pub team: Team,
    /// Seat within the team.
    pub position: Position,
    /// Durable goal counter.
    pub goals: u32,
}

#[derive(Debug, Default)]
struct Inner {
    players: DashMap<UserId, PlayerId>,
    games: DashMap<GameId, GameRecord>,
    roster: DashMap<SessionPlayerId, RosterRecord>,
}

/// Keyed-map store implementing both persistence traits.
///
/// Cheap to clone; all clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Durable image of a game row, if it exists.
    pub fn game(&self, game_id: GameId) -> Option<GameRecord> {
        self.inner.games.get(&game_id).map(|entry| entry.clone())
    }

    /// Durable goal counter of one roster entry.
    pub fn goals_for(&self, session_player_id: SessionPlayerId) -> Option<u32> {
        self.inner
            .roster
            .get(&session_player_id)
            .map(|entry| entry.goals)
    }

    /// Roster entries persisted for one game.
    pub fn roster_of(&self, game_id: GameId) -> Vec<RosterRecord> {
        self.inner
            .roster
            .iter()
            .filter(|entry| entry.game_id == game_id)
            .map(|entry| entry.clone())
            .collect()
    }

    /// Number of distinct durable players.
    pub fn player_count(&self) -> usize {
        self.inner.players.len()
    }
}

impl PersistenceGateway for InMemoryStore {
    fn create_game(&self, channel_id: ChannelId) -> BoxFuture<'static, StorageResult<GameId>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            let game_id = Uuid::new_v4();
            inner.games.insert(
                game_id,
                GameRecord {
                    channel_id,
                    status: GameStatus::InProgress,
                    started_at: None,
                    ended_at: None,
                },
            );
            Ok(game_id)
        })
    }

    fn add_roster_entry(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        team: Team,
        position: Position,
    ) -> BoxFuture<'static, StorageResult<SessionPlayerId>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            if !inner.games.contains_key(&game_id) {
                return Err(StorageError::Missing(format!("game `{game_id}`")));
            }
            let session_player_id = Uuid::new_v4();
            inner.roster.insert(
                session_player_id,
                RosterRecord {
                    game_id,
                    player_id,
                    team,
                    position,
                    goals: 0,
                },
            );
            Ok(session_player_id)
        })
    }

    fn record_goal(
        &self,
        session_player_id: SessionPlayerId,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            let mut entry = inner
                .roster
                .get_mut(&session_player_id)
                .ok_or_else(|| StorageError::Missing(format!("roster entry `{session_player_id}`")))?;
            entry.goals += 1;
            Ok(())
        })
    }

    fn finalize_game(
        &self,
        game_id: GameId,
        status: GameStatus,
        started_at: OffsetDateTime,
        ended_at: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            let mut entry = inner
                .games
                .get_mut(&game_id)
                .ok_or_else(|| StorageError::Missing(format!("game `{game_id}`")))?;
            entry.status = status;
            entry.started_at = Some(started_at);
            entry.ended_at = Some(ended_at);
            Ok(())
        })
    }
}

impl PlayerDirectory for InMemoryStore {
    fn resolve_or_create(
        &self,
        user_id: UserId,
        _display_name: String,
    ) -> BoxFuture<'static, StorageResult<PlayerId>> {
        let inner = Arc::clone(&self.inner);
        // The entry API makes concurrent duplicate creates converge on one id.
        Box::pin(async move { Ok(*inner.players.entry(user_id).or_insert_with(Uuid::new_v4)) })
    }
}
