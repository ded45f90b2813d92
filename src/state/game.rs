//! In-progress game: fixed four-player roster with running scores.

use indexmap::IndexMap;
use time::OffsetDateTime;

use crate::{
    config::ScoringRules,
    error::Rejection,
    state::session::{ChannelId, GameId, MessageRef, Position, SessionPlayerId, Team, UserId},
};

/// One seated player of an in-progress game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamePlayer {
    /// Roster-entry identifier allocated by the persistence layer.
    pub session_player_id: SessionPlayerId,
    /// Identifier on the external messaging platform.
    pub user_id: UserId,
    /// Name shown when rendering the scoreboard.
    pub display_name: String,
    /// Side the player is seated on.
    pub team: Team,
    /// Seat within the team.
    pub position: Position,
    /// Goals scored so far; strictly additive.
    pub goals: u32,
}

/// Scoring state for one channel's running game.
///
/// The roster is fixed at creation (two per team, one goalie and one forward
/// each) and kept in seat order. Team scores are always recomputed from the
/// per-player counters, never stored redundantly.
#[derive(Debug, Clone)]
pub struct GameSession {
    game_id: GameId,
    channel_id: ChannelId,
    message_ref: Option<MessageRef>,
    started_at: OffsetDateTime,
    blue_set_wins: u32,
    red_set_wins: u32,
    players: IndexMap<SessionPlayerId, GamePlayer>,
}

impl GameSession {
    /// Build a game from an already-persisted roster.
    pub fn new(game_id: GameId, channel_id: ChannelId, roster: Vec<GamePlayer>) -> Self {
        Self {
            game_id,
            channel_id,
            message_ref: None,
            started_at: OffsetDateTime::now_utc(),
            blue_set_wins: 0,
            red_set_wins: 0,
            players: roster
                .into_iter()
                .map(|player| (player.session_player_id, player))
                .collect(),
        }
    }

    /// Identifier of the persisted game row.
    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    /// Channel this game runs in.
    pub fn channel_id(&self) -> &ChannelId {
        &self.channel_id
    }

    /// When the game started.
    pub fn started_at(&self) -> OffsetDateTime {
        self.started_at
    }

    /// Message reference recorded by the transport, if any.
    pub fn message_ref(&self) -> Option<&MessageRef> {
        self.message_ref.as_ref()
    }

    /// Record the transport's message reference; the first write wins.
    pub fn set_message_ref(&mut self, message_ref: MessageRef) {
        if self.message_ref.is_none() {
            self.message_ref = Some(message_ref);
        }
    }

    /// Seated players in roster order.
    pub fn players(&self) -> impl Iterator<Item = &GamePlayer> {
        self.players.values()
    }

    /// Look up one roster entry.
    pub fn player(&self, session_player_id: SessionPlayerId) -> Option<&GamePlayer> {
        self.players.get(&session_player_id)
    }

    /// Members of one team, in roster order.
    pub fn team(&self, team: Team) -> Vec<&GamePlayer> {
        self.players
            .values()
            .filter(|player| player.team == team)
            .collect()
    }

    /// Whether the given user occupies one of the four seats.
    ///
    /// Goal scoring and win declaration are restricted to participants.
    pub fn is_participant(&self, user_id: &UserId) -> bool {
        self.players.values().any(|player| &player.user_id == user_id)
    }

    /// Credit one goal to a roster entry.
    pub fn add_goal(&mut self, session_player_id: SessionPlayerId) -> Result<(), Rejection> {
        let player = self
            .players
            .get_mut(&session_player_id)
            .ok_or(Rejection::PlayerNotFound(session_player_id))?;
        player.goals += 1;
        Ok(())
    }

    /// Current score of one team, recomputed from the player counters.
    pub fn team_score(&self, team: Team) -> u32 {
        self.players
            .values()
            .filter(|player| player.team == team)
            .map(|player| player.goals)
            .sum()
    }

    /// Team currently ahead, or `None` on a tie.
    pub fn leading_team(&self) -> Option<Team> {
        let blue = self.team_score(Team::Blue);
        let red = self.team_score(Team::Red);
        if blue > red {
            Some(Team::Blue)
        } else if red > blue {
            Some(Team::Red)
        } else {
            None
        }
    }

    /// Whether the leading team may declare the set won.
    ///
    /// Requires the leader to have reached the threshold with the configured
    /// margin (win-by-2 at 11 under the default rules).
    pub fn is_winnable(&self, rules: &ScoringRules) -> bool {
        let blue = self.team_score(Team::Blue);
        let red = self.team_score(Team::Red);
        blue.max(red) >= rules.win_threshold && blue.abs_diff(red) >= rules.win_margin
    }

    /// Credit a set win to the leading team, returning it.
    ///
    /// No-op (`None`) on a tie. Goal counters are deliberately left intact so
    /// a future multi-set match can keep playing on the same roster.
    pub fn record_set_win(&mut self) -> Option<Team> {
        let winner = self.leading_team()?;
        match winner {
            Team::Blue => self.blue_set_wins += 1,
            Team::Red => self.red_set_wins += 1,
        }
        Some(winner)
    }

    /// Sets won by one team so far.
    pub fn set_wins(&self, team: Team) -> u32 {
        match team {
            Team::Blue => self.blue_set_wins,
            Team::Red => self.red_set_wins,
        }
    }
}
