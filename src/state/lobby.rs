//! Pre-game lobby: roster building for one channel.

use indexmap::IndexMap;
use rand::{Rng, seq::SliceRandom};

use crate::state::{
    balance,
    session::{ChannelId, MessageRef, Position, Team, UserId},
};

/// Number of seats a full match requires.
pub const MAX_PLAYERS: usize = 4;
/// Members per team in a full match.
pub const TEAM_SIZE: usize = 2;

/// A player waiting in the lobby.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbyPlayer {
    /// Identifier on the external messaging platform.
    pub user_id: UserId,
    /// Name shown when rendering the lobby.
    pub display_name: String,
    /// Side the player is currently assigned to.
    pub team: Team,
    /// Seat within the team.
    pub position: Position,
    /// Whether the player committed to starting the game.
    pub ready: bool,
}

/// Roster-building state for one channel, capped at four players.
///
/// Players are keyed by user id and kept in join order. Seat assignment and
/// reshuffling delegate to [`balance`].
#[derive(Debug, Clone)]
pub struct LobbySession {
    channel_id: ChannelId,
    message_ref: Option<MessageRef>,
    players: IndexMap<UserId, LobbyPlayer>,
}

impl LobbySession {
    /// Create an empty lobby for the given channel.
    pub fn new(channel_id: ChannelId) -> Self {
        Self {
            channel_id,
            message_ref: None,
            players: IndexMap::new(),
        }
    }

    /// Channel this lobby belongs to.
    pub fn channel_id(&self) -> &ChannelId {
        &self.channel_id
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

    /// Players in join order.
    pub fn players(&self) -> impl Iterator<Item = &LobbyPlayer> {
        self.players.values()
    }

    /// Number of seated players.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Whether the given user is seated in this lobby.
    pub fn has_player(&self, user_id: &UserId) -> bool {
        self.players.contains_key(user_id)
    }

    /// Members of one team, in join order.
    pub fn team(&self, team: Team) -> Vec<&LobbyPlayer> {
        self.players
            .values()
            .filter(|player| player.team == team)
            .collect()
    }

    /// True iff all four seats are taken.
    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    /// True iff four players are seated and every one of them is ready.
    ///
    /// This is the sole promotion trigger for the lobby → game transition.
    pub fn all_ready(&self) -> bool {
        self.players.len() == MAX_PLAYERS && self.players.values().all(|player| player.ready)
    }

    /// Seat a new player, balancing teams and filling the goalie seat first.
    ///
    /// No-op when the player is already seated or the lobby is full.
    pub fn add_player(&mut self, user_id: UserId, display_name: String) {
        if self.has_player(&user_id) || self.is_full() {
            return;
        }

        let seated: Vec<(Team, Position)> = self
            .players
            .values()
            .map(|player| (player.team, player.position))
            .collect();
        let (team, position) = balance::assign_seat(&seated);

        self.players.insert(
            user_id.clone(),
            LobbyPlayer {
                user_id,
                display_name,
                team,
                position,
                ready: false,
            },
        );
    }

    /// Swap goalie and forward within one team.
    ///
    /// Defined only when the team has exactly two members; no-op otherwise.
    pub fn switch_positions(&mut self, team: Team) {
        let members: Vec<UserId> = self
            .players
            .values()
            .filter(|player| player.team == team)
            .map(|player| player.user_id.clone())
            .collect();
        if members.len() != TEAM_SIZE {
            return;
        }

        for user_id in members {
            if let Some(player) = self.players.get_mut(&user_id) {
                player.position = player.position.swapped();
            }
        }
    }

    /// Randomly redistribute teams and positions.
    ///
    /// Permutes the roster uniformly, reseats everyone via
    /// [`balance::seat_for_slot`], and resets every ready flag since the
    /// shuffle invalidates prior readiness commitments. Defined for two or
    /// more players; no-op otherwise. The random source is injected so tests
    /// can drive a deterministic permutation.
    pub fn shuffle_teams<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.players.len() < 2 {
            return;
        }

        let mut roster: Vec<LobbyPlayer> = self.players.drain(..).map(|(_, player)| player).collect();
        roster.shuffle(rng);

        for (slot, player) in roster.iter_mut().enumerate() {
            let (team, position) = balance::seat_for_slot(slot);
            player.team = team;
            player.position = position;
            player.ready = false;
        }

        self.players = roster
            .into_iter()
            .map(|player| (player.user_id.clone(), player))
            .collect();
    }

    /// Flip the ready flag of the named player.
    ///
    /// Returns `false` (no-op) when the player is not seated.
    pub fn toggle_ready(&mut self, user_id: &UserId) -> bool {
        match self.players.get_mut(user_id) {
            Some(player) => {
                player.ready = !player.ready;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn lobby_with(names: &[(&str, &str)]) -> LobbySession {
        let mut lobby = LobbySession::new(ChannelId::from("C100"));
        for (user_id, display_name) in names {
            lobby.add_player(UserId::from(*user_id), (*display_name).to_owned());
        }
        lobby
    }

    fn seat_of<'a>(lobby: &'a LobbySession, user_id: &str) -> &'a LobbyPlayer {
        lobby
            .players()
            .find(|player| player.user_id == UserId::from(user_id))
            .expect("player seated")
    }

    #[test]
    fn four_joins_fill_both_teams_goalie_first() {
        let lobby = lobby_with(&[
            ("u1", "Alice"),
            ("u2", "Bob"),
            ("u3", "Cara"),
            ("u4", "Dee"),
        ]);

        assert!(lobby.is_full());
        assert!(!lobby.all_ready());

        let alice = seat_of(&lobby, "u1");
        assert_eq!((alice.team, alice.position), (Team::Blue, Position::Goalie));
        let bob = seat_of(&lobby, "u2");
        assert_eq!((bob.team, bob.position), (Team::Red, Position::Goalie));
        let cara = seat_of(&lobby, "u3");
        assert_eq!((cara.team, cara.position), (Team::Blue, Position::Forward));
        let dee = seat_of(&lobby, "u4");
        assert_eq!((dee.team, dee.position), (Team::Red, Position::Forward));
    }

    #[test]
    fn duplicate_join_is_ignored() {
        let mut lobby = lobby_with(&[("u1", "Alice")]);
        lobby.add_player(UserId::from("u1"), "Alice again".into());
        assert_eq!(lobby.player_count(), 1);
        assert_eq!(seat_of(&lobby, "u1").display_name, "Alice");
    }

    #[test]
    fn fifth_join_is_ignored() {
        let mut lobby = lobby_with(&[
            ("u1", "Alice"),
            ("u2", "Bob"),
            ("u3", "Cara"),
            ("u4", "Dee"),
        ]);
        lobby.add_player(UserId::from("u5"), "Eve".into());
        assert_eq!(lobby.player_count(), 4);
        assert!(!lobby.has_player(&UserId::from("u5")));
    }

    #[test]
    fn switch_swaps_both_seats_of_a_full_team() {
        let mut lobby = lobby_with(&[("u1", "Alice"), ("u2", "Bob"), ("u3", "Cara")]);
        lobby.switch_positions(Team::Blue);

        assert_eq!(seat_of(&lobby, "u1").position, Position::Forward);
        assert_eq!(seat_of(&lobby, "u3").position, Position::Goalie);
        // Red only has one member and is untouched.
        assert_eq!(seat_of(&lobby, "u2").position, Position::Goalie);
    }

    #[test]
    fn switch_with_single_member_team_is_noop() {
        let mut lobby = lobby_with(&[("u1", "Alice"), ("u2", "Bob")]);
        lobby.switch_positions(Team::Blue);
        assert_eq!(seat_of(&lobby, "u1").position, Position::Goalie);
    }

    #[test]
    fn shuffle_is_a_bijection_and_clears_ready_flags() {
        let mut lobby = lobby_with(&[
            ("u1", "Alice"),
            ("u2", "Bob"),
            ("u3", "Cara"),
            ("u4", "Dee"),
        ]);
        for user_id in ["u1", "u2", "u3", "u4"] {
            lobby.toggle_ready(&UserId::from(user_id));
        }
        assert!(lobby.all_ready());

        let before: HashSet<UserId> = lobby.players().map(|p| p.user_id.clone()).collect();
        let mut rng = StdRng::seed_from_u64(7);
        lobby.shuffle_teams(&mut rng);

        let after: HashSet<UserId> = lobby.players().map(|p| p.user_id.clone()).collect();
        assert_eq!(before, after);
        assert!(lobby.players().all(|player| !player.ready));
        assert_eq!(lobby.team(Team::Blue).len(), 2);
        assert_eq!(lobby.team(Team::Red).len(), 2);
        for side in [Team::Blue, Team::Red] {
            let positions: Vec<Position> =
                lobby.team(side).iter().map(|p| p.position).collect();
            assert!(positions.contains(&Position::Goalie));
            assert!(positions.contains(&Position::Forward));
        }
    }

    #[test]
    fn shuffle_is_deterministic_under_a_seeded_rng() {
        let build = || {
            lobby_with(&[
                ("u1", "Alice"),
                ("u2", "Bob"),
                ("u3", "Cara"),
                ("u4", "Dee"),
            ])
        };

        let mut first = build();
        let mut second = build();
        first.shuffle_teams(&mut StdRng::seed_from_u64(42));
        second.shuffle_teams(&mut StdRng::seed_from_u64(42));

        let seats = |lobby: &LobbySession| -> Vec<(UserId, Team, Position)> {
            lobby
                .players()
                .map(|p| (p.user_id.clone(), p.team, p.position))
                .collect()
        };
        assert_eq!(seats(&first), seats(&second));
    }

    #[test]
    fn shuffle_with_one_player_is_noop() {
        let mut lobby = lobby_with(&[("u1", "Alice")]);
        lobby.shuffle_teams(&mut StdRng::seed_from_u64(1));
        let alice = seat_of(&lobby, "u1");
        assert_eq!((alice.team, alice.position), (Team::Blue, Position::Goalie));
    }

    #[test]
    fn all_ready_requires_four_ready_players() {
        let mut lobby = lobby_with(&[("u1", "Alice"), ("u2", "Bob"), ("u3", "Cara")]);
        for user_id in ["u1", "u2", "u3"] {
            lobby.toggle_ready(&UserId::from(user_id));
        }
        // Three ready players are not enough.
        assert!(!lobby.all_ready());

        lobby.add_player(UserId::from("u4"), "Dee".into());
        assert!(!lobby.all_ready());
        lobby.toggle_ready(&UserId::from("u4"));
        assert!(lobby.all_ready());

        lobby.toggle_ready(&UserId::from("u2"));
        assert!(!lobby.all_ready());
    }

    #[test]
    fn toggle_ready_for_stranger_is_noop() {
        let mut lobby = lobby_with(&[("u1", "Alice")]);
        assert!(!lobby.toggle_ready(&UserId::from("u9")));
        assert!(!seat_of(&lobby, "u1").ready);
    }

    #[test]
    fn message_ref_is_set_once() {
        let mut lobby = lobby_with(&[]);
        lobby.set_message_ref(MessageRef::from("1700000000.000100"));
        lobby.set_message_ref(MessageRef::from("1700000000.000200"));
        assert_eq!(
            lobby.message_ref(),
            Some(&MessageRef::from("1700000000.000100"))
        );
    }
}
