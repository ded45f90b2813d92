//! Game lifecycle: promotion from a lobby, scoring, and completion.
//!
//! Transitions that touch the durable store follow the detach → persist →
//! reinstall protocol: the registry guard is never held across a gateway
//! call, and a storage failure rolls the registry back to its previous
//! consistent state (or surfaces after the in-memory step already took
//! effect, as documented per operation).

use time::OffsetDateTime;
use tracing::{info, warn};

use crate::{
    dao::gateway::GameStatus,
    error::{Rejection, ServiceError},
    state::{
        SharedState,
        game::{GamePlayer, GameSession},
        lobby::LobbySession,
        session::{ChannelId, ChannelSession, SessionKind, SessionPlayerId, Team, UserId},
    },
};

/// Promote a detached, all-ready lobby into a running game.
///
/// The caller has already removed the lobby from the registry. Persists the
/// game row and the four roster entries, then installs the game under the
/// channel. Any failure along the way puts the lobby back (unless the channel
/// was re-occupied meanwhile) so the transition is all-or-nothing.
pub(crate) async fn start_game(
    state: &SharedState,
    lobby: LobbySession,
) -> Result<GameSession, ServiceError> {
    let channel_id = lobby.channel_id().clone();

    if !lobby.all_ready() {
        state
            .registry()
            .restore(&channel_id, ChannelSession::Lobby(lobby));
        return Err(Rejection::LobbyNotFull.into());
    }

    let game = match persist_roster(state, &lobby).await {
        Ok(game) => game,
        Err(err) => {
            warn!(channel = %channel_id, error = %err, "game start failed; restoring lobby");
            state
                .registry()
                .restore(&channel_id, ChannelSession::Lobby(lobby));
            return Err(err);
        }
    };

    let game_id = game.game_id();
    if let Err(rejection) = state.registry().install_game(&channel_id, game.clone()) {
        // The channel was re-occupied while persistence ran. Close the
        // orphaned game row and hand the conflict to the caller.
        warn!(channel = %channel_id, game_id = %game_id, "channel re-occupied during game start");
        let ended_at = OffsetDateTime::now_utc();
        if let Err(err) = state
            .gateway()
            .finalize_game(game_id, GameStatus::Cancelled, game.started_at(), ended_at)
            .await
        {
            warn!(game_id = %game_id, error = %err, "failed to finalize orphaned game");
        }
        return Err(rejection.into());
    }

    info!(channel = %channel_id, game_id = %game_id, "game started");
    Ok(game)
}

/// Create the durable game row and roster, building the in-memory session.
async fn persist_roster(
    state: &SharedState,
    lobby: &LobbySession,
) -> Result<GameSession, ServiceError> {
    let channel_id = lobby.channel_id().clone();
    let game_id = state.gateway().create_game(channel_id.clone()).await?;

    let mut roster = Vec::with_capacity(lobby.player_count());
    for player in lobby.players() {
        let player_id = state
            .directory()
            .resolve_or_create(player.user_id.clone(), player.display_name.clone())
            .await?;
        let session_player_id = state
            .gateway()
            .add_roster_entry(game_id, player_id, player.team, player.position)
            .await?;
        roster.push(GamePlayer {
            session_player_id,
            user_id: player.user_id.clone(),
            display_name: player.display_name.clone(),
            team: player.team,
            position: player.position,
            goals: 0,
        });
    }

    Ok(GameSession::new(game_id, channel_id, roster))
}

/// Credit one goal to a roster entry and mirror it to the store.
///
/// Only seated participants may score. The in-memory counter advances under
/// the channel guard; the durable write happens after and a failure there is
/// surfaced without touching the already-advanced counter.
pub async fn add_goal(
    state: &SharedState,
    channel_id: &ChannelId,
    session_player_id: SessionPlayerId,
    requesting_user: &UserId,
) -> Result<GameSession, ServiceError> {
    let snapshot = state.registry().mutate(channel_id, |session| {
        let game = session.as_game_mut()?;
        if !game.is_participant(requesting_user) {
            return Err(Rejection::PlayerNotInSession(requesting_user.clone()));
        }
        game.add_goal(session_player_id)?;
        Ok(game.clone())
    })?;

    if let Err(err) = state.gateway().record_goal(session_player_id).await {
        warn!(
            channel = %channel_id,
            session_player = %session_player_id,
            error = %err,
            "failed to persist goal"
        );
        return Err(err.into());
    }

    Ok(snapshot)
}

/// Declare the current set won by the leading team and complete the match.
///
/// Rejected with `NotWinnable` unless the scoring rules are met. The set win
/// is recorded on the session, and — since the current flow treats one set as
/// the whole match — the game is then completed and its terminal snapshot
/// returned.
pub async fn declare_set_win(
    state: &SharedState,
    channel_id: &ChannelId,
    requesting_user: &UserId,
) -> Result<GameSession, ServiceError> {
    let rules = *state.scoring();
    let winner = state.registry().mutate(channel_id, |session| {
        let game = session.as_game_mut()?;
        if !game.is_participant(requesting_user) {
            return Err(Rejection::PlayerNotInSession(requesting_user.clone()));
        }
        if !game.is_winnable(&rules) {
            return Err(Rejection::NotWinnable {
                blue: game.team_score(Team::Blue),
                red: game.team_score(Team::Red),
            });
        }
        // Winnable implies a non-zero margin, so a leader exists.
        game.record_set_win().ok_or(Rejection::NotWinnable {
            blue: game.team_score(Team::Blue),
            red: game.team_score(Team::Red),
        })
    })?;

    info!(channel = %channel_id, winner = %winner, "set won");
    finish(state, channel_id).await
}

/// End the match on request of a participant and return the terminal snapshot.
pub async fn end_match(
    state: &SharedState,
    channel_id: &ChannelId,
    requesting_user: &UserId,
) -> Result<GameSession, ServiceError> {
    state.registry().mutate(channel_id, |session| {
        let game = session.as_game()?;
        if !game.is_participant(requesting_user) {
            return Err(Rejection::PlayerNotInSession(requesting_user.clone()));
        }
        Ok(())
    })?;

    finish(state, channel_id).await
}

/// Detach the game and finalize it as completed.
///
/// If the finalizing write fails the game is already out of the registry;
/// the error is surfaced so the caller can retry against the durable row.
async fn finish(
    state: &SharedState,
    channel_id: &ChannelId,
) -> Result<GameSession, ServiceError> {
    let session = state
        .registry()
        .remove(channel_id)
        .ok_or(Rejection::SessionNotFound)?;

    let game = match session {
        ChannelSession::Game(game) => game,
        lobby => {
            let rejection = Rejection::WrongSessionKind {
                expected: SessionKind::Game,
                actual: lobby.kind(),
            };
            state.registry().restore(channel_id, lobby);
            return Err(rejection.into());
        }
    };

    let ended_at = OffsetDateTime::now_utc();
    if let Err(err) = state
        .gateway()
        .finalize_game(
            game.game_id(),
            GameStatus::Completed,
            game.started_at(),
            ended_at,
        )
        .await
    {
        warn!(
            channel = %channel_id,
            game_id = %game.game_id(),
            error = %err,
            "failed to finalize completed game"
        );
        return Err(err.into());
    }

    info!(channel = %channel_id, game_id = %game.game_id(), "game completed");
    Ok(game)
}
