//! Lobby operations: joining, seat management, and readiness.

use tracing::{debug, info};

use crate::{
    error::{Rejection, ServiceError},
    services::game_service,
    state::{
        SharedState,
        game::GameSession,
        lobby::LobbySession,
        session::{ChannelId, ChannelSession, SessionKind, Team, UserId},
    },
};

/// What a ready toggle led to.
#[derive(Debug, Clone)]
pub enum ReadyOutcome {
    /// The lobby is still forming; render the updated roster.
    Lobby(LobbySession),
    /// The toggle completed the lobby and the game is now running.
    Started(GameSession),
}

/// Seat a player in the channel's lobby, creating the lobby when the channel
/// is idle.
///
/// Rejected with `ChannelBusy` while a game occupies the channel and with
/// `LobbyFull` when a fifth distinct player knocks. A duplicate join returns
/// the unchanged roster.
pub async fn join(
    state: &SharedState,
    channel_id: &ChannelId,
    user_id: UserId,
    display_name: String,
) -> Result<LobbySession, ServiceError> {
    if state.registry().get(channel_id).is_none() {
        // A concurrent creator winning this race is fine; the mutate below
        // lands in whichever lobby exists.
        match state.registry().try_create_lobby(channel_id) {
            Ok(_) | Err(Rejection::ChannelBusy) => {}
            Err(other) => return Err(other.into()),
        }
    }

    let snapshot = state.registry().mutate(channel_id, |session| {
        let lobby = match session {
            ChannelSession::Lobby(lobby) => lobby,
            ChannelSession::Game(_) => return Err(Rejection::ChannelBusy),
        };
        if lobby.is_full() && !lobby.has_player(&user_id) {
            return Err(Rejection::LobbyFull);
        }
        lobby.add_player(user_id.clone(), display_name);
        Ok(lobby.clone())
    })?;

    info!(channel = %channel_id, user = %user_id, "player joined lobby");
    Ok(snapshot)
}

/// Flip a seated player's ready flag.
///
/// When the toggle makes all four players ready, the lobby is promoted:
/// detached from the registry, persisted as a game with its roster, and
/// reinstalled as the channel's running game. A storage failure restores the
/// lobby untouched.
pub async fn toggle_ready(
    state: &SharedState,
    channel_id: &ChannelId,
    user_id: &UserId,
) -> Result<ReadyOutcome, ServiceError> {
    let (snapshot, all_ready) = state.registry().mutate(channel_id, |session| {
        let lobby = session.as_lobby_mut()?;
        if !lobby.toggle_ready(user_id) {
            return Err(Rejection::PlayerNotInSession(user_id.clone()));
        }
        Ok((lobby.clone(), lobby.all_ready()))
    })?;

    if !all_ready {
        debug!(channel = %channel_id, user = %user_id, "ready toggled");
        return Ok(ReadyOutcome::Lobby(snapshot));
    }

    // Everyone is in: drive the promotion. Re-validation happens after the
    // detach, since another operation may have slipped in between.
    let session = state
        .registry()
        .remove(channel_id)
        .ok_or(Rejection::SessionNotFound)?;
    let lobby = match session {
        ChannelSession::Lobby(lobby) => lobby,
        game => {
            let rejection = Rejection::WrongSessionKind {
                expected: SessionKind::Lobby,
                actual: game.kind(),
            };
            state.registry().restore(channel_id, game);
            return Err(rejection.into());
        }
    };

    let game = game_service::start_game(state, lobby).await?;
    Ok(ReadyOutcome::Started(game))
}

/// Swap goalie and forward within one team of the channel's lobby.
///
/// A team without exactly two members leaves the roster unchanged.
pub async fn switch_positions(
    state: &SharedState,
    channel_id: &ChannelId,
    team: Team,
) -> Result<LobbySession, ServiceError> {
    let snapshot = state.registry().mutate(channel_id, |session| {
        let lobby = session.as_lobby_mut()?;
        lobby.switch_positions(team);
        Ok(lobby.clone())
    })?;
    Ok(snapshot)
}

/// Randomly redistribute the lobby's teams and positions.
///
/// Every ready flag is reset, so a shuffled lobby always needs fresh
/// commitments before it can start.
pub async fn shuffle(
    state: &SharedState,
    channel_id: &ChannelId,
) -> Result<LobbySession, ServiceError> {
    let snapshot = state.registry().mutate(channel_id, |session| {
        let lobby = session.as_lobby_mut()?;
        let mut rng = rand::rng();
        lobby.shuffle_teams(&mut rng);
        Ok(lobby.clone())
    })?;

    info!(channel = %channel_id, "teams shuffled");
    Ok(snapshot)
}
