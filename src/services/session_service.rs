//! Channel-level operations that apply to either session kind.

use time::OffsetDateTime;
use tracing::{info, warn};

use crate::{
    dao::gateway::GameStatus,
    error::{Rejection, ServiceError},
    state::{
        SharedState,
        session::{ChannelId, ChannelSession, MessageRef},
    },
};

/// Point-in-time view of the channel's session, for re-rendering.
pub fn snapshot(state: &SharedState, channel_id: &ChannelId) -> Result<ChannelSession, ServiceError> {
    state
        .registry()
        .get(channel_id)
        .ok_or_else(|| Rejection::SessionNotFound.into())
}

/// Record the transport's message reference on the live session.
///
/// The first write wins; later calls are no-ops so a racing re-render cannot
/// repoint the session at a different message.
pub fn attach_message_ref(
    state: &SharedState,
    channel_id: &ChannelId,
    message_ref: MessageRef,
) -> Result<(), ServiceError> {
    state.registry().mutate(channel_id, |session| {
        session.set_message_ref(message_ref);
        Ok(())
    })?;
    Ok(())
}

/// Tear down whatever session the channel holds and return its last snapshot.
///
/// A cancelled game is finalized in the store after detachment; if that write
/// fails the in-memory cancellation has still taken effect and the error is
/// surfaced for the caller to retry against the durable row.
pub async fn cancel(
    state: &SharedState,
    channel_id: &ChannelId,
) -> Result<ChannelSession, ServiceError> {
    let session = state
        .registry()
        .remove(channel_id)
        .ok_or(Rejection::SessionNotFound)?;

    match &session {
        ChannelSession::Lobby(lobby) => {
            info!(
                channel = %channel_id,
                players = lobby.player_count(),
                "lobby cancelled"
            );
        }
        ChannelSession::Game(game) => {
            let ended_at = OffsetDateTime::now_utc();
            if let Err(err) = state
                .gateway()
                .finalize_game(
                    game.game_id(),
                    GameStatus::Cancelled,
                    game.started_at(),
                    ended_at,
                )
                .await
            {
                warn!(
                    channel = %channel_id,
                    game_id = %game.game_id(),
                    error = %err,
                    "failed to finalize cancelled game"
                );
                return Err(err.into());
            }
            info!(channel = %channel_id, game_id = %game.game_id(), "game cancelled");
        }
    }

    Ok(session)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        config::AppConfig,
        dao::memory::InMemoryStore,
        services::lobby_service::{self, ReadyOutcome},
        state::{AppState, session::SessionKind, session::UserId},
    };

    use super::*;

    fn app() -> (SharedState, InMemoryStore) {
        let store = InMemoryStore::new();
        let state = AppState::new(
            AppConfig::default(),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        );
        (state, store)
    }

    fn channel() -> ChannelId {
        ChannelId::from("C100")
    }

    #[tokio::test]
    async fn snapshot_of_idle_channel_is_not_found() {
        let (state, _) = app();
        let err = snapshot(&state, &channel()).unwrap_err();
        assert_eq!(err.as_rejection(), Some(&Rejection::SessionNotFound));
    }

    #[tokio::test]
    async fn message_ref_sticks_to_the_first_render() {
        let (state, _) = app();
        lobby_service::join(&state, &channel(), UserId::from("u1"), "Alice".into())
            .await
            .unwrap();

        attach_message_ref(&state, &channel(), MessageRef::from("ts-1")).unwrap();
        attach_message_ref(&state, &channel(), MessageRef::from("ts-2")).unwrap();

        let session = snapshot(&state, &channel()).unwrap();
        assert_eq!(
            session.as_lobby().unwrap().message_ref(),
            Some(&MessageRef::from("ts-1"))
        );
    }

    #[tokio::test]
    async fn cancelling_a_lobby_frees_the_channel() {
        let (state, _) = app();
        lobby_service::join(&state, &channel(), UserId::from("u1"), "Alice".into())
            .await
            .unwrap();

        let session = cancel(&state, &channel()).await.unwrap();
        assert_eq!(session.kind(), SessionKind::Lobby);
        assert!(state.registry().get(&channel()).is_none());

        // A new lobby can form right away.
        lobby_service::join(&state, &channel(), UserId::from("u2"), "Bob".into())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cancelling_a_game_finalizes_the_durable_row() {
        let (state, store) = app();
        for (user_id, name) in [("u1", "Alice"), ("u2", "Bob"), ("u3", "Cara"), ("u4", "Dee")] {
            lobby_service::join(&state, &channel(), UserId::from(user_id), name.into())
                .await
                .unwrap();
        }
        let mut game_id = None;
        for user_id in ["u1", "u2", "u3", "u4"] {
            if let ReadyOutcome::Started(game) =
                lobby_service::toggle_ready(&state, &channel(), &UserId::from(user_id))
                    .await
                    .unwrap()
            {
                game_id = Some(game.game_id());
            }
        }
        let game_id = game_id.expect("game started");

        let session = cancel(&state, &channel()).await.unwrap();
        assert_eq!(session.kind(), SessionKind::Game);
        assert!(state.registry().get(&channel()).is_none());
        assert_eq!(store.game(game_id).unwrap().status, GameStatus::Cancelled);
    }

    #[tokio::test]
    async fn cancelling_an_idle_channel_is_not_found() {
        let (state, _) = app();
        let err = cancel(&state, &channel()).await.unwrap_err();
        assert_eq!(err.as_rejection(), Some(&Rejection::SessionNotFound));
    }
}
