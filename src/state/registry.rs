//! Concurrency-safe registry mapping each channel to its live session.

use dashmap::{DashMap, mapref::entry::Entry};
use tracing::{info, warn};

use crate::{
    error::Rejection,
    state::{
        game::GameSession,
        lobby::LobbySession,
        session::{ChannelId, ChannelSession},
    },
};

/// Channel-keyed store holding at most one live session per channel.
///
/// Mutations run under the key's exclusive guard: concurrent operations on
/// the same channel are totally ordered, while unrelated channels proceed in
/// parallel on the sharded map (no global mutex). Closures passed to
/// [`SessionRegistry::mutate`] must stay synchronous — every persistence call
/// happens before or after the guard, never inside it.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    channels: DashMap<ChannelId, ChannelSession>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically create an empty lobby if the channel has no session.
    pub fn try_create_lobby(&self, channel_id: &ChannelId) -> Result<LobbySession, Rejection> {
        match self.channels.entry(channel_id.clone()) {
            Entry::Occupied(_) => Err(Rejection::ChannelBusy),
            Entry::Vacant(slot) => {
                let lobby = LobbySession::new(channel_id.clone());
                slot.insert(ChannelSession::Lobby(lobby.clone()));
                info!(channel = %channel_id, "lobby created");
                Ok(lobby)
            }
        }
    }

    /// Point-in-time snapshot of the channel's session.
    pub fn get(&self, channel_id: &ChannelId) -> Option<ChannelSession> {
        self.channels
            .get(channel_id)
            .map(|entry| entry.value().clone())
    }

    /// Apply one state-transition operation under the channel's guard.
    ///
    /// The closure sees the live session exclusively; two concurrent calls on
    /// the same channel never interleave. Returns `SessionNotFound` when the
    /// channel is idle.
    pub fn mutate<T>(
        &self,
        channel_id: &ChannelId,
        op: impl FnOnce(&mut ChannelSession) -> Result<T, Rejection>,
    ) -> Result<T, Rejection> {
        let mut entry = self
            .channels
            .get_mut(channel_id)
            .ok_or(Rejection::SessionNotFound)?;
        op(entry.value_mut())
    }

    /// Atomically detach and return the channel's session.
    ///
    /// Used for cancellation and as the first step of the remove → persist →
    /// recreate promotion and completion protocols.
    pub fn remove(&self, channel_id: &ChannelId) -> Option<ChannelSession> {
        self.channels
            .remove(channel_id)
            .map(|(_, session)| session)
    }

    /// Put a previously removed session back, but only into a vacant slot.
    ///
    /// This is the rollback half of the promotion protocol: when persistence
    /// fails after the lobby was detached, the lobby is reinstated unless
    /// someone already started a new session in the channel.
    pub fn restore(&self, channel_id: &ChannelId, session: ChannelSession) -> bool {
        match self.channels.entry(channel_id.clone()) {
            Entry::Occupied(_) => {
                warn!(
                    channel = %channel_id,
                    kind = %session.kind(),
                    "dropping restored session, channel was re-occupied"
                );
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(session);
                true
            }
        }
    }

    /// Install a freshly created game, completing a lobby → game promotion.
    pub fn install_game(&self, channel_id: &ChannelId, game: GameSession) -> Result<(), Rejection> {
        match self.channels.entry(channel_id.clone()) {
            Entry::Occupied(_) => Err(Rejection::ChannelBusy),
            Entry::Vacant(slot) => {
                slot.insert(ChannelSession::Game(game));
                Ok(())
            }
        }
    }

    /// Number of channels with a live session.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether no channel currently holds a session.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
