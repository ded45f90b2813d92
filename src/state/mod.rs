//! In-memory session state: value types, lobby/game models, and the registry.

/// Seat assignment and shuffle layout rules.
pub mod balance;
/// In-progress game roster and scoring.
pub mod game;
/// Pre-game lobby roster building.
pub mod lobby;
/// Channel-keyed session registry.
pub mod registry;
/// Shared value types and the per-channel session union.
pub mod session;

use std::sync::Arc;

use crate::{
    config::{AppConfig, ScoringRules},
    dao::gateway::{PersistenceGateway, PlayerDirectory},
};

pub use self::registry::SessionRegistry;
pub use self::session::ChannelSession;

/// Shared handle to the application context.
pub type SharedState = Arc<AppState>;

/// Application context wiring configuration, the registry, and the store.
///
/// The registry exclusively owns every live session; services reach it (and
/// the persistence collaborators) through this context.
pub struct AppState {
    config: AppConfig,
    registry: SessionRegistry,
    gateway: Arc<dyn PersistenceGateway>,
    directory: Arc<dyn PlayerDirectory>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(
        config: AppConfig,
        gateway: Arc<dyn PersistenceGateway>,
        directory: Arc<dyn PlayerDirectory>,
    ) -> SharedState {
        Arc::new(Self {
            config,
            registry: SessionRegistry::new(),
            gateway,
            directory,
        })
    }

    /// The channel → session registry.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Rules gating a set-win declaration.
    pub fn scoring(&self) -> &ScoringRules {
        &self.config.scoring
    }

    /// Handle to the durable game store.
    pub fn gateway(&self) -> &Arc<dyn PersistenceGateway> {
        &self.gateway
    }

    /// Handle to the durable player directory.
    pub fn directory(&self) -> &Arc<dyn PlayerDirectory> {
        &self.directory
    }
}
