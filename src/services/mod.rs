//! Service layer: the operations the transport adapter invokes.

/// Game lifecycle, scoring, and completion.
pub mod game_service;
/// Lobby joining, seat management, and readiness.
pub mod lobby_service;
/// Kind-agnostic channel operations (snapshot, message ref, cancel).
pub mod session_service;
