//! Persistence layer: traits the durable store implements plus backends.

/// Traits for the durable game/player store.
pub mod gateway;
/// In-memory backend used by tests and store-less deployments.
pub mod memory;
/// Storage abstraction error types.
pub mod storage;
