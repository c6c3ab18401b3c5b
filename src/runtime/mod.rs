//! Serialized async access to an [`crate::service::EventService`].

/// Event stream types emitted by the runtime.
pub mod events;
/// Handle and command loop implementation.
pub mod handle;
