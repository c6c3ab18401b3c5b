//! In-memory store and index helpers.

/// Secondary index helpers.
pub mod indices;
/// In-memory implementation of the store traits.
pub mod store;
