//! Protocol error taxonomy
//!
//! Every variant is recovered inside the dispatcher and surfaced to the
//! client as a status string; none of them terminates a connection.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Room or user absent for an operation that requires it.
    #[error("room or user not found")]
    NotFound,
    /// The envelope's `msg`/`meta` had the wrong shape for the action.
    #[error("invalid payload for action")]
    InvalidPayload,
    /// Identity collision in the user registry. Unreachable while the
    /// allocator holds its no-reuse guarantee.
    #[error("duplicate user id {0}")]
    DuplicateId(u64),
    /// A room with this name already exists.
    #[error("room {0:?} already exists")]
    RoomExists(String),
}
