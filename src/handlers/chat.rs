//! Chat relay handler

use crate::error::RelayError;
use crate::protocol::{Action, Envelope, Payload};
use crate::state::AppState;

/// `chat`: relay a text message to the sender's current room as
/// `{action:"chat", msg:[senderName, text]}`. The sender must be
/// registered and occupying a room; delivery is fire-and-forget.
pub fn send_chat(state: &AppState, user_id: u64, envelope: &Envelope) -> Result<(), RelayError> {
    let text = envelope
        .msg
        .as_ref()
        .and_then(Payload::as_text)
        .ok_or(RelayError::InvalidPayload)?
        .to_string();

    let user = state.users.find(user_id).ok_or(RelayError::NotFound)?;
    let room = user.room.ok_or(RelayError::NotFound)?;

    let outbound = Envelope {
        action: Action::Chat,
        meta: None,
        msg: Some(Payload::Names(vec![user.name, text])),
    };
    state.gateway.publish(&room, &outbound);

    tracing::debug!(user_id = %user_id, room = %room, "Chat relayed");
    Ok(())
}
