//! Connection lifecycle handlers

use crate::error::RelayError;
use crate::gateway::ConnectionSender;
use crate::protocol::{Action, Envelope, MetaValue};
use crate::registry::User;
use crate::state::{AppState, ConnContext};
use std::time::Instant;

/// New connection: allocate an identity, attach the outbound channel,
/// send the welcome confirmation. No user record exists yet; that is
/// `register`'s job.
pub fn handle_open(state: &AppState, sender: ConnectionSender) -> ConnContext {
    let user_id = state.ids.next_id();
    state.gateway.attach(user_id, sender);
    state.gateway.send_direct(
        user_id,
        Envelope::reply(Action::Confirmation, format!("Connected user {user_id}")),
    );

    tracing::info!(user_id = %user_id, "Connection established");
    ConnContext {
        user_id,
        connected_at: Instant::now(),
    }
}

/// Connection closed: mark the user offline (the reaper collects the
/// record later), detach from the gateway, and let the departed user's
/// room see the refreshed roster.
pub fn handle_close(state: &AppState, ctx: &ConnContext) {
    state.gateway.detach(ctx.user_id);
    let room = state.users.find(ctx.user_id).and_then(|user| user.room);
    state.users.update(ctx.user_id, |user| user.online = false);
    if let Some(room) = room {
        crate::handlers::room::broadcast_roster(state, &room);
    }
    tracing::info!(user_id = %ctx.user_id, "Connection closed");
}

/// `register`: create the user record for this connection, display name
/// taken from `meta`. A repeat register refreshes the name in place.
pub fn register_user(
    state: &AppState,
    user_id: u64,
    envelope: &Envelope,
) -> Result<(), RelayError> {
    let name = envelope
        .meta
        .as_ref()
        .and_then(MetaValue::as_text)
        .ok_or(RelayError::InvalidPayload)?
        .to_string();

    match state.users.insert(User::new(user_id, name.clone())) {
        Ok(()) => {}
        Err(RelayError::DuplicateId(_)) => {
            state.users.update(user_id, |user| {
                user.name = name;
                user.online = true;
            });
        }
        Err(err) => return Err(err),
    }

    tracing::info!(user_id = %user_id, "User registered");
    Ok(())
}
