//! Room management handlers

use crate::error::RelayError;
use crate::protocol::{Action, Envelope, MetaValue, Payload, UserInfo};
use crate::state::AppState;

/// `createRoom`: room name from `msg`, optional lock token from `meta`.
/// Duplicate names are rejected.
pub fn create_room(state: &AppState, envelope: &Envelope) -> Result<(), RelayError> {
    let name = envelope
        .msg
        .as_ref()
        .and_then(Payload::as_text)
        .filter(|name| !name.is_empty())
        .ok_or(RelayError::InvalidPayload)?
        .to_string();
    let lock = envelope
        .meta
        .as_ref()
        .and_then(MetaValue::as_text)
        .map(str::to_string);

    state.rooms.insert(name.clone(), lock)?;
    tracing::info!(room = %name, "Created new room");
    Ok(())
}

/// `join`: validate the room and the user, record the assignment,
/// subscribe the connection, and show everyone the new roster.
/// A user moving between rooms is unsubscribed from the old one.
pub fn join_room(state: &AppState, user_id: u64, envelope: &Envelope) -> Result<String, RelayError> {
    let name = envelope
        .msg
        .as_ref()
        .and_then(Payload::as_text)
        .ok_or(RelayError::InvalidPayload)?
        .to_string();

    let room = state.rooms.find(&name).ok_or(RelayError::NotFound)?;
    let user = state.users.find(user_id).ok_or(RelayError::NotFound)?;

    if let Some(previous) = user.room.filter(|previous| previous != &room.name) {
        state.gateway.unsubscribe(user_id, &previous);
        broadcast_roster(state, &previous);
    }

    state
        .users
        .update(user_id, |user| user.room = Some(room.name.clone()));
    state.gateway.subscribe(user_id, &room.name);
    broadcast_roster(state, &room.name);

    tracing::info!(user_id = %user_id, room = %room.name, "User joined room");
    Ok(room.name)
}

/// `leave`: only valid for the room the user actually occupies; clears
/// the assignment and unsubscribes the connection.
pub fn leave_room(state: &AppState, user_id: u64, envelope: &Envelope) -> Result<(), RelayError> {
    let name = envelope
        .msg
        .as_ref()
        .and_then(Payload::as_text)
        .ok_or(RelayError::InvalidPayload)?;

    state.rooms.find(name).ok_or(RelayError::NotFound)?;
    let user = state.users.find(user_id).ok_or(RelayError::NotFound)?;
    if user.room.as_deref() != Some(name) {
        return Err(RelayError::NotFound);
    }

    state.gateway.unsubscribe(user_id, name);
    state.users.update(user_id, |user| user.room = None);

    tracing::info!(user_id = %user_id, room = %name, "User left room");
    Ok(())
}

/// `fetchRooms`: every room name, creation order.
pub fn fetch_rooms(state: &AppState) -> Vec<String> {
    state.rooms.list()
}

/// `fetchUsers`: the roster of the named room. A room nobody occupies
/// (or that does not exist) yields an empty list.
pub fn fetch_users(state: &AppState, envelope: &Envelope) -> Result<Vec<UserInfo>, RelayError> {
    let name = envelope
        .msg
        .as_ref()
        .and_then(Payload::as_text)
        .ok_or(RelayError::InvalidPayload)?;
    Ok(roster(state, name))
}

/// Online occupants of a room, insertion order. Offline records still
/// awaiting the reaper are not shown.
pub fn roster(state: &AppState, room: &str) -> Vec<UserInfo> {
    state
        .users
        .list_by_room(room)
        .iter()
        .filter(|user| user.online)
        .map(UserInfo::from)
        .collect()
}

/// Publishes the room's current roster to everyone subscribed to it.
pub fn broadcast_roster(state: &AppState, room: &str) {
    let envelope = Envelope {
        action: Action::FetchUsers,
        meta: None,
        msg: Some(Payload::Users(roster(state, room))),
    };
    state.gateway.publish(room, &envelope);
}
