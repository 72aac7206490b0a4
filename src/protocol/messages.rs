//! Client/server envelope definitions
//!
//! Every message in either direction shares one JSON shape:
//! `{ "action": string, "meta"?: string|number, "msg"?: ... }`.
//! The `msg` payload varies by action: a plain string, a list of
//! names, or a list of user records.

use serde::{Deserialize, Serialize};

/// Action vocabulary carried in the `action` field.
///
/// Unrecognized action strings deserialize to `Unknown` instead of
/// failing, so malformed clients get a reply rather than a dropped
/// connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    // sys actions
    Confirmation,
    // user actions
    Register,
    Chat,
    CreateRoom,
    Join,
    Leave,
    FetchRooms,
    FetchUsers,
    #[serde(other)]
    Unknown,
}

/// The `meta` field: clients may send a string or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Text(String),
    Number(u64),
}

impl MetaValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            MetaValue::Number(_) => None,
        }
    }
}

/// The `msg` field payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Text(String),
    Names(Vec<String>),
    Users(Vec<UserInfo>),
}

impl Payload {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// One protocol message, inbound or outbound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<MetaValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<Payload>,
}

impl Envelope {
    /// Direct reply carrying a status string.
    pub fn reply(action: Action, msg: impl Into<String>) -> Self {
        Self {
            action,
            meta: None,
            msg: Some(Payload::Text(msg.into())),
        }
    }

    /// Reply for undecodable or unrecognized input.
    pub fn unrecognized() -> Self {
        Self::reply(Action::Unknown, "Unrecognized message from user")
    }
}

/// User record as it appears on the wire (fetchUsers payloads).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: u64,
    pub name: String,
    pub online: bool,
    pub room: Option<String>,
}
