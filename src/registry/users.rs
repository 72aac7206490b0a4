//! User registry

use crate::error::RelayError;
use crate::protocol::UserInfo;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// A connected (or recently disconnected) client identity.
///
/// `room: None` means the user occupies no room; a disconnect marks the
/// record offline rather than removing it, so peers already notified of
/// the departure are not re-notified when the reaper collects it.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub online: bool,
    pub room: Option<String>,
}

impl User {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            online: true,
            room: None,
        }
    }
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            online: user.online,
            room: user.room.clone(),
        }
    }
}

/// Shared user table keyed by connection identity.
///
/// All access goes through these operations; each is a single atomic
/// map operation, so concurrent handlers never observe torn state.
#[derive(Default)]
pub struct UserRegistry {
    users: DashMap<u64, User>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new record, rejecting identity collisions.
    pub fn insert(&self, user: User) -> Result<(), RelayError> {
        match self.users.entry(user.id) {
            Entry::Occupied(_) => Err(RelayError::DuplicateId(user.id)),
            Entry::Vacant(slot) => {
                slot.insert(user);
                Ok(())
            }
        }
    }

    /// Snapshot lookup; absence is a normal outcome.
    pub fn find(&self, id: u64) -> Option<User> {
        self.users.get(&id).map(|entry| entry.clone())
    }

    /// Applies `mutator` to the record under the map lock. No-op if absent.
    pub fn update(&self, id: u64, mutator: impl FnOnce(&mut User)) {
        if let Some(mut entry) = self.users.get_mut(&id) {
            mutator(&mut entry);
        }
    }

    /// All users assigned to `room`, snapshotted in insertion order.
    /// Ids are allocated monotonically, so id order is insertion order.
    pub fn list_by_room(&self, room: &str) -> Vec<User> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|entry| entry.room.as_deref() == Some(room))
            .map(|entry| entry.clone())
            .collect();
        users.sort_by_key(|user| user.id);
        users
    }

    /// Names of every room occupied by at least one online user.
    pub fn occupied_rooms(&self) -> std::collections::HashSet<String> {
        self.users
            .iter()
            .filter(|entry| entry.online)
            .filter_map(|entry| entry.room.clone())
            .collect()
    }

    /// Removes every record matching `predicate`, returning the count.
    pub fn remove_where(&self, predicate: impl Fn(&User) -> bool) -> usize {
        let before = self.users.len();
        self.users.retain(|_, user| !predicate(user));
        before - self.users.len()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }
}
