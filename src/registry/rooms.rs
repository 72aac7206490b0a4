//! Room registry

use crate::error::RelayError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// A named broadcast scope.
///
/// The `lock` token is stored as supplied by `createRoom` but nothing in
/// the protocol validates it; it is reserved, not access control.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub name: String,
    pub lock: Option<String>,
    seq: u64,
}

/// Shared room table keyed by name, seeded with the permanent default
/// room. `list()` preserves creation order via a per-room sequence
/// number.
pub struct RoomRegistry {
    rooms: DashMap<String, Room>,
    next_seq: AtomicU64,
    default_name: String,
}

impl RoomRegistry {
    pub fn new(default_name: impl Into<String>) -> Self {
        let registry = Self {
            rooms: DashMap::new(),
            next_seq: AtomicU64::new(0),
            default_name: default_name.into(),
        };
        registry
            .insert(registry.default_name.clone(), None)
            .ok();
        registry
    }

    /// Adds a room, rejecting duplicate names.
    pub fn insert(&self, name: String, lock: Option<String>) -> Result<(), RelayError> {
        match self.rooms.entry(name.clone()) {
            Entry::Occupied(_) => Err(RelayError::RoomExists(name)),
            Entry::Vacant(slot) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                slot.insert(Room { name, lock, seq });
                Ok(())
            }
        }
    }

    pub fn find(&self, name: &str) -> Option<Room> {
        self.rooms.get(name).map(|entry| entry.clone())
    }

    /// All room names, snapshotted in creation order.
    pub fn list(&self) -> Vec<String> {
        let mut rooms: Vec<Room> = self.rooms.iter().map(|entry| entry.clone()).collect();
        rooms.sort_by_key(|room| room.seq);
        rooms.into_iter().map(|room| room.name).collect()
    }

    /// Removes every room matching `predicate` except the default room,
    /// returning the removed names.
    pub fn remove_where(&self, predicate: impl Fn(&Room) -> bool) -> Vec<String> {
        let mut removed = Vec::new();
        self.rooms.retain(|name, room| {
            if name != &self.default_name && predicate(room) {
                removed.push(name.clone());
                false
            } else {
                true
            }
        });
        removed
    }
}
