//! Application state

use crate::config::Config;
use crate::gateway::BroadcastGateway;
use crate::registry::{RoomRegistry, UserRegistry};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Issues connection identities: strictly increasing from 1, never
/// reused within the process lifetime, safe under concurrent opens.
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Global application state shared by every connection handler and the
/// reaper task.
pub struct AppState {
    pub users: UserRegistry,
    pub rooms: RoomRegistry,
    pub gateway: BroadcastGateway,
    pub ids: IdAllocator,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            users: UserRegistry::new(),
            rooms: RoomRegistry::new(config.room.default_name.clone()),
            gateway: BroadcastGateway::new(),
            ids: IdAllocator::new(),
            config: Arc::new(config),
        }
    }
}

/// Per-connection context built at socket open, before any protocol
/// message. Binds the transport connection to its logical user id.
#[derive(Debug, Clone)]
pub struct ConnContext {
    pub user_id: u64,
    #[allow(dead_code)]
    pub connected_at: Instant,
}
