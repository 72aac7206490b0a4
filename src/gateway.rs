//! Broadcast gateway
//!
//! Bridges the registries to the transport: one outbound mpsc sender per
//! connection, plus a subscription table from room name to connection
//! ids. Sends are fire-and-forget; a send to a closing connection is
//! silently dropped along with its channel.

use crate::protocol::Envelope;
use dashmap::DashMap;
use std::collections::HashSet;
use tokio::sync::mpsc::UnboundedSender;

pub type ConnectionSender = UnboundedSender<Envelope>;

#[derive(Default)]
pub struct BroadcastGateway {
    /// connection id -> outbound channel
    peers: DashMap<u64, ConnectionSender>,
    /// room name -> subscribed connection ids
    channels: DashMap<String, HashSet<u64>>,
}

impl BroadcastGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection's outbound channel.
    pub fn attach(&self, conn_id: u64, sender: ConnectionSender) {
        self.peers.insert(conn_id, sender);
    }

    /// Removes a connection and abandons all of its subscriptions.
    pub fn detach(&self, conn_id: u64) {
        self.peers.remove(&conn_id);
        self.channels.retain(|_, subscribers| {
            subscribers.remove(&conn_id);
            !subscribers.is_empty()
        });
    }

    /// Subscribes a connection to a room's channel. Idempotent.
    pub fn subscribe(&self, conn_id: u64, room: &str) {
        self.channels
            .entry(room.to_string())
            .or_default()
            .insert(conn_id);
    }

    /// Unsubscribes a connection from a room's channel. Idempotent;
    /// unsubscribing a non-subscriber is a no-op.
    pub fn unsubscribe(&self, conn_id: u64, room: &str) {
        let emptied = if let Some(mut subscribers) = self.channels.get_mut(room) {
            subscribers.remove(&conn_id);
            subscribers.is_empty()
        } else {
            false
        };
        if emptied {
            self.channels.remove(room);
        }
    }

    /// Delivers the envelope to every current subscriber of `room`,
    /// the sender included if subscribed.
    pub fn publish(&self, room: &str, envelope: &Envelope) {
        let subscribers: Vec<u64> = match self.channels.get(room) {
            Some(subscribers) => subscribers.iter().copied().collect(),
            None => return,
        };
        for conn_id in subscribers {
            if let Some(sender) = self.peers.get(&conn_id) {
                let _ = sender.send(envelope.clone());
            }
        }
    }

    /// Delivers the envelope to exactly one connection.
    pub fn send_direct(&self, conn_id: u64, envelope: Envelope) {
        if let Some(sender) = self.peers.get(&conn_id) {
            let _ = sender.send(envelope);
        }
    }

    /// Drops a room's channel outright (reaped rooms).
    pub fn drop_channel(&self, room: &str) {
        self.channels.remove(room);
    }
}
