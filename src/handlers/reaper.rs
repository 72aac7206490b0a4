//! Presence reaper

use crate::state::AppState;
use std::sync::Arc;

/// One cleanup sweep: collect offline user records, then drop every
/// room no online user occupies. Disconnects were already announced to
/// peers, so removal here is garbage collection, not notification.
/// The default room is never removed.
pub fn sweep(state: &AppState) {
    let occupied = state.users.occupied_rooms();

    let reaped_users = state.users.remove_where(|user| !user.online);
    let reaped_rooms = state
        .rooms
        .remove_where(|room| !occupied.contains(&room.name));
    for room in &reaped_rooms {
        state.gateway.drop_channel(room);
    }

    if reaped_users > 0 || !reaped_rooms.is_empty() {
        tracing::info!(
            users = reaped_users,
            rooms = reaped_rooms.len(),
            "Reaper sweep completed"
        );
    }
}

/// Runs sweeps on the configured interval until the process stops.
pub async fn run(state: Arc<AppState>) {
    let period = tokio::time::Duration::from_secs(state.config.reaper.interval_secs);
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        sweep(&state);
    }
}
