use std::time::{Duration, Instant};

use crate::Timer;

/// Decides when a network update is due.
pub struct ReplicationScheduler {
    timer: Timer,
    min_connected_peers: usize,
}

impl ReplicationScheduler {
    pub fn new(interval: Duration, min_connected_peers: usize, now: Instant) -> Self {
        Self {
            timer: Timer::new(interval, now),
            min_connected_peers,
        }
    }

    /// Server side: true once per interval while enough peers are
    /// connected. The interval restarts whether or not a broadcast follows.
    pub fn server_update_due(&mut self, now: Instant, connected_peers: usize) -> bool {
        if !self.timer.ringing(now) {
            return false;
        }
        self.timer.reset(now);
        connected_peers >= self.min_connected_peers
    }

    /// Client side: true once per interval after the first full snapshot.
    pub fn client_update_due(&mut self, now: Instant, has_full_server_data: bool) -> bool {
        if !self.timer.ringing(now) {
            return false;
        }
        self.timer.reset(now);
        has_full_server_data
    }

    pub fn interval(&self) -> Duration {
        self.timer.duration()
    }
}
