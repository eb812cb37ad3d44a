//! Link keep-alive timer.
//!
//! The host treats a silent link as a dead device, so a Heartbeat goes out
//! whenever nothing else was sent for `interval_ms`.  Every transmitted
//! message restarts the interval.

#[derive(Debug, Clone)]
pub struct HeartbeatTimer {
    interval_ms: u32,
    last_message_ms: u32,
}

impl HeartbeatTimer {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_message_ms: 0,
        }
    }

    /// Record a transmission at `now_ms`.
    pub fn notify_sent(&mut self, now_ms: u32) {
        self.last_message_ms = now_ms;
    }

    /// True once `interval_ms` elapsed since the last transmission.
    pub fn is_due(&self, now_ms: u32) -> bool {
        now_ms.wrapping_sub(self.last_message_ms) >= self.interval_ms
    }

    pub fn interval(&self) -> u32 {
        self.interval_ms
    }

    pub fn last_message_ms(&self) -> u32 {
        self.last_message_ms
    }
}
