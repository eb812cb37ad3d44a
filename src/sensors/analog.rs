//! Analog input with change-driven reporting.
//!
//! Each scan takes one raw ADC sample.  A reading is reported when either
//!
//! 1. `MAX_SEND_INTERVAL` scans passed since the last report (keep-alive
//!    even when nothing changed), or
//! 2. the sample moved more than `DEAD_ZONE` counts away from the last
//!    reported value and at least `11 - sensitivity` scans have passed.
//!
//! The first scan after construction only records the baseline.

use log::warn;

use crate::app::ports::AnalogPort;

/// Scans after which a reading is forced even without change.
pub const MAX_SEND_INTERVAL: u16 = 200;

/// Changes of this many counts or fewer are treated as noise.
pub const DEAD_ZONE: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub pin: u8,
    pub value: i16,
}

#[derive(Debug, Clone)]
pub struct AnalogSensor {
    pin: u8,
    min_send_interval: u16,
    current: u16,
    last_sent: u16,
    scans_since_send: u16,
    primed: bool,
}

impl AnalogSensor {
    /// `sensitivity` is clamped to 0..=10.
    pub fn new(pin: u8, sensitivity: u8) -> Self {
        Self {
            pin,
            min_send_interval: min_send_interval(sensitivity),
            current: 0,
            last_sent: 0,
            scans_since_send: 0,
            primed: false,
        }
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// Minimum scans between two change-driven reports.
    pub fn min_send_interval(&self) -> u16 {
        self.min_send_interval
    }

    pub fn scans_since_send(&self) -> u16 {
        self.scans_since_send
    }

    /// Sample once.  A failed read keeps the previous sample.
    pub fn scan(&mut self, adc: &mut impl AnalogPort) {
        let sample = match adc.read_analog(self.pin) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Analog pin {}: {}", self.pin, e);
                if self.primed {
                    self.scans_since_send = self.scans_since_send.saturating_add(1);
                }
                return;
            }
        };

        if !self.primed {
            self.current = sample;
            self.last_sent = sample;
            self.scans_since_send = 0;
            self.primed = true;
            return;
        }

        self.current = sample;
        self.scans_since_send = self.scans_since_send.saturating_add(1);
    }

    /// Whether [`take_reading`](Self::take_reading) would return a value.
    pub fn is_ready(&self) -> bool {
        if !self.primed {
            return false;
        }
        if self.scans_since_send >= MAX_SEND_INTERVAL {
            return true;
        }
        if self.scans_since_send < self.min_send_interval {
            return false;
        }
        self.current.abs_diff(self.last_sent) > DEAD_ZONE
    }

    /// Consume the pending reading, if any, and restart the report window.
    pub fn take_reading(&mut self) -> Option<Reading> {
        if !self.is_ready() {
            return None;
        }
        self.last_sent = self.current;
        self.scans_since_send = 0;
        Some(Reading {
            pin: self.pin,
            value: self.current as i16,
        })
    }
}

/// Sensitivity 10 → 1 scan, 5 → 6 scans, 0 → 11 scans.
fn min_send_interval(sensitivity: u8) -> u16 {
    11 - u16::from(sensitivity.min(10))
}
