//! System configuration parameters
//!
//! Timing knobs for the bridge runtime.  Wire and storage layout constants
//! live next to the code that owns them ([`protocol`](crate::protocol),
//! [`store`](crate::store)) because changing them breaks compatibility.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Firmware version reported in every IdentityResponse.
pub const FIRMWARE_VERSION: FirmwareVersion = FirmwareVersion {
    major: 1,
    minor: 0,
    patch: 1,
};

/// Semantic firmware version triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

/// Core runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Delay between scheduler ticks (milliseconds). One tick = one scan.
    pub tick_interval_ms: u32,
    /// Idle time after which a standalone Heartbeat is sent (milliseconds)
    pub heartbeat_interval_ms: u32,
    /// A configuration session older than this is abandoned (milliseconds)
    pub assembly_timeout_ms: u32,
    /// Serial link baud rate
    pub uart_baud: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 10, // ~100 Hz, so 200 scans ≈ 2 s
            heartbeat_interval_ms: 2000,
            assembly_timeout_ms: 5000,
            uart_baud: 115_200,
        }
    }
}

impl BridgeConfig {
    /// Range-check every field.
    pub fn validate(&self) -> Result<()> {
        if !(1..=1000).contains(&self.tick_interval_ms) {
            return Err(Error::Config("tick_interval_ms must be 1–1000"));
        }
        if self.heartbeat_interval_ms <= self.tick_interval_ms {
            return Err(Error::Config(
                "heartbeat_interval_ms must be longer than one tick",
            ));
        }
        if self.assembly_timeout_ms <= self.tick_interval_ms {
            return Err(Error::Config(
                "assembly_timeout_ms must be longer than one tick",
            ));
        }
        if self.uart_baud == 0 {
            return Err(Error::Config("uart_baud must be non-zero"));
        }
        Ok(())
    }
}
