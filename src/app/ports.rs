//! Port traits — the hexagonal boundary between the bridge core and the board.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Bridge (domain)
//! ```
//!
//! Driven adapters (ADC, GPIO, EEPROM image, serial link, event sinks)
//! implement these traits.  The [`Bridge`](super::service::Bridge) consumes
//! them via generics, so the core never touches hardware directly.

use crate::error::{LinkError, OutputError, SensorError, StorageError};

// ───────────────────────────────────────────────────────────────
// Analog input port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the sensor pipeline samples inputs through this.
pub trait AnalogPort {
    /// One raw ADC sample for `pin`.  Must not block longer than a
    /// single conversion.
    fn read_analog(&mut self, pin: u8) -> Result<u16, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Digital output port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: SetOutput requests end up here.
pub trait OutputPort {
    /// Put `pin` into push-pull output mode.
    fn configure_output(&mut self, pin: u8) -> Result<(), OutputError>;

    /// Drive a configured output pin.
    fn write_output(&mut self, pin: u8, high: bool) -> Result<(), OutputError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ EEPROM / flash)
// ───────────────────────────────────────────────────────────────

/// Byte-addressed persistent storage, EEPROM style.
///
/// Writes may be buffered until [`commit`](Self::commit); backends that
/// write through leave the default no-op in place.
pub trait StoragePort {
    /// Total addressable bytes.
    fn capacity(&self) -> usize;

    /// Fill `buf` from `addr..addr + buf.len()`.
    fn read(&self, addr: usize, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Overwrite `addr..addr + data.len()`.
    fn write(&mut self, addr: usize, data: &[u8]) -> Result<(), StorageError>;

    /// Make every preceding write durable.
    fn commit(&mut self) -> Result<(), StorageError> {
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Packet sink port (driven adapter: domain → host link)
// ───────────────────────────────────────────────────────────────

/// Sends one encoded message to the host.  The adapter owns the framing.
pub trait PacketSink {
    fn send_packet(&mut self, packet: &[u8]) -> Result<(), LinkError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`BridgeEvent`](super::events::BridgeEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::BridgeEvent);
}
