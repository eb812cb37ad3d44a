//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing bridge events to the `log` facade
//! (the ESP-IDF logger on target, whatever logger the test installs on
//! host).  Configuration ids are printed in hex, as the host tools show them.

use log::{info, warn};

use crate::app::events::BridgeEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`BridgeEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &BridgeEvent) {
        match event {
            BridgeEvent::Started { config_id, inputs } => {
                info!("START | config={:#010x} inputs={}", config_id, inputs);
            }
            BridgeEvent::ConfigurationLoaded { config_id, inputs } => {
                info!("CONFIG | loaded {:#010x} ({} inputs)", config_id, inputs);
            }
            BridgeEvent::LoadFailed(e) => {
                info!("CONFIG | none loaded: {}", e);
            }
            BridgeEvent::ConfigurationStored { config_id, inputs } => {
                info!("CONFIG | stored {:#010x} ({} inputs)", config_id, inputs);
            }
            BridgeEvent::ConfigurationRejected { config_id, reason } => {
                warn!("CONFIG | rejected {:#010x}: {}", config_id, reason);
            }
            BridgeEvent::ConfigurationTimedOut { config_id } => {
                warn!("CONFIG | {:#010x} timed out", config_id);
            }
            BridgeEvent::PacketDropped(e) => {
                warn!("LINK | packet dropped: {}", e);
            }
            BridgeEvent::OutputSet { pin, high } => {
                info!("OUTPUT | pin {} -> {}", pin, if *high { "HIGH" } else { "LOW" });
            }
            BridgeEvent::OutputFailed { pin, error } => {
                warn!("OUTPUT | pin {} failed: {}", pin, error);
            }
            BridgeEvent::SendFailed(e) => {
                warn!("LINK | send failed: {}", e);
            }
        }
    }
}
