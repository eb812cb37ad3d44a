//! Outbound bridge events.
//!
//! The [`Bridge`](super::service::Bridge) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  They describe what the
//! core did, independent of what was sent to the host.

use crate::error::{AssemblyError, CodecError, LinkError, LoadError, OutputError};

/// Structured events emitted by the bridge core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// Boot finished.  `config_id` is 0 when nothing was loaded.
    Started { config_id: u32, inputs: usize },

    /// The persisted configuration was applied at boot.
    ConfigurationLoaded { config_id: u32, inputs: usize },

    /// No usable persisted configuration; running unconfigured.
    LoadFailed(LoadError),

    /// A completed configuration was persisted and applied.
    ConfigurationStored { config_id: u32, inputs: usize },

    /// A configuration part or completed configuration was refused.
    ConfigurationRejected {
        config_id: u32,
        reason: AssemblyError,
    },

    /// A stalled configuration session was dropped.
    ConfigurationTimedOut { config_id: u32 },

    /// An incoming packet could not be decoded.
    PacketDropped(CodecError),

    /// A SetOutput request was applied.
    OutputSet { pin: u8, high: bool },

    /// A SetOutput request failed.
    OutputFailed { pin: u8, error: OutputError },

    /// An outgoing message could not be handed to the link.
    SendFailed(LinkError),
}
