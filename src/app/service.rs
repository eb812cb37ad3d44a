//! Bridge service — the hexagonal core.
//!
//! [`Bridge`] owns the configuration assembler, the persistent store, the
//! sensor pipeline, the output bank and the keep-alive timer.  All I/O
//! flows through port traits injected at call sites, so the whole service
//! runs against mock adapters on the host.
//!
//! ```text
//!  packet ──▶ ┌──────────────────────────────┐ ──▶ PacketSink
//!             │            Bridge            │
//! AnalogPort ─│ Assembler · Store · Sensors  │ ──▶ EventSink
//! OutputPort ◀│ Outputs · Heartbeat          │
//!             └──────────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::assembler::{AssemblyOutcome, ConfigAssembler, Configuration};
use crate::config::{BridgeConfig, FIRMWARE_VERSION};
use crate::error::{AssemblyError, CodecError, Result};
use crate::heartbeat::HeartbeatTimer;
use crate::outputs::OutputBank;
use crate::protocol::wire::Reader;
use crate::protocol::{
    ConfigurationError, ConfigurationStored, Configure, Heartbeat, IdentityRequest,
    IdentityResponse, InputValue, MAX_MESSAGE_LEN, Message, MessageKind, SetOutput,
};
use crate::sensors::SensorManager;
use crate::store::ConfigStore;

use super::events::BridgeEvent;
use super::ports::{AnalogPort, EventSink, OutputPort, PacketSink, StoragePort};

// ───────────────────────────────────────────────────────────────
// Counters
// ───────────────────────────────────────────────────────────────

/// Running totals since boot, for diagnostics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BridgeStats {
    pub packets_received: u32,
    pub packets_dropped: u32,
    pub messages_sent: u32,
    pub send_failures: u32,
    pub readings_sent: u32,
    pub heartbeats_sent: u32,
    pub configurations_stored: u32,
    pub configurations_rejected: u32,
    pub configurations_timed_out: u32,
}

// ───────────────────────────────────────────────────────────────
// Bridge
// ───────────────────────────────────────────────────────────────

pub struct Bridge<S> {
    config: BridgeConfig,
    assembler: ConfigAssembler,
    store: ConfigStore<S>,
    sensors: SensorManager,
    outputs: OutputBank,
    heartbeat: HeartbeatTimer,
    active: Configuration,
    stats: BridgeStats,
}

impl<S: StoragePort> Bridge<S> {
    /// Construct the bridge over `storage`.
    ///
    /// Does **not** touch storage — call [`start`](Self::start) next.
    pub fn new(config: BridgeConfig, storage: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            assembler: ConfigAssembler::new(config.assembly_timeout_ms),
            store: ConfigStore::new(storage),
            sensors: SensorManager::new(),
            outputs: OutputBank::new(),
            heartbeat: HeartbeatTimer::new(config.heartbeat_interval_ms),
            active: Configuration::empty(),
            stats: BridgeStats::default(),
            config,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Load and apply the persisted configuration.
    ///
    /// A missing or unusable record is not an error: the bridge then runs
    /// with no inputs and reports config id 0 until the host configures it.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        match self.store.load() {
            Ok(loaded) => {
                self.sensors.apply_configuration(&loaded);
                sink.emit(&BridgeEvent::ConfigurationLoaded {
                    config_id: loaded.config_id,
                    inputs: loaded.inputs.len(),
                });
                self.active = loaded;
            }
            Err(e) => {
                warn!("No stored configuration: {}", e);
                sink.emit(&BridgeEvent::LoadFailed(e));
            }
        }
        sink.emit(&BridgeEvent::Started {
            config_id: self.active.config_id,
            inputs: self.active.inputs.len(),
        });
        info!(
            "Bridge started (config {:#010x}, {} sampled inputs)",
            self.active.config_id,
            self.sensors.len()
        );
    }

    // ── Host packets ──────────────────────────────────────────

    /// Handle one de-framed packet from the host.
    pub fn handle_packet(
        &mut self,
        packet: &[u8],
        now_ms: u32,
        hw: &mut impl OutputPort,
        link: &mut impl PacketSink,
        sink: &mut impl EventSink,
    ) {
        self.stats.packets_received = self.stats.packets_received.wrapping_add(1);

        let message = match Message::decode(packet) {
            Ok(m) => m,
            Err(e) => {
                self.stats.packets_dropped = self.stats.packets_dropped.wrapping_add(1);
                debug!("Dropping {} byte packet: {}", packet.len(), e);
                sink.emit(&BridgeEvent::PacketDropped(e));
                if let CodecError::UnknownInputKind(_) = e {
                    self.reject_unknown_input(packet, now_ms, link, sink);
                }
                return;
            }
        };

        match message {
            Message::IdentityRequest(req) => self.handle_identity(req, now_ms, link, sink),
            Message::Configure(part) => self.handle_configure(&part, now_ms, link, sink),
            Message::SetOutput(cmd) => self.handle_set_output(cmd, hw, sink),
            other => debug!("Ignoring {:?} from host", other.kind()),
        }
    }

    fn handle_identity(
        &mut self,
        req: IdentityRequest,
        now_ms: u32,
        link: &mut impl PacketSink,
        sink: &mut impl EventSink,
    ) {
        let response = IdentityResponse {
            request_id: req.request_id,
            version: FIRMWARE_VERSION,
            config_id: self.active.config_id,
        };
        self.send(&response.into(), now_ms, link, sink);
    }

    fn handle_configure(
        &mut self,
        part: &Configure,
        now_ms: u32,
        link: &mut impl PacketSink,
        sink: &mut impl EventSink,
    ) {
        match self.assembler.feed(part, now_ms) {
            AssemblyOutcome::Pending {
                config_id,
                received,
                total,
            } => {
                debug!(
                    "Configuration {:#010x}: {}/{} parts",
                    config_id, received, total
                );
            }
            AssemblyOutcome::Complete(config) => self.commit(config, now_ms, link, sink),
            AssemblyOutcome::Rejected { config_id, reason } => {
                self.reject(config_id, reason, now_ms, link, sink);
            }
        }
    }

    /// Persist, apply, then acknowledge.  A failed save keeps the previous
    /// configuration active.
    fn commit(
        &mut self,
        config: Configuration,
        now_ms: u32,
        link: &mut impl PacketSink,
        sink: &mut impl EventSink,
    ) {
        let config_id = config.config_id;
        if let Err(e) = self.store.save(&config) {
            warn!("Configuration {:#010x} not stored: {}", config_id, e);
            self.reject(config_id, AssemblyError::StoreFailed, now_ms, link, sink);
            return;
        }

        self.sensors.apply_configuration(&config);
        self.stats.configurations_stored = self.stats.configurations_stored.wrapping_add(1);
        sink.emit(&BridgeEvent::ConfigurationStored {
            config_id,
            inputs: config.inputs.len(),
        });
        self.active = config;
        self.send(&ConfigurationStored { config_id }.into(), now_ms, link, sink);
    }

    fn reject(
        &mut self,
        config_id: u32,
        reason: AssemblyError,
        now_ms: u32,
        link: &mut impl PacketSink,
        sink: &mut impl EventSink,
    ) {
        info!("Configuration {:#010x} rejected: {}", config_id, reason);
        self.stats.configurations_rejected = self.stats.configurations_rejected.wrapping_add(1);
        sink.emit(&BridgeEvent::ConfigurationRejected { config_id, reason });
        self.send(&ConfigurationError { config_id }.into(), now_ms, link, sink);
    }

    /// A Configure part whose input kind is unknown still names its
    /// config id; the session is abandoned and the host told.
    fn reject_unknown_input(
        &mut self,
        packet: &[u8],
        now_ms: u32,
        link: &mut impl PacketSink,
        sink: &mut impl EventSink,
    ) {
        let mut r = Reader::new(packet);
        let Ok(kind) = r.u8() else { return };
        if kind != MessageKind::Configure as u8 {
            return;
        }
        let Ok(config_id) = r.u32_le() else { return };
        self.assembler.reset();
        self.reject(config_id, AssemblyError::InvalidInput, now_ms, link, sink);
    }

    fn handle_set_output(
        &mut self,
        cmd: SetOutput,
        hw: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) {
        match self.outputs.set(hw, cmd.pin, cmd.value) {
            Ok(()) => sink.emit(&BridgeEvent::OutputSet {
                pin: cmd.pin,
                high: cmd.is_high(),
            }),
            Err(error) => {
                warn!("SetOutput pin {}: {}", cmd.pin, error);
                sink.emit(&BridgeEvent::OutputFailed {
                    pin: cmd.pin,
                    error,
                });
            }
        }
    }

    // ── Per-tick work ─────────────────────────────────────────

    /// One scheduler tick: session timeout, sensor scan, reading drain,
    /// keep-alive.
    pub fn tick(
        &mut self,
        now_ms: u32,
        adc: &mut impl AnalogPort,
        link: &mut impl PacketSink,
        sink: &mut impl EventSink,
    ) {
        if let Some(config_id) = self.assembler.check_timeout(now_ms) {
            self.stats.configurations_timed_out =
                self.stats.configurations_timed_out.wrapping_add(1);
            sink.emit(&BridgeEvent::ConfigurationTimedOut { config_id });
        }

        self.sensors.scan(adc);
        while let Some(reading) = self.sensors.next_reading() {
            let msg = InputValue {
                pin: reading.pin,
                value: reading.value,
            };
            if self.send(&msg.into(), now_ms, link, sink) {
                self.stats.readings_sent = self.stats.readings_sent.wrapping_add(1);
            }
        }

        if self.heartbeat.is_due(now_ms) {
            if self.send(&Heartbeat.into(), now_ms, link, sink) {
                self.stats.heartbeats_sent = self.stats.heartbeats_sent.wrapping_add(1);
            } else {
                // Retry after a full interval rather than every tick.
                self.heartbeat.notify_sent(now_ms);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Id of the applied configuration (0 = none).
    pub fn active_config_id(&self) -> u32 {
        self.active.config_id
    }

    pub fn active_configuration(&self) -> &Configuration {
        &self.active
    }

    /// Number of inputs being sampled.
    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }

    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Id of the configuration session in progress, if any.
    pub fn pending_config_id(&self) -> Option<u32> {
        self.assembler.active_id()
    }

    pub fn store(&self) -> &ConfigStore<S> {
        &self.store
    }

    /// Tear the bridge down, handing back its storage backend.
    pub fn into_storage(self) -> S {
        self.store.into_inner()
    }

    // ── Internal ──────────────────────────────────────────────

    /// Encode and hand one message to the link.  Only a successful send
    /// restarts the keep-alive interval.
    fn send(
        &mut self,
        message: &Message,
        now_ms: u32,
        link: &mut impl PacketSink,
        sink: &mut impl EventSink,
    ) -> bool {
        let mut buf = [0u8; MAX_MESSAGE_LEN];
        let len = match message.encode(&mut buf) {
            Ok(len) => len,
            Err(e) => {
                warn!("Cannot encode {:?}: {}", message.kind(), e);
                return false;
            }
        };
        match link.send_packet(&buf[..len]) {
            Ok(()) => {
                self.stats.messages_sent = self.stats.messages_sent.wrapping_add(1);
                self.heartbeat.notify_sent(now_ms);
                true
            }
            Err(e) => {
                self.stats.send_failures = self.stats.send_failures.wrapping_add(1);
                warn!("Send {:?} failed: {}", message.kind(), e);
                sink.emit(&BridgeEvent::SendFailed(e));
                false
            }
        }
    }
}
