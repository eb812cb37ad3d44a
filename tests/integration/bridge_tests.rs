//! Bridge service integration tests.
//!
//! Drive the full [`Bridge`] with host packets and ticks against mock
//! adapters: identity, multi-part configuration, persistence across a
//! restart, analog reporting, outputs and keep-alive.

use sensorbridge::adapters::nvs::NvsEeprom;
use sensorbridge::app::events::BridgeEvent;
use sensorbridge::app::service::Bridge;
use sensorbridge::config::{BridgeConfig, FIRMWARE_VERSION};
use sensorbridge::error::{AssemblyError, CodecError, LinkError, OutputError};
use sensorbridge::protocol::{
    ConfigurationError, ConfigurationStored, Heartbeat, IdentityRequest, IdentityResponse,
    InputConfig, InputValue, MatrixConfig, Message, SetOutput,
};

use sensorbridge::adapters::pin_bank::PinBank;

use crate::mock_hw::{MockBoard, MockLink, MockPin, RecordingSink, analog, configure, packet};

// ── Harness ───────────────────────────────────────────────────

struct Rig {
    bridge: Bridge<NvsEeprom>,
    board: MockBoard,
    link: MockLink,
    sink: RecordingSink,
}

impl Rig {
    fn new() -> Self {
        Self::with_storage(NvsEeprom::new())
    }

    fn with_storage(storage: NvsEeprom) -> Self {
        let mut sink = RecordingSink::new();
        let mut bridge = Bridge::new(BridgeConfig::default(), storage).unwrap();
        bridge.start(&mut sink);
        Self {
            bridge,
            board: MockBoard::new(),
            link: MockLink::new(),
            sink,
        }
    }

    fn recv(&mut self, bytes: &[u8], now_ms: u32) {
        self.bridge
            .handle_packet(bytes, now_ms, &mut self.board, &mut self.link, &mut self.sink);
    }

    fn tick(&mut self, now_ms: u32) {
        self.bridge
            .tick(now_ms, &mut self.board, &mut self.link, &mut self.sink);
    }

    fn identity(&mut self, now_ms: u32) -> IdentityResponse {
        self.recv(&packet(IdentityRequest { request_id: 77 }), now_ms);
        match self.link.take().pop() {
            Some(Message::IdentityResponse(r)) => r,
            other => panic!("expected IdentityResponse, got {:?}", other),
        }
    }

    /// Send a one-part analog configuration and expect it stored.
    fn configure_analog(&mut self, config_id: u32, pin: u8, sensitivity: u8, now_ms: u32) {
        self.recv(&configure(config_id, 1, 0, analog(pin, sensitivity)), now_ms);
        assert_eq!(
            self.link.take(),
            [Message::from(ConfigurationStored { config_id })]
        );
    }

    fn input_values(&mut self) -> Vec<InputValue> {
        self.link
            .take()
            .into_iter()
            .filter_map(|m| match m {
                Message::InputValue(v) => Some(v),
                _ => None,
            })
            .collect()
    }
}

// ── Identity ──────────────────────────────────────────────────

#[test]
fn unconfigured_bridge_identifies_with_zero_config() {
    let mut rig = Rig::new();
    assert!(rig.sink.contains(&BridgeEvent::Started {
        config_id: 0,
        inputs: 0
    }));

    let resp = rig.identity(0);
    assert_eq!(resp.request_id, 77);
    assert_eq!(resp.version, FIRMWARE_VERSION);
    assert_eq!(resp.config_id, 0);
}

// ── Configuration ─────────────────────────────────────────────

#[test]
fn multi_part_configuration_out_of_order() {
    let mut rig = Rig::new();
    let matrix = MatrixConfig::new(&[1, 2], &[3, 4, 5]).unwrap();

    rig.recv(&configure(0xABCD, 3, 2, InputConfig::Matrix(matrix.clone())), 0);
    rig.recv(&configure(0xABCD, 3, 0, analog(4, 5)), 10);
    assert!(rig.link.sent.is_empty(), "no reply before the last part");
    assert_eq!(rig.bridge.pending_config_id(), Some(0xABCD));

    rig.recv(
        &configure(0xABCD, 3, 1, InputConfig::Button { pin: 9, debounce: 20 }),
        20,
    );
    assert_eq!(
        rig.link.take(),
        [Message::from(ConfigurationStored { config_id: 0xABCD })]
    );

    let active = rig.bridge.active_configuration();
    assert_eq!(active.config_id, 0xABCD);
    assert_eq!(
        active.inputs.as_slice(),
        [
            analog(4, 5),
            InputConfig::Button { pin: 9, debounce: 20 },
            InputConfig::Matrix(matrix),
        ]
    );
    assert_eq!(rig.bridge.sensor_count(), 1, "only analog inputs are sampled");
    assert_eq!(rig.identity(30).config_id, 0xABCD);
}

#[test]
fn duplicate_part_is_idempotent() {
    let mut rig = Rig::new();
    rig.recv(&configure(5, 2, 0, analog(1, 3)), 0);
    rig.recv(&configure(5, 2, 0, analog(1, 3)), 1);
    assert!(rig.link.sent.is_empty());
    rig.recv(&configure(5, 2, 1, analog(2, 3)), 2);
    assert_eq!(rig.bridge.active_configuration().inputs.len(), 2);
}

#[test]
fn new_config_id_discards_previous_session() {
    let mut rig = Rig::new();
    rig.recv(&configure(1, 2, 0, analog(1, 3)), 0);
    rig.recv(&configure(2, 1, 0, analog(7, 3)), 10);
    assert_eq!(
        rig.link.take(),
        [Message::from(ConfigurationStored { config_id: 2 })]
    );

    // The late second part of session 1 opens a fresh, incomplete session.
    rig.recv(&configure(1, 2, 1, analog(2, 3)), 20);
    assert!(rig.link.sent.is_empty());
    assert_eq!(rig.bridge.active_config_id(), 2);
}

#[test]
fn part_number_out_of_range_rejected() {
    let mut rig = Rig::new();
    rig.recv(&configure(9, 2, 2, analog(1, 3)), 0);
    assert_eq!(
        rig.link.take(),
        [Message::from(ConfigurationError { config_id: 9 })]
    );
    assert!(rig.sink.contains(&BridgeEvent::ConfigurationRejected {
        config_id: 9,
        reason: AssemblyError::InvalidPart { part: 2, total: 2 },
    }));
    assert_eq!(rig.bridge.pending_config_id(), None);
}

#[test]
fn zero_and_oversized_totals_rejected() {
    let mut rig = Rig::new();
    rig.recv(&configure(3, 0, 0, analog(1, 3)), 0);
    rig.recv(&configure(4, 9, 0, analog(1, 3)), 0);
    assert_eq!(
        rig.link.take(),
        [
            Message::from(ConfigurationError { config_id: 3 }),
            Message::from(ConfigurationError { config_id: 4 }),
        ]
    );
}

#[test]
fn out_of_range_sensitivity_rejected() {
    let mut rig = Rig::new();
    rig.recv(&configure(6, 1, 0, analog(1, 11)), 0);
    assert_eq!(
        rig.link.take(),
        [Message::from(ConfigurationError { config_id: 6 })]
    );
    assert_eq!(rig.bridge.active_config_id(), 0);
}

#[test]
fn unknown_input_kind_reported_as_configuration_error() {
    let mut rig = Rig::new();
    rig.recv(&configure(0x10, 2, 0, analog(1, 3)), 0);

    // kind byte 3 does not exist
    rig.recv(&[2, 0x10, 0, 0, 0, 2, 1, 3, 0, 0], 5);
    assert_eq!(
        rig.link.take(),
        [Message::from(ConfigurationError { config_id: 0x10 })]
    );
    assert!(rig.sink.contains(&BridgeEvent::PacketDropped(
        CodecError::UnknownInputKind(3)
    )));
    assert_eq!(rig.bridge.pending_config_id(), None);
}

#[test]
fn stalled_session_times_out_silently_then_rejects_late_part() {
    let mut rig = Rig::new();
    rig.recv(&configure(0x77, 2, 0, analog(1, 3)), 0);

    rig.tick(5000);
    assert_eq!(rig.bridge.pending_config_id(), Some(0x77));
    rig.tick(5001);
    assert_eq!(rig.bridge.pending_config_id(), None);
    assert!(rig.sink.contains(&BridgeEvent::ConfigurationTimedOut { config_id: 0x77 }));
    assert!(
        rig.link
            .take()
            .iter()
            .all(|m| !matches!(m, Message::ConfigurationError(_))),
        "timeout itself sends nothing but keep-alives"
    );

    rig.recv(&configure(0x77, 2, 1, analog(2, 3)), 5002);
    assert_eq!(
        rig.link.take(),
        [Message::from(ConfigurationError { config_id: 0x77 })]
    );

    // A full resend starts over and succeeds.
    rig.recv(&configure(0x77, 2, 0, analog(1, 3)), 5003);
    rig.recv(&configure(0x77, 2, 1, analog(2, 3)), 5004);
    assert_eq!(
        rig.link.take(),
        [Message::from(ConfigurationStored { config_id: 0x77 })]
    );
}

#[test]
fn same_id_retry_long_after_timeout_is_stored() {
    let mut rig = Rig::new();
    rig.recv(&configure(7, 2, 0, analog(1, 3)), 0);
    rig.tick(6000);
    assert_eq!(rig.bridge.pending_config_id(), None);
    rig.link.take();

    rig.recv(&configure(7, 2, 0, analog(1, 3)), 3_600_000);
    rig.recv(&configure(7, 2, 1, analog(2, 3)), 3_600_001);
    assert_eq!(
        rig.link.take(),
        [Message::from(ConfigurationStored { config_id: 7 })]
    );
    assert_eq!(rig.bridge.active_config_id(), 7);
}

#[test]
fn timeout_checked_on_part_arrival() {
    let mut rig = Rig::new();
    rig.recv(&configure(0x42, 2, 0, analog(1, 3)), 100);
    // No tick in between: the late part itself notices the expiry.
    rig.recv(&configure(0x42, 2, 1, analog(2, 3)), 5101);
    assert_eq!(
        rig.link.take(),
        [Message::from(ConfigurationError { config_id: 0x42 })]
    );
}

// ── Persistence ───────────────────────────────────────────────

#[test]
fn configuration_survives_restart() {
    let mut rig = Rig::new();
    rig.configure_analog(0xFEED, 4, 7, 0);
    let storage = rig.bridge.into_storage();
    assert_eq!(storage.commits(), 1);

    let mut rebooted = Rig::with_storage(storage);
    assert!(rebooted.sink.contains(&BridgeEvent::ConfigurationLoaded {
        config_id: 0xFEED,
        inputs: 1
    }));
    assert_eq!(rebooted.bridge.sensor_count(), 1);
    assert_eq!(rebooted.identity(0).config_id, 0xFEED);
}

#[test]
fn blank_storage_reports_load_failure() {
    let rig = Rig::new();
    assert!(
        rig.sink
            .events
            .iter()
            .any(|e| matches!(e, BridgeEvent::LoadFailed(_)))
    );
    assert_eq!(rig.bridge.sensor_count(), 0);
}

// ── Analog reporting ──────────────────────────────────────────

#[test]
fn analog_change_reported_after_gate() {
    let mut rig = Rig::new();
    rig.configure_analog(1, 4, 10, 0);
    rig.board.set_analog(4, 100);

    rig.tick(1); // baseline
    rig.tick(2);
    assert!(rig.input_values().is_empty(), "unchanged value is not sent");

    rig.board.set_analog(4, 200);
    rig.tick(3);
    assert_eq!(rig.input_values(), [InputValue { pin: 4, value: 200 }]);

    rig.board.set_analog(4, 202);
    rig.tick(4);
    assert!(rig.input_values().is_empty(), "within dead zone");
}

#[test]
fn low_sensitivity_waits_longer() {
    let mut rig = Rig::new();
    rig.configure_analog(1, 4, 0, 0);
    rig.board.set_analog(4, 10);
    rig.tick(1);
    rig.board.set_analog(4, 500);

    for t in 2..12 {
        rig.tick(t);
    }
    assert!(rig.input_values().is_empty(), "10 scans are below the gate");
    rig.tick(12);
    assert_eq!(rig.input_values(), [InputValue { pin: 4, value: 500 }]);
}

#[test]
fn steady_value_resent_every_200_scans() {
    let mut rig = Rig::new();
    rig.configure_analog(1, 4, 5, 0);
    rig.board.set_analog(4, 321);
    rig.tick(1);

    for t in 2..201 {
        rig.tick(t);
    }
    assert!(rig.input_values().is_empty());
    rig.tick(201);
    assert_eq!(rig.input_values(), [InputValue { pin: 4, value: 321 }]);
}

#[test]
fn readings_shared_round_robin() {
    let mut rig = Rig::new();
    rig.recv(&configure(2, 2, 0, analog(4, 10)), 0);
    rig.recv(&configure(2, 2, 1, analog(5, 10)), 0);
    rig.link.take();
    rig.board.set_analog(4, 0);
    rig.board.set_analog(5, 0);
    rig.tick(1);

    rig.board.set_analog(4, 1000);
    rig.board.set_analog(5, 2000);
    rig.tick(2);
    let values = rig.input_values();
    assert_eq!(values.len(), 2);
    assert!(values.contains(&InputValue { pin: 4, value: 1000 }));
    assert!(values.contains(&InputValue { pin: 5, value: 2000 }));
}

#[test]
fn reconfiguration_replaces_sensors() {
    let mut rig = Rig::new();
    rig.configure_analog(1, 4, 10, 0);
    rig.recv(
        &configure(2, 1, 0, InputConfig::Button { pin: 4, debounce: 5 }),
        1,
    );
    rig.link.take();
    assert_eq!(rig.bridge.sensor_count(), 0);

    rig.board.set_analog(4, 900);
    rig.tick(2);
    rig.tick(3);
    assert_eq!(rig.board.reads, 0);
    assert!(rig.input_values().is_empty());
}

// ── Outputs ───────────────────────────────────────────────────

#[test]
fn set_output_drives_pin() {
    let mut rig = Rig::new();
    rig.recv(&packet(SetOutput { pin: 5, value: 1 }), 0);
    rig.recv(&packet(SetOutput { pin: 5, value: 0 }), 1);
    assert_eq!(rig.board.level(5), Some(false));
    assert_eq!(
        rig.board
            .calls
            .iter()
            .filter(|c| matches!(c, crate::mock_hw::OutputCall::Configure(5)))
            .count(),
        1,
        "pin mode set once"
    );
    assert!(rig.sink.contains(&BridgeEvent::OutputSet { pin: 5, high: true }));
    assert!(rig.link.sent.is_empty(), "SetOutput has no reply");
}

#[test]
fn any_nonzero_value_is_high() {
    let mut rig = Rig::new();
    rig.recv(&packet(SetOutput { pin: 2, value: 200 }), 0);
    assert_eq!(rig.board.level(2), Some(true));
}

#[test]
fn invalid_output_pin_reported() {
    let mut rig = Rig::new();
    rig.recv(&packet(SetOutput { pin: 60, value: 1 }), 0);
    assert!(rig.sink.contains(&BridgeEvent::OutputFailed {
        pin: 60,
        error: OutputError::InvalidPin(60),
    }));
    assert_eq!(rig.board.level(60), None);
}

#[test]
fn set_output_through_hal_pin_bank() {
    let mut sink = RecordingSink::new();
    let mut link = MockLink::new();
    let mut bridge = Bridge::new(BridgeConfig::default(), NvsEeprom::new()).unwrap();
    bridge.start(&mut sink);

    let relay = MockPin::new();
    let mut bank = PinBank::new();
    assert!(bank.register(4, relay.clone()).is_ok());
    assert!(bank.register(9, MockPin::broken()).is_ok());

    bridge.handle_packet(&packet(SetOutput { pin: 4, value: 1 }), 0, &mut bank, &mut link, &mut sink);
    assert_eq!(relay.level(), Some(true));
    bridge.handle_packet(&packet(SetOutput { pin: 4, value: 0 }), 1, &mut bank, &mut link, &mut sink);
    assert_eq!(relay.level(), Some(false));
    assert!(sink.contains(&BridgeEvent::OutputSet { pin: 4, high: true }));

    bridge.handle_packet(&packet(SetOutput { pin: 7, value: 1 }), 2, &mut bank, &mut link, &mut sink);
    assert!(sink.contains(&BridgeEvent::OutputFailed {
        pin: 7,
        error: OutputError::InvalidPin(7),
    }));

    bridge.handle_packet(&packet(SetOutput { pin: 9, value: 1 }), 3, &mut bank, &mut link, &mut sink);
    assert!(sink.contains(&BridgeEvent::OutputFailed {
        pin: 9,
        error: OutputError::GpioWriteFailed,
    }));
    assert!(link.sent.is_empty());
}

// ── Keep-alive ────────────────────────────────────────────────

#[test]
fn heartbeat_only_when_idle() {
    let mut rig = Rig::new();
    rig.identity(1500);
    rig.tick(2000);
    rig.tick(3499);
    assert!(rig.link.sent.is_empty());

    rig.tick(3500);
    assert_eq!(rig.link.take(), [Message::from(Heartbeat)]);
    rig.tick(3510);
    assert!(rig.link.sent.is_empty());
    rig.tick(5500);
    assert_eq!(rig.link.take(), [Message::from(Heartbeat)]);
}

#[test]
fn send_failure_is_reported_and_counted() {
    let mut rig = Rig::new();
    rig.link.fail = true;
    rig.tick(2000);
    assert!(rig.sink.contains(&BridgeEvent::SendFailed(LinkError::WriteFailed)));
    assert_eq!(rig.bridge.stats().send_failures, 1);

    // Not retried every tick.
    rig.tick(2010);
    assert_eq!(rig.bridge.stats().send_failures, 1);
}

// ── Malformed input ───────────────────────────────────────────

#[test]
fn malformed_packets_dropped() {
    let mut rig = Rig::new();
    rig.recv(&[], 0);
    rig.recv(&[42], 0);
    rig.recv(&[0, 1, 2], 0);
    assert!(rig.link.sent.is_empty());
    assert_eq!(rig.bridge.stats().packets_dropped, 3);
    assert!(rig.sink.contains(&BridgeEvent::PacketDropped(CodecError::UnknownKind(42))));
    assert!(rig.sink.contains(&BridgeEvent::PacketDropped(CodecError::Truncated)));
}
