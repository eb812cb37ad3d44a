//! End-to-end link tests.
//!
//! A host byte stream goes through [`SerialLink`] into the bridge and the
//! bridge's replies come back out as COBS frames on the same transport.

use std::collections::VecDeque;

use sensorbridge::adapters::nvs::NvsEeprom;
use sensorbridge::app::service::Bridge;
use sensorbridge::config::BridgeConfig;
use sensorbridge::link::{MAX_FRAME_LEN, PacketDecoder, SerialLink, Transport, encode_packet};
use sensorbridge::protocol::{
    ConfigurationStored, IdentityRequest, InputValue, Message, SetOutput,
};

use crate::mock_hw::{MockBoard, RecordingSink, analog, configure, packet};

/// Host side of a serial line: bytes queued for the device, bytes it wrote.
#[derive(Default)]
struct Wire {
    to_device: VecDeque<u8>,
    from_device: Vec<u8>,
    /// Largest chunk handed out per read, to mimic a UART FIFO.
    chunk: usize,
}

impl Wire {
    fn new(chunk: usize) -> Self {
        Self {
            chunk,
            ..Self::default()
        }
    }

    fn host_send(&mut self, payload: &[u8]) {
        let mut frame = [0u8; MAX_FRAME_LEN + 1];
        let n = encode_packet(payload, &mut frame).unwrap();
        self.to_device.extend(&frame[..n]);
    }

    /// Decode everything the device wrote so far.
    fn host_receive(&mut self) -> Vec<Message> {
        let mut decoder = PacketDecoder::new();
        let mut out = Vec::new();
        for b in self.from_device.drain(..) {
            if let Some(p) = decoder.push(b) {
                out.push(Message::decode(p).unwrap());
            }
        }
        out
    }
}

impl Transport for Wire {
    type Error = ();

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        let n = buf.len().min(self.chunk).min(self.to_device.len());
        for slot in &mut buf[..n] {
            *slot = self.to_device.pop_front().unwrap_or(0);
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        self.from_device.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }
}

/// One main-loop iteration: drain packets, then tick.
fn run_once(
    bridge: &mut Bridge<NvsEeprom>,
    link: &mut SerialLink<Wire>,
    board: &mut MockBoard,
    sink: &mut RecordingSink,
    now_ms: u32,
) {
    while let Some(p) = link.poll_packet() {
        bridge.handle_packet(&p, now_ms, board, link, sink);
    }
    bridge.tick(now_ms, board, link, sink);
}

#[test]
fn configure_and_report_over_framed_link() {
    let mut sink = RecordingSink::new();
    let mut board = MockBoard::new();
    let mut bridge = Bridge::new(BridgeConfig::default(), NvsEeprom::new()).unwrap();
    bridge.start(&mut sink);
    let mut link = SerialLink::new(Wire::new(3));

    link.transport_mut()
        .host_send(&configure(0x5151, 1, 0, analog(6, 10)));
    link.transport_mut()
        .host_send(&packet(IdentityRequest { request_id: 0 }));
    board.set_analog(6, 0);
    run_once(&mut bridge, &mut link, &mut board, &mut sink, 0);

    let replies = link.transport_mut().host_receive();
    assert_eq!(replies.len(), 2);
    assert_eq!(
        replies[0],
        Message::from(ConfigurationStored { config_id: 0x5151 })
    );
    match &replies[1] {
        Message::IdentityResponse(r) => assert_eq!(r.config_id, 0x5151),
        other => panic!("unexpected {:?}", other),
    }

    board.set_analog(6, 1500);
    run_once(&mut bridge, &mut link, &mut board, &mut sink, 10);
    assert_eq!(
        link.transport_mut().host_receive(),
        [Message::from(InputValue {
            pin: 6,
            value: 1500
        })]
    );
}

#[test]
fn garbage_between_frames_is_skipped() {
    let mut sink = RecordingSink::new();
    let mut board = MockBoard::new();
    let mut bridge = Bridge::new(BridgeConfig::default(), NvsEeprom::new()).unwrap();
    bridge.start(&mut sink);
    let mut link = SerialLink::new(Wire::new(64));

    // Line noise: a frame whose code byte overruns, then a valid command.
    link.transport_mut().to_device.extend([0x09, 0x01, 0x00]);
    link.transport_mut()
        .host_send(&packet(SetOutput { pin: 12, value: 1 }));
    run_once(&mut bridge, &mut link, &mut board, &mut sink, 0);

    assert_eq!(board.level(12), Some(true));
    assert_eq!(link.dropped_frames(), 1);
    assert!(link.transport_mut().host_receive().is_empty());
}

#[test]
fn every_reply_is_one_zero_terminated_frame() {
    let mut sink = RecordingSink::new();
    let mut board = MockBoard::new();
    let mut bridge = Bridge::new(BridgeConfig::default(), NvsEeprom::new()).unwrap();
    bridge.start(&mut sink);
    let mut link = SerialLink::new(Wire::new(64));

    // The request id contains zero bytes, which must be stuffed.
    link.transport_mut()
        .host_send(&packet(IdentityRequest { request_id: 0x0100 }));
    run_once(&mut bridge, &mut link, &mut board, &mut sink, 0);

    let raw = &link.transport().from_device;
    assert_eq!(raw.iter().filter(|&&b| b == 0).count(), 1);
    assert_eq!(raw.last(), Some(&0));
}
