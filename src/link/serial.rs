//! Packet link over a byte [`Transport`].

use heapless::Vec;
use log::warn;

use super::framing::{MAX_FRAME_LEN, MAX_PACKET_LEN, PacketDecoder, encode_packet};
use super::transport::Transport;
use crate::app::ports::PacketSink;
use crate::error::LinkError;

/// One decoded host packet.
pub type Packet = Vec<u8, MAX_PACKET_LEN>;

const RX_CHUNK: usize = 64;

/// Owns a transport, de-frames incoming bytes and frames outgoing packets.
pub struct SerialLink<T> {
    transport: T,
    decoder: PacketDecoder,
    rx_buf: [u8; RX_CHUNK],
    rx_len: usize,
    rx_pos: usize,
}

impl<T: Transport> SerialLink<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            decoder: PacketDecoder::new(),
            rx_buf: [0; RX_CHUNK],
            rx_len: 0,
            rx_pos: 0,
        }
    }

    /// Next complete packet, reading from the transport as needed.
    ///
    /// Returns `None` once the transport has no more data; call again on
    /// the next loop iteration.
    pub fn poll_packet(&mut self) -> Option<Packet> {
        loop {
            while self.rx_pos < self.rx_len {
                let byte = self.rx_buf[self.rx_pos];
                self.rx_pos += 1;
                if let Some(packet) = self.decoder.push(byte) {
                    return Packet::from_slice(packet).ok();
                }
            }

            self.rx_pos = 0;
            self.rx_len = 0;
            match self.transport.read(&mut self.rx_buf) {
                Ok(0) => return None,
                Ok(n) => self.rx_len = n.min(RX_CHUNK),
                Err(e) => {
                    warn!("Link read failed: {:?}", e);
                    return None;
                }
            }
        }
    }

    /// Frames dropped by the decoder since start.
    pub fn dropped_frames(&self) -> u32 {
        self.decoder.dropped()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

impl<T: Transport> PacketSink for SerialLink<T> {
    fn send_packet(&mut self, packet: &[u8]) -> Result<(), LinkError> {
        let mut frame = [0u8; MAX_FRAME_LEN + 1];
        let len = encode_packet(packet, &mut frame)?;

        let mut written = 0;
        while written < len {
            match self.transport.write(&frame[written..len]) {
                Ok(0) => return Err(LinkError::WriteFailed),
                Ok(n) => written += n,
                Err(e) => {
                    warn!("Link write failed: {:?}", e);
                    return Err(LinkError::WriteFailed);
                }
            }
        }
        self.transport.flush().map_err(|e| {
            warn!("Link flush failed: {:?}", e);
            LinkError::WriteFailed
        })
    }
}
