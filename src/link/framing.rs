//! COBS packet framing.
//!
//! Wire format:
//! ```text
//! ┌──────────────────────────────┬──────┐
//! │ COBS(packet), no zero bytes  │ 0x00 │
//! └──────────────────────────────┴──────┘
//! ```
//!
//! The decoder is fed one byte at a time, so partial reads and several
//! packets in a single read are both handled.  A frame that overflows the
//! buffer or does not decode is dropped and the decoder waits for the
//! next delimiter.

use heapless::Vec;
use log::{debug, warn};

use crate::error::LinkError;

/// Largest decoded packet accepted or sent.
pub const MAX_PACKET_LEN: usize = 64;

/// Largest encoded frame, excluding the delimiter.
pub const MAX_FRAME_LEN: usize = MAX_PACKET_LEN + MAX_PACKET_LEN / 254 + 1;

const DELIMITER: u8 = 0x00;

/// Streaming frame decoder.
pub struct PacketDecoder {
    frame: Vec<u8, MAX_FRAME_LEN>,
    packet: [u8; MAX_FRAME_LEN],
    /// Set after an overflow; bytes are ignored until the next delimiter.
    discarding: bool,
    dropped: u32,
}

impl Default for PacketDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketDecoder {
    pub fn new() -> Self {
        Self {
            frame: Vec::new(),
            packet: [0; MAX_FRAME_LEN],
            discarding: false,
            dropped: 0,
        }
    }

    /// Feed one byte.
    ///
    /// Returns the decoded packet when `byte` completes a frame.  The slice
    /// is valid until the next call.
    pub fn push(&mut self, byte: u8) -> Option<&[u8]> {
        if byte != DELIMITER {
            if !self.discarding && self.frame.push(byte).is_err() {
                warn!("Frame exceeds {} bytes, discarding", MAX_FRAME_LEN);
                self.discarding = true;
                self.dropped = self.dropped.wrapping_add(1);
                self.frame.clear();
            }
            return None;
        }

        if self.discarding {
            self.discarding = false;
            return None;
        }
        if self.frame.is_empty() {
            return None;
        }

        let decoded = cobs::decode(&self.frame, &mut self.packet);
        self.frame.clear();
        match decoded {
            Ok(0) => None,
            Ok(len) => Some(&self.packet[..len]),
            Err(()) => {
                debug!("Invalid COBS frame dropped");
                self.dropped = self.dropped.wrapping_add(1);
                None
            }
        }
    }

    /// Frames dropped for overflow or bad encoding.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Forget any partial frame (e.g. after a transport reset).
    pub fn reset(&mut self) {
        self.frame.clear();
        self.discarding = false;
    }
}

/// Encode `payload` as one delimited frame into `out`.
///
/// Returns the total number of bytes written, delimiter included.
pub fn encode_packet(payload: &[u8], out: &mut [u8]) -> Result<usize, LinkError> {
    if payload.len() > MAX_PACKET_LEN {
        return Err(LinkError::PacketTooLarge(payload.len()));
    }
    let max_encoded = cobs::max_encoding_length(payload.len());
    if out.len() <= max_encoded {
        return Err(LinkError::PacketTooLarge(payload.len()));
    }
    let len = cobs::encode(payload, &mut out[..max_encoded]);
    out[len] = DELIMITER;
    Ok(len + 1)
}
