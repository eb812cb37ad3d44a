//! Host link — byte-stream transport and packet framing.
//!
//! ```text
//!  Transport bytes ──▶ PacketDecoder ──▶ packet ──▶ Bridge::handle_packet
//!  Bridge ──▶ PacketSink::send_packet ──▶ encode_packet ──▶ Transport
//! ```
//!
//! Packets are COBS-encoded and terminated by a single `0x00`, so a
//! receiver that joins mid-stream resynchronises at the next delimiter.

pub mod framing;
pub mod serial;
pub mod transport;

pub use framing::{MAX_FRAME_LEN, MAX_PACKET_LEN, PacketDecoder, encode_packet};
pub use serial::SerialLink;
pub use transport::{NullTransport, Transport};
