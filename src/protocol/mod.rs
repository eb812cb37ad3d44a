//! Host wire protocol.
//!
//! Every message is a fixed-layout little-endian record whose first byte is
//! the [`MessageKind`] discriminant.  There is no padding and no length
//! field; the framing layer ([`link`](crate::link)) delimits packets.
//!
//! ```text
//! ┌────────┬──────────────────────────────────┐
//! │ kind   │ kind-specific fields (LE, packed)│
//! │ 1 byte │ 0..=25 bytes                     │
//! └────────┴──────────────────────────────────┘
//! ```
//!
//! Encoding never writes past the destination; decoding never yields a
//! partially filled message.  [`Message::decode`] reads the kind first and
//! dispatches to the matching [`WireMessage`] implementation.

pub mod input;
pub mod messages;
pub mod wire;

pub use input::{InputConfig, InputKind, MatrixConfig, MAX_MATRIX_PINS, MAX_SENSITIVITY};
pub use messages::{
    ConfigurationError, ConfigurationStored, Configure, Heartbeat, IdentityRequest,
    IdentityResponse, InputValue, SetOutput,
};

use crate::error::CodecError;
use wire::{Reader, Writer};

/// Largest encoded message: a Configure carrying a full Matrix.
pub const MAX_MESSAGE_LEN: usize = 8 + 2 + MAX_MATRIX_PINS;

/// Message-kind discriminant byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageKind {
    IdentityRequest = 0,
    IdentityResponse = 1,
    Configure = 2,
    ConfigurationStored = 3,
    ConfigurationError = 4,
    InputValue = 5,
    Heartbeat = 6,
    SetOutput = 7,
}

impl TryFrom<u8> for MessageKind {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::IdentityRequest),
            1 => Ok(Self::IdentityResponse),
            2 => Ok(Self::Configure),
            3 => Ok(Self::ConfigurationStored),
            4 => Ok(Self::ConfigurationError),
            5 => Ok(Self::InputValue),
            6 => Ok(Self::Heartbeat),
            7 => Ok(Self::SetOutput),
            other => Err(CodecError::UnknownKind(other)),
        }
    }
}

/// A single message kind with a fixed binary layout.
pub trait WireMessage: Sized {
    const KIND: MessageKind;

    /// Size of everything after the kind byte.
    fn payload_len(&self) -> usize;

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<(), CodecError>;

    fn read_payload(r: &mut Reader<'_>) -> Result<Self, CodecError>;

    /// Exact encoded size including the kind byte.
    fn encoded_len(&self) -> usize {
        1 + self.payload_len()
    }

    /// Encode into `buf`, returning the number of bytes written.
    fn encode(&self, buf: &mut [u8]) -> Result<usize, CodecError> {
        let required = self.encoded_len();
        if buf.len() < required {
            return Err(CodecError::BufferTooSmall {
                required,
                available: buf.len(),
            });
        }
        let mut w = Writer::new(buf);
        w.u8(Self::KIND as u8)?;
        self.write_payload(&mut w)?;
        Ok(w.position())
    }

    /// Decode a message of exactly this kind.
    fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let mut r = Reader::new(buf);
        let found = r.u8()?;
        if found != Self::KIND as u8 {
            return Err(CodecError::WrongKind {
                expected: Self::KIND as u8,
                found,
            });
        }
        Self::read_payload(&mut r)
    }
}

/// Any wire message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    IdentityRequest(IdentityRequest),
    IdentityResponse(IdentityResponse),
    Configure(Configure),
    ConfigurationStored(ConfigurationStored),
    ConfigurationError(ConfigurationError),
    InputValue(InputValue),
    Heartbeat(Heartbeat),
    SetOutput(SetOutput),
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::IdentityRequest(_) => MessageKind::IdentityRequest,
            Self::IdentityResponse(_) => MessageKind::IdentityResponse,
            Self::Configure(_) => MessageKind::Configure,
            Self::ConfigurationStored(_) => MessageKind::ConfigurationStored,
            Self::ConfigurationError(_) => MessageKind::ConfigurationError,
            Self::InputValue(_) => MessageKind::InputValue,
            Self::Heartbeat(_) => MessageKind::Heartbeat,
            Self::SetOutput(_) => MessageKind::SetOutput,
        }
    }

    pub fn encoded_len(&self) -> usize {
        match self {
            Self::IdentityRequest(m) => m.encoded_len(),
            Self::IdentityResponse(m) => m.encoded_len(),
            Self::Configure(m) => m.encoded_len(),
            Self::ConfigurationStored(m) => m.encoded_len(),
            Self::ConfigurationError(m) => m.encoded_len(),
            Self::InputValue(m) => m.encoded_len(),
            Self::Heartbeat(m) => m.encoded_len(),
            Self::SetOutput(m) => m.encoded_len(),
        }
    }

    /// Encode into `buf`, returning the number of bytes written.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, CodecError> {
        match self {
            Self::IdentityRequest(m) => m.encode(buf),
            Self::IdentityResponse(m) => m.encode(buf),
            Self::Configure(m) => m.encode(buf),
            Self::ConfigurationStored(m) => m.encode(buf),
            Self::ConfigurationError(m) => m.encode(buf),
            Self::InputValue(m) => m.encode(buf),
            Self::Heartbeat(m) => m.encode(buf),
            Self::SetOutput(m) => m.encode(buf),
        }
    }

    /// Decode any message, dispatching on the leading kind byte.
    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let kind = *buf.first().ok_or(CodecError::Truncated)?;
        Ok(match MessageKind::try_from(kind)? {
            MessageKind::IdentityRequest => Self::IdentityRequest(IdentityRequest::decode(buf)?),
            MessageKind::IdentityResponse => {
                Self::IdentityResponse(IdentityResponse::decode(buf)?)
            }
            MessageKind::Configure => Self::Configure(Configure::decode(buf)?),
            MessageKind::ConfigurationStored => {
                Self::ConfigurationStored(ConfigurationStored::decode(buf)?)
            }
            MessageKind::ConfigurationError => {
                Self::ConfigurationError(ConfigurationError::decode(buf)?)
            }
            MessageKind::InputValue => Self::InputValue(InputValue::decode(buf)?),
            MessageKind::Heartbeat => Self::Heartbeat(Heartbeat::decode(buf)?),
            MessageKind::SetOutput => Self::SetOutput(SetOutput::decode(buf)?),
        })
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Message {
                fn from(m: $variant) -> Self {
                    Self::$variant(m)
                }
            }
        )*
    };
}

impl_from_variant!(
    IdentityRequest,
    IdentityResponse,
    Configure,
    ConfigurationStored,
    ConfigurationError,
    InputValue,
    Heartbeat,
    SetOutput,
);
