//! One struct per wire message kind.
//!
//! | Kind                | Byte 0 | Fields (little-endian)                          |
//! |---------------------|--------|-------------------------------------------------|
//! | IdentityRequest     | 0      | request_id:u32                                  |
//! | IdentityResponse    | 1      | request_id:u32, major, minor, patch, config_id:u32 |
//! | Configure           | 2      | config_id:u32, total_parts, part_number, kind, payload |
//! | ConfigurationStored | 3      | config_id:u32                                   |
//! | ConfigurationError  | 4      | config_id:u32                                   |
//! | InputValue          | 5      | pin, value:i16                                  |
//! | Heartbeat           | 6      | —                                               |
//! | SetOutput           | 7      | pin, value                                      |

use super::input::InputConfig;
use super::wire::{Reader, Writer};
use super::{MessageKind, WireMessage};
use crate::config::FirmwareVersion;
use crate::error::CodecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityRequest {
    pub request_id: u32,
}

impl WireMessage for IdentityRequest {
    const KIND: MessageKind = MessageKind::IdentityRequest;

    fn payload_len(&self) -> usize {
        4
    }

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<(), CodecError> {
        w.u32_le(self.request_id)
    }

    fn read_payload(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            request_id: r.u32_le()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityResponse {
    pub request_id: u32,
    pub version: FirmwareVersion,
    /// Currently active configuration (0 = none).
    pub config_id: u32,
}

impl WireMessage for IdentityResponse {
    const KIND: MessageKind = MessageKind::IdentityResponse;

    fn payload_len(&self) -> usize {
        11
    }

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<(), CodecError> {
        w.u32_le(self.request_id)?;
        w.u8(self.version.major)?;
        w.u8(self.version.minor)?;
        w.u8(self.version.patch)?;
        w.u32_le(self.config_id)
    }

    fn read_payload(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let request_id = r.u32_le()?;
        let version = FirmwareVersion {
            major: r.u8()?,
            minor: r.u8()?,
            patch: r.u8()?,
        };
        Ok(Self {
            request_id,
            version,
            config_id: r.u32_le()?,
        })
    }
}

/// One part of a multi-part configuration update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configure {
    pub config_id: u32,
    pub total_parts: u8,
    pub part_number: u8,
    pub input: InputConfig,
}

impl WireMessage for Configure {
    const KIND: MessageKind = MessageKind::Configure;

    fn payload_len(&self) -> usize {
        // config_id + total_parts + part_number + input kind
        7 + self.input.payload_len()
    }

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<(), CodecError> {
        w.u32_le(self.config_id)?;
        w.u8(self.total_parts)?;
        w.u8(self.part_number)?;
        w.u8(self.input.kind() as u8)?;
        self.input.write_payload(w)
    }

    fn read_payload(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let config_id = r.u32_le()?;
        let total_parts = r.u8()?;
        let part_number = r.u8()?;
        let kind = r.u8()?;
        Ok(Self {
            config_id,
            total_parts,
            part_number,
            input: InputConfig::read_payload(kind, r)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigurationStored {
    pub config_id: u32,
}

impl WireMessage for ConfigurationStored {
    const KIND: MessageKind = MessageKind::ConfigurationStored;

    fn payload_len(&self) -> usize {
        4
    }

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<(), CodecError> {
        w.u32_le(self.config_id)
    }

    fn read_payload(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            config_id: r.u32_le()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigurationError {
    pub config_id: u32,
}

impl WireMessage for ConfigurationError {
    const KIND: MessageKind = MessageKind::ConfigurationError;

    fn payload_len(&self) -> usize {
        4
    }

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<(), CodecError> {
        w.u32_le(self.config_id)
    }

    fn read_payload(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            config_id: r.u32_le()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputValue {
    pub pin: u8,
    pub value: i16,
}

impl WireMessage for InputValue {
    const KIND: MessageKind = MessageKind::InputValue;

    fn payload_len(&self) -> usize {
        3
    }

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<(), CodecError> {
        w.u8(self.pin)?;
        w.i16_le(self.value)
    }

    fn read_payload(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            pin: r.u8()?,
            value: r.i16_le()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heartbeat;

impl WireMessage for Heartbeat {
    const KIND: MessageKind = MessageKind::Heartbeat;

    fn payload_len(&self) -> usize {
        0
    }

    fn write_payload(&self, _w: &mut Writer<'_>) -> Result<(), CodecError> {
        Ok(())
    }

    fn read_payload(_r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetOutput {
    pub pin: u8,
    /// 0 = low, anything else = high.
    pub value: u8,
}

impl SetOutput {
    pub fn is_high(&self) -> bool {
        self.value != 0
    }
}

impl WireMessage for SetOutput {
    const KIND: MessageKind = MessageKind::SetOutput;

    fn payload_len(&self) -> usize {
        2
    }

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<(), CodecError> {
        w.u8(self.pin)?;
        w.u8(self.value)
    }

    fn read_payload(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            pin: r.u8()?,
            value: r.u8()?,
        })
    }
}
