//! Input configuration — the per-input payload shared by the Configure
//! message and the persisted configuration record.
//!
//! ```text
//! Analog: [kind=0][pin][sensitivity]
//! Button: [kind=1][pin][debounce]
//! Matrix: [kind=2][row_count][col_count][row pins…][col pins…]
//! ```

use heapless::Vec;

use super::wire::{Reader, Writer};
use crate::error::{AssemblyError, CodecError};

/// Maximum number of row + column pins in one Matrix input.
pub const MAX_MATRIX_PINS: usize = 16;

/// Highest Analog sensitivity (most responsive).
pub const MAX_SENSITIVITY: u8 = 10;

/// Input-kind discriminant byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InputKind {
    Analog = 0,
    Button = 1,
    Matrix = 2,
}

impl TryFrom<u8> for InputKind {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Analog),
            1 => Ok(Self::Button),
            2 => Ok(Self::Matrix),
            other => Err(CodecError::UnknownInputKind(other)),
        }
    }
}

/// Key-matrix pin assignment.  Row pins come first in the pin list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixConfig {
    rows: u8,
    cols: u8,
    pins: Vec<u8, MAX_MATRIX_PINS>,
}

impl MatrixConfig {
    pub fn new(row_pins: &[u8], col_pins: &[u8]) -> Result<Self, CodecError> {
        let total = row_pins.len() + col_pins.len();
        if total > MAX_MATRIX_PINS {
            return Err(CodecError::TooManyPins(total));
        }
        let mut pins = Vec::new();
        // Capacity checked above.
        let _ = pins.extend_from_slice(row_pins);
        let _ = pins.extend_from_slice(col_pins);
        Ok(Self {
            rows: row_pins.len() as u8,
            cols: col_pins.len() as u8,
            pins,
        })
    }

    pub fn row_pins(&self) -> &[u8] {
        &self.pins[..self.rows as usize]
    }

    pub fn col_pins(&self) -> &[u8] {
        &self.pins[self.rows as usize..]
    }

    /// All pins, rows first.
    pub fn pins(&self) -> &[u8] {
        &self.pins
    }
}

/// Configuration of one host-declared input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputConfig {
    Analog { pin: u8, sensitivity: u8 },
    Button { pin: u8, debounce: u8 },
    Matrix(MatrixConfig),
}

impl InputConfig {
    pub fn kind(&self) -> InputKind {
        match self {
            Self::Analog { .. } => InputKind::Analog,
            Self::Button { .. } => InputKind::Button,
            Self::Matrix(_) => InputKind::Matrix,
        }
    }

    /// Size of the kind-specific fields, excluding the kind byte.
    pub fn payload_len(&self) -> usize {
        match self {
            Self::Analog { .. } | Self::Button { .. } => 2,
            Self::Matrix(m) => 2 + m.pins.len(),
        }
    }

    /// Range checks the codec cannot express in the layout alone.
    pub fn validate(&self) -> Result<(), AssemblyError> {
        match self {
            Self::Analog { sensitivity, .. } if *sensitivity > MAX_SENSITIVITY => {
                Err(AssemblyError::InvalidInput)
            }
            _ => Ok(()),
        }
    }

    /// Write the kind-specific fields (the kind byte is written by the caller).
    pub fn write_payload(&self, w: &mut Writer<'_>) -> Result<(), CodecError> {
        match self {
            Self::Analog { pin, sensitivity } => {
                w.u8(*pin)?;
                w.u8(*sensitivity)
            }
            Self::Button { pin, debounce } => {
                w.u8(*pin)?;
                w.u8(*debounce)
            }
            Self::Matrix(m) => {
                w.u8(m.rows)?;
                w.u8(m.cols)?;
                w.put(&m.pins)
            }
        }
    }

    /// Write the kind byte followed by the payload (persisted-record shape).
    pub fn write_record(&self, w: &mut Writer<'_>) -> Result<(), CodecError> {
        w.u8(self.kind() as u8)?;
        self.write_payload(w)
    }

    /// Read the kind-specific fields for an already-consumed kind byte.
    pub fn read_payload(kind: u8, r: &mut Reader<'_>) -> Result<Self, CodecError> {
        match InputKind::try_from(kind)? {
            InputKind::Analog => Ok(Self::Analog {
                pin: r.u8()?,
                sensitivity: r.u8()?,
            }),
            InputKind::Button => Ok(Self::Button {
                pin: r.u8()?,
                debounce: r.u8()?,
            }),
            InputKind::Matrix => {
                let rows = r.u8()?;
                let cols = r.u8()?;
                let total = rows as usize + cols as usize;
                if total > MAX_MATRIX_PINS {
                    return Err(CodecError::TooManyPins(total));
                }
                let pins = r.take(total)?;
                let (row_pins, col_pins) = pins.split_at(rows as usize);
                MatrixConfig::new(row_pins, col_pins).map(Self::Matrix)
            }
        }
    }

    /// Read a kind byte followed by its payload (persisted-record shape).
    pub fn read_record(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let kind = r.u8()?;
        Self::read_payload(kind, r)
    }
}
