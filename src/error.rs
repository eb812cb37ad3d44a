//! Unified error types for the SensorBridge firmware.
//!
//! Every subsystem has its own small error enum; all of them convert into
//! the top-level [`Error`] so the boot path and the event loop can report
//! failures uniformly.  All variants are `Copy` so they can be carried in
//! [`BridgeEvent`](crate::app::events::BridgeEvent)s without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A wire message could not be encoded or decoded.
    Codec(CodecError),
    /// A configuration part was rejected by the assembler.
    Assembly(AssemblyError),
    /// The persisted configuration could not be loaded.
    Load(LoadError),
    /// The byte-addressed storage backend failed.
    Storage(StorageError),
    /// An input could not be sampled.
    Sensor(SensorError),
    /// A digital output could not be driven.
    Output(OutputError),
    /// The serial packet link failed.
    Link(LinkError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codec(e) => write!(f, "codec: {e}"),
            Self::Assembly(e) => write!(f, "assembly: {e}"),
            Self::Load(e) => write!(f, "load: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Output(e) => write!(f, "output: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Codec errors
// ---------------------------------------------------------------------------

/// Why a message could not be encoded or decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Destination buffer is smaller than the encoded message.
    BufferTooSmall { required: usize, available: usize },
    /// Fewer bytes than the layout requires.
    Truncated,
    /// Leading discriminant is not the requested message kind.
    WrongKind { expected: u8, found: u8 },
    /// Leading discriminant is not a known message kind.
    UnknownKind(u8),
    /// Input-kind discriminant is not Analog, Button or Matrix.
    UnknownInputKind(u8),
    /// Matrix row+col pin count exceeds the protocol maximum.
    TooManyPins(usize),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooSmall {
                required,
                available,
            } => write!(f, "buffer too small ({available} < {required})"),
            Self::Truncated => write!(f, "truncated message"),
            Self::WrongKind { expected, found } => {
                write!(f, "wrong message kind (expected {expected}, found {found})")
            }
            Self::UnknownKind(kind) => write!(f, "unknown message kind {kind}"),
            Self::UnknownInputKind(kind) => write!(f, "unknown input kind {kind}"),
            Self::TooManyPins(n) => write!(f, "matrix declares {n} pins"),
        }
    }
}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}

// ---------------------------------------------------------------------------
// Assembly errors
// ---------------------------------------------------------------------------

/// Why a Configure part caused its session to be abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyError {
    /// `total_parts` is zero or above `MAX_INPUTS`.
    InvalidTotal(u8),
    /// `part_number` is outside `0..total_parts`.
    InvalidPart { part: u8, total: u8 },
    /// An input field is out of range (e.g. sensitivity above 10).
    InvalidInput,
    /// The session for this config id already timed out.
    TimedOut,
    /// The completed configuration could not be persisted.
    StoreFailed,
}

impl fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTotal(total) => write!(f, "invalid total part count {total}"),
            Self::InvalidPart { part, total } => write!(f, "part {part} out of range for {total}"),
            Self::InvalidInput => write!(f, "input field out of range"),
            Self::TimedOut => write!(f, "session timed out"),
            Self::StoreFailed => write!(f, "could not persist configuration"),
        }
    }
}

impl From<AssemblyError> for Error {
    fn from(e: AssemblyError) -> Self {
        Self::Assembly(e)
    }
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

/// Why no configuration could be loaded from persistent storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    /// Magic marker missing (first boot, erased, or invalidated).
    NoRecord,
    /// Record was written by an incompatible layout; it has been invalidated.
    VersionMismatch { found: u8 },
    /// Stored input count is zero or above `MAX_INPUTS`.
    InvalidInputCount(u8),
    /// A per-input record could not be parsed.
    Corrupted,
    /// The storage backend failed.
    Storage(StorageError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRecord => write!(f, "no stored configuration"),
            Self::VersionMismatch { found } => write!(f, "format version {found} not supported"),
            Self::InvalidInputCount(n) => write!(f, "invalid input count {n}"),
            Self::Corrupted => write!(f, "stored configuration corrupted"),
            Self::Storage(e) => write!(f, "{e}"),
        }
    }
}

impl From<LoadError> for Error {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}

impl From<StorageError> for LoadError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Access beyond the end of the storage area.
    OutOfBounds { addr: usize, len: usize },
    /// The backend failed to persist (flash/NVS error code).
    CommitFailed(i32),
    /// Generic I/O error.
    IoError,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { addr, len } => write!(f, "access {addr}+{len} out of bounds"),
            Self::CommitFailed(code) => write!(f, "commit failed ({code})"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor / output errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC read returned an error or timed out.
    AdcReadFailed,
    /// Pin has no ADC channel on this board.
    NotAnalogPin(u8),
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::NotAnalogPin(pin) => write!(f, "pin {pin} is not an analog input"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputError {
    /// Pin cannot be configured as an output.
    InvalidPin(u8),
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPin(pin) => write!(f, "pin {pin} cannot drive an output"),
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl From<OutputError> for Error {
    fn from(e: OutputError) -> Self {
        Self::Output(e)
    }
}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// Payload does not fit the framing buffer.
    PacketTooLarge(usize),
    /// The underlying transport failed to write.
    WriteFailed,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PacketTooLarge(len) => write!(f, "packet of {len} bytes too large"),
            Self::WriteFailed => write!(f, "transport write failed"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
