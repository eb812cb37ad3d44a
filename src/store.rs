//! Persistent configuration record.
//!
//! Fixed-address layout in a byte-addressed [`StoragePort`]:
//!
//! ```text
//! addr 0  magic      u32 LE   0xC0FF1234 when the record is valid
//! addr 4  version    u8       FORMAT_VERSION
//! addr 5  config_id  u32 LE
//! addr 9  count      u8       1..=MAX_INPUTS
//! addr 10 inputs     count × [kind][kind-specific fields]
//! ```
//!
//! Per-input records have exactly the shape of a Configure payload.
//! Any change to this layout must bump [`FORMAT_VERSION`].
//!
//! Loading fails closed: nothing is returned unless every field parsed.  A
//! record from another format version is invalidated on sight so it can
//! never be misread later.

use log::{info, warn};

use crate::app::ports::StoragePort;
use crate::assembler::{Configuration, MAX_INPUTS};
use crate::error::{CodecError, LoadError, StorageError};
use crate::protocol::wire::{Reader, Writer};
use crate::protocol::{InputConfig, MAX_MATRIX_PINS};

pub const CONFIG_MAGIC: u32 = 0xC0FF_1234;
pub const FORMAT_VERSION: u8 = 1;

pub const MAGIC_ADDR: usize = 0;
pub const VERSION_ADDR: usize = 4;
pub const CONFIG_ID_ADDR: usize = 5;
pub const COUNT_ADDR: usize = 9;
pub const INPUTS_ADDR: usize = 10;

/// Largest possible record: header plus MAX_INPUTS full matrices.
pub const RECORD_MAX_LEN: usize = INPUTS_ADDR + MAX_INPUTS * (3 + MAX_MATRIX_PINS);

/// Saves and loads the active [`Configuration`].
pub struct ConfigStore<S> {
    storage: S,
}

impl<S: StoragePort> ConfigStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    /// Persist `config`, replacing any previous record.
    ///
    /// The magic marker is cleared before the body is rewritten and set
    /// again last, so an interrupted save leaves no valid record behind.
    pub fn save(&mut self, config: &Configuration) -> Result<(), StorageError> {
        let mut body = [0u8; RECORD_MAX_LEN - VERSION_ADDR];
        let len = encode_body(config, &mut body).map_err(|e| match e {
            CodecError::BufferTooSmall { required, .. } => StorageError::OutOfBounds {
                addr: VERSION_ADDR,
                len: required,
            },
            _ => StorageError::IoError,
        })?;

        self.storage.write(MAGIC_ADDR, &0u32.to_le_bytes())?;
        self.storage.write(VERSION_ADDR, &body[..len])?;
        self.storage.write(MAGIC_ADDR, &CONFIG_MAGIC.to_le_bytes())?;
        self.storage.commit()?;

        info!(
            "Stored configuration {:#010x} ({} inputs, {} bytes)",
            config.config_id,
            config.inputs.len(),
            VERSION_ADDR + len
        );
        Ok(())
    }

    /// Load the persisted configuration.
    pub fn load(&mut self) -> Result<Configuration, LoadError> {
        let mut header = [0u8; INPUTS_ADDR];
        self.storage.read(MAGIC_ADDR, &mut header)?;
        let mut r = Reader::new(&header);

        let magic = r.u32_le().map_err(|_| LoadError::Corrupted)?;
        if magic != CONFIG_MAGIC {
            return Err(LoadError::NoRecord);
        }

        let version = r.u8().map_err(|_| LoadError::Corrupted)?;
        if version != FORMAT_VERSION {
            warn!(
                "Stored configuration has format version {} (expected {}), invalidating",
                version, FORMAT_VERSION
            );
            self.invalidate()?;
            return Err(LoadError::VersionMismatch { found: version });
        }

        let config_id = r.u32_le().map_err(|_| LoadError::Corrupted)?;
        let count = r.u8().map_err(|_| LoadError::Corrupted)?;
        if count == 0 || count as usize > MAX_INPUTS {
            return Err(LoadError::InvalidInputCount(count));
        }

        let mut body = [0u8; RECORD_MAX_LEN - INPUTS_ADDR];
        let available = self
            .storage
            .capacity()
            .saturating_sub(INPUTS_ADDR)
            .min(body.len());
        self.storage.read(INPUTS_ADDR, &mut body[..available])?;

        let mut r = Reader::new(&body[..available]);
        let mut config = Configuration {
            config_id,
            inputs: heapless::Vec::new(),
        };
        for _ in 0..count {
            let input = InputConfig::read_record(&mut r).map_err(|_| LoadError::Corrupted)?;
            input.validate().map_err(|_| LoadError::Corrupted)?;
            config
                .inputs
                .push(input)
                .map_err(|_| LoadError::InvalidInputCount(count))?;
        }
        Ok(config)
    }

    /// Clear the magic marker so the record is no longer trusted.
    pub fn invalidate(&mut self) -> Result<(), StorageError> {
        self.storage.write(MAGIC_ADDR, &0u32.to_le_bytes())?;
        self.storage.commit()
    }
}

/// Everything after the magic marker.
fn encode_body(config: &Configuration, buf: &mut [u8]) -> Result<usize, CodecError> {
    let mut w = Writer::new(buf);
    w.u8(FORMAT_VERSION)?;
    w.u32_le(config.config_id)?;
    w.u8(config.inputs.len() as u8)?;
    for input in &config.inputs {
        input.write_record(&mut w)?;
    }
    Ok(w.position())
}
