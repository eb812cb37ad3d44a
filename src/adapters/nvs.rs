//! NVS-backed EEPROM emulation.
//!
//! Implements [`StoragePort`] as a fixed-size byte image held in RAM and
//! erased to `0xFF`, the way a blank EEPROM reads.  Writes only touch the
//! image; [`commit`](StoragePort::commit) persists it.
//!
//! - **`target_os = "espidf"`** — the image is stored as a single NVS blob
//!   (`sbridge/eeprom`).  `nvs_commit()` is atomic, so a power cut during
//!   commit leaves the previous image intact.
//! - **`not(target_os = "espidf")`** — pure in-memory store for host tests.

use crate::app::ports::StoragePort;
use crate::error::StorageError;

#[cfg(target_os = "espidf")]
use esp_idf_sys::*;
#[cfg(target_os = "espidf")]
use log::{info, warn};

/// Emulated EEPROM size in bytes.
pub const EEPROM_SIZE: usize = 512;

/// Value of an erased cell.
pub const ERASED: u8 = 0xFF;

#[cfg(target_os = "espidf")]
const NVS_NAMESPACE: &[u8] = b"sbridge\0";
#[cfg(target_os = "espidf")]
const NVS_KEY: &[u8] = b"eeprom\0";

pub struct NvsEeprom {
    image: Box<[u8; EEPROM_SIZE]>,
    commits: u32,
}

impl Default for NvsEeprom {
    fn default() -> Self {
        Self::new()
    }
}

impl NvsEeprom {
    /// A blank, never-committed image.
    pub fn new() -> Self {
        Self {
            image: Box::new([ERASED; EEPROM_SIZE]),
            commits: 0,
        }
    }

    /// Initialise NVS flash and load the last committed image.
    ///
    /// A missing blob (first boot) yields a blank image.  If the partition
    /// is full or was written by a newer NVS version it is erased first.
    #[cfg(target_os = "espidf")]
    pub fn open() -> Result<Self, StorageError> {
        // SAFETY: called once from the main task before any other NVS access.
        let ret = unsafe { nvs_flash_init() };
        if ret == ESP_ERR_NVS_NO_FREE_PAGES as i32 || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as i32 {
            warn!("NVS: erasing and re-initialising flash partition");
            let ret = unsafe { nvs_flash_erase() };
            if ret != ESP_OK as i32 {
                return Err(StorageError::CommitFailed(ret));
            }
            let ret = unsafe { nvs_flash_init() };
            if ret != ESP_OK as i32 {
                return Err(StorageError::CommitFailed(ret));
            }
        } else if ret != ESP_OK as i32 {
            return Err(StorageError::CommitFailed(ret));
        }

        let mut eeprom = Self::new();
        let loaded = with_nvs_handle(false, |handle| {
            let mut size = EEPROM_SIZE;
            // SAFETY: `image` is EEPROM_SIZE bytes and `size` says so.
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    NVS_KEY.as_ptr() as *const _,
                    eeprom.image.as_mut_ptr() as *mut _,
                    &mut size,
                )
            };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            Ok(size)
        });
        match loaded {
            Ok(size) => info!("NvsEeprom: loaded {} byte image", size),
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND as i32 => info!("NvsEeprom: no stored image, starting blank"),
            Err(e) => {
                warn!("NvsEeprom: read error {}, starting blank", e);
                eeprom = Self::new();
            }
        }
        Ok(eeprom)
    }

    /// The full RAM image, committed or not.
    pub fn image(&self) -> &[u8] {
        &self.image[..]
    }

    /// Number of successful commits since construction.
    pub fn commits(&self) -> u32 {
        self.commits
    }

    /// Reset every cell to [`ERASED`] (not persisted until commit).
    pub fn erase(&mut self) {
        self.image.fill(ERASED);
    }

    fn range(addr: usize, len: usize) -> Result<core::ops::Range<usize>, StorageError> {
        match addr.checked_add(len) {
            Some(end) if end <= EEPROM_SIZE => Ok(addr..end),
            _ => Err(StorageError::OutOfBounds { addr, len }),
        }
    }
}

/// Open the bridge namespace, run `f` with the handle, then close it.
#[cfg(target_os = "espidf")]
fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
where
    F: FnOnce(nvs_handle_t) -> Result<T, i32>,
{
    let mode = if write {
        nvs_open_mode_t_NVS_READWRITE
    } else {
        nvs_open_mode_t_NVS_READONLY
    };
    let mut handle: nvs_handle_t = 0;
    let ret = unsafe { nvs_open(NVS_NAMESPACE.as_ptr() as *const _, mode, &mut handle) };
    if ret != ESP_OK as i32 {
        return Err(ret);
    }
    let result = f(handle);
    unsafe {
        nvs_close(handle);
    }
    result
}

impl StoragePort for NvsEeprom {
    fn capacity(&self) -> usize {
        EEPROM_SIZE
    }

    fn read(&self, addr: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        let range = Self::range(addr, buf.len())?;
        buf.copy_from_slice(&self.image[range]);
        Ok(())
    }

    fn write(&mut self, addr: usize, data: &[u8]) -> Result<(), StorageError> {
        let range = Self::range(addr, data.len())?;
        self.image[range].copy_from_slice(data);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn commit(&mut self) -> Result<(), StorageError> {
        self.commits += 1;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn commit(&mut self) -> Result<(), StorageError> {
        let image = &self.image;
        with_nvs_handle(true, |handle| {
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    NVS_KEY.as_ptr() as *const _,
                    image.as_ptr() as *const _,
                    EEPROM_SIZE,
                )
            };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            Ok(())
        })
        .map_err(|e| {
            warn!("NvsEeprom: NVS write error {}", e);
            StorageError::CommitFailed(e)
        })?;
        self.commits += 1;
        info!("NvsEeprom: image committed");
        Ok(())
    }
}
