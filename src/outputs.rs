//! Host-driven digital outputs.
//!
//! Pins are switched to output mode lazily, the first time the host
//! writes them.  Pins 0–31 are tracked in a bitmask so the mode is only
//! set once; higher pins are (re)configured on every write.

use log::debug;

use crate::app::ports::OutputPort;
use crate::error::OutputError;

#[derive(Debug, Default)]
pub struct OutputBank {
    configured: u32,
}

impl OutputBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive `pin` low for `value == 0`, high otherwise.
    pub fn set(
        &mut self,
        hw: &mut impl OutputPort,
        pin: u8,
        value: u8,
    ) -> Result<(), OutputError> {
        if !self.is_configured(pin) {
            hw.configure_output(pin)?;
            if pin < 32 {
                self.configured |= 1 << pin;
                debug!("Output pin {} configured", pin);
            }
        }
        hw.write_output(pin, value != 0)
    }

    /// Whether `pin` is already known to be in output mode.
    pub fn is_configured(&self, pin: u8) -> bool {
        pin < 32 && self.configured & (1 << pin) != 0
    }
}
