//! Output port over `embedded-hal` pins.
//!
//! Boards whose outputs are already claimed as typed HAL pins (or sit
//! behind an I/O expander) register them here by GPIO number instead of
//! going through raw `gpio_config`.  SetOutput requests for unregistered
//! numbers are refused.

use embedded_hal::digital::{OutputPin, PinState};
use heapless::Vec;

use crate::app::ports::OutputPort;
use crate::error::OutputError;

/// Most pins one bank holds.
pub const MAX_BANK_PINS: usize = 16;

pub struct PinBank<P> {
    pins: Vec<(u8, P), MAX_BANK_PINS>,
}

impl<P> Default for PinBank<P> {
    fn default() -> Self {
        Self { pins: Vec::new() }
    }
}

impl<P: OutputPin> PinBank<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `pin` under host-visible number `number`.
    ///
    /// Re-registering a number replaces the old pin, which is returned.
    pub fn register(&mut self, number: u8, pin: P) -> Result<Option<P>, P> {
        if let Some(slot) = self.pins.iter_mut().find(|(n, _)| *n == number) {
            return Ok(Some(core::mem::replace(&mut slot.1, pin)));
        }
        self.pins.push((number, pin)).map(|()| None).map_err(|(_, p)| p)
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    fn get_mut(&mut self, number: u8) -> Option<&mut P> {
        self.pins
            .iter_mut()
            .find(|(n, _)| *n == number)
            .map(|(_, p)| p)
    }
}

impl<P: OutputPin> OutputPort for PinBank<P> {
    fn configure_output(&mut self, pin: u8) -> Result<(), OutputError> {
        // HAL pins are already in output mode once constructed.
        self.get_mut(pin)
            .map(|_| ())
            .ok_or(OutputError::InvalidPin(pin))
    }

    fn write_output(&mut self, pin: u8, high: bool) -> Result<(), OutputError> {
        let out = self.get_mut(pin).ok_or(OutputError::InvalidPin(pin))?;
        out.set_state(PinState::from(high))
            .map_err(|_| OutputError::GpioWriteFailed)
    }
}
