//! UART transport (ESP-IDF only).
//!
//! Wraps an [`UartDriver`] as a non-blocking [`Transport`]: reads return
//! whatever the driver's RX ring buffer holds right now, possibly nothing.

use esp_idf_hal::delay::{NON_BLOCK, TickType};
use esp_idf_hal::uart::UartDriver;
use esp_idf_sys::EspError;

use crate::link::Transport;

/// Upper bound for waiting on TX completion during `flush`.
const TX_DONE_TIMEOUT_MS: u64 = 50;

pub struct UartTransport<'d> {
    uart: UartDriver<'d>,
}

impl<'d> UartTransport<'d> {
    pub fn new(uart: UartDriver<'d>) -> Self {
        Self { uart }
    }
}

impl Transport for UartTransport<'_> {
    type Error = EspError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, EspError> {
        self.uart.read(buf, NON_BLOCK)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, EspError> {
        self.uart.write(data)
    }

    fn flush(&mut self) -> Result<(), EspError> {
        let ticks = TickType::new_millis(TX_DONE_TIMEOUT_MS).ticks();
        self.uart.wait_tx_done(ticks)
    }
}
