//! SensorBridge Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsEeprom    UartTransport   │
//! │  (Analog+Output)   (EventSink)    (Storage)    (SerialLink)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │                 Bridge (pure logic)                    │    │
//! │  │  Assembler · Store · Sensors · Outputs · Heartbeat     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Main loop: drain host packets → tick → delay                  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::AnyIOPin;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_hal::units::Hertz;
use log::{info, warn};

use sensorbridge::adapters::hardware::HardwareAdapter;
use sensorbridge::adapters::log_sink::LogEventSink;
use sensorbridge::adapters::nvs::NvsEeprom;
use sensorbridge::adapters::time::MonotonicClock;
use sensorbridge::adapters::uart::UartTransport;
use sensorbridge::app::service::Bridge;
use sensorbridge::config::{BridgeConfig, FIRMWARE_VERSION};
use sensorbridge::error::Error;
use sensorbridge::link::SerialLink;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!(
        "║  SensorBridge v{}.{}.{}                 ║",
        FIRMWARE_VERSION.major, FIRMWARE_VERSION.minor, FIRMWARE_VERSION.patch
    );
    info!("╚══════════════════════════════════════╝");

    let config = BridgeConfig::default();
    let peripherals = Peripherals::take()?;

    // ── 2. Host link on UART1 (the console keeps UART0) ───────
    let uart_config = UartConfig::default().baudrate(Hertz(config.uart_baud));
    let uart = UartDriver::new(
        peripherals.uart1,
        peripherals.pins.gpio17,
        peripherals.pins.gpio18,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config,
    )?;
    let mut link = SerialLink::new(UartTransport::new(uart));

    // ── 3. Persistent store ───────────────────────────────────
    let storage = match NvsEeprom::open() {
        Ok(s) => s,
        Err(e) => {
            // Without NVS the bridge still runs, it just forgets on reboot.
            warn!("NVS unavailable ({}), configuration will not persist", e);
            NvsEeprom::new()
        }
    };

    // ── 4. Peripherals ────────────────────────────────────────
    let mut hw = HardwareAdapter::new().map_err(Error::from)?;
    let clock = MonotonicClock::new();
    let mut log_sink = LogEventSink::new();

    // ── 5. Bridge ─────────────────────────────────────────────
    let mut bridge = Bridge::new(config.clone(), storage)?;
    bridge.start(&mut log_sink);

    info!("System ready. Entering main loop.");

    // ── 6. Main loop ──────────────────────────────────────────
    loop {
        let now_ms = clock.uptime_ms();
        while let Some(packet) = link.poll_packet() {
            bridge.handle_packet(&packet, now_ms, &mut hw, &mut link, &mut log_sink);
        }

        bridge.tick(clock.uptime_ms(), &mut hw, &mut link, &mut log_sink);

        FreeRtos::delay_ms(config.tick_interval_ms);
    }
}
