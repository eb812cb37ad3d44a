//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements          | Connects to                 |
//! |-------------|---------------------|-----------------------------|
//! | `hardware`  | AnalogPort          | ESP32 ADC1 one-shot         |
//! |             | OutputPort          | ESP32 GPIO                  |
//! | `pin_bank`  | OutputPort          | `embedded-hal` output pins  |
//! | `log_sink`  | EventSink           | Serial log output           |
//! | `nvs`       | StoragePort         | NVS blob / in-memory image  |
//! | `uart`      | Transport           | ESP-IDF UART driver         |
//! | `time`      | —                   | ESP32 system timer          |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod pin_bank;
pub mod time;
#[cfg(target_os = "espidf")]
pub mod uart;
