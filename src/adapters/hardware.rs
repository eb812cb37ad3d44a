//! Hardware adapter — bridges ADC and GPIO to the domain port traits.
//!
//! Implements [`AnalogPort`] and [`OutputPort`].  This is the only module
//! that touches real peripherals.
//!
//! - **`target_os = "espidf"`** — ADC1 through the one-shot driver, GPIO
//!   through raw `gpio_config` / `gpio_set_level` calls.  ADC channels are
//!   configured lazily on first read of a pin.
//! - **`not(target_os = "espidf")`** — an injectable table of analog
//!   values and a record of output levels, for host tests.

use crate::app::ports::{AnalogPort, OutputPort};
use crate::error::{OutputError, SensorError};

#[cfg(target_os = "espidf")]
use esp_idf_sys::*;
#[cfg(target_os = "espidf")]
use log::{info, warn};

/// Highest GPIO number + 1 on the ESP32-S3.
pub const GPIO_COUNT: usize = 49;

/// Concrete adapter for the board's analog inputs and digital outputs.
pub struct HardwareAdapter {
    #[cfg(target_os = "espidf")]
    adc1: adc_oneshot_unit_handle_t,
    /// Bit `n` set once ADC1 channel `n` is configured.
    #[cfg(target_os = "espidf")]
    configured_channels: u16,

    #[cfg(not(target_os = "espidf"))]
    analog: [u16; GPIO_COUNT],
    #[cfg(not(target_os = "espidf"))]
    outputs: [Option<bool>; GPIO_COUNT],
    #[cfg(not(target_os = "espidf"))]
    fail_reads: bool,
}

// ── ESP-IDF ───────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
impl HardwareAdapter {
    /// Create the ADC1 one-shot unit.  Call once from `main()`.
    pub fn new() -> Result<Self, SensorError> {
        let init_cfg = adc_oneshot_unit_init_cfg_t {
            unit_id: adc_unit_t_ADC_UNIT_1,
            ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            ..Default::default()
        };
        let mut adc1: adc_oneshot_unit_handle_t = core::ptr::null_mut();
        // SAFETY: called once at boot; the handle is owned by this adapter.
        let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &mut adc1) };
        if ret != ESP_OK as i32 {
            warn!("ADC1 init failed (rc={})", ret);
            return Err(SensorError::AdcReadFailed);
        }
        info!("HardwareAdapter: ADC1 one-shot unit ready");
        Ok(Self {
            adc1,
            configured_channels: 0,
        })
    }

    fn adc1_channel(&mut self, pin: u8) -> Result<adc_channel_t, SensorError> {
        let mut unit: adc_unit_t = 0;
        let mut channel: adc_channel_t = 0;
        let ret = unsafe { adc_oneshot_io_to_channel(pin as i32, &mut unit, &mut channel) };
        if ret != ESP_OK as i32 || unit != adc_unit_t_ADC_UNIT_1 {
            return Err(SensorError::NotAnalogPin(pin));
        }

        if self.configured_channels & (1 << channel) == 0 {
            let chan_cfg = adc_oneshot_chan_cfg_t {
                atten: adc_atten_t_ADC_ATTEN_DB_12,
                bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
            };
            let ret = unsafe { adc_oneshot_config_channel(self.adc1, channel, &chan_cfg) };
            if ret != ESP_OK as i32 {
                return Err(SensorError::AdcReadFailed);
            }
            self.configured_channels |= 1 << channel;
            info!("HardwareAdapter: GPIO{} -> ADC1 channel {}", pin, channel);
        }
        Ok(channel)
    }
}

#[cfg(target_os = "espidf")]
impl Drop for HardwareAdapter {
    fn drop(&mut self) {
        // SAFETY: the handle was created in `new()` and is not shared.
        unsafe {
            adc_oneshot_del_unit(self.adc1);
        }
    }
}

#[cfg(target_os = "espidf")]
impl AnalogPort for HardwareAdapter {
    fn read_analog(&mut self, pin: u8) -> Result<u16, SensorError> {
        let channel = self.adc1_channel(pin)?;
        let mut raw: i32 = 0;
        // SAFETY: handle valid for the adapter's lifetime; main-loop only.
        let ret = unsafe { adc_oneshot_read(self.adc1, channel, &mut raw) };
        if ret != ESP_OK as i32 {
            return Err(SensorError::AdcReadFailed);
        }
        Ok(raw.max(0) as u16)
    }
}

#[cfg(target_os = "espidf")]
impl OutputPort for HardwareAdapter {
    fn configure_output(&mut self, pin: u8) -> Result<(), OutputError> {
        if pin as usize >= GPIO_COUNT {
            return Err(OutputError::InvalidPin(pin));
        }
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            warn!("GPIO{} config failed (rc={})", pin, ret);
            return Err(OutputError::InvalidPin(pin));
        }
        Ok(())
    }

    fn write_output(&mut self, pin: u8, high: bool) -> Result<(), OutputError> {
        // SAFETY: writes the level register of a pin configured above.
        let ret = unsafe { gpio_set_level(pin as i32, u32::from(high)) };
        if ret != ESP_OK as i32 {
            return Err(OutputError::GpioWriteFailed);
        }
        Ok(())
    }
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl Default for HardwareAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl HardwareAdapter {
    pub fn new() -> Self {
        Self {
            analog: [0; GPIO_COUNT],
            outputs: [None; GPIO_COUNT],
            fail_reads: false,
        }
    }

    /// Value returned by the next reads of `pin`.
    pub fn sim_set_analog(&mut self, pin: u8, raw: u16) {
        if let Some(slot) = self.analog.get_mut(pin as usize) {
            *slot = raw;
        }
    }

    /// Make every analog read fail until cleared.
    pub fn sim_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Last level written to `pin`, `None` if never driven.
    pub fn sim_output(&self, pin: u8) -> Option<bool> {
        self.outputs.get(pin as usize).copied().flatten()
    }
}

#[cfg(not(target_os = "espidf"))]
impl AnalogPort for HardwareAdapter {
    fn read_analog(&mut self, pin: u8) -> Result<u16, SensorError> {
        if self.fail_reads {
            return Err(SensorError::AdcReadFailed);
        }
        self.analog
            .get(pin as usize)
            .copied()
            .ok_or(SensorError::NotAnalogPin(pin))
    }
}

#[cfg(not(target_os = "espidf"))]
impl OutputPort for HardwareAdapter {
    fn configure_output(&mut self, pin: u8) -> Result<(), OutputError> {
        if pin as usize >= GPIO_COUNT {
            return Err(OutputError::InvalidPin(pin));
        }
        Ok(())
    }

    fn write_output(&mut self, pin: u8, high: bool) -> Result<(), OutputError> {
        let slot = self
            .outputs
            .get_mut(pin as usize)
            .ok_or(OutputError::InvalidPin(pin))?;
        *slot = Some(high);
        Ok(())
    }
}
