//! Sensor pipeline — runtime instances for the active configuration.
//!
//! The [`SensorManager`] is rebuilt wholesale from a [`Configuration`];
//! no state survives a reconfiguration.  Only Analog inputs are sampled.
//! Button and Matrix inputs are persisted and reported back to the host
//! but have no runtime instance.
//!
//! Readings are handed out round-robin: each call to
//! [`next_reading`](SensorManager::next_reading) starts looking one slot
//! after the sensor that reported last, so a noisy input cannot starve
//! the others.

pub mod analog;

use heapless::Vec;
use log::info;

use crate::app::ports::AnalogPort;
use crate::assembler::{Configuration, MAX_INPUTS};
use crate::protocol::InputConfig;
use analog::AnalogSensor;
pub use analog::Reading;

/// Owns every sampled input and the round-robin cursor.
#[derive(Debug, Default)]
pub struct SensorManager {
    sensors: Vec<AnalogSensor, MAX_INPUTS>,
    cursor: usize,
}

impl SensorManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every instance with the inputs of `config`.
    pub fn apply_configuration(&mut self, config: &Configuration) {
        self.sensors.clear();
        self.cursor = 0;

        for input in &config.inputs {
            if let InputConfig::Analog { pin, sensitivity } = *input {
                // Configuration holds at most MAX_INPUTS inputs.
                let _ = self.sensors.push(AnalogSensor::new(pin, sensitivity));
            }
        }
        info!(
            "Sensor pipeline: {} of {} inputs sampled",
            self.sensors.len(),
            config.inputs.len()
        );
    }

    /// Sample every instance once.
    pub fn scan(&mut self, adc: &mut impl AnalogPort) {
        for sensor in &mut self.sensors {
            sensor.scan(adc);
        }
    }

    /// Next pending reading in round-robin order.
    pub fn next_reading(&mut self) -> Option<Reading> {
        let count = self.sensors.len();
        for offset in 0..count {
            let index = (self.cursor + offset) % count;
            if let Some(reading) = self.sensors[index].take_reading() {
                self.cursor = (index + 1) % count;
                return Some(reading);
            }
        }
        None
    }

    /// Number of sampled inputs.
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn sensors(&self) -> &[AnalogSensor] {
        &self.sensors
    }
}
