//! Fuzz target: `ConfigStore::load`
//!
//! Loads configurations from arbitrary EEPROM images and checks that a
//! successful load always respects the input limit and re-saves to an
//! image that loads back identically.
//!
//! cargo fuzz run fuzz_store_load

#![no_main]

use libfuzzer_sys::fuzz_target;
use sensorbridge::adapters::nvs::{EEPROM_SIZE, NvsEeprom};
use sensorbridge::app::ports::StoragePort;
use sensorbridge::assembler::MAX_INPUTS;
use sensorbridge::store::ConfigStore;

fuzz_target!(|data: &[u8]| {
    let mut eeprom = NvsEeprom::new();
    let len = data.len().min(EEPROM_SIZE);
    eeprom.write(0, &data[..len]).unwrap();

    let mut store = ConfigStore::new(eeprom);
    let Ok(config) = store.load() else {
        return;
    };
    assert!(!config.inputs.is_empty() && config.inputs.len() <= MAX_INPUTS);

    let mut fresh = ConfigStore::new(NvsEeprom::new());
    fresh.save(&config).unwrap();
    assert_eq!(fresh.load().unwrap(), config);
});
