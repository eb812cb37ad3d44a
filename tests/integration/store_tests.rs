//! Persistent configuration store integration tests.
//!
//! Exercise [`ConfigStore`] over the EEPROM image and a storage mock whose
//! commit can fail, including the bridge's reaction to a failed save.

use sensorbridge::adapters::nvs::{EEPROM_SIZE, ERASED, NvsEeprom};
use sensorbridge::app::events::BridgeEvent;
use sensorbridge::app::ports::StoragePort;
use sensorbridge::app::service::Bridge;
use sensorbridge::assembler::Configuration;
use sensorbridge::config::BridgeConfig;
use sensorbridge::error::{AssemblyError, LoadError};
use sensorbridge::protocol::{ConfigurationError, InputConfig, MatrixConfig, Message};
use sensorbridge::store::{
    CONFIG_MAGIC, COUNT_ADDR, ConfigStore, FORMAT_VERSION, INPUTS_ADDR, MAGIC_ADDR, VERSION_ADDR,
};

use crate::mock_hw::{FlakyStorage, MockBoard, MockLink, RecordingSink, analog, configure};

fn full_configuration() -> Configuration {
    let mut inputs = heapless::Vec::new();
    inputs.push(analog(1, 0)).unwrap();
    inputs
        .push(InputConfig::Button {
            pin: 2,
            debounce: 30,
        })
        .unwrap();
    for i in 0..6u8 {
        let rows: Vec<u8> = (0..8).map(|p| p + i).collect();
        let cols: Vec<u8> = (8..16).map(|p| p + i).collect();
        inputs
            .push(InputConfig::Matrix(MatrixConfig::new(&rows, &cols).unwrap()))
            .unwrap();
    }
    Configuration {
        config_id: u32::MAX,
        inputs,
    }
}

#[test]
fn largest_configuration_fits_the_eeprom() {
    let config = full_configuration();
    let mut store = ConfigStore::new(NvsEeprom::new());
    store.save(&config).unwrap();
    assert_eq!(store.load().unwrap(), config);
}

#[test]
fn record_layout_is_stable() {
    let mut inputs = heapless::Vec::new();
    inputs.push(analog(7, 3)).unwrap();
    let config = Configuration {
        config_id: 0x0102_0304,
        inputs,
    };
    let mut store = ConfigStore::new(NvsEeprom::new());
    store.save(&config).unwrap();

    let image = store.storage().image();
    assert_eq!(&image[MAGIC_ADDR..4], &CONFIG_MAGIC.to_le_bytes());
    assert_eq!(image[VERSION_ADDR], FORMAT_VERSION);
    assert_eq!(&image[5..9], &[0x04, 0x03, 0x02, 0x01]);
    assert_eq!(image[COUNT_ADDR], 1);
    assert_eq!(&image[INPUTS_ADDR..INPUTS_ADDR + 3], &[0, 7, 3]);
    assert_eq!(image[INPUTS_ADDR + 3], ERASED);
}

#[test]
fn erased_eeprom_has_no_record() {
    let mut store = ConfigStore::new(NvsEeprom::new());
    assert_eq!(store.load(), Err(LoadError::NoRecord));
}

#[test]
fn future_format_version_invalidated() {
    let mut eeprom = NvsEeprom::new();
    eeprom.write(MAGIC_ADDR, &CONFIG_MAGIC.to_le_bytes()).unwrap();
    eeprom.write(VERSION_ADDR, &[FORMAT_VERSION + 1]).unwrap();

    let mut store = ConfigStore::new(eeprom);
    assert_eq!(
        store.load(),
        Err(LoadError::VersionMismatch {
            found: FORMAT_VERSION + 1
        })
    );
    // The stale record is gone for good.
    assert_eq!(store.load(), Err(LoadError::NoRecord));
    assert_eq!(store.storage().commits(), 1);
}

#[test]
fn record_with_garbage_body_is_corrupted() {
    let mut eeprom = NvsEeprom::new();
    eeprom.write(MAGIC_ADDR, &CONFIG_MAGIC.to_le_bytes()).unwrap();
    eeprom
        .write(VERSION_ADDR, &[FORMAT_VERSION, 1, 0, 0, 0, 2])
        .unwrap();
    // Input 0 is fine, input 1 has kind 0xFF (erased cells).
    eeprom.write(INPUTS_ADDR, &[0, 4, 5]).unwrap();

    let mut store = ConfigStore::new(eeprom);
    assert_eq!(store.load(), Err(LoadError::Corrupted));
}

#[test]
fn input_count_out_of_range() {
    for count in [0u8, 9, 0xFF] {
        let mut eeprom = NvsEeprom::new();
        eeprom.write(MAGIC_ADDR, &CONFIG_MAGIC.to_le_bytes()).unwrap();
        eeprom
            .write(VERSION_ADDR, &[FORMAT_VERSION, 1, 0, 0, 0, count])
            .unwrap();
        let mut store = ConfigStore::new(eeprom);
        assert_eq!(store.load(), Err(LoadError::InvalidInputCount(count)));
    }
}

#[test]
fn short_storage_never_reads_past_the_end() {
    let mut storage = FlakyStorage::new(INPUTS_ADDR + 2);
    storage.write(MAGIC_ADDR, &CONFIG_MAGIC.to_le_bytes()).unwrap();
    storage
        .write(VERSION_ADDR, &[FORMAT_VERSION, 1, 0, 0, 0, 1])
        .unwrap();
    storage.write(INPUTS_ADDR, &[0, 4]).unwrap();

    let mut store = ConfigStore::new(storage);
    assert_eq!(store.load(), Err(LoadError::Corrupted));
}

#[test]
fn eeprom_bounds_enforced() {
    let mut eeprom = NvsEeprom::new();
    assert!(eeprom.write(EEPROM_SIZE - 1, &[1, 2]).is_err());
    let mut buf = [0u8; 4];
    assert!(eeprom.read(EEPROM_SIZE, &mut buf).is_err());
}

#[test]
fn failed_save_keeps_previous_configuration() {
    let mut sink = RecordingSink::new();
    let mut link = MockLink::new();
    let mut board = MockBoard::new();
    let mut storage = FlakyStorage::new(EEPROM_SIZE);
    storage.fail_commit = true;

    let mut bridge = Bridge::new(BridgeConfig::default(), storage).unwrap();
    bridge.start(&mut sink);
    bridge.handle_packet(
        &configure(0x99, 1, 0, analog(3, 4)),
        0,
        &mut board,
        &mut link,
        &mut sink,
    );

    assert_eq!(
        link.take(),
        [Message::from(ConfigurationError { config_id: 0x99 })]
    );
    assert!(sink.contains(&BridgeEvent::ConfigurationRejected {
        config_id: 0x99,
        reason: AssemblyError::StoreFailed,
    }));
    assert_eq!(bridge.active_config_id(), 0);
    assert_eq!(bridge.sensor_count(), 0);
}
