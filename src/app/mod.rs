//! Application core — bridge logic with no direct I/O.
//!
//! The [`service::Bridge`] ties the codec, assembler, store and sensor
//! pipeline together.  All interaction with hardware and the host link
//! happens through **port traits** defined in [`ports`], keeping this
//! layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
