//! Fuzz target: `Message::decode`
//!
//! Any input either fails to decode or yields a message that re-encodes
//! to a prefix of the input.
//!
//! cargo fuzz run fuzz_message_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use sensorbridge::protocol::{MAX_MESSAGE_LEN, Message};

fuzz_target!(|data: &[u8]| {
    let Ok(msg) = Message::decode(data) else {
        return;
    };
    let mut buf = [0u8; MAX_MESSAGE_LEN];
    let n = msg.encode(&mut buf).expect("decoded message re-encodes");
    assert_eq!(&buf[..n], &data[..n]);
});
