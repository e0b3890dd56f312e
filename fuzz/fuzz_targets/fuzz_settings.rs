//! Fuzz target for settings parsing.
//!
//! Settings files are user-edited; parsing and validation must reject bad
//! input with an error, never a panic.

#![no_main]

use et_config::Settings;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(settings) = serde_json::from_slice::<Settings>(data) {
        let _ = settings.validate();
    }
});
