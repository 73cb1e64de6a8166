//! Fuzz target for the delimited text loader.
//!
//! Checks that encoding detection, delimiter detection and parsing never
//! panic on malformed input.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Write;
use tabviz::Loader;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    if let Ok(mut temp_file) = tempfile::NamedTempFile::with_suffix(".csv") {
        if temp_file.write_all(data).is_ok() {
            let _ = Loader::new().load(temp_file.path());
        }
    }
});
