//! Fuzz target for the JSON loader and its shape detection.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Write;
use tabviz::Loader;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    if let Ok(mut temp_file) = tempfile::NamedTempFile::with_suffix(".json") {
        if temp_file.write_all(data).is_ok() {
            let _ = Loader::new().load(temp_file.path());
        }
    }
});
