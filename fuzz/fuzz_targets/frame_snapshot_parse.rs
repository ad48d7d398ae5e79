//! Fuzz target for frame snapshot parsing.
//!
//! This fuzzer feeds arbitrary strings to the snapshot parser and labels
//! every snapshot that parses, checking for panics, crashes, or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use simlabel::scene::fuzz_label_snapshot;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let _ = fuzz_label_snapshot(text);
});
