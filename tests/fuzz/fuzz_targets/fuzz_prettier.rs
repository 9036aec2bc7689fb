#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let output = String::from_utf8_lossy(data);
    let _ = lintrend::parsers::prettier::count_unformatted(&output);
});
