#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(files) = lintrend::parsers::eslint::parse(data) {
        let _ = lintrend::aggregate::aggregate(&files, None, "fuzz", None);
    }
});
