#![no_main]
use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;
use lintrend::report::{ChartData, TextFormatter};
use lintrend::theme::Theme;

fuzz_target!(|data: &[u8]| {
    // The log is hand-editable; any text must parse, analyse and render
    // without panicking.
    let text = String::from_utf8_lossy(data);
    let snapshots: Vec<_> = lintrend::logfile::parse_log(&text).collect();
    let _ = lintrend::trend::analyze(&snapshots);

    let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    let _ = ChartData::new(&snapshots, None, today).format(&TextFormatter {
        theme: Theme::plain(),
    });
});
