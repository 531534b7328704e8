#![no_main]

use libfuzzer_sys::fuzz_target;
use nfscope_message_flow::timestamp::{parse_millis, TimestampExtractor};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(extractor) = TimestampExtractor::new() else {
        return;
    };

    let clean = extractor.clean_line(raw);
    assert_eq!(clean.trim(), clean);

    if let Some(timestamp) = extractor.extract(&clean) {
        assert!(clean.starts_with(timestamp));
        let _ = parse_millis(timestamp);
    }
});
