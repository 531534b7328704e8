#![no_main]

use libfuzzer_sys::fuzz_target;
use nfscope_message_flow::timestamp::parse_millis;
use nfscope_message_flow::LineClassifier;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(classifier) = LineClassifier::new() else {
        return;
    };

    let Some(event) = classifier.classify(raw) else {
        return;
    };

    // 이벤트는 파싱 가능한 타임스탬프에서만 만들어짐
    assert_eq!(parse_millis(&event.timestamp), Some(event.timestamp_ms));
    assert!(event.raw_log.is_some());

    // 같은 라인은 id를 제외하고 같은 이벤트
    let mut again = classifier.classify(raw).expect("classification is deterministic");
    again.id = event.id.clone();
    assert_eq!(again, event);
});
