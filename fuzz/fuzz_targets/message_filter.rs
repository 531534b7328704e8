#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use nfscope_core::types::{MessageDirection, MessageType, NetworkEntity, ProtocolEvent};
use nfscope_message_flow::MessageFilter;

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    search: String,
    entity_idx: Vec<u8>,
    type_idx: Vec<u8>,
    start_ms: Option<i64>,
    end_ms: Option<i64>,
    events: Vec<FuzzEvent>,
}

#[derive(Arbitrary, Debug)]
struct FuzzEvent {
    timestamp_ms: i64,
    source: u8,
    destination: u8,
    message_type: u8,
    name: String,
}

fn entity(idx: u8) -> NetworkEntity {
    NetworkEntity::ALL[usize::from(idx) % NetworkEntity::ALL.len()]
}

fn message_type(idx: u8) -> MessageType {
    MessageType::ALL[usize::from(idx) % MessageType::ALL.len()]
}

fuzz_target!(|input: FuzzInput| {
    let filter = MessageFilter::new()
        .search(&input.search)
        .entities(input.entity_idx.iter().take(16).map(|i| entity(*i)))
        .types(input.type_idx.iter().take(8).map(|i| message_type(*i)))
        .time_range(input.start_ms, input.end_ms);

    let events: Vec<ProtocolEvent> = input
        .events
        .into_iter()
        .take(64)
        .map(|e| ProtocolEvent {
            id: String::new(),
            timestamp: String::new(),
            timestamp_ms: e.timestamp_ms,
            source: entity(e.source),
            destination: entity(e.destination),
            message_type: message_type(e.message_type),
            message_name: e.name,
            direction: MessageDirection::Request,
            details: None,
            raw_log: None,
        })
        .collect();

    let kept = filter.apply(&events);
    assert!(kept.len() <= events.len());
    if filter.is_empty() {
        assert_eq!(kept.len(), events.len());
    }
    // 순서 보존
    for pair in kept.windows(2) {
        let a = events.iter().position(|e| std::ptr::eq(e, pair[0]));
        let b = events.iter().position(|e| std::ptr::eq(e, pair[1]));
        assert!(a < b);
    }
});
