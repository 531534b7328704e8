//! 라인 분류기 -- 원시 로그 라인 하나를 프로토콜 이벤트로 변환
//!
//! [`LineClassifier`]는 라인을 정제하고, 선행 타임스탬프를 추출하고,
//! [`PatternLibrary`]를 선언 순서대로 적용합니다.
//! 타임스탬프가 없거나 어떤 규칙에도 매칭되지 않는 라인은 조용히 버립니다.

use uuid::Uuid;

use nfscope_core::types::ProtocolEvent;

use crate::error::MessageFlowError;
use crate::pattern::{EventDraft, PatternLibrary};
use crate::timestamp::{TimestampExtractor, parse_millis};

/// 라인 분류기
///
/// 내부 상태가 없으므로 여러 태스크가 `Arc`로 공유할 수 있습니다.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    extractor: TimestampExtractor,
    library: PatternLibrary,
}

impl LineClassifier {
    /// 표준 규칙 세트로 분류기를 생성합니다.
    pub fn new() -> Result<Self, MessageFlowError> {
        Self::with_library(PatternLibrary::standard()?)
    }

    /// 지정한 규칙 라이브러리로 분류기를 생성합니다.
    pub fn with_library(library: PatternLibrary) -> Result<Self, MessageFlowError> {
        Ok(Self {
            extractor: TimestampExtractor::new()?,
            library,
        })
    }

    /// 원시 라인을 분류합니다.
    ///
    /// 정제 -> 타임스탬프 추출 -> 첫 매칭 규칙 적용 순서로 처리합니다.
    pub fn classify(&self, raw_line: &str) -> Option<ProtocolEvent> {
        let clean = self.extractor.clean_line(raw_line);
        let timestamp = self.extractor.extract(&clean)?;
        let timestamp_ms = parse_millis(timestamp)?;
        let (rule, draft) = self.library.first_match(&clean)?;

        tracing::trace!(
            rule = rule.name(),
            family = %rule.family(),
            timestamp,
            "line classified"
        );

        Some(into_event(draft, timestamp, timestamp_ms, &clean))
    }

    /// 이미 정제된 라인의 구조적 필드만 분류합니다 (타임스탬프 불필요).
    pub fn classify_draft(&self, clean_line: &str) -> Option<EventDraft> {
        self.library
            .first_match(clean_line)
            .map(|(_, draft)| draft)
    }

    /// 원시 라인을 정제합니다.
    pub fn clean_line(&self, raw_line: &str) -> String {
        self.extractor.clean_line(raw_line)
    }

    /// 사용 중인 규칙 라이브러리
    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }
}

fn into_event(draft: EventDraft, timestamp: &str, timestamp_ms: i64, clean: &str) -> ProtocolEvent {
    ProtocolEvent {
        id: format!("{timestamp}-{}", Uuid::new_v4().simple()),
        timestamp: timestamp.to_owned(),
        timestamp_ms,
        source: draft.source,
        destination: draft.destination,
        message_type: draft.message_type,
        message_name: draft.message_name,
        direction: draft.direction,
        details: draft.details,
        raw_log: Some(clean.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfscope_core::types::{MessageDirection, MessageType, NetworkEntity};

    fn classifier() -> LineClassifier {
        LineClassifier::new().unwrap()
    }

    #[test]
    fn initial_ue_message_from_amf() {
        let event = classifier()
            .classify("2025-01-01T00:00:01.000Z Processing Initial UE Message")
            .unwrap();
        assert_eq!(event.source, NetworkEntity::Gnb);
        assert_eq!(event.destination, NetworkEntity::Amf);
        assert_eq!(event.message_type, MessageType::Ngap);
        assert_eq!(event.message_name, "Initial UE Message");
        assert_eq!(event.direction, MessageDirection::Indication);
        assert_eq!(event.timestamp, "2025-01-01T00:00:01.000Z");
        assert_eq!(event.timestamp_ms, 1_735_689_601_000);
        assert!(event.id.starts_with("2025-01-01T00:00:01.000Z-"));
        assert_eq!(
            event.raw_log.as_deref(),
            Some("2025-01-01T00:00:01.000Z Processing Initial UE Message")
        );
    }

    #[test]
    fn supi_detail_from_ausf() {
        let event = classifier()
            .classify(
                "2025-01-01T00:00:02.000Z Calling UDM to get authentication info for UE: imsi-999700000000001",
            )
            .unwrap();
        assert_eq!(
            event.details.unwrap().get("supi").map(String::as_str),
            Some("imsi-999700000000001")
        );
    }

    #[test]
    fn timestamped_line_without_rule_yields_nothing() {
        assert!(
            classifier()
                .classify("2025-01-01T00:00:03.000Z heartbeat ok")
                .is_none()
        );
    }

    #[test]
    fn matching_line_without_timestamp_yields_nothing() {
        assert!(
            classifier()
                .classify("Processing Initial UE Message")
                .is_none()
        );
    }

    #[test]
    fn ansi_colored_line_is_classified_and_cleaned() {
        let event = classifier()
            .classify("\u{1b}[36m2025-01-01T00:00:04.000Z\u{1b}[0m \u{1b}[32mSending Registration Accept\u{1b}[0m")
            .unwrap();
        assert_eq!(event.message_name, "Registration Accept");
        assert_eq!(
            event.raw_log.as_deref(),
            Some("2025-01-01T00:00:04.000Z Sending Registration Accept")
        );
    }

    #[test]
    fn classification_is_idempotent_except_id() {
        let c = classifier();
        let line = "2025-01-01T00:00:05.000Z PFCP session established";
        let mut a = c.classify(line).unwrap();
        let mut b = c.classify(line).unwrap();
        assert_ne!(a.id, b.id);
        a.id.clear();
        b.id.clear();
        assert_eq!(a, b);
    }

    #[test]
    fn nas_rule_wins_over_create_sm_context() {
        let event = classifier()
            .classify("2025-01-01T00:00:06.000Z Processing PDU Session Establishment Request")
            .unwrap();
        assert_eq!(event.message_type, MessageType::Nas);
        assert_eq!(event.message_name, "PDU Session Establishment Request");
    }

    #[test]
    fn classify_draft_ignores_timestamp() {
        let draft = classifier()
            .classify_draft("Establishing PFCP session")
            .unwrap();
        assert_eq!(draft.message_type, MessageType::Pfcp);
    }
}
