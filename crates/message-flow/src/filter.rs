//! 뷰어 필터 -- 이미 조회한 이벤트 목록에 적용하는 표시용 필터
//!
//! 조회 API는 서버 측 필터링을 하지 않습니다. 이 필터는 CLI 같은
//! 표시 계층이 받은 목록을 좁힐 때 사용합니다. 모든 조건은 AND로 결합되며
//! 비어 있는 조건은 모든 이벤트를 통과시킵니다.

use std::collections::HashSet;

use nfscope_core::types::{MessageType, NetworkEntity, ProtocolEvent};

/// 이벤트 필터
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    /// 소문자로 정규화된 검색어
    search: Option<String>,
    /// 출발지 또는 목적지가 이 집합에 속해야 함
    entities: HashSet<NetworkEntity>,
    /// 메시지 타입이 이 집합에 속해야 함
    types: HashSet<MessageType>,
    /// `timestamp_ms` 하한 (포함)
    start_ms: Option<i64>,
    /// `timestamp_ms` 상한 (포함)
    end_ms: Option<i64>,
}

impl MessageFilter {
    /// 모든 이벤트를 통과시키는 필터를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 메시지 이름, 출발지, 목적지에 대한 대소문자 무시 검색어를 설정합니다.
    ///
    /// 공백뿐인 검색어는 무시합니다.
    pub fn search(mut self, query: &str) -> Self {
        let query = query.trim();
        self.search = (!query.is_empty()).then(|| query.to_lowercase());
        self
    }

    /// 엔티티 조건을 추가합니다.
    pub fn entities(mut self, entities: impl IntoIterator<Item = NetworkEntity>) -> Self {
        self.entities.extend(entities);
        self
    }

    /// 메시지 타입 조건을 추가합니다.
    pub fn types(mut self, types: impl IntoIterator<Item = MessageType>) -> Self {
        self.types.extend(types);
        self
    }

    /// 시간 범위 조건을 설정합니다. 양 끝을 포함합니다.
    pub fn time_range(mut self, start_ms: Option<i64>, end_ms: Option<i64>) -> Self {
        self.start_ms = start_ms;
        self.end_ms = end_ms;
        self
    }

    /// 조건이 하나도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.entities.is_empty()
            && self.types.is_empty()
            && self.start_ms.is_none()
            && self.end_ms.is_none()
    }

    /// 이벤트가 모든 조건을 만족하는지 평가합니다.
    pub fn matches(&self, event: &ProtocolEvent) -> bool {
        if let Some(query) = &self.search {
            let hit = event.message_name.to_lowercase().contains(query)
                || event.source.as_str().to_lowercase().contains(query)
                || event.destination.as_str().to_lowercase().contains(query);
            if !hit {
                return false;
            }
        }

        if !self.entities.is_empty()
            && !self.entities.contains(&event.source)
            && !self.entities.contains(&event.destination)
        {
            return false;
        }

        if !self.types.is_empty() && !self.types.contains(&event.message_type) {
            return false;
        }

        if self.start_ms.is_some_and(|start| event.timestamp_ms < start) {
            return false;
        }
        if self.end_ms.is_some_and(|end| event.timestamp_ms > end) {
            return false;
        }

        true
    }

    /// 조건을 만족하는 이벤트만 순서를 유지하며 반환합니다.
    pub fn apply<'a>(&self, events: &'a [ProtocolEvent]) -> Vec<&'a ProtocolEvent> {
        events.iter().filter(|event| self.matches(event)).collect()
    }
}
