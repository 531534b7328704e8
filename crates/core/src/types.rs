//! 도메인 타입 -- 메시지 흐름 재구성에서 공유하는 공통 타입
//!
//! 네트워크 엔티티, 메시지 타입, 방향 열거형과
//! 로그 한 줄에서 추론된 [`ProtocolEvent`]를 정의합니다.
//! 열거형의 직렬화 문자열은 뷰어와의 호환을 위해 고정되어 있습니다.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 네트워크 엔티티
///
/// 메시지의 출발지/목적지가 될 수 있는 추상 엔티티입니다.
/// gNB, UE, PCF는 로그 소스로는 존재하지 않고 메시지 종단점으로만 등장합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NetworkEntity {
    /// 단말
    #[serde(rename = "UE")]
    Ue,
    /// 기지국
    #[serde(rename = "gNB")]
    Gnb,
    /// Access and Mobility Management Function
    #[serde(rename = "AMF")]
    Amf,
    /// Authentication Server Function
    #[serde(rename = "AUSF")]
    Ausf,
    /// Unified Data Management
    #[serde(rename = "UDM")]
    Udm,
    /// Network Repository Function
    #[serde(rename = "NRF")]
    Nrf,
    /// Session Management Function
    #[serde(rename = "SMF")]
    Smf,
    /// User Plane Function
    #[serde(rename = "UPF")]
    Upf,
    /// Network Slice Selection Function
    #[serde(rename = "NSSF")]
    Nssf,
    /// Policy Control Function
    #[serde(rename = "PCF")]
    Pcf,
}

impl NetworkEntity {
    /// 모든 엔티티 (표시 순서)
    pub const ALL: [Self; 10] = [
        Self::Ue,
        Self::Gnb,
        Self::Amf,
        Self::Ausf,
        Self::Udm,
        Self::Nrf,
        Self::Smf,
        Self::Upf,
        Self::Nssf,
        Self::Pcf,
    ];

    /// 직렬화 문자열을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ue => "UE",
            Self::Gnb => "gNB",
            Self::Amf => "AMF",
            Self::Ausf => "AUSF",
            Self::Udm => "UDM",
            Self::Nrf => "NRF",
            Self::Smf => "SMF",
            Self::Upf => "UPF",
            Self::Nssf => "NSSF",
            Self::Pcf => "PCF",
        }
    }

    /// 문자열에서 엔티티를 파싱합니다.
    ///
    /// 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for NetworkEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 메시지 타입 (프로토콜 계열)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    /// gNB <-> AMF 시그널링
    Ngap,
    /// UE <-> 코어 시그널링
    Nas,
    /// 서비스 기반 인터페이스 호출
    Http,
    /// SMF <-> UPF 세션 제어
    Pfcp,
    /// 사용자 평면 터널링
    Gtp,
}

impl MessageType {
    /// 모든 메시지 타입
    pub const ALL: [Self; 5] = [Self::Ngap, Self::Nas, Self::Http, Self::Pfcp, Self::Gtp];

    /// 직렬화 문자열을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ngap => "NGAP",
            Self::Nas => "NAS",
            Self::Http => "HTTP",
            Self::Pfcp => "PFCP",
            Self::Gtp => "GTP",
        }
    }

    /// 문자열에서 메시지 타입을 파싱합니다.
    ///
    /// 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 메시지 방향 -- 메시지 타입과 무관한 화용적 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageDirection {
    /// 요청
    Request,
    /// 응답
    Response,
    /// 단방향 전달
    Indication,
    /// 통지
    Notification,
}

impl MessageDirection {
    /// 직렬화 문자열을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Response => "response",
            Self::Indication => "indication",
            Self::Notification => "notification",
        }
    }
}

impl fmt::Display for MessageDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 프로토콜 이벤트
///
/// 로그 한 줄에서 추론된 프로토콜 수준의 상호작용 하나를 나타냅니다.
/// 파생 데이터이므로 생성 후 변경되지 않으며, 한 번의 조회 주기 동안만 존재합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolEvent {
    /// 타임스탬프 + 무작위 접미사로 구성된 식별자
    pub id: String,
    /// 로그 라인에 기록된 ISO-8601 시각 문자열
    pub timestamp: String,
    /// 같은 시각의 epoch 밀리초 (정렬 키)
    pub timestamp_ms: i64,
    /// 출발지 엔티티
    pub source: NetworkEntity,
    /// 목적지 엔티티
    pub destination: NetworkEntity,
    /// 메시지 타입
    pub message_type: MessageType,
    /// 메시지 이름 (예: "Registration Request")
    pub message_name: String,
    /// 메시지 방향
    pub direction: MessageDirection,
    /// 매칭 텍스트에서 추출한 하위 필드 (method, path, supi 등)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
    /// 이벤트를 만든 정제된 로그 라인
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_log: Option<String>,
}

impl fmt::Display for ProtocolEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} [{}] {} ({})",
            self.timestamp,
            self.source,
            self.destination,
            self.message_type,
            self.message_name,
            self.direction,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> ProtocolEvent {
        ProtocolEvent {
            id: "2025-01-01T00:00:01.000Z-abc".to_owned(),
            timestamp: "2025-01-01T00:00:01.000Z".to_owned(),
            timestamp_ms: 1_735_689_601_000,
            source: NetworkEntity::Gnb,
            destination: NetworkEntity::Amf,
            message_type: MessageType::Ngap,
            message_name: "Initial UE Message".to_owned(),
            direction: MessageDirection::Indication,
            details: None,
            raw_log: Some("2025-01-01T00:00:01.000Z Processing Initial UE Message".to_owned()),
        }
    }

    #[test]
    fn entity_serializes_with_fixed_names() {
        let names: Vec<String> = NetworkEntity::ALL
            .iter()
            .map(|e| serde_json::to_value(e).unwrap().as_str().unwrap().to_owned())
            .collect();
        assert_eq!(
            names,
            vec!["UE", "gNB", "AMF", "AUSF", "UDM", "NRF", "SMF", "UPF", "NSSF", "PCF"]
        );
    }

    #[test]
    fn entity_as_str_matches_serde() {
        for entity in NetworkEntity::ALL {
            let json = serde_json::to_value(entity).unwrap();
            assert_eq!(json.as_str(), Some(entity.as_str()));
        }
    }

    #[test]
    fn entity_from_str_loose() {
        assert_eq!(NetworkEntity::from_str_loose("gnb"), Some(NetworkEntity::Gnb));
        assert_eq!(NetworkEntity::from_str_loose(" AMF "), Some(NetworkEntity::Amf));
        assert_eq!(NetworkEntity::from_str_loose("mme"), None);
    }

    #[test]
    fn message_type_serializes_uppercase() {
        for message_type in MessageType::ALL {
            let json = serde_json::to_value(message_type).unwrap();
            assert_eq!(json.as_str(), Some(message_type.as_str()));
        }
        assert_eq!(MessageType::from_str_loose("pfcp"), Some(MessageType::Pfcp));
        assert_eq!(MessageType::from_str_loose("sctp"), None);
    }

    #[test]
    fn direction_serializes_lowercase() {
        let json = serde_json::to_value(MessageDirection::Notification).unwrap();
        assert_eq!(json.as_str(), Some("notification"));
    }

    #[test]
    fn event_json_shape_uses_camel_case() {
        let json = serde_json::to_value(sample_event()).unwrap();
        assert_eq!(json["timestampMs"], 1_735_689_601_000_i64);
        assert_eq!(json["messageType"], "NGAP");
        assert_eq!(json["messageName"], "Initial UE Message");
        assert_eq!(json["source"], "gNB");
        assert_eq!(json["direction"], "indication");
        assert!(json.get("details").is_none());
        assert!(json.get("rawLog").is_some());
    }

    #[test]
    fn event_details_serialize_as_object() {
        let mut event = sample_event();
        let mut details = BTreeMap::new();
        details.insert("supi".to_owned(), "imsi-999700000000001".to_owned());
        event.details = Some(details);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["details"]["supi"], "imsi-999700000000001");
    }

    #[test]
    fn event_display() {
        let text = sample_event().to_string();
        assert!(text.contains("gNB -> AMF"));
        assert!(text.contains("[NGAP]"));
        assert!(text.contains("indication"));
    }
}
