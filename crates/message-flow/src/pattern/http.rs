//! HTTP 규칙 -- 서비스 기반 인터페이스(SBI) 호출
//!
//! 구체적인 AUSF/UDM 로그 문구 규칙이 먼저 오고,
//! 마지막 규칙은 `method`/`path`를 담은 모든 요청 로그를 잡는 일반 대체 규칙입니다.

use nfscope_core::types::MessageDirection::{Request, Response};
use nfscope_core::types::MessageType::Http;
use nfscope_core::types::NetworkEntity::{self, Amf, Ausf, Nrf, Smf, Udm};

use super::{EventDraft, PatternRule, ProtocolFamily, group};
use crate::error::MessageFlowError;

/// SBI 경로 접두사별 목적지 (첫 번째 포함 항목이 이김)
const PATH_DESTINATIONS: [(&str, NetworkEntity); 4] = [
    ("/nudm-ueau/", Udm),
    ("/nausf-auth/", Ausf),
    ("/nnrf-nfm/", Nrf),
    ("/nsmf-pdusession/", Smf),
];

/// 요청 경로에서 목적지 엔티티를 결정합니다.
///
/// 알려진 서비스 접두사가 없으면 UDM입니다.
pub fn destination_for_path(path: &str) -> NetworkEntity {
    PATH_DESTINATIONS
        .iter()
        .find(|(prefix, _)| path.contains(prefix))
        .map(|(_, entity)| *entity)
        .unwrap_or(Udm)
}

pub(super) fn rules() -> Result<Vec<PatternRule>, MessageFlowError> {
    let family = ProtocolFamily::Http;
    Ok(vec![
        PatternRule::new(
            "http.get_authentication_info",
            family,
            r"(?i)Calling UDM to get authentication info for UE: (.+)",
            |caps| {
                EventDraft::new(Ausf, Udm, Http, "GET Authentication Info", Request)
                    .with_detail("supi", group(caps, 1))
            },
        )?,
        PatternRule::new(
            "http.authentication_info_response",
            family,
            r"(?i)Received authentication info from UDM",
            |_| EventDraft::new(Udm, Ausf, Http, "Authentication Info Response", Response),
        )?,
        PatternRule::new(
            "http.authenticate_request",
            family,
            r"(?i)Home network authentication for UE: (.+)",
            |caps| {
                EventDraft::new(Amf, Ausf, Http, "Authenticate Request", Request)
                    .with_detail("suci", group(caps, 1))
            },
        )?,
        PatternRule::new(
            "http.authenticate_response",
            family,
            r"(?i)Sending to AMF - RAND:",
            |_| EventDraft::new(Ausf, Amf, Http, "Authenticate Response", Response),
        )?,
        PatternRule::new(
            "http.sbi_request",
            family,
            r"(?is)Request received.*?method:\s*'(\w+)'.*?path:\s*'([^']+)'",
            |caps| {
                let method = group(caps, 1);
                let path = group(caps, 2);
                EventDraft::new(
                    Amf,
                    destination_for_path(path),
                    Http,
                    format!("{method} {path}"),
                    Request,
                )
                .with_detail("method", method)
                .with_detail("path", path)
            },
        )?,
    ])
}
