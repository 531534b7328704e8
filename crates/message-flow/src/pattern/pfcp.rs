//! PFCP 규칙 -- SMF <-> UPF 세션 제어
//!
//! AMF -> SMF 세션 생성 요청(HTTP)도 이 그룹에서 평가합니다.
//! NAS 그룹의 `PDU Session Establishment Request` 규칙이 먼저 평가되므로
//! 이 규칙은 그 문구를 포함하지 않는 라인에만 적용됩니다.

use nfscope_core::types::MessageDirection::{Request, Response};
use nfscope_core::types::MessageType::{Http, Pfcp};
use nfscope_core::types::NetworkEntity::{Amf, Smf, Upf};

use super::{EventDraft, PatternRule, ProtocolFamily};
use crate::error::MessageFlowError;

pub(super) fn rules() -> Result<Vec<PatternRule>, MessageFlowError> {
    let family = ProtocolFamily::Pfcp;
    Ok(vec![
        PatternRule::new(
            "pfcp.session_establishment_request",
            family,
            r"(?i)Establishing PFCP session",
            |_| EventDraft::new(Smf, Upf, Pfcp, "Session Establishment Request", Request),
        )?,
        PatternRule::new(
            "pfcp.session_establishment_response",
            family,
            r"(?i)PFCP session established",
            |_| EventDraft::new(Upf, Smf, Pfcp, "Session Establishment Response", Response),
        )?,
        PatternRule::new(
            "pfcp.create_sm_context_request",
            family,
            r"(?i)Processing PDU Session Establishment",
            |_| EventDraft::new(Amf, Smf, Http, "Create SM Context Request", Request),
        )?,
    ])
}
