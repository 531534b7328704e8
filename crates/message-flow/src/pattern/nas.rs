//! NAS 규칙 -- UE <-> AMF/SMF 시그널링

use nfscope_core::types::MessageDirection::{Request, Response};
use nfscope_core::types::MessageType::Nas;
use nfscope_core::types::NetworkEntity::{Amf, Smf, Ue};

use super::{EventDraft, PatternRule, ProtocolFamily, group};
use crate::error::MessageFlowError;

pub(super) fn rules() -> Result<Vec<PatternRule>, MessageFlowError> {
    let family = ProtocolFamily::Nas;
    Ok(vec![
        PatternRule::new(
            "nas.registration_request",
            family,
            r"(?i)Decoded Registration Request.*?type=(.+?),",
            |caps| {
                EventDraft::new(Ue, Amf, Nas, "Registration Request", Request)
                    .with_detail("type", group(caps, 1))
            },
        )?,
        PatternRule::new(
            "nas.authentication_request",
            family,
            r"(?i)Sending Authentication Request|Encoded Authentication Request|Full Authentication Request NAS PDU",
            |_| EventDraft::new(Amf, Ue, Nas, "Authentication Request", Request),
        )?,
        PatternRule::new(
            "nas.authentication_response",
            family,
            r"(?i)Decoded Authentication Response|Authentication Failure received from UE",
            |_| EventDraft::new(Ue, Amf, Nas, "Authentication Response", Response),
        )?,
        PatternRule::new(
            "nas.security_mode_command",
            family,
            r"(?i)Sending Security Mode Command",
            |_| EventDraft::new(Amf, Ue, Nas, "Security Mode Command", Request),
        )?,
        PatternRule::new(
            "nas.security_mode_complete",
            family,
            r"(?i)Decoded Security Mode Complete",
            |_| EventDraft::new(Ue, Amf, Nas, "Security Mode Complete", Response),
        )?,
        PatternRule::new(
            "nas.registration_accept",
            family,
            r"(?i)Sending Registration Accept",
            |_| EventDraft::new(Amf, Ue, Nas, "Registration Accept", Response),
        )?,
        PatternRule::new(
            "nas.pdu_session_establishment_request",
            family,
            r"(?i)PDU Session Establishment Request",
            |_| EventDraft::new(Ue, Smf, Nas, "PDU Session Establishment Request", Request),
        )?,
        PatternRule::new(
            "nas.pdu_session_establishment_accept",
            family,
            r"(?i)PDU Session Establishment Accept",
            |_| EventDraft::new(Smf, Ue, Nas, "PDU Session Establishment Accept", Response),
        )?,
    ])
}
