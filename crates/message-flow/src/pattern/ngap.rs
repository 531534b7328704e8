//! NGAP 규칙 -- gNB <-> AMF 시그널링

use nfscope_core::types::MessageDirection::{Indication, Request, Response};
use nfscope_core::types::MessageType::Ngap;
use nfscope_core::types::NetworkEntity::{Amf, Gnb};

use super::{EventDraft, PatternRule, ProtocolFamily};
use crate::error::MessageFlowError;

pub(super) fn rules() -> Result<Vec<PatternRule>, MessageFlowError> {
    let family = ProtocolFamily::Ngap;
    Ok(vec![
        PatternRule::new(
            "ngap.ng_setup_request",
            family,
            r"(?i)Processing NG Setup Request from (.+)",
            |_| EventDraft::new(Gnb, Amf, Ngap, "NG Setup Request", Request),
        )?,
        PatternRule::new(
            "ngap.ng_setup_response",
            family,
            r"(?i)RAN node (.+) successfully registered",
            |_| EventDraft::new(Amf, Gnb, Ngap, "NG Setup Response", Response),
        )?,
        PatternRule::new(
            "ngap.initial_ue_message",
            family,
            r"(?i)Processing Initial UE Message",
            |_| EventDraft::new(Gnb, Amf, Ngap, "Initial UE Message", Indication),
        )?,
        PatternRule::new(
            "ngap.uplink_nas_transport",
            family,
            r"(?i)Processing Uplink NAS Transport",
            |_| EventDraft::new(Gnb, Amf, Ngap, "Uplink NAS Transport", Indication),
        )?,
        PatternRule::new(
            "ngap.downlink_nas_transport",
            family,
            r"(?i)Sending Downlink NAS Transport",
            |_| EventDraft::new(Amf, Gnb, Ngap, "Downlink NAS Transport", Indication),
        )?,
        PatternRule::new(
            "ngap.initial_context_setup_request",
            family,
            r"(?i)Initial Context Setup Request",
            |_| EventDraft::new(Amf, Gnb, Ngap, "Initial Context Setup Request", Request),
        )?,
        PatternRule::new(
            "ngap.pdu_session_resource_setup_request",
            family,
            r"(?i)PDU Session Resource Setup Request",
            |_| {
                EventDraft::new(
                    Amf,
                    Gnb,
                    Ngap,
                    "PDU Session Resource Setup Request",
                    Request,
                )
            },
        )?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(line: &str) -> Option<EventDraft> {
        rules().unwrap().iter().find_map(|r| r.apply(line))
    }

    #[test]
    fn ng_setup_request_from_gnb() {
        let draft = first("Processing NG Setup Request from gNB-0x000102").unwrap();
        assert_eq!(draft.source, Gnb);
        assert_eq!(draft.destination, Amf);
        assert_eq!(draft.message_name, "NG Setup Request");
        assert_eq!(draft.direction, Request);
        assert!(draft.details.is_none());
    }

    #[test]
    fn ng_setup_response_to_gnb() {
        let draft = first("RAN node gnb-01 successfully registered").unwrap();
        assert_eq!((draft.source, draft.destination), (Amf, Gnb));
        assert_eq!(draft.direction, Response);
    }

    #[test]
    fn nas_transport_directions() {
        let up = first("[amf] processing uplink nas transport for ue 3").unwrap();
        assert_eq!((up.source, up.destination), (Gnb, Amf));
        let down = first("Sending Downlink NAS Transport").unwrap();
        assert_eq!((down.source, down.destination), (Amf, Gnb));
        assert_eq!(down.direction, Indication);
    }

    #[test]
    fn ng_setup_request_needs_origin() {
        // "from" 뒤에 최소 한 글자가 필요
        assert!(first("Processing NG Setup Request from ").is_none());
    }
}
