//! Grouped IEs carrying a nested TLV stream

use serde::Serialize;

use crate::error::IeDecodeError;
use crate::format::FormatMode;
use crate::ie::composite::{BearerQos, Cause, FTeid};
use crate::ie::scalar::decode_ebi;
use crate::ie::IeType;
use crate::tlv::{TlvCursor, TlvLayout};

/// Bearer Context IE (3GPP TS 29.274 8.28)
///
/// The content is a TLV stream in the same framing as top-level IEs.
/// Only the members this decoder knows are kept; anything else in the
/// group is walked over.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BearerContext {
    #[serde(rename = "EBI", skip_serializing_if = "Option::is_none")]
    pub ebi: Option<u8>,
    #[serde(rename = "BearerQoS", skip_serializing_if = "Option::is_none")]
    pub bearer_qos: Option<BearerQos>,
    #[serde(rename = "Cause", skip_serializing_if = "Option::is_none")]
    pub cause: Option<Cause>,
    #[serde(rename = "FTEIDs", skip_serializing_if = "Vec::is_empty")]
    pub fteids: Vec<FTeid>,
}

impl BearerContext {
    pub fn decode(content: &[u8], mode: FormatMode) -> Result<Self, IeDecodeError> {
        if content.len() < 4 {
            return Err(IeDecodeError::Insufficient {
                needed: 4,
                available: content.len(),
            });
        }

        let mut context = BearerContext::default();
        for element in TlvCursor::new(content, TlvLayout::Gtp) {
            let element =
                element.map_err(|err| IeDecodeError::TruncatedTlv { offset: err.offset })?;
            match IeType::try_from(element.tag as u8) {
                Ok(IeType::Ebi) => context.ebi = Some(decode_ebi(element.content)?),
                Ok(IeType::BearerQos) => {
                    context.bearer_qos = Some(BearerQos::decode(element.content)?)
                }
                Ok(IeType::Cause) => context.cause = Some(Cause::decode(element.content, mode)?),
                Ok(IeType::FTeid) => context.fteids.push(FTeid::decode(element.content, mode)?),
                _ => {}
            }
        }

        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::FormatValue;

    // EBI 6, a default bearer QoS, cause 16 and one S11 F-TEID.
    const GROUP: [u8; 50] = [
        0x49, 0x00, 0x01, 0x00, 0x06, // EBI
        0x50, 0x00, 0x16, 0x00, 0x48, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // Bearer QoS
        0x02, 0x00, 0x02, 0x00, 0x10, 0x00, // Cause
        0x57, 0x00, 0x09, 0x00, 0x8a, 0x3f, 0x0f, 0xed, 0x23, 0xd9, 0x94, 0x30,
        0xea, // F-TEID
    ];

    #[test]
    fn test_bearer_context_members() {
        let decoded = BearerContext::decode(&GROUP, FormatMode::Numeric).unwrap();
        assert_eq!(decoded.ebi, Some(6));

        let qos = decoded.bearer_qos.unwrap();
        assert!(!qos.pci);
        assert_eq!(qos.pl, 2);
        assert!(qos.pvi);
        assert_eq!(qos.qci, 8);
        assert_eq!(qos.mbr_ul, 0);
        assert_eq!(qos.gbr_dl, 0);

        let cause = decoded.cause.unwrap();
        assert_eq!(cause.cause_value, FormatValue::Code(16));
        assert!(!cause.pce);

        assert_eq!(decoded.fteids.len(), 1);
        assert_eq!(decoded.fteids[0].interface_type, FormatValue::Code(10));
        assert_eq!(decoded.fteids[0].teid_gre_key, "3f0fed23");
    }

    #[test]
    fn test_bearer_context_format_mode_reaches_members() {
        let decoded = BearerContext::decode(&GROUP, FormatMode::Mixed).unwrap();
        assert_eq!(
            decoded.cause.unwrap().cause_value,
            FormatValue::Text("Request accepted (16)".to_owned())
        );
        assert_eq!(
            decoded.fteids[0].interface_type,
            FormatValue::Text("S11 MME GTP-C interface (10)".to_owned())
        );
    }

    #[test]
    fn test_bearer_context_skips_unknown_members() {
        let content = [
            0x03, 0x00, 0x01, 0x00, 0x2A, // Recovery is not a tracked member
            0x49, 0x00, 0x01, 0x00, 0x06,
        ];
        let decoded = BearerContext::decode(&content, FormatMode::Numeric).unwrap();
        assert_eq!(decoded.ebi, Some(6));
        assert_eq!(decoded.bearer_qos, None);
    }

    #[test]
    fn test_bearer_context_too_short() {
        assert_eq!(
            BearerContext::decode(&[0x49, 0x00, 0x01], FormatMode::Numeric),
            Err(IeDecodeError::Insufficient {
                needed: 4,
                available: 3,
            })
        );
    }

    #[test]
    fn test_bearer_context_truncated_member() {
        let content = [0x49, 0x00, 0x05, 0x00, 0x06];
        assert_eq!(
            BearerContext::decode(&content, FormatMode::Numeric),
            Err(IeDecodeError::TruncatedTlv { offset: 0 })
        );
    }

    #[test]
    fn test_bearer_context_member_error_propagates() {
        let content = [0x50, 0x00, 0x01, 0x00, 0x48];
        assert_eq!(
            BearerContext::decode(&content, FormatMode::Numeric),
            Err(IeDecodeError::Insufficient {
                needed: 22,
                available: 1,
            })
        );
    }

    #[test]
    fn test_bearer_context_json_omits_absent_members() {
        let content = [0x49, 0x00, 0x01, 0x00, 0x06];
        let decoded = BearerContext::decode(&content, FormatMode::Numeric).unwrap();
        assert_eq!(serde_json::to_string(&decoded).unwrap(), r#"{"EBI":6}"#);
    }
}
