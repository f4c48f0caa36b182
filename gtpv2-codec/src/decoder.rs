//! Top-level decoder tying framing, IE dispatch and records together

use chrono::{DateTime, Utc};

use crate::error::{FramingError, IeError};
use crate::format::FormatMode;
use crate::ie::{self, DecodedIe};
use crate::message::Gtp2Message;
use crate::record::{IeRecord, PacketRecord};

/// GTPv2-C message decoder with a fixed output format mode
///
/// The decoder carries nothing but the mode, so it is `Copy`; decodes
/// under different modes never share state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    format: FormatMode,
}

impl Decoder {
    pub fn new(format: FormatMode) -> Self {
        Decoder { format }
    }

    /// The format mode this decoder renders enumerated fields with
    pub fn format(&self) -> FormatMode {
        self.format
    }

    /// Splits a datagram into its header and raw IEs
    pub fn decode_message(&self, data: &[u8]) -> Result<Gtp2Message, FramingError> {
        Gtp2Message::decode(data)
    }

    /// Decodes the content bytes of one IE under this decoder's mode
    pub fn decode_ie(&self, ie_type: u8, content: &[u8]) -> Result<DecodedIe, IeError> {
        ie::decode(self.format, ie_type, content)
    }

    /// Decodes a whole datagram into a packet record
    ///
    /// Framing errors are fatal. IE errors are not: the failing IE
    /// keeps its slot with a null value and the error text, and the
    /// walk continues with the next IE.
    pub fn decode_packet(
        &self,
        timestamp: DateTime<Utc>,
        data: &[u8],
    ) -> Result<PacketRecord, FramingError> {
        let message = self.decode_message(data)?;

        let mut ies = Vec::with_capacity(message.ies.len());
        for raw in &message.ies {
            match self.decode_ie(raw.ie_type, &raw.content) {
                Ok(decoded) => ies.push(IeRecord {
                    ie_type: decoded.name,
                    value: Some(decoded.value),
                    error: None,
                }),
                Err(err) => ies.push(IeRecord {
                    ie_type: err.name.to_owned(),
                    value: None,
                    error: Some(err.to_string()),
                }),
            }
        }

        let header = message.header;
        Ok(PacketRecord {
            timestamp,
            version: header.version,
            piggybacking_flag: header.piggybacking,
            teid_flag: header.teid_flag(),
            message_priority: header.message_priority,
            message_type: header.message_type,
            message_length: header.length,
            teid: header.teid,
            sequence_number: header.sequence_number,
            spare: header.spare,
            ies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ie::IeValue;

    fn capture_time() -> DateTime<Utc> {
        DateTime::from_timestamp(1_702_713_940, 0).unwrap()
    }

    // Echo Request: no TEID, one Recovery IE and one unknown IE.
    const ECHO: [u8; 19] = [
        0x40, 0x01, 0x00, 0x0F, 0x00, 0x00, 0x01, 0x00, // header
        0x03, 0x00, 0x01, 0x00, 0x2A, // Recovery 42
        0xFF, 0x00, 0x02, 0x00, 0x01, 0x02, // unknown type 255
    ];

    /// Build a message with a TEID header and the given raw IEs.
    fn build_message(ies: &[(u8, &[u8])]) -> Vec<u8> {
        let ie_len: usize = ies.iter().map(|(_, content)| 4 + content.len()).sum();
        let length = (8 + ie_len) as u16;
        let mut data = vec![0x48, 0x20];
        data.extend_from_slice(&length.to_be_bytes());
        data.extend_from_slice(&[0x00, 0x00, 0x10, 0x01]); // TEID
        data.extend_from_slice(&[0x00, 0x00, 0x2a, 0x00]); // sequence + spare
        for (ie_type, content) in ies {
            data.push(*ie_type);
            data.extend_from_slice(&(content.len() as u16).to_be_bytes());
            data.push(0x00); // instance
            data.extend_from_slice(content);
        }
        data
    }

    /// A Create Session Request the way an S11 MME sends one.
    fn create_session_request() -> Vec<u8> {
        build_message(&[
            (1, &[0x52, 0x10, 0x20, 0x90, 0x99, 0x71, 0x16, 0xf3]), // IMSI
            (76, &[0x97, 0x52, 0x89, 0x03, 0x86, 0x07, 0xf5]),      // MSISDN
            (75, &[0x68, 0x65, 0x82, 0x50, 0x03, 0x91, 0x48, 0x65]), // MEI
            (
                86, // ULI carrying a TAI and an ECGI
                &[
                    0x18, 0x52, 0xf0, 0x53, 0x0b, 0x54, 0x52, 0xf0, 0x53, 0x03, 0xfd, 0x25, 0x02,
                ],
            ),
            (83, &[0x52, 0xf0, 0x53]), // ServingNetwork 250/35
            (82, &[0x06]),             // RAT type EUTRAN
            (77, &[0x00, 0x00]),       // Indication, nothing set
            (87, &[0x8a, 0x3f, 0x0f, 0xed, 0x23, 0xd9, 0x94, 0x30, 0xea]), // F-TEID
            (71, b"\x04inet\x03ycc\x02ru\x06mnc035\x06mcc250\x04gprs"), // APN
            (128, &[0x00]),                        // SelectionMode
            (99, &[0x01]),                         // PDNType IPv4
            (79, &[0x01, 0x00, 0x00, 0x00, 0x00]), // PAA, address not yet assigned
            (127, &[0x00]),                        // APNRestriction
            (72, &[0x00, 0x00, 0x1F, 0x40, 0x00, 0x00, 0x2E, 0xE0]), // AMBR 8000/12000
            (
                78, // PCO: P-CSCF, DNS and MTU requests, all empty
                &[0x80, 0x00, 0x0C, 0x00, 0x00, 0x0D, 0x00, 0x00, 0x10, 0x00],
            ),
            (
                93, // BearerContext: EBI 5 plus a QoS
                &[
                    0x49, 0x00, 0x01, 0x00, 0x05, 0x50, 0x00, 0x16, 0x00, 0x6C, 0x09, 0x00, 0x00,
                    0x01, 0x86, 0xA0, 0x00, 0x00, 0x00, 0xC3, 0x50, 0x00, 0x00, 0x00, 0x00, 0x00,
                    0x00, 0x00, 0x00, 0x00, 0x00,
                ],
            ),
            (114, &[0x10, 0x00]),             // UETimeZone GMT+0:15
            (95, &[0x09, 0x00]),              // ChargingCharacteristics
            (3, &[0x11]),                     // Recovery 17
            (170, &[0xE9, 0x27, 0xD8, 0xD4]), // ULITimestamp
        ])
    }

    #[test]
    fn test_decode_packet_echo() {
        let decoder = Decoder::default();
        let record = decoder.decode_packet(capture_time(), &ECHO).unwrap();

        assert_eq!(record.timestamp, capture_time());
        assert_eq!(record.version, 2);
        assert!(!record.piggybacking_flag);
        assert!(!record.teid_flag);
        assert_eq!(record.teid, None);
        assert_eq!(record.message_type, 1);
        assert_eq!(record.message_length, 15);
        assert_eq!(record.sequence_number, 1);

        assert_eq!(record.ies.len(), 2);
        assert_eq!(record.ies[0].ie_type, "Recovery");
        assert_eq!(record.ies[0].value, Some(IeValue::Uint(42)));
        assert_eq!(record.ies[0].error, None);
        assert_eq!(record.ies[1].ie_type, "unknown_type_255");
        assert_eq!(record.ies[1].value, Some(IeValue::Text("0102".to_owned())));
    }

    #[test]
    fn test_decode_packet_isolates_ie_failures() {
        // A one-byte F-TEID cannot decode; the Recovery after it must.
        let data = [
            0x48, 0x20, 0x00, 0x12, 0x11, 0x22, 0x33, 0x44, 0x00, 0x01, 0x02, 0x00, // header
            0x57, 0x00, 0x01, 0x00, 0x8a, // truncated F-TEID
            0x03, 0x00, 0x01, 0x00, 0x2A, // Recovery 42
        ];
        let decoder = Decoder::default();
        let record = decoder.decode_packet(capture_time(), &data).unwrap();

        assert_eq!(record.teid, Some(0x1122_3344));
        assert!(record.teid_flag);
        assert_eq!(record.sequence_number, 258);

        assert_eq!(record.ies.len(), 2);
        assert_eq!(record.ies[0].ie_type, "F-TEID");
        assert_eq!(record.ies[0].value, None);
        assert_eq!(
            record.ies[0].error.as_deref(),
            Some("failed to decode F-TEID: insufficient data: needed 5 bytes, available 1")
        );
        assert_eq!(record.ies[1].ie_type, "Recovery");
        assert_eq!(record.ies[1].value, Some(IeValue::Uint(42)));
    }

    #[test]
    fn test_decode_packet_framing_error_is_fatal() {
        let decoder = Decoder::default();
        assert!(matches!(
            decoder.decode_packet(capture_time(), &[0x48, 0x20]),
            Err(FramingError::TooShort { .. })
        ));
    }

    #[test]
    fn test_decode_packet_mode_reaches_ies() {
        let data = [
            0x48, 0x21, 0x00, 0x0E, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, // header
            0x02, 0x00, 0x02, 0x00, 0x10, 0x00, // Cause 16
        ];
        let decoder = Decoder::new(FormatMode::Mixed);
        let record = decoder.decode_packet(capture_time(), &data).unwrap();
        match record.ies[0].value.as_ref().unwrap() {
            IeValue::Cause(cause) => assert_eq!(
                cause.cause_value,
                crate::FormatValue::Text("Request accepted (16)".to_owned())
            ),
            other => panic!("expected a Cause value, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_packet_json_shape() {
        let decoder = Decoder::default();
        let record = decoder.decode_packet(capture_time(), &ECHO).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["timestamp"], "2023-12-16T08:05:40Z");
        assert!(json.get("teid").is_none());
        assert_eq!(json["ies"][0]["type"], "Recovery");
        assert_eq!(json["ies"][0]["value"], 42);
        assert!(json["ies"][0].get("error").is_none());
        assert_eq!(json["ies"][1]["value"], "0102");
    }

    #[test]
    fn test_decode_create_session_request() {
        let decoder = Decoder::default();
        let record = decoder
            .decode_packet(capture_time(), &create_session_request())
            .unwrap();

        assert_eq!(record.message_type, 32);
        assert_eq!(record.message_length, 236);
        assert_eq!(record.teid, Some(0x1001));
        assert_eq!(record.sequence_number, 0x2a);

        let names: Vec<&str> = record.ies.iter().map(|ie| ie.ie_type.as_str()).collect();
        assert_eq!(
            names,
            [
                "IMSI",
                "MSISDN",
                "MEI",
                "ULI",
                "ServingNetwork",
                "RATType",
                "Indication",
                "F-TEID",
                "APN",
                "SelectionMode",
                "PDNType",
                "PAA",
                "APNRestriction",
                "AMBR",
                "PCO",
                "BearerContext",
                "UETimeZone",
                "ChargingCharacteristics",
                "Recovery",
                "ULITimestamp",
            ]
        );
        for ie in &record.ies {
            assert_eq!(ie.error, None, "{} failed to decode", ie.ie_type);
        }
    }

    #[test]
    fn test_create_session_request_values() {
        let decoder = Decoder::default();
        let record = decoder
            .decode_packet(capture_time(), &create_session_request())
            .unwrap();
        let json = serde_json::to_value(&record).unwrap();
        let ies = &json["ies"];

        assert_eq!(ies[0]["value"], "250102099917613");
        assert_eq!(ies[1]["value"], "7925983068705");
        assert_eq!(ies[2]["value"], "8656280530198456");
        assert_eq!(ies[3]["value"]["TAI"]["MCC"], "250");
        assert_eq!(ies[3]["value"]["TAI"]["TAC"], "2900");
        assert_eq!(ies[3]["value"]["ECGI"]["ECI"], "66921730");
        assert_eq!(ies[4]["value"]["MNC"], "35");
        assert_eq!(ies[5]["value"], 6);
        assert_eq!(ies[6]["value"]["DAF"], false);
        assert_eq!(ies[7]["value"]["InterfaceType"], 10);
        assert_eq!(ies[7]["value"]["TEID/GRE Key"], "3f0fed23");
        assert_eq!(ies[7]["value"]["F-TEID IPv4"], "217.148.48.234");
        assert_eq!(ies[8]["value"], "inet.ycc.ru.mnc035.mcc250.gprs");
        assert_eq!(ies[9]["value"], 0);
        assert_eq!(ies[10]["value"], 1);
        assert_eq!(ies[11]["value"]["pdnType"], 1);
        assert_eq!(ies[11]["value"]["ipv4"], "0.0.0.0");
        assert_eq!(ies[12]["value"], 0);
        assert_eq!(ies[13]["value"]["Uplink"], 8000);
        assert_eq!(ies[13]["value"]["Downlink"], 12000);
        assert_eq!(ies[14]["value"]["ConfigurationProtocol"], 128);
        assert_eq!(ies[14]["value"]["Options"][1]["ProtocolID"], 13);
        assert!(ies[14]["value"]["Options"][2]["ProtocolContents"].is_null());
        assert_eq!(ies[15]["value"]["EBI"], 5);
        assert_eq!(ies[15]["value"]["BearerQoS"]["QCI"], 9);
        assert_eq!(ies[15]["value"]["BearerQoS"]["PL"], 11);
        assert_eq!(ies[15]["value"]["BearerQoS"]["MBRUL"], 100_000);
        assert_eq!(ies[16]["value"]["TimeZone"], "GMT + 0 hours 15 minutes");
        assert_eq!(ies[16]["value"]["DST"], 0);
        assert_eq!(ies[17]["value"]["ChargingCharacteristic"], "0x0900");
        assert_eq!(ies[18]["value"], 17);
        assert_eq!(ies[19]["value"], "Dec 16, 2023 08:05:40 UTC");
    }

    #[test]
    fn test_create_session_request_short_length_cuts_last_ie() {
        // One byte off the declared length leaves the final IE hanging
        // over the region boundary.
        let mut data = create_session_request();
        let declared = u16::from_be_bytes([data[2], data[3]]) - 1;
        data[2..4].copy_from_slice(&declared.to_be_bytes());

        let decoder = Decoder::default();
        let err = decoder.decode_packet(capture_time(), &data).unwrap_err();
        assert_eq!(
            err,
            FramingError::TruncatedIe {
                ie_type: 170,
                offset: 232,
            }
        );
    }

    #[test]
    fn test_create_session_request_truncated_buffer() {
        let mut data = create_session_request();
        data.truncate(data.len() - 1);

        let decoder = Decoder::default();
        let err = decoder.decode_packet(capture_time(), &data).unwrap_err();
        assert_eq!(
            err,
            FramingError::TruncatedMessage {
                declared: 236,
                available: 239,
            }
        );
    }

    #[test]
    fn test_decoder_default_mode() {
        assert_eq!(Decoder::default().format(), FormatMode::Numeric);
        assert_eq!(Decoder::new(FormatMode::Text).format(), FormatMode::Text);
    }
}
