//! Decoded packet records, the JSON output shape

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ie::IeValue;

/// One IE slot in a packet record
///
/// A failed IE keeps its slot: `value` serializes as JSON null and
/// `error` says why, so one bad IE never hides the rest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IeRecord {
    #[serde(rename = "type")]
    pub ie_type: String,
    pub value: Option<IeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A fully decoded message with its capture timestamp
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PacketRecord {
    pub timestamp: DateTime<Utc>,
    pub version: u8,
    #[serde(rename = "piggybackingFlag")]
    pub piggybacking_flag: bool,
    #[serde(rename = "teidFlag")]
    pub teid_flag: bool,
    #[serde(rename = "messagePriority")]
    pub message_priority: u8,
    #[serde(rename = "messageType")]
    pub message_type: u8,
    #[serde(rename = "messageLength")]
    pub message_length: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teid: Option<u32>,
    #[serde(rename = "sequenceNumber")]
    pub sequence_number: u32,
    pub spare: u8,
    pub ies: Vec<IeRecord>,
}
