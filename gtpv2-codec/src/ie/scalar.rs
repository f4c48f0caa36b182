//! Single-value IEs
//!
//! BCD identity strings, the APN label join, plain counters and the
//! table-rendered single-byte enumerations.

use bytes::Buf;
use chrono::DateTime;
use serde::Serialize;

use crate::error::IeDecodeError;
use crate::format::{FormatMode, FormatValue};

/// Seconds between the NTP era (1900-01-01) and the Unix epoch
const NTP_UNIX_OFFSET_SECS: i64 = 2_208_988_800;

fn first_byte(content: &[u8]) -> Result<u8, IeDecodeError> {
    content.first().copied().ok_or(IeDecodeError::Insufficient {
        needed: 1,
        available: 0,
    })
}

/// Decode packed BCD digits, low nibble before high nibble
///
/// A 0xF filler nibble ends the whole sequence, so `[0x21, 0xf3]`
/// decodes to `"12"` followed by `"3"`. Shared by IMSI, MEI and MSISDN.
pub fn decode_bcd(content: &[u8]) -> String {
    let mut digits = String::with_capacity(content.len() * 2);
    for &byte in content {
        let low = byte & 0x0F;
        if low == 0x0F {
            break;
        }
        digits.push_str(&low.to_string());
        let high = (byte >> 4) & 0x0F;
        if high == 0x0F {
            break;
        }
        digits.push_str(&high.to_string());
    }
    digits
}

/// Decode the APN from DNS-style length-prefixed labels
///
/// `[0x04, "inet", 0x03, "ycc", ...]` joins to `"inet.ycc..."`.
pub fn decode_apn(content: &[u8]) -> Result<String, IeDecodeError> {
    if content.is_empty() {
        return Err(IeDecodeError::Insufficient {
            needed: 1,
            available: 0,
        });
    }

    let mut apn = String::new();
    let mut index = 0;
    while index < content.len() {
        let label_len = usize::from(content[index]);
        index += 1;
        let end = index + label_len;
        if end > content.len() {
            return Err(IeDecodeError::MalformedApn);
        }
        // No separator before the first written label.
        if !apn.is_empty() {
            apn.push('.');
        }
        apn.push_str(&String::from_utf8_lossy(&content[index..end]));
        index = end;
    }
    Ok(apn)
}

/// Decode the Recovery restart counter (3GPP TS 29.274 8.5)
pub fn decode_recovery(content: &[u8]) -> Result<u8, IeDecodeError> {
    first_byte(content)
}

/// Decode the EPS Bearer Identity from the low nibble (3GPP TS 29.274 8.8)
///
/// The high nibble is spare; a masked value of 0 is invalid.
pub fn decode_ebi(content: &[u8]) -> Result<u8, IeDecodeError> {
    let ebi = first_byte(content)? & 0x0F;
    if ebi < 1 {
        return Err(IeDecodeError::InvalidEbi(ebi));
    }
    Ok(ebi)
}

/// Aggregate Maximum Bit Rate in kbps (3GPP TS 29.274 8.7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ambr {
    #[serde(rename = "Uplink")]
    pub uplink: u32,
    #[serde(rename = "Downlink")]
    pub downlink: u32,
}

impl Ambr {
    pub fn decode(mut content: &[u8]) -> Result<Self, IeDecodeError> {
        if content.len() < 8 {
            return Err(IeDecodeError::Insufficient {
                needed: 8,
                available: content.len(),
            });
        }
        Ok(Ambr {
            uplink: content.get_u32(),
            downlink: content.get_u32(),
        })
    }
}

/// Charging Characteristics profile bits (3GPP TS 29.274 8.30)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChargingCharacteristics {
    /// First two content bytes as `0x`-prefixed lowercase hex
    #[serde(rename = "ChargingCharacteristic")]
    pub raw_value: String,
}

impl ChargingCharacteristics {
    pub fn decode(content: &[u8]) -> Result<Self, IeDecodeError> {
        if content.len() < 2 {
            return Err(IeDecodeError::Insufficient {
                needed: 2,
                available: content.len(),
            });
        }
        Ok(ChargingCharacteristics {
            raw_value: format!("0x{}", hex::encode(&content[..2])),
        })
    }
}

/// Decode the ULI Timestamp IE (3GPP TS 29.274 8.93)
///
/// Big-endian seconds since the NTP era (1900-01-01 00:00:00 UTC),
/// rendered as an English UTC timestamp like
/// `"Dec 16, 2023 08:05:40 UTC"`.
pub fn decode_uli_timestamp(content: &[u8]) -> Result<String, IeDecodeError> {
    if content.len() < 4 {
        return Err(IeDecodeError::Insufficient {
            needed: 4,
            available: content.len(),
        });
    }

    let seconds = u32::from_be_bytes([content[0], content[1], content[2], content[3]]);
    let stamp = DateTime::from_timestamp(i64::from(seconds) - NTP_UNIX_OFFSET_SECS, 0)
        .ok_or(IeDecodeError::TimestampOutOfRange)?;
    Ok(stamp.format("%b %-d, %Y %H:%M:%S UTC").to_string())
}

/// RAT Type descriptions (3GPP TS 29.274 8.17)
fn rat_type_description(code: u8) -> Option<&'static str> {
    let description = match code {
        1 => "UTRAN",
        2 => "GERAN",
        3 => "WLAN",
        4 => "GAN",
        5 => "HSPA Evolution",
        6 => "EUTRAN",
        7 => "Virtual",
        8 => "EUTRAN-NB-IoT",
        9 => "LTE-M",
        10 => "NR",
        11 => "WB-E-UTRAN(LEO)",
        12 => "WB-E-UTRAN(MEO)",
        13 => "WB-E-UTRAN(GEO)",
        14 => "WB-E-UTRAN(OTHERSAT)",
        15 => "EUTRAN-NB-IoT(LEO)",
        16 => "EUTRAN-NB-IoT(MEO)",
        17 => "EUTRAN-NB-IoT(GEO)",
        18 => "EUTRAN-NB-IoT(OTHERSAT)",
        19 => "LTE-M(LEO)",
        20 => "LTE-M(MEO)",
        21 => "LTE-M(GEO)",
        22 => "LTE-M(OTHERSAT)",
        _ => return None,
    };
    Some(description)
}

/// Decode the RAT Type IE (3GPP TS 29.274 8.17)
///
/// An out-of-table code yields the synthesized text in every mode
/// instead of an error.
pub fn decode_rat_type(content: &[u8], mode: FormatMode) -> Result<FormatValue, IeDecodeError> {
    let code = first_byte(content)?;
    match rat_type_description(code) {
        Some(description) => Ok(FormatValue::render(mode, code, description)),
        None => Ok(FormatValue::Text(format!("Unknown RAT Type ({code})"))),
    }
}

/// PDN Type descriptions (3GPP TS 29.274 8.34), shared with PAA
pub(crate) fn pdn_type_description(code: u8) -> Option<&'static str> {
    let description = match code {
        1 => "IPv4",
        2 => "IPv6",
        3 => "IPv4v6",
        4 => "Non-IP",
        5 => "Ethernet",
        _ => return None,
    };
    Some(description)
}

/// Decode the PDN Type IE (3GPP TS 29.274 8.34)
pub fn decode_pdn_type(content: &[u8], mode: FormatMode) -> Result<FormatValue, IeDecodeError> {
    let code = first_byte(content)?;
    let description = pdn_type_description(code).ok_or(IeDecodeError::UnknownPdnType(code))?;
    Ok(FormatValue::render(mode, code, description))
}

/// Selection Mode descriptions (3GPP TS 29.274 8.58)
fn selection_mode_description(code: u8) -> Option<&'static str> {
    let description = match code {
        0 => "MS or network provided APN, subscription verified",
        1 => "MS provided APN, subscription not verified",
        2 => "Network provided APN, subscription not verified",
        3 => "For future use (interpreted as 'Network provided APN, subscription not verified')",
        _ => return None,
    };
    Some(description)
}

/// Decode the Selection Mode IE (3GPP TS 29.274 8.58)
pub fn decode_selection_mode(
    content: &[u8],
    mode: FormatMode,
) -> Result<FormatValue, IeDecodeError> {
    let code = first_byte(content)?;
    let description =
        selection_mode_description(code).ok_or(IeDecodeError::UnknownSelectionMode(code))?;
    Ok(FormatValue::render(mode, code, description))
}

/// APN Restriction level descriptions (3GPP TS 29.274 8.57)
fn apn_restriction_description(code: u8) -> Option<&'static str> {
    let description = match code {
        0 => "No Existing Contexts or Restriction",
        1 => "Public-1",
        2 => "Public-2",
        3 => "Private-1",
        4 => "Private-2",
        _ => return None,
    };
    Some(description)
}

/// Decode the APN Restriction IE (3GPP TS 29.274 8.57)
pub fn decode_apn_restriction(
    content: &[u8],
    mode: FormatMode,
) -> Result<FormatValue, IeDecodeError> {
    let code = first_byte(content)?;
    let description =
        apn_restriction_description(code).ok_or(IeDecodeError::UnknownApnRestriction(code))?;
    Ok(FormatValue::render(mode, code, description))
}
