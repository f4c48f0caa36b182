//! Fixed-layout composite IEs
//!
//! Cause, Indication, Bearer QoS, F-TEID, PAA and UE Time Zone: multi
//! field records decoded at fixed offsets, no nested TLV walking.

use std::net::{Ipv4Addr, Ipv6Addr};

use bytes::Buf;
use serde::Serialize;

use crate::error::IeDecodeError;
use crate::format::{FormatMode, FormatValue};
use crate::ie::scalar::pdn_type_description;

/// Cause descriptions (3GPP TS 29.274 8.4)
fn cause_description(code: u8) -> Option<&'static str> {
    let description = match code {
        2 => "Local Detach",
        3 => "Complete Detach",
        4 => "RAT changed from 3GPP to Non-3GPP",
        5 => "ISR deactivation",
        6 => "Error Indication received from RNC/eNodeB/S4-SGSN/MME",
        7 => "IMSI Detach Only",
        8 => "Reactivation Requested",
        9 => "PDN reconnection to this APN disallowed",
        10 => "Access changed from Non-3GPP to 3GPP",
        11 => "PDN connection inactivity timer expires",
        12 => "PGW not responding",
        13 => "Network Failure",
        14 => "QoS parameter mismatch",
        15 => "EPS to 5GS Mobility",
        16 => "Request accepted",
        17 => "Request accepted partially",
        18 => "New PDN type due to network preference",
        19 => "New PDN type due to single address bearer only",
        64 => "Context Not Found",
        65 => "Invalid Message Format",
        66 => "Version not supported by next peer",
        67 => "Invalid length",
        68 => "Service not supported",
        69 => "Mandatory IE incorrect",
        70 => "Mandatory IE missing",
        72 => "System failure",
        73 => "No resources available",
        74 => "Semantic error in the TFT operation",
        75 => "Syntactic error in the TFT operation",
        76 => "Semantic errors in packet filter(s)",
        77 => "Syntactic errors in packet filter(s)",
        78 => "Missing or unknown APN",
        80 => "GRE key not found",
        81 => "Relocation failure",
        82 => "Denied in RAT",
        83 => "Preferred PDN type not supported",
        84 => "All dynamic addresses are occupied",
        85 => "UE context without TFT already activated",
        86 => "Protocol type not supported",
        87 => "UE not responding",
        88 => "UE refuses",
        89 => "Service denied",
        90 => "Unable to page UE",
        91 => "No memory available",
        92 => "User authentication failed",
        93 => "APN access denied – no subscription",
        94 => "Request rejected (reason not specified)",
        95 => "P-TMSI Signature mismatch",
        96 => "IMSI/IMEI not known",
        97 => "Semantic error in the TAD operation",
        98 => "Syntactic error in the TAD operation",
        100 => "Remote peer not responding",
        101 => "Collision with network initiated request",
        102 => "Unable to page UE due to Suspension",
        103 => "Conditional IE missing",
        104 => "APN Restriction type Incompatible with currently active PDN connection",
        105 => "Invalid overall length of the triggered response message and a piggybacked initial message",
        106 => "Data forwarding not supported",
        107 => "Invalid reply from remote peer",
        108 => "Fallback to GTPv1",
        109 => "Invalid peer",
        110 => "Temporarily rejected due to handover/TAU/RAU procedure in progress",
        111 => "Modifications not limited to S1-U bearers",
        112 => "Request rejected for a PMIPv6 reason",
        113 => "APN Congestion",
        114 => "Bearer handling not supported",
        115 => "UE already re-attached",
        116 => "Multiple PDN connections for a given APN not allowed",
        117 => "Target access restricted for the subscriber",
        119 => "MME/SGSN refuses due to VPLMN Policy",
        120 => "GTP-C Entity Congestion",
        121 => "Late Overlapping Request",
        122 => "Timed out Request",
        123 => "UE is temporarily not reachable due to power saving",
        124 => "Relocation failure due to NAS message redirection",
        125 => "UE not authorised by OCS or external AAA Server",
        126 => "Multiple accesses to a PDN connection not allowed",
        127 => "Request rejected due to UE capability",
        128 => "S1-U Path Failure",
        129 => "5GC not allowed",
        130 => "PGW mismatch with network slice subscribed by the UE",
        131 => "Rejection due to paging restriction",
        _ => return None,
    };
    Some(description)
}

/// Cause IE (3GPP TS 29.274 8.4)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cause {
    /// Cause code rendered under the format policy
    #[serde(rename = "CauseValue")]
    pub cause_value: FormatValue,
    /// PDN Connection IE Error
    #[serde(rename = "PCE")]
    pub pce: bool,
    /// Bearer Context IE Error
    #[serde(rename = "BCE")]
    pub bce: bool,
    /// Cause Source bit
    #[serde(rename = "CS")]
    pub cs: u8,
}

impl Cause {
    /// Decode from the IE content; the flags byte is optional
    ///
    /// An out-of-table code substitutes a synthesized description and
    /// renders normally, it is not an error.
    pub fn decode(content: &[u8], mode: FormatMode) -> Result<Self, IeDecodeError> {
        let code = content.first().copied().ok_or(IeDecodeError::Insufficient {
            needed: 1,
            available: 0,
        })?;

        let mut pce = false;
        let mut bce = false;
        let mut cs = 0;
        if let Some(&flags) = content.get(1) {
            pce = flags & 0x04 != 0;
            bce = flags & 0x02 != 0;
            cs = flags & 0x01;
        }

        let cause_value = match cause_description(code) {
            Some(description) => FormatValue::render(mode, code, description),
            None => FormatValue::render(mode, code, &format!("Unknown Cause ({code})")),
        };
        Ok(Cause {
            cause_value,
            pce,
            bce,
            cs,
        })
    }
}

/// Indication flags (3GPP TS 29.274 8.12), first two octets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Indication {
    /// Dual Address Bearer Flag
    pub daf: bool,
    /// Direct Tunnel Flag
    pub dtf: bool,
    /// Handover Indication
    pub hi: bool,
    /// Direct Forwarding Indication
    pub dfi: bool,
    /// Operation Indication
    pub oi: bool,
    /// Idle mode Signalling Reduction Supported Indication
    pub isrsi: bool,
    /// Idle mode Signalling Reduction Activation Indication
    pub israi: bool,
    /// SGW Change Indication
    pub sgwci: bool,
    /// Subscribed QoS Change Indication
    pub sqci: bool,
    /// Unauthenticated IMSI
    pub uimsi: bool,
    /// Change F-TEID support indication
    pub cfsi: bool,
    /// Change Reporting support indication
    pub crsi: bool,
    /// Piggybacking Supported
    pub ps: bool,
    /// Protocol Type
    pub pt: bool,
    /// Scope Indication
    pub si: bool,
    /// MS Validated
    pub msv: bool,
}

impl Indication {
    pub fn decode(content: &[u8]) -> Result<Self, IeDecodeError> {
        if content.len() < 2 {
            return Err(IeDecodeError::Insufficient {
                needed: 2,
                available: content.len(),
            });
        }
        Ok(Indication {
            daf: content[0] & 0x80 != 0,
            dtf: content[0] & 0x40 != 0,
            hi: content[0] & 0x20 != 0,
            dfi: content[0] & 0x10 != 0,
            oi: content[0] & 0x08 != 0,
            isrsi: content[0] & 0x04 != 0,
            israi: content[0] & 0x02 != 0,
            sgwci: content[0] & 0x01 != 0,
            sqci: content[1] & 0x80 != 0,
            uimsi: content[1] & 0x40 != 0,
            cfsi: content[1] & 0x20 != 0,
            crsi: content[1] & 0x10 != 0,
            ps: content[1] & 0x08 != 0,
            pt: content[1] & 0x04 != 0,
            si: content[1] & 0x02 != 0,
            msv: content[1] & 0x01 != 0,
        })
    }
}

/// Bearer QoS IE (3GPP TS 29.274 8.15)
///
/// PCI and PVI are pre-emption *capability* and *vulnerability*: the
/// wire bit 1 means disabled, so both decode inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BearerQos {
    /// Pre-emption Capability
    #[serde(rename = "PCI")]
    pub pci: bool,
    /// Priority Level
    #[serde(rename = "PL")]
    pub pl: u8,
    /// Pre-emption Vulnerability
    #[serde(rename = "PVI")]
    pub pvi: bool,
    /// QoS Class Identifier
    #[serde(rename = "QCI")]
    pub qci: u8,
    /// Maximum bit rate uplink, kbps
    #[serde(rename = "MBRUL")]
    pub mbr_ul: u64,
    /// Maximum bit rate downlink, kbps
    #[serde(rename = "MBRDL")]
    pub mbr_dl: u64,
    /// Guaranteed bit rate uplink, kbps
    #[serde(rename = "GBRUL")]
    pub gbr_ul: u64,
    /// Guaranteed bit rate downlink, kbps
    #[serde(rename = "GBRDL")]
    pub gbr_dl: u64,
}

impl BearerQos {
    pub fn decode(content: &[u8]) -> Result<Self, IeDecodeError> {
        if content.len() < 22 {
            return Err(IeDecodeError::Insufficient {
                needed: 22,
                available: content.len(),
            });
        }

        let flags = content[0];
        let mut rates = &content[2..22];
        Ok(BearerQos {
            pci: flags & 0x40 == 0,
            pl: (flags >> 2) & 0x0F,
            pvi: flags & 0x01 == 0,
            qci: content[1],
            mbr_ul: rates.get_uint(5),
            mbr_dl: rates.get_uint(5),
            gbr_ul: rates.get_uint(5),
            gbr_dl: rates.get_uint(5),
        })
    }
}

/// F-TEID interface types (3GPP TS 29.274 8.22)
fn interface_type_description(code: u8) -> Option<&'static str> {
    let description = match code {
        0 => "S1-U eNodeB GTP-U interface",
        1 => "S1-U SGW GTP-U interface",
        2 => "S12 RNC GTP-U interface",
        3 => "S12 SGW GTP-U interface",
        4 => "S5/S8 SGW GTP-U interface",
        5 => "S5/S8 PGW GTP-U interface",
        6 => "S5/S8 SGW GTP-C interface",
        7 => "S5/S8 PGW GTP-C interface",
        8 => "S5/S8 SGW PMIPv6 interface",
        9 => "S5/S8 PGW PMIPv6 interface",
        10 => "S11 MME GTP-C interface",
        11 => "S11/S4 SGW GTP-C interface",
        12 => "S10/N26 MME GTP-C interface",
        13 => "S3 MME GTP-C interface",
        14 => "S3 SGSN GTP-C interface",
        15 => "S4 SGSN GTP-U interface",
        16 => "S4 SGW GTP-U interface",
        17 => "S4 SGSN GTP-C interface",
        18 => "S16 SGSN GTP-C interface",
        19 => "eNodeB/gNodeB GTP-U interface for DL data forwarding",
        20 => "eNodeB GTP-U interface for UL data forwarding",
        21 => "RNC GTP-U interface for data forwarding",
        22 => "SGSN GTP-U interface for data forwarding",
        23 => "SGW/UPF GTP-U interface for DL data forwarding",
        24 => "Sm MBMS GW GTP-C interface",
        25 => "Sn MBMS GW GTP-C interface",
        26 => "Sm MME GTP-C interface",
        27 => "Sn SGSN GTP-C interface",
        28 => "SGW GTP-U interface for UL data forwarding",
        29 => "Sn SGSN GTP-U interface",
        30 => "S2b ePDG GTP-C interface",
        31 => "S2b-U ePDG GTP-U interface",
        32 => "S2b PGW GTP-C interface",
        33 => "S2b-U PGW GTP-U interface",
        34 => "S2a TWAN GTP-U interface",
        35 => "S2a TWAN GTP-C interface",
        36 => "S2a PGW GTP-C interface",
        37 => "S2a PGW GTP-U interface",
        38 => "S11 MME GTP-U interface",
        39 => "S11 SGW GTP-U interface",
        40 => "N26 AMF GTP-C interface",
        41 => "N19mb UPF GTP-U interface",
        _ => return None,
    };
    Some(description)
}

/// F-TEID IE (3GPP TS 29.274 8.22)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FTeid {
    /// Interface type from the low six flag bits, format rendered
    #[serde(rename = "InterfaceType")]
    pub interface_type: FormatValue,
    /// TEID or GRE key as lowercase hex
    #[serde(rename = "TEID/GRE Key")]
    pub teid_gre_key: String,
    #[serde(rename = "F-TEID IPv4", skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<Ipv4Addr>,
    #[serde(rename = "F-TEID IPv6", skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<Ipv6Addr>,
}

impl FTeid {
    pub fn decode(content: &[u8], mode: FormatMode) -> Result<Self, IeDecodeError> {
        if content.len() < 5 {
            return Err(IeDecodeError::Insufficient {
                needed: 5,
                available: content.len(),
            });
        }

        let flags = content[0];
        let code = flags & 0x3F;
        let teid_gre_key = hex::encode(&content[1..5]);

        let mut index = 5;
        let ipv4 = if flags & 0x80 != 0 {
            if content.len() < index + 4 {
                return Err(IeDecodeError::TruncatedField("IPv4 address"));
            }
            let addr = Ipv4Addr::new(
                content[index],
                content[index + 1],
                content[index + 2],
                content[index + 3],
            );
            index += 4;
            Some(addr)
        } else {
            None
        };

        let ipv6 = if flags & 0x40 != 0 {
            if content.len() < index + 16 {
                return Err(IeDecodeError::TruncatedField("IPv6 address"));
            }
            let mut octets = [0u8; 16];
            octets.copy_from_slice(&content[index..index + 16]);
            Some(Ipv6Addr::from(octets))
        } else {
            None
        };

        let interface_type = match interface_type_description(code) {
            Some(description) => FormatValue::render(mode, code, description),
            None => FormatValue::render(mode, code, &format!("Unknown Interface Type ({code})")),
        };

        Ok(FTeid {
            interface_type,
            teid_gre_key,
            ipv4,
            ipv6,
        })
    }
}

/// PDN Address Allocation IE (3GPP TS 29.274 8.14)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paa {
    /// PDN type from the low three bits, format rendered
    #[serde(rename = "pdnType")]
    pub pdn_type: FormatValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<Ipv4Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<Ipv6Addr>,
}

impl Paa {
    pub fn decode(content: &[u8], mode: FormatMode) -> Result<Self, IeDecodeError> {
        let code = content.first().copied().ok_or(IeDecodeError::Insufficient {
            needed: 1,
            available: 0,
        })? & 0x07;
        let description = pdn_type_description(code).ok_or(IeDecodeError::UnknownPdnType(code))?;

        let mut index = 1;
        let ipv4 = if code == 0x01 || code == 0x03 {
            if content.len() < index + 4 {
                return Err(IeDecodeError::TruncatedField("IPv4 address"));
            }
            let addr = Ipv4Addr::new(
                content[index],
                content[index + 1],
                content[index + 2],
                content[index + 3],
            );
            index += 4;
            Some(addr)
        } else {
            None
        };

        let ipv6 = if code == 0x02 || code == 0x03 {
            if content.len() < index + 16 {
                return Err(IeDecodeError::TruncatedField("IPv6 address"));
            }
            let mut octets = [0u8; 16];
            octets.copy_from_slice(&content[index..index + 16]);
            Some(Ipv6Addr::from(octets))
        } else {
            None
        };

        Ok(Paa {
            pdn_type: FormatValue::render(mode, code, description),
            ipv4,
            ipv6,
        })
    }
}

/// DST adjustment descriptions (3GPP TS 23.040)
fn dst_description(code: u8) -> &'static str {
    match code {
        0 => "No adjustment for Daylight Saving Time",
        1 => "+1 hour adjustment for Daylight Saving Time",
        2 => "+2 hours adjustment for Daylight Saving Time",
        3 => "Reserved",
        _ => "Unknown adjustment",
    }
}

/// UE Time Zone IE (3GPP TS 29.274 8.44)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UeTimeZone {
    /// GMT offset text, quarter-hour resolution
    #[serde(rename = "TimeZone")]
    pub time_zone: String,
    /// DST adjustment, format rendered
    #[serde(rename = "DST")]
    pub dst: FormatValue,
}

impl UeTimeZone {
    pub fn decode(content: &[u8], mode: FormatMode) -> Result<Self, IeDecodeError> {
        if content.len() < 2 {
            return Err(IeDecodeError::Insufficient {
                needed: 2,
                available: content.len(),
            });
        }

        let tz = content[0];
        let dst_code = content[1] & 0x03;

        let sign = if tz & 0x08 != 0 { '-' } else { '+' };
        // Swapped-nibble BCD quarters of an hour.
        let quarters = ((tz & 0x70) >> 4) + (tz & 0x07) * 10;
        let hours = quarters / 4;
        let minutes = (quarters % 4) * 15;

        Ok(UeTimeZone {
            time_zone: format!("GMT {sign} {hours} hours {minutes} minutes"),
            dst: FormatValue::render(mode, dst_code, dst_description(dst_code)),
        })
    }
}
