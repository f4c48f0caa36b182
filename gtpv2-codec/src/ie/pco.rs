//! Protocol Configuration Options decoding
//!
//! The PCO IE (3GPP TS 29.274 8.67, contents per TS 24.008 10.5.6.3)
//! is a configuration protocol byte followed by a TLV stream with
//! two-byte protocol identifiers. A handful of protocols get typed
//! contents; everything else falls back to a hex string.

use std::net::Ipv4Addr;

use bytes::Buf;
use serde::Serialize;

use crate::error::IeDecodeError;
use crate::format::{FormatMode, FormatValue};
use crate::tlv::{TlvCursor, TlvLayout};

/// Container protocol identifiers (3GPP TS 24.008 10.5.6.3)
fn protocol_description(protocol_id: u16) -> Option<&'static str> {
    let description = match protocol_id {
        0x0001 => "P-CSCF IPv6 Address",
        0x0002 => "IM CN Subsystem Signaling Flag",
        0x0003 => "DNS Server IPv6 Address",
        0x0004 => "Not Supported",
        0x0005 => "MS Support of Network Bearer Control indicator",
        0x0007 => "DSMIPv6 Home Agent Address Request",
        0x0008 => "DSMIPv6 Home Network Prefix Request",
        0x0009 => "DSMIPv6 IPv4 Home Agent Address Request",
        0x000A => "IP address allocation via NAS signalling",
        0x000B => "IPv4 address allocation via DHCPv4",
        0x000C => "P-CSCF IPv4 Address",
        0x000D => "DNS Server IPv4 Address",
        0x000E => "MSISDN Request",
        0x000F => "IFOM-Support-Request",
        0x0010 => "IPv4 Link MTU",
        0x0011 => "MS support of Local address in TFT indicator",
        0x0012 => "P-CSCF Re-selection support",
        0x0013 => "NBIFOM request indicator",
        0x0014 => "NBIFOM mode",
        0x0015 => "Non-IP Link MTU Request",
        0x0016 => "APN rate control support indicator",
        0x0017 => "3GPP PS data off UE status",
        0x0018 => "Reliable Data Service request indicator",
        0x0019 => "Additional APN rate control",
        0x001A => "PDU session ID",
        0x0020 => "Ethernet Frame Payload MTU Request",
        0x0021 => "Unstructured Link MTU Request",
        0x0022 => "5GSM cause value",
        0x0023 => "QoS rules",
        0x0024 => "QoS flow descriptions",
        0x0027 => "ACS information request",
        0x0030 => "ATSSS request",
        0x0031 => "DNS server security information indicator",
        0x0032 => "ECS configuration information",
        0x0036 => "PVS information request",
        0x0039 => "DNS server security protocol support",
        0x003A => "EAS rediscovery support indication",
        0x0041 => "Service-level-AA container",
        0x0047 => "EDC support indicator",
        0x004A => "MS support of MAC address range in 5GS indicator",
        0x0050 => "SDNAEPC support indicator",
        0x0051 => "SDNAEPC EAP message",
        0x0052 => "SDNAEPC DN-specific identity",
        0x0056 => "UE policy container",
        0x8021 => "IPCP",
        0xC021 => "LCP",
        0xC023 => "PAP",
        0xC223 => "CHAP",
        _ => return None,
    };
    Some(description)
}

fn bearer_control_mode_description(code: u8) -> Option<&'static str> {
    match code {
        1 => Some("MS only"),
        2 => Some("MS/NW"),
        _ => None,
    }
}

/// IPCP option types (RFC 1332, RFC 1877)
fn ipcp_option_description(option_type: u8) -> Option<&'static str> {
    let description = match option_type {
        1 => "IP Addresses",
        2 => "IP Compression Protocol",
        3 => "IP Address",
        129 => "Primary DNS Server IP Address",
        130 => "Primary NBNS Server IP Address",
        131 => "Secondary DNS Server IP Address",
        132 => "Secondary NBNS Server IP Address",
        _ => return None,
    };
    Some(description)
}

/// Splits off a length-prefixed field, one count byte then the bytes.
fn take_counted<'a>(rest: &mut &'a [u8], name: &'static str) -> Result<&'a [u8], IeDecodeError> {
    let size = *rest.first().ok_or(IeDecodeError::TruncatedField(name))? as usize;
    if rest.len() < 1 + size {
        return Err(IeDecodeError::TruncatedField(name));
    }
    let (head, tail) = rest[1..].split_at(size);
    *rest = tail;
    Ok(head)
}

/// An IPCP packet carried in a PCO container (RFC 1332)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ipcp {
    #[serde(rename = "Code")]
    pub code: u8,
    #[serde(rename = "Identifier")]
    pub identifier: u8,
    #[serde(rename = "Length")]
    pub length: u16,
    #[serde(rename = "Options")]
    pub options: Vec<IpcpOption>,
}

/// One IPCP configuration option
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpcpOption {
    #[serde(rename = "Type")]
    pub option_type: FormatValue,
    #[serde(rename = "Data")]
    pub data: String,
}

impl Ipcp {
    fn decode(content: &[u8], mode: FormatMode) -> Result<Self, IeDecodeError> {
        if content.len() < 4 {
            return Err(IeDecodeError::Insufficient {
                needed: 4,
                available: content.len(),
            });
        }

        let mut header = content;
        let code = header.get_u8();
        let identifier = header.get_u8();
        let length = header.get_u16();

        let mut options = Vec::new();
        let mut rest = &content[4..];
        while !rest.is_empty() {
            if rest.len() < 2 {
                return Err(IeDecodeError::Insufficient {
                    needed: 2,
                    available: rest.len(),
                });
            }
            let option_type = rest[0];
            // The option length covers its own two-byte header.
            let option_len = rest[1] as usize;
            if option_len < 2 || option_len > rest.len() {
                return Err(IeDecodeError::TruncatedField("IPCP option"));
            }
            let data = &rest[2..option_len];
            rest = &rest[option_len..];

            let data = match option_type {
                3 | 129..=132 => {
                    if data.len() < 4 {
                        return Err(IeDecodeError::TruncatedField("IPCP address"));
                    }
                    Ipv4Addr::new(data[0], data[1], data[2], data[3]).to_string()
                }
                _ => hex::encode(data),
            };
            let option_type = match ipcp_option_description(option_type) {
                Some(description) => FormatValue::render(mode, option_type, description),
                None => FormatValue::render(
                    mode,
                    option_type,
                    &format!("Unknown Option ({option_type})"),
                ),
            };
            options.push(IpcpOption { option_type, data });
        }

        Ok(Ipcp {
            code,
            identifier,
            length,
            options,
        })
    }
}

/// A PAP authenticate-request carried in a PCO container (RFC 1334)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pap {
    #[serde(rename = "Code")]
    pub code: u8,
    #[serde(rename = "Identifier")]
    pub identifier: u8,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Password")]
    pub password: String,
}

impl Pap {
    fn decode(content: &[u8]) -> Result<Self, IeDecodeError> {
        if content.len() < 4 {
            return Err(IeDecodeError::Insufficient {
                needed: 4,
                available: content.len(),
            });
        }
        let mut rest = &content[4..];
        let username = take_counted(&mut rest, "PAP username")?;
        let password = take_counted(&mut rest, "PAP password")?;
        Ok(Pap {
            code: content[0],
            identifier: content[1],
            username: String::from_utf8_lossy(username).into_owned(),
            password: String::from_utf8_lossy(password).into_owned(),
        })
    }
}

/// A CHAP packet carried in a PCO container (RFC 1994)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chap {
    #[serde(rename = "Code")]
    pub code: u8,
    #[serde(rename = "Identifier")]
    pub identifier: u8,
    /// Challenge or response value as lowercase hex
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "Name")]
    pub name: String,
}

impl Chap {
    fn decode(content: &[u8]) -> Result<Self, IeDecodeError> {
        if content.len() < 4 {
            return Err(IeDecodeError::Insufficient {
                needed: 4,
                available: content.len(),
            });
        }
        let mut rest = &content[4..];
        let value = take_counted(&mut rest, "CHAP value")?;
        Ok(Chap {
            code: content[0],
            identifier: content[1],
            value: hex::encode(value),
            name: String::from_utf8_lossy(rest).into_owned(),
        })
    }
}

/// Typed contents of one PCO container
///
/// The unit variant serializes as JSON null; request-form containers
/// are legitimately empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PcoContents {
    None,
    Address(Ipv4Addr),
    Mtu(u16),
    Mode(FormatValue),
    Ipcp(Ipcp),
    Pap(Pap),
    Chap(Chap),
    Raw(String),
}

fn decode_contents(
    protocol_id: u16,
    content: &[u8],
    mode: FormatMode,
) -> Result<PcoContents, IeDecodeError> {
    match protocol_id {
        // P-CSCF and DNS server IPv4 addresses
        0x000C | 0x000D => {
            if content.is_empty() {
                return Ok(PcoContents::None);
            }
            if content.len() < 4 {
                return Err(IeDecodeError::Insufficient {
                    needed: 4,
                    available: content.len(),
                });
            }
            Ok(PcoContents::Address(Ipv4Addr::new(
                content[0], content[1], content[2], content[3],
            )))
        }
        // IPv4 link MTU, a bare number in every mode
        0x0010 => {
            if content.is_empty() {
                return Ok(PcoContents::None);
            }
            if content.len() < 2 {
                return Err(IeDecodeError::Insufficient {
                    needed: 2,
                    available: content.len(),
                });
            }
            let mut content = content;
            Ok(PcoContents::Mtu(content.get_u16()))
        }
        // Network bearer control mode
        0x0005 => {
            let code = match content.first() {
                Some(&code) => code,
                None => return Ok(PcoContents::None),
            };
            let mode_value = match bearer_control_mode_description(code) {
                Some(description) => FormatValue::render(mode, code, description),
                None => FormatValue::render(
                    mode,
                    code,
                    &format!("Unknown Bearer Control Mode ({code})"),
                ),
            };
            Ok(PcoContents::Mode(mode_value))
        }
        0x8021 => Ok(PcoContents::Ipcp(Ipcp::decode(content, mode)?)),
        0xC023 => Ok(PcoContents::Pap(Pap::decode(content)?)),
        0xC223 => Ok(PcoContents::Chap(Chap::decode(content)?)),
        _ => {
            if content.is_empty() {
                Ok(PcoContents::None)
            } else {
                Ok(PcoContents::Raw(hex::encode(content)))
            }
        }
    }
}

/// One container from the PCO option list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PcoOption {
    #[serde(rename = "ProtocolID")]
    pub protocol_id: FormatValue,
    #[serde(rename = "ProtocolContents")]
    pub protocol_contents: PcoContents,
}

/// Protocol Configuration Options IE
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pco {
    /// Extension bit and configuration protocol, kept as the raw octet
    #[serde(rename = "ConfigurationProtocol")]
    pub configuration_protocol: u8,
    #[serde(rename = "Options")]
    pub options: Vec<PcoOption>,
}

impl Pco {
    pub fn decode(content: &[u8], mode: FormatMode) -> Result<Self, IeDecodeError> {
        if content.len() < 3 {
            return Err(IeDecodeError::Insufficient {
                needed: 3,
                available: content.len(),
            });
        }

        let configuration_protocol = content[0];
        let mut options = Vec::new();
        for element in TlvCursor::new(&content[1..], TlvLayout::Pco) {
            let element =
                element.map_err(|err| IeDecodeError::TruncatedTlv { offset: err.offset })?;
            let protocol_id = match protocol_description(element.tag) {
                Some(description) => FormatValue::render(mode, element.tag, description),
                None => FormatValue::render(
                    mode,
                    element.tag,
                    &format!("Unknown Protocol (0x{:04X})", element.tag),
                ),
            };
            options.push(PcoOption {
                protocol_id,
                protocol_contents: decode_contents(element.tag, element.content, mode)?,
            });
        }

        Ok(Pco {
            configuration_protocol,
            options,
        })
    }
}
