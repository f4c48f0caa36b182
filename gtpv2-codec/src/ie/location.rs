//! User Location Information and PLMN identity decoding
//!
//! The ULI IE (3GPP TS 29.274 8.21) is a flag byte followed by the
//! identities the flags announce, in flag-bit order. Serving Network
//! (8.18) reuses the bare PLMN identity.

use bytes::Buf;
use serde::Serialize;

use crate::error::IeDecodeError;

/// PLMN identity, swapped-nibble BCD over three octets
///
/// A filler nibble in the third MNC digit position marks a two-digit
/// MNC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MccMnc {
    #[serde(rename = "MCC")]
    pub mcc: String,
    #[serde(rename = "MNC")]
    pub mnc: String,
}

impl MccMnc {
    pub fn decode(content: &[u8]) -> Result<Self, IeDecodeError> {
        if content.len() < 3 {
            return Err(IeDecodeError::Insufficient {
                needed: 3,
                available: content.len(),
            });
        }

        let mcc = format!(
            "{}{}{}",
            content[0] & 0x0F,
            content[0] >> 4,
            content[1] & 0x0F
        );

        let mnc_digit1 = content[2] & 0x0F;
        let mnc_digit2 = (content[2] >> 4) & 0x0F;
        let mnc_digit3 = (content[1] >> 4) & 0x0F;
        let mnc = if mnc_digit3 == 0x0F {
            format!("{mnc_digit1}{mnc_digit2}")
        } else {
            format!("{mnc_digit1}{mnc_digit2}{mnc_digit3}")
        };

        Ok(MccMnc { mcc, mnc })
    }
}

/// Cell Global Identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cgi {
    #[serde(flatten)]
    pub mcc_mnc: MccMnc,
    #[serde(rename = "LAC")]
    pub lac: String,
    #[serde(rename = "CI")]
    pub ci: String,
}

impl Cgi {
    fn decode(content: &[u8]) -> Result<Self, IeDecodeError> {
        let mcc_mnc = MccMnc::decode(content)?;
        let mut tail = &content[3..];
        Ok(Cgi {
            mcc_mnc,
            lac: tail.get_u16().to_string(),
            ci: tail.get_u16().to_string(),
        })
    }
}

/// Service Area Identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sai {
    #[serde(flatten)]
    pub mcc_mnc: MccMnc,
    #[serde(rename = "LAC")]
    pub lac: String,
    #[serde(rename = "SAC")]
    pub sac: String,
}

impl Sai {
    fn decode(content: &[u8]) -> Result<Self, IeDecodeError> {
        let mcc_mnc = MccMnc::decode(content)?;
        let mut tail = &content[3..];
        Ok(Sai {
            mcc_mnc,
            lac: tail.get_u16().to_string(),
            sac: tail.get_u16().to_string(),
        })
    }
}

/// Routing Area Identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rai {
    #[serde(flatten)]
    pub mcc_mnc: MccMnc,
    #[serde(rename = "LAC")]
    pub lac: String,
    #[serde(rename = "RAC")]
    pub rac: String,
}

impl Rai {
    fn decode(content: &[u8]) -> Result<Self, IeDecodeError> {
        let mcc_mnc = MccMnc::decode(content)?;
        let mut tail = &content[3..];
        Ok(Rai {
            mcc_mnc,
            lac: tail.get_u16().to_string(),
            rac: tail.get_u16().to_string(),
        })
    }
}

/// Tracking Area Identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tai {
    #[serde(flatten)]
    pub mcc_mnc: MccMnc,
    #[serde(rename = "TAC")]
    pub tac: String,
}

impl Tai {
    fn decode(content: &[u8]) -> Result<Self, IeDecodeError> {
        let mcc_mnc = MccMnc::decode(content)?;
        let mut tail = &content[3..];
        Ok(Tai {
            mcc_mnc,
            tac: tail.get_u16().to_string(),
        })
    }
}

/// E-UTRAN Cell Global Identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ecgi {
    #[serde(flatten)]
    pub mcc_mnc: MccMnc,
    #[serde(rename = "ECI")]
    pub eci: String,
}

impl Ecgi {
    fn decode(content: &[u8]) -> Result<Self, IeDecodeError> {
        let mcc_mnc = MccMnc::decode(content)?;
        let mut tail = &content[3..];
        Ok(Ecgi {
            mcc_mnc,
            eci: tail.get_u32().to_string(),
        })
    }
}

/// Location Area Identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lai {
    #[serde(flatten)]
    pub mcc_mnc: MccMnc,
    #[serde(rename = "LAC")]
    pub lac: String,
}

impl Lai {
    fn decode(content: &[u8]) -> Result<Self, IeDecodeError> {
        let mcc_mnc = MccMnc::decode(content)?;
        let mut tail = &content[3..];
        Ok(Lai {
            mcc_mnc,
            lac: tail.get_u16().to_string(),
        })
    }
}

/// Macro eNodeB identity, 20 significant bits
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacroEnodebId {
    #[serde(flatten)]
    pub mcc_mnc: MccMnc,
    #[serde(rename = "MacroID")]
    pub macro_id: String,
}

impl MacroEnodebId {
    fn decode(content: &[u8]) -> Result<Self, IeDecodeError> {
        let mcc_mnc = MccMnc::decode(content)?;
        let mut tail = &content[3..];
        Ok(MacroEnodebId {
            mcc_mnc,
            macro_id: (tail.get_u32() & 0x000F_FFFF).to_string(),
        })
    }
}

/// Extended macro eNodeB identity, 21 significant bits
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtendedMacroEnodebId {
    #[serde(flatten)]
    pub mcc_mnc: MccMnc,
    #[serde(rename = "ExtendedID")]
    pub extended_id: String,
}

impl ExtendedMacroEnodebId {
    fn decode(content: &[u8]) -> Result<Self, IeDecodeError> {
        let mcc_mnc = MccMnc::decode(content)?;
        let mut tail = &content[3..];
        Ok(ExtendedMacroEnodebId {
            mcc_mnc,
            extended_id: (tail.get_u32() & 0x001F_FFFF).to_string(),
        })
    }
}

/// User Location Information IE (3GPP TS 29.274 8.21)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Uli {
    #[serde(rename = "CGI", skip_serializing_if = "Option::is_none")]
    pub cgi: Option<Cgi>,
    #[serde(rename = "SAI", skip_serializing_if = "Option::is_none")]
    pub sai: Option<Sai>,
    #[serde(rename = "RAI", skip_serializing_if = "Option::is_none")]
    pub rai: Option<Rai>,
    #[serde(rename = "TAI", skip_serializing_if = "Option::is_none")]
    pub tai: Option<Tai>,
    #[serde(rename = "ECGI", skip_serializing_if = "Option::is_none")]
    pub ecgi: Option<Ecgi>,
    #[serde(rename = "LAI", skip_serializing_if = "Option::is_none")]
    pub lai: Option<Lai>,
    #[serde(rename = "Macro_eNodebID", skip_serializing_if = "Option::is_none")]
    pub macro_enodeb_id: Option<MacroEnodebId>,
    #[serde(
        rename = "ExtendedMacroENodebID",
        skip_serializing_if = "Option::is_none"
    )]
    pub extended_macro_enodeb_id: Option<ExtendedMacroEnodebId>,
}

/// Splits off one fixed-width identity; a flagged identity with some
/// but not enough bytes is an error.
fn take_identity<'a>(
    rest: &mut &'a [u8],
    width: usize,
    name: &'static str,
) -> Result<&'a [u8], IeDecodeError> {
    if rest.len() < width {
        return Err(IeDecodeError::TruncatedField(name));
    }
    let (head, tail) = rest.split_at(width);
    *rest = tail;
    Ok(head)
}

impl Uli {
    /// Decode from the IE content
    ///
    /// A flag whose identity bytes are entirely absent is skipped, the
    /// way senders omit trailing identities.
    pub fn decode(content: &[u8]) -> Result<Self, IeDecodeError> {
        let flags = content.first().copied().ok_or(IeDecodeError::Insufficient {
            needed: 1,
            available: 0,
        })?;
        let mut rest = &content[1..];
        let mut uli = Uli::default();

        if flags & 0x01 != 0 && !rest.is_empty() {
            uli.cgi = Some(Cgi::decode(take_identity(&mut rest, 7, "CGI")?)?);
        }
        if flags & 0x02 != 0 && !rest.is_empty() {
            uli.sai = Some(Sai::decode(take_identity(&mut rest, 7, "SAI")?)?);
        }
        if flags & 0x04 != 0 && !rest.is_empty() {
            uli.rai = Some(Rai::decode(take_identity(&mut rest, 7, "RAI")?)?);
        }
        if flags & 0x08 != 0 && !rest.is_empty() {
            uli.tai = Some(Tai::decode(take_identity(&mut rest, 5, "TAI")?)?);
        }
        if flags & 0x10 != 0 && !rest.is_empty() {
            uli.ecgi = Some(Ecgi::decode(take_identity(&mut rest, 7, "ECGI")?)?);
        }
        if flags & 0x20 != 0 && !rest.is_empty() {
            uli.lai = Some(Lai::decode(take_identity(&mut rest, 5, "LAI")?)?);
        }
        if flags & 0x40 != 0 && !rest.is_empty() {
            uli.macro_enodeb_id = Some(MacroEnodebId::decode(take_identity(
                &mut rest,
                7,
                "Macro eNodeB ID",
            )?)?);
        }
        if flags & 0x80 != 0 && !rest.is_empty() {
            uli.extended_macro_enodeb_id = Some(ExtendedMacroEnodebId::decode(take_identity(
                &mut rest,
                7,
                "Extended Macro eNodeB ID",
            )?)?);
        }

        Ok(uli)
    }
}
