//! Information element decoding
//!
//! Each IE this decoder understands has a type code, a canonical name
//! used as the record key, and a content decoder. Unknown type codes
//! are not an error; they pass through as hex so capture tooling never
//! goes blind on a new IE.

pub mod composite;
pub mod container;
pub mod location;
pub mod pco;
pub mod scalar;

use serde::Serialize;

pub use composite::{BearerQos, Cause, FTeid, Indication, Paa, UeTimeZone};
pub use container::BearerContext;
pub use location::{
    Cgi, Ecgi, ExtendedMacroEnodebId, Lai, MacroEnodebId, MccMnc, Rai, Sai, Tai, Uli,
};
pub use pco::{Chap, Ipcp, IpcpOption, Pap, Pco, PcoContents, PcoOption};
pub use scalar::{Ambr, ChargingCharacteristics};

use crate::error::{IeDecodeError, IeError};
use crate::format::{FormatMode, FormatValue};

/// IE type codes this decoder understands (3GPP TS 29.274 8.1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum IeType {
    Imsi = 1,
    Cause = 2,
    Recovery = 3,
    Apn = 71,
    Ambr = 72,
    Ebi = 73,
    Mei = 75,
    Msisdn = 76,
    Indication = 77,
    Pco = 78,
    Paa = 79,
    BearerQos = 80,
    RatType = 82,
    ServingNetwork = 83,
    Uli = 86,
    FTeid = 87,
    BearerContext = 93,
    ChargingCharacteristics = 95,
    PdnType = 99,
    UeTimeZone = 114,
    ApnRestriction = 127,
    SelectionMode = 128,
    UliTimestamp = 170,
}

impl IeType {
    /// Canonical IE name, used as the key in decoded records
    pub fn name(&self) -> &'static str {
        match self {
            IeType::Imsi => "IMSI",
            IeType::Cause => "Cause",
            IeType::Recovery => "Recovery",
            IeType::Apn => "APN",
            IeType::Ambr => "AMBR",
            IeType::Ebi => "EBI",
            IeType::Mei => "MEI",
            IeType::Msisdn => "MSISDN",
            IeType::Indication => "Indication",
            IeType::Pco => "PCO",
            IeType::Paa => "PAA",
            IeType::BearerQos => "BearerQoS",
            IeType::RatType => "RATType",
            IeType::ServingNetwork => "ServingNetwork",
            IeType::Uli => "ULI",
            IeType::FTeid => "F-TEID",
            IeType::BearerContext => "BearerContext",
            IeType::ChargingCharacteristics => "ChargingCharacteristics",
            IeType::PdnType => "PDNType",
            IeType::UeTimeZone => "UETimeZone",
            IeType::ApnRestriction => "APNRestriction",
            IeType::SelectionMode => "SelectionMode",
            IeType::UliTimestamp => "ULITimestamp",
        }
    }
}

impl TryFrom<u8> for IeType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(IeType::Imsi),
            2 => Ok(IeType::Cause),
            3 => Ok(IeType::Recovery),
            71 => Ok(IeType::Apn),
            72 => Ok(IeType::Ambr),
            73 => Ok(IeType::Ebi),
            75 => Ok(IeType::Mei),
            76 => Ok(IeType::Msisdn),
            77 => Ok(IeType::Indication),
            78 => Ok(IeType::Pco),
            79 => Ok(IeType::Paa),
            80 => Ok(IeType::BearerQos),
            82 => Ok(IeType::RatType),
            83 => Ok(IeType::ServingNetwork),
            86 => Ok(IeType::Uli),
            87 => Ok(IeType::FTeid),
            93 => Ok(IeType::BearerContext),
            95 => Ok(IeType::ChargingCharacteristics),
            99 => Ok(IeType::PdnType),
            114 => Ok(IeType::UeTimeZone),
            127 => Ok(IeType::ApnRestriction),
            128 => Ok(IeType::SelectionMode),
            170 => Ok(IeType::UliTimestamp),
            other => Err(other),
        }
    }
}

/// Decoded value of one IE, shaped for JSON output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IeValue {
    Text(String),
    Uint(u64),
    Enumerated(FormatValue),
    Cause(Cause),
    Ambr(Ambr),
    Indication(Indication),
    BearerQos(BearerQos),
    FTeid(FTeid),
    Paa(Paa),
    UeTimeZone(UeTimeZone),
    ChargingCharacteristics(ChargingCharacteristics),
    ServingNetwork(MccMnc),
    Uli(Uli),
    BearerContext(BearerContext),
    Pco(Pco),
}

/// One decoded IE, the record key and its value
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedIe {
    pub name: String,
    pub value: IeValue,
}

/// Decodes one IE content under `mode`.
///
/// Unknown type codes come back as an `unknown_type_{n}` entry with
/// the content hex-encoded. A decode failure on a known type carries
/// the canonical name for the caller's error report.
pub(crate) fn decode(
    mode: FormatMode,
    ie_type: u8,
    content: &[u8],
) -> Result<DecodedIe, IeError> {
    let known = match IeType::try_from(ie_type) {
        Ok(known) => known,
        Err(code) => {
            return Ok(DecodedIe {
                name: format!("unknown_type_{code}"),
                value: IeValue::Text(hex::encode(content)),
            })
        }
    };

    let value = decode_known(known, mode, content).map_err(|source| IeError {
        name: known.name(),
        source,
    })?;
    Ok(DecodedIe {
        name: known.name().to_owned(),
        value,
    })
}

fn decode_known(
    known: IeType,
    mode: FormatMode,
    content: &[u8],
) -> Result<IeValue, IeDecodeError> {
    let value = match known {
        IeType::Imsi | IeType::Mei | IeType::Msisdn => IeValue::Text(scalar::decode_bcd(content)),
        IeType::Cause => IeValue::Cause(Cause::decode(content, mode)?),
        IeType::Recovery => IeValue::Uint(scalar::decode_recovery(content)?.into()),
        IeType::Apn => IeValue::Text(scalar::decode_apn(content)?),
        IeType::Ambr => IeValue::Ambr(Ambr::decode(content)?),
        IeType::Ebi => IeValue::Uint(scalar::decode_ebi(content)?.into()),
        IeType::Indication => IeValue::Indication(Indication::decode(content)?),
        IeType::Pco => IeValue::Pco(Pco::decode(content, mode)?),
        IeType::Paa => IeValue::Paa(Paa::decode(content, mode)?),
        IeType::BearerQos => IeValue::BearerQos(BearerQos::decode(content)?),
        IeType::RatType => IeValue::Enumerated(scalar::decode_rat_type(content, mode)?),
        IeType::ServingNetwork => IeValue::ServingNetwork(MccMnc::decode(content)?),
        IeType::Uli => IeValue::Uli(Uli::decode(content)?),
        IeType::FTeid => IeValue::FTeid(FTeid::decode(content, mode)?),
        IeType::BearerContext => IeValue::BearerContext(BearerContext::decode(content, mode)?),
        IeType::ChargingCharacteristics => {
            IeValue::ChargingCharacteristics(ChargingCharacteristics::decode(content)?)
        }
        IeType::PdnType => IeValue::Enumerated(scalar::decode_pdn_type(content, mode)?),
        IeType::UeTimeZone => IeValue::UeTimeZone(UeTimeZone::decode(content, mode)?),
        IeType::ApnRestriction => {
            IeValue::Enumerated(scalar::decode_apn_restriction(content, mode)?)
        }
        IeType::SelectionMode => {
            IeValue::Enumerated(scalar::decode_selection_mode(content, mode)?)
        }
        IeType::UliTimestamp => IeValue::Text(scalar::decode_uli_timestamp(content)?),
    };
    Ok(value)
}
