//! GTPv2-C message decoding
//!
//! Decodes GTP version 2 control-plane messages (3GPP TS 29.274) into
//! JSON-ready records: the header fields plus every information
//! element the decoder understands. Enumerated fields render numeric,
//! as description text, or as both, selected by [`FormatMode`].
//!
//! [`Decoder`] is the entry point. A framing problem fails the whole
//! message; a bad IE only fails its own slot in the record, and an IE
//! type the decoder has no table for passes through hex-encoded.

pub mod decoder;
pub mod error;
pub mod format;
pub mod header;
pub mod ie;
pub mod message;
pub mod record;

mod tlv;


pub use decoder::Decoder;
pub use error::{FramingError, IeDecodeError, IeError};
pub use format::{FormatMode, FormatValue};
pub use header::{
    Gtp2Header, GTP2_HEADER_LEN, GTP2_HEADER_LEN_NO_TEID, GTP2_MAX_SEQUENCE, GTP2_MIN_HEADER_LEN,
};
pub use ie::{DecodedIe, IeType, IeValue};
pub use message::{Gtp2Message, RawIe};
pub use record::{IeRecord, PacketRecord};

/// GTPv2-C UDP port (2123)
pub const GTPV2_C_UDP_PORT: u16 = 2123;
