//! Message framing
//!
//! Splits one UDP payload into the decoded header and the ordered list
//! of raw top-level IEs. The IE walk is bounded by the length declared
//! in the header; trailing bytes past those bounds (piggybacked message,
//! capture slack) are ignored rather than rejected.

use bytes::Bytes;

use crate::error::FramingError;
use crate::header::{Gtp2Header, GTP2_MIN_HEADER_LEN};
use crate::tlv::{TlvCursor, TlvLayout};

/// One top-level IE: type code and content window, not yet decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawIe {
    /// IE type code from the element header
    pub ie_type: u8,
    /// Content bytes declared by the element length
    pub content: Bytes,
}

/// A framed GTPv2-C message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gtp2Message {
    /// Decoded header fields
    pub header: Gtp2Header,
    /// Raw IEs in wire order
    pub ies: Vec<RawIe>,
}

impl Gtp2Message {
    /// Frame one message from a byte buffer
    ///
    /// Fails on a header that does not fit, a declared length running
    /// past the buffer, or an IE cut off by the declared bounds. IE
    /// contents are shared slices of one copy of the input.
    pub fn decode(data: &[u8]) -> Result<Self, FramingError> {
        let payload = Bytes::copy_from_slice(data);
        let mut buf = payload.clone();
        let header = Gtp2Header::decode(&mut buf)?;

        let total = GTP2_MIN_HEADER_LEN + usize::from(header.length);
        if total > payload.len() {
            return Err(FramingError::TruncatedMessage {
                declared: header.length,
                available: payload.len(),
            });
        }

        // The declared length must cover the TEID, sequence number and
        // spare fields before any IE bytes.
        let trailer = header.header_len() - GTP2_MIN_HEADER_LEN;
        if usize::from(header.length) < trailer {
            return Err(FramingError::InvalidLength {
                declared: header.length,
                minimum: trailer,
            });
        }

        let ie_region = payload.slice(header.header_len()..total);
        let mut ies = Vec::new();
        for element in TlvCursor::new(&ie_region, TlvLayout::Gtp) {
            let element = element.map_err(|err| FramingError::TruncatedIe {
                ie_type: err.tag.unwrap_or(0) as u8,
                offset: header.header_len() + err.offset,
            })?;
            ies.push(RawIe {
                ie_type: element.tag as u8,
                content: ie_region.slice_ref(element.content),
            });
        }

        Ok(Gtp2Message { header, ies })
    }
}
