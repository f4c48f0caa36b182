//! GTPv2-C message header
//!
//! Wire layout per 3GPP TS 29.274 5.1: a flags byte (version,
//! piggybacking, TEID presence, message priority), the message type,
//! a 16-bit length covering everything after the first four bytes, an
//! optional 32-bit TEID, a 24-bit sequence number and a spare byte.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::FramingError;

/// Mandatory header prefix: flags, message type, length
pub const GTP2_MIN_HEADER_LEN: usize = 4;

/// Full header length with a TEID present
pub const GTP2_HEADER_LEN: usize = 12;

/// Full header length without a TEID
pub const GTP2_HEADER_LEN_NO_TEID: usize = 8;

/// Largest sequence number that fits the 24-bit wire field
pub const GTP2_MAX_SEQUENCE: u32 = 0x00FF_FFFF;

/// Decoded GTPv2-C header fields
///
/// The TEID is carried as an `Option`; its presence always mirrors the
/// T flag of the first header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gtp2Header {
    /// Protocol version from bits 7-5 of the flags byte
    pub version: u8,
    /// Piggybacking flag (bit 4): another message follows this one
    pub piggybacking: bool,
    /// Message priority bit (bit 2)
    pub message_priority: u8,
    /// Message type code
    pub message_type: u8,
    /// Declared length of everything after the first four bytes
    pub length: u16,
    /// Tunnel endpoint identifier, present iff the T flag is set
    pub teid: Option<u32>,
    /// 24-bit sequence number
    pub sequence_number: u32,
    /// Spare byte following the sequence number
    pub spare: u8,
}

impl Gtp2Header {
    /// Decode a header from the start of `buf`, consuming 8 or 12 bytes
    pub fn decode(buf: &mut Bytes) -> Result<Self, FramingError> {
        let available = buf.remaining();
        if available < GTP2_MIN_HEADER_LEN {
            return Err(FramingError::TooShort {
                needed: GTP2_MIN_HEADER_LEN,
                available,
            });
        }

        let flags = buf.get_u8();
        let version = (flags >> 5) & 0x07;
        let piggybacking = flags & 0x10 != 0;
        let has_teid = flags & 0x08 != 0;
        let message_priority = (flags >> 2) & 0x01;
        let message_type = buf.get_u8();
        let length = buf.get_u16();

        let needed = if has_teid {
            GTP2_HEADER_LEN
        } else {
            GTP2_HEADER_LEN_NO_TEID
        };
        if available < needed {
            return Err(FramingError::TooShort { needed, available });
        }

        let teid = if has_teid { Some(buf.get_u32()) } else { None };
        let seq_spare = buf.get_u32();

        Ok(Gtp2Header {
            version,
            piggybacking,
            message_priority,
            message_type,
            length,
            teid,
            sequence_number: seq_spare >> 8,
            spare: (seq_spare & 0xFF) as u8,
        })
    }

    /// Encode the header into `buf`
    pub fn encode(&self, buf: &mut BytesMut) -> Result<(), FramingError> {
        if self.sequence_number > GTP2_MAX_SEQUENCE {
            return Err(FramingError::SequenceOutOfRange(self.sequence_number));
        }

        buf.put_u8(self.flags());
        buf.put_u8(self.message_type);
        buf.put_u16(self.length);
        if let Some(teid) = self.teid {
            buf.put_u32(teid);
        }
        buf.put_u32((self.sequence_number << 8) | u32::from(self.spare));
        Ok(())
    }

    /// First header byte rebuilt from the decoded fields
    pub fn flags(&self) -> u8 {
        let mut flags = (self.version & 0x07) << 5;
        if self.piggybacking {
            flags |= 0x10;
        }
        if self.teid.is_some() {
            flags |= 0x08;
        }
        flags |= (self.message_priority & 0x01) << 2;
        flags
    }

    /// T flag: whether a TEID field is carried
    pub fn teid_flag(&self) -> bool {
        self.teid.is_some()
    }

    /// Header length on the wire, 12 with a TEID and 8 without
    pub fn header_len(&self) -> usize {
        if self.teid.is_some() {
            GTP2_HEADER_LEN
        } else {
            GTP2_HEADER_LEN_NO_TEID
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_with_teid() {
        // Create Session Request: version 2, T flag, TEID 0, seq 0x92f987
        let data = [
            0x48, 0x20, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x92, 0xf9, 0x87, 0x00,
        ];
        let mut buf = Bytes::copy_from_slice(&data);
        let header = Gtp2Header::decode(&mut buf).unwrap();
        assert_eq!(header.version, 2);
        assert!(!header.piggybacking);
        assert!(header.teid_flag());
        assert_eq!(header.message_priority, 0);
        assert_eq!(header.message_type, 0x20);
        assert_eq!(header.length, 0x0100);
        assert_eq!(header.teid, Some(0));
        assert_eq!(header.sequence_number, 0x92f987);
        assert_eq!(header.spare, 0);
        assert_eq!(header.header_len(), GTP2_HEADER_LEN);
    }

    #[test]
    fn test_decode_without_teid() {
        // Echo Request: version 2, no T flag
        let data = [0x40, 0x01, 0x00, 0x04, 0x00, 0x00, 0x2a, 0x00];
        let mut buf = Bytes::copy_from_slice(&data);
        let header = Gtp2Header::decode(&mut buf).unwrap();
        assert_eq!(header.version, 2);
        assert!(!header.teid_flag());
        assert_eq!(header.message_type, 1);
        assert_eq!(header.length, 4);
        assert_eq!(header.teid, None);
        assert_eq!(header.sequence_number, 0x00002a);
        assert_eq!(header.header_len(), GTP2_HEADER_LEN_NO_TEID);
    }

    #[test]
    fn test_decode_piggybacking_and_priority_bits() {
        let data = [
            0x5c, 0x22, 0x00, 0x08, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x01, 0x00,
        ];
        let mut buf = Bytes::copy_from_slice(&data);
        let header = Gtp2Header::decode(&mut buf).unwrap();
        assert!(header.piggybacking);
        assert!(header.teid_flag());
        assert_eq!(header.message_priority, 1);
        assert_eq!(header.flags(), 0x5c);
    }

    #[test]
    fn test_decode_too_short() {
        let mut buf = Bytes::copy_from_slice(&[0x48, 0x20]);
        let err = Gtp2Header::decode(&mut buf).unwrap_err();
        assert_eq!(
            err,
            FramingError::TooShort {
                needed: GTP2_MIN_HEADER_LEN,
                available: 2,
            }
        );
    }

    #[test]
    fn test_decode_too_short_for_teid() {
        // T flag set but only 8 bytes on hand
        let mut buf = Bytes::copy_from_slice(&[0x48, 0x20, 0x00, 0x08, 0x00, 0x00, 0x00, 0x01]);
        let err = Gtp2Header::decode(&mut buf).unwrap_err();
        assert_eq!(
            err,
            FramingError::TooShort {
                needed: GTP2_HEADER_LEN,
                available: 8,
            }
        );
    }

    #[test]
    fn test_encode_round_trip() {
        let header = Gtp2Header {
            version: 2,
            piggybacking: false,
            message_priority: 0,
            message_type: 0x21,
            length: 0x00f5,
            teid: Some(0x8a3f0fed),
            sequence_number: 0x92f987,
            spare: 0,
        };
        let mut buf = BytesMut::new();
        header.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), GTP2_HEADER_LEN);

        let mut bytes = buf.freeze();
        let decoded = Gtp2Header::decode(&mut bytes).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_encode_rejects_wide_sequence() {
        let header = Gtp2Header {
            version: 2,
            piggybacking: false,
            message_priority: 0,
            message_type: 1,
            length: 4,
            teid: None,
            sequence_number: 0x0100_0000,
            spare: 0,
        };
        let mut buf = BytesMut::new();
        assert_eq!(
            header.encode(&mut buf),
            Err(FramingError::SequenceOutOfRange(0x0100_0000))
        );
    }

    #[test]
    fn test_reencode_reproduces_header_bytes() {
        let data = [
            0x48, 0x22, 0x00, 0x3c, 0x00, 0x00, 0x10, 0x01, 0x00, 0x00, 0x02, 0x00,
        ];
        let mut buf = Bytes::copy_from_slice(&data);
        let header = Gtp2Header::decode(&mut buf).unwrap();

        let mut out = BytesMut::new();
        header.encode(&mut out).unwrap();
        assert_eq!(&out[..], &data[..]);
    }
}
