//! GTPv2-C decode error types
//!
//! Two layers of failure are kept apart: [`FramingError`] is fatal to a
//! whole message (the header or the IE walk is unusable), while
//! [`IeDecodeError`] is local to a single IE and leaves the rest of the
//! message intact. [`IeError`] attaches the canonical IE name to the
//! latter for reporting.

use thiserror::Error;

/// Fatal message-level errors from the header decoder and the IE walk
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FramingError {
    /// Buffer too short to hold the header
    #[error("message too short: needed {needed} bytes, available {available}")]
    TooShort { needed: usize, available: usize },

    /// Declared message length runs past the end of the buffer
    #[error("declared message length {declared} exceeds the buffer: available {available} bytes")]
    TruncatedMessage { declared: u16, available: usize },

    /// Declared message length cannot hold the mandatory header trailer
    #[error("declared message length {declared} cannot hold the TEID, sequence number and spare fields (minimum {minimum})")]
    InvalidLength { declared: u16, minimum: usize },

    /// A top-level IE runs past the declared message bounds
    #[error("IE type {ie_type} at offset {offset} is truncated by the declared message bounds")]
    TruncatedIe { ie_type: u8, offset: usize },

    /// Sequence number wider than the 24-bit wire field (encode only)
    #[error("sequence number {0} does not fit in 24 bits")]
    SequenceOutOfRange(u32),
}

/// Errors local to the content bytes of one IE
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IeDecodeError {
    /// Content too short for the fixed part of the IE
    #[error("insufficient data: needed {needed} bytes, available {available}")]
    Insufficient { needed: usize, available: usize },

    /// EPS bearer identity outside 1..=15
    #[error("invalid EBI value: {0}")]
    InvalidEbi(u8),

    /// PDN type code outside the defined range
    #[error("unknown PDN Type value: {0}")]
    UnknownPdnType(u8),

    /// Selection mode code outside the defined range
    #[error("unknown Selection Mode value: {0}")]
    UnknownSelectionMode(u8),

    /// APN restriction level outside the defined range
    #[error("unknown APN Restriction value: {0}")]
    UnknownApnRestriction(u8),

    /// An APN label length runs past the end of the content
    #[error("invalid APN label length: exceeds data length")]
    MalformedApn,

    /// A nested TLV element is cut off by its enclosing bounds
    #[error("truncated TLV element at offset {offset}")]
    TruncatedTlv { offset: usize },

    /// A named sub-structure is cut off
    #[error("not enough data for {0}")]
    TruncatedField(&'static str),

    /// Timestamp seconds outside the representable date range
    #[error("timestamp is outside the representable range")]
    TimestampOutOfRange,
}

/// A single-IE decode failure carrying the canonical IE name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to decode {name}: {source}")]
pub struct IeError {
    /// Canonical name of the IE that failed
    pub name: &'static str,
    /// Underlying content-level error
    #[source]
    pub source: IeDecodeError,
}
