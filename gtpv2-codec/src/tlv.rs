//! Bounded TLV walking
//!
//! One cursor serves every TLV stream in the protocol: the top-level IE
//! walk, the nested Bearer Context members and the PCO option list. The
//! layouts differ only in their headers, so the cursor is parameterized
//! by [`TlvLayout`] and never reads past the region it was given.

/// Header layout of a TLV region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TlvLayout {
    /// GTPv2 IE header: type (1 byte), length (2 bytes BE), instance
    /// byte (skipped)
    Gtp,
    /// PCO option header: protocol identifier (2 bytes BE), length
    /// (1 byte)
    Pco,
}

impl TlvLayout {
    fn header_len(self) -> usize {
        match self {
            TlvLayout::Gtp => 4,
            TlvLayout::Pco => 3,
        }
    }
}

/// One element of a TLV region, content still undecoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawTlv<'a> {
    /// Type code; at most 255 under the GTPv2 layout
    pub tag: u16,
    /// Offset of the element header relative to the region start
    pub offset: usize,
    /// Content window declared by the length field
    pub content: &'a [u8],
}

/// A truncated element: a partial header, or a length field running
/// past the region end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TlvError {
    /// Offset of the failed element relative to the region start
    pub offset: usize,
    /// Type code, when the header got far enough to carry one
    pub tag: Option<u16>,
}

/// Iterator over a bounded TLV region
///
/// Ending exactly at the region boundary is a clean stop; any trailing
/// partial element yields one `Err` and the iteration ends.
#[derive(Debug, Clone)]
pub(crate) struct TlvCursor<'a> {
    region: &'a [u8],
    pos: usize,
    layout: TlvLayout,
}

impl<'a> TlvCursor<'a> {
    pub fn new(region: &'a [u8], layout: TlvLayout) -> Self {
        TlvCursor {
            region,
            pos: 0,
            layout,
        }
    }
}

impl<'a> Iterator for TlvCursor<'a> {
    type Item = Result<RawTlv<'a>, TlvError>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.pos;
        let remaining = &self.region[self.pos..];
        if remaining.is_empty() {
            return None;
        }

        let header_len = self.layout.header_len();
        if remaining.len() < header_len {
            let tag = match self.layout {
                TlvLayout::Gtp => Some(u16::from(remaining[0])),
                TlvLayout::Pco if remaining.len() >= 2 => {
                    Some(u16::from_be_bytes([remaining[0], remaining[1]]))
                }
                TlvLayout::Pco => None,
            };
            self.pos = self.region.len();
            return Some(Err(TlvError { offset, tag }));
        }

        let (tag, len) = match self.layout {
            TlvLayout::Gtp => (
                u16::from(remaining[0]),
                usize::from(u16::from_be_bytes([remaining[1], remaining[2]])),
            ),
            TlvLayout::Pco => (
                u16::from_be_bytes([remaining[0], remaining[1]]),
                usize::from(remaining[2]),
            ),
        };

        let content_end = header_len + len;
        if content_end > remaining.len() {
            self.pos = self.region.len();
            return Some(Err(TlvError {
                offset,
                tag: Some(tag),
            }));
        }

        self.pos += content_end;
        Some(Ok(RawTlv {
            tag,
            offset,
            content: &remaining[header_len..content_end],
        }))
    }
}
