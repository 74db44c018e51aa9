// OGG container support
//
// OGG Page Layout:
// - Capture Pattern: "OggS" (4 bytes)
// - Version: 0 (1 byte)
// - Header Type: 1=continuation, 2=bos, 4=eos (1 byte)
// - Granule Position (8 bytes, little-endian)
// - Bitstream Serial Number (4 bytes, little-endian)
// - Page Sequence Number (4 bytes, little-endian)
// - CRC Checksum (4 bytes, little-endian)
// - Number of Page Segments (1 byte)
// - Segment Table (lace values, one byte each)
// - Segment data
//
// Reference: RFC 3533, https://xiph.org/ogg/doc/framing.html

pub mod crc;
pub mod packet;
pub mod page;
pub mod sync;

pub use packet::{PacketReader, PageLayout, Reassembly, StreamSelection};
pub use page::{ChecksumMode, Page, PageHeader};
pub use sync::PageReader;

// OGG signature
pub const OGG_SIGNATURE: &[u8; 4] = b"OggS";

// OGG page header types
pub const OGG_HEADER_TYPE_CONTINUATION: u8 = 0x01;
pub const OGG_HEADER_TYPE_BOS: u8 = 0x02; // Beginning of Stream
pub const OGG_HEADER_TYPE_EOS: u8 = 0x04; // End of Stream

/// Lace value signalling that the packet continues in the next segment
pub const MAX_LACE_VALUE: u8 = 255;

/// Fixed header length including the capture pattern
pub const OGG_HEADER_LEN: usize = 27;

/// Offset of the checksum field inside a serialized page
pub(crate) const OGG_CRC_OFFSET: usize = 22;
