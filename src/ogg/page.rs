use std::io::{ErrorKind, Read};

use crate::error::{Error, Result};
use crate::ogg::{
    crc, MAX_LACE_VALUE, OGG_CRC_OFFSET, OGG_HEADER_LEN, OGG_HEADER_TYPE_BOS,
    OGG_HEADER_TYPE_CONTINUATION, OGG_HEADER_TYPE_EOS, OGG_SIGNATURE,
};
use crate::utils::io::ByteSource;

/// How the checksum field is filled when a page is serialized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumMode {
    /// Compute the CRC over the serialized page
    #[default]
    Recompute,
    /// Write the checksum stored in the header
    Preserve,
    /// Write 0 (legacy compatibility)
    Zero,
}

/// OGG Page Header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    pub version: u8,
    pub header_type: u8,
    pub granule_position: u64,
    pub bitstream_serial: u32,
    pub page_sequence: u32,
    pub crc: u32,
}

/// OGG Page
///
/// `packets` holds the packet data found on the page. When the page
/// carries the continuation flag, the first entry is the tail of a
/// packet begun on an earlier page. When `last_partial` is set the final
/// entry continues on the next page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub header: PageHeader,
    pub packets: Vec<Vec<u8>>,
    pub last_partial: bool,
}

impl PageHeader {
    pub fn new(header_type: u8, granule_position: u64, bitstream_serial: u32, page_sequence: u32) -> Self {
        PageHeader {
            version: 0,
            header_type,
            granule_position,
            bitstream_serial,
            page_sequence,
            crc: 0,
        }
    }

    pub fn is_continued(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_CONTINUATION != 0
    }

    /// Check if this is the beginning of a stream
    pub fn is_bos(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_BOS != 0
    }

    /// Check if this is the end of a stream
    pub fn is_eos(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_EOS != 0
    }
}

impl Page {
    pub fn new(header: PageHeader, packets: Vec<Vec<u8>>, last_partial: bool) -> Self {
        Page {
            header,
            packets,
            last_partial,
        }
    }

    /// Parse one page whose capture pattern has already been consumed.
    ///
    /// `offset` is the position of the capture pattern and is reported in errors.
    pub fn parse<R: Read>(source: &mut ByteSource<R>, offset: u64) -> Result<Self> {
        let eof = |e: std::io::Error| {
            if e.kind() == ErrorKind::UnexpectedEof {
                Error::CorruptPage { offset }
            } else {
                Error::Io(e)
            }
        };

        let version = source.read_u8().map_err(eof)?;
        if version != 0 {
            return Err(Error::UnsupportedVersion { version, offset });
        }

        let header_type = source.read_u8().map_err(eof)?;
        let granule_position = source.read_le_u64().map_err(eof)?;
        let bitstream_serial = source.read_le_u32().map_err(eof)?;
        let page_sequence = source.read_le_u32().map_err(eof)?;
        let crc = source.read_le_u32().map_err(eof)?;
        let segment_count = source.read_u8().map_err(eof)?;
        let segment_table = source.read_bytes(segment_count as usize).map_err(eof)?;

        let mut packets = Vec::new();
        let mut packet_len = 0usize;
        for &lace in &segment_table {
            packet_len += lace as usize;
            if lace < MAX_LACE_VALUE {
                packets.push(source.read_bytes(packet_len).map_err(eof)?);
                packet_len = 0;
            }
        }
        let last_partial = packet_len != 0;
        if last_partial {
            packets.push(source.read_bytes(packet_len).map_err(eof)?);
        }

        Ok(Page {
            header: PageHeader {
                version,
                header_type,
                granule_position,
                bitstream_serial,
                page_sequence,
                crc,
            },
            packets,
            last_partial,
        })
    }

    /// True when the last packet ends on this page
    pub fn is_complete(&self) -> bool {
        !self.last_partial
    }

    /// Total payload size
    pub fn data_size(&self) -> usize {
        self.packets.iter().map(Vec::len).sum()
    }

    /// Lace values describing `packets`
    pub fn segment_table(&self) -> Result<Vec<u8>> {
        let mut table = Vec::new();
        let last = self.packets.len().saturating_sub(1);
        for (i, packet) in self.packets.iter().enumerate() {
            let partial = self.last_partial && i == last;
            if partial && packet.len() % MAX_LACE_VALUE as usize != 0 {
                return Err(Error::InvalidPageLayout(format!(
                    "partial packet of {} bytes is not a multiple of 255",
                    packet.len()
                )));
            }
            table.extend(lacing(packet.len(), partial));
        }
        if table.len() > u8::MAX as usize {
            return Err(Error::InvalidPageLayout(format!(
                "{} segments do not fit in one page",
                table.len()
            )));
        }
        Ok(table)
    }

    /// Serialize the page, filling the checksum according to `mode`
    pub fn to_bytes(&self, mode: ChecksumMode) -> Result<Vec<u8>> {
        let table = self.segment_table()?;
        let mut out = Vec::with_capacity(OGG_HEADER_LEN + table.len() + self.data_size());

        out.extend_from_slice(OGG_SIGNATURE);
        out.push(self.header.version);
        out.push(self.header.header_type);
        out.extend_from_slice(&self.header.granule_position.to_le_bytes());
        out.extend_from_slice(&self.header.bitstream_serial.to_le_bytes());
        out.extend_from_slice(&self.header.page_sequence.to_le_bytes());
        out.extend_from_slice(&[0u8; 4]);
        out.push(table.len() as u8);
        out.extend_from_slice(&table);
        for packet in &self.packets {
            out.extend_from_slice(packet);
        }

        let checksum = match mode {
            ChecksumMode::Recompute => crc::page_checksum(&out),
            ChecksumMode::Preserve => self.header.crc,
            ChecksumMode::Zero => 0,
        };
        out[OGG_CRC_OFFSET..OGG_CRC_OFFSET + 4].copy_from_slice(&checksum.to_le_bytes());
        Ok(out)
    }
}

/// Lace values for a packet (or packet fragment) of `len` bytes.
///
/// A terminated packet always ends with a value below 255, so lengths that
/// are a multiple of 255 get a trailing 0. A partial fragment is 255s only.
pub fn lacing(len: usize, partial: bool) -> Vec<u8> {
    let full = len / MAX_LACE_VALUE as usize;
    let mut table = vec![MAX_LACE_VALUE; full];
    if !partial {
        table.push((len % MAX_LACE_VALUE as usize) as u8);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse_bytes(bytes: &[u8]) -> Result<Page> {
        assert_eq!(&bytes[..4], OGG_SIGNATURE);
        let mut source = ByteSource::new(Cursor::new(&bytes[4..]));
        Page::parse(&mut source, 0)
    }

    #[test]
    fn lacing_boundaries() {
        assert_eq!(lacing(254, false), vec![254]);
        assert_eq!(lacing(255, false), vec![255, 0]);
        assert_eq!(lacing(510, false), vec![255, 255, 0]);
        assert_eq!(lacing(0, false), vec![0]);
        assert_eq!(lacing(510, true), vec![255, 255]);
    }

    #[test]
    fn serialize_then_parse_keeps_fields() {
        let header = PageHeader::new(OGG_HEADER_TYPE_EOS, 960, 7, 3);
        let page = Page::new(header, vec![b"abc".to_vec(), vec![9u8; 255]], false);
        let bytes = page.to_bytes(ChecksumMode::Recompute).unwrap();

        // segment count + table: 3, then 255 0
        assert_eq!(bytes[26], 3);
        assert_eq!(&bytes[27..30], &[3, 255, 0]);

        let parsed = parse_bytes(&bytes).unwrap();
        assert_eq!(parsed.header.granule_position, 960);
        assert_eq!(parsed.header.bitstream_serial, 7);
        assert_eq!(parsed.header.page_sequence, 3);
        assert!(parsed.header.is_eos());
        assert_eq!(parsed.packets, page.packets);
        assert!(parsed.is_complete());
        assert_eq!(parsed.header.crc, crc::page_checksum(&bytes));
    }

    #[test]
    fn trailing_255_segments_form_partial_packet() {
        let header = PageHeader::new(0, 0, 1, 0);
        let page = Page::new(header, vec![vec![1], vec![2u8; 510]], true);
        let bytes = page.to_bytes(ChecksumMode::Zero).unwrap();
        assert_eq!(&bytes[22..26], &[0, 0, 0, 0]);

        let parsed = parse_bytes(&bytes).unwrap();
        assert!(parsed.last_partial);
        assert_eq!(parsed.packets.len(), 2);
        assert_eq!(parsed.packets[1].len(), 510);
    }

    #[test]
    fn preserve_mode_writes_stored_checksum() {
        let mut header = PageHeader::new(OGG_HEADER_TYPE_BOS, 0, 1, 0);
        header.crc = 0x0102_0304;
        let bytes = Page::new(header, vec![b"x".to_vec()], false)
            .to_bytes(ChecksumMode::Preserve)
            .unwrap();
        assert_eq!(&bytes[22..26], &[4, 3, 2, 1]);
    }

    #[test]
    fn rejects_nonzero_version() {
        let mut bytes = Page::new(PageHeader::new(0, 0, 1, 0), vec![], false)
            .to_bytes(ChecksumMode::Recompute)
            .unwrap();
        bytes[4] = 1;
        assert!(matches!(
            parse_bytes(&bytes),
            Err(Error::UnsupportedVersion { version: 1, offset: 0 })
        ));
    }

    #[test]
    fn truncated_body_is_corrupt_page() {
        let bytes = Page::new(PageHeader::new(0, 0, 1, 0), vec![vec![5u8; 100]], false)
            .to_bytes(ChecksumMode::Recompute)
            .unwrap();
        let cut = &bytes[..bytes.len() - 10];
        assert!(matches!(parse_bytes(cut), Err(Error::CorruptPage { offset: 0 })));
    }

    #[test]
    fn truncated_header_is_corrupt_page() {
        assert!(matches!(
            parse_bytes(b"OggS\0\x02\0\0"),
            Err(Error::CorruptPage { .. })
        ));
    }

    #[test]
    fn oversized_page_is_rejected() {
        let page = Page::new(PageHeader::new(0, 0, 1, 0), vec![vec![0u8; 255 * 255]], false);
        assert!(matches!(
            page.to_bytes(ChecksumMode::Recompute),
            Err(Error::InvalidPageLayout(_))
        ));
    }
}
