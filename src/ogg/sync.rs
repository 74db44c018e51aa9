// Page synchronization over a raw byte stream

use std::io::Read;

use tracing::{debug, warn};

use crate::error::Result;
use crate::ogg::page::{ChecksumMode, Page};
use crate::ogg::{crc, OGG_SIGNATURE};
use crate::utils::io::ByteSource;

/// Advance `source` past the next capture pattern.
///
/// Returns the offset where the pattern starts, or `None` once the source
/// is exhausted. Bytes before the pattern are discarded.
pub fn sync_to_capture<R: Read>(source: &mut ByteSource<R>) -> std::io::Result<Option<u64>> {
    let mut matched = 0;
    while matched < OGG_SIGNATURE.len() {
        let Some(byte) = source.read_u8_or_eof()? else {
            return Ok(None);
        };
        if byte == OGG_SIGNATURE[matched] {
            matched += 1;
        } else {
            matched = if byte == OGG_SIGNATURE[0] { 1 } else { 0 };
        }
    }
    Ok(Some(source.position() - OGG_SIGNATURE.len() as u64))
}

/// Reads pages one after another from a byte source
pub struct PageReader<R> {
    source: ByteSource<R>,
    verify_crc: bool,
    last_offset: u64,
    pages_read: u64,
    skipped_bytes: u64,
}

impl<R: Read> PageReader<R> {
    pub fn new(reader: R) -> Self {
        PageReader {
            source: ByteSource::new(reader),
            verify_crc: false,
            last_offset: 0,
            pages_read: 0,
            skipped_bytes: 0,
        }
    }

    /// Log a warning for every page whose stored checksum does not match its content
    pub fn with_crc_verification(mut self, verify: bool) -> Self {
        self.verify_crc = verify;
        self
    }

    /// Read the next page of any logical stream
    pub fn next_page(&mut self) -> Result<Option<Page>> {
        let start = self.source.position();
        let Some(offset) = sync_to_capture(&mut self.source)? else {
            return Ok(None);
        };
        if offset > start {
            warn!(offset, skipped = offset - start, "Skipped bytes before capture pattern");
            self.skipped_bytes += offset - start;
        }

        self.last_offset = offset;
        let page = Page::parse(&mut self.source, offset)?;
        self.pages_read += 1;
        debug!(
            offset,
            serial = page.header.bitstream_serial,
            sequence = page.header.page_sequence,
            granule = page.header.granule_position,
            packets = page.packets.len(),
            "Read page"
        );

        if self.verify_crc {
            self.check_crc(&page, offset)?;
        }
        Ok(Some(page))
    }

    /// Read the next page of the logical stream `serial`, skipping all others
    pub fn next_page_of(&mut self, serial: u32) -> Result<Option<(Page, u64)>> {
        let mut skipped = 0u64;
        while let Some(page) = self.next_page()? {
            if page.header.bitstream_serial == serial {
                return Ok(Some((page, skipped)));
            }
            skipped += 1;
            debug!(
                serial = page.header.bitstream_serial,
                selected = serial,
                "Dropped page of another logical stream"
            );
        }
        Ok(None)
    }

    fn check_crc(&self, page: &Page, offset: u64) -> Result<()> {
        let bytes = page.to_bytes(ChecksumMode::Preserve)?;
        let computed = crc::page_checksum(&bytes);
        if computed != page.header.crc {
            warn!(
                offset,
                stored = page.header.crc,
                computed,
                "Page checksum mismatch"
            );
        }
        Ok(())
    }

    /// Offset of the capture pattern of the last page read
    pub fn last_offset(&self) -> u64 {
        self.last_offset
    }

    /// Bytes consumed from the source so far
    pub fn position(&self) -> u64 {
        self.source.position()
    }

    pub fn pages_read(&self) -> u64 {
        self.pages_read
    }

    /// Bytes discarded while searching for capture patterns
    pub fn skipped_bytes(&self) -> u64 {
        self.skipped_bytes
    }
}
