// OPUS header extraction (in OGG container)
//
// OPUS File Structure:
// - Identification header: "OpusHead" packet, alone on the beginning-of-stream page
// - Comment header: "OpusTags" packet, on the following page(s); the last
//   comment page has granule position 0
// - Audio data pages
//
// Reference:
// - https://wiki.xiph.org/OggOpus
// - RFC 7845: Ogg Encapsulation for the Opus Audio Codec

use std::io::Read;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::ogg::{ChecksumMode, Page, PageReader, StreamSelection};

pub const OPUS_SIGNATURE: &[u8; 8] = b"OpusHead";
pub const OPUS_TAGS: &[u8; 8] = b"OpusTags";

/// Header section of the selected logical stream
#[derive(Debug, Clone)]
pub struct OpusHeaders {
    /// Beginning-of-stream page carrying the identification header
    pub identification: Page,
    /// Raw bytes of the comment header pages, in input order
    pub comment: Vec<u8>,
    pub comment_pages: usize,
    pub selection: StreamSelection,
    /// Pages of other logical streams dropped while reading the headers
    pub foreign_pages: u64,
}

impl OpusHeaders {
    /// Read the identification and comment headers
    pub fn read<R: Read>(pages: &mut PageReader<R>) -> Result<Self> {
        let (identification, foreign_pages) = read_identification_header(pages)?;
        let mut selection = StreamSelection::new(identification.header.bitstream_serial);
        if identification.header.is_eos() {
            selection.ended = true;
            return Ok(OpusHeaders {
                identification,
                comment: Vec::new(),
                comment_pages: 0,
                selection,
                foreign_pages,
            });
        }

        let comment = read_comment_header(pages, &mut selection)?;
        Ok(OpusHeaders {
            identification,
            comment: comment.bytes,
            comment_pages: comment.pages,
            selection,
            foreign_pages: foreign_pages + comment.foreign_pages,
        })
    }

    pub fn serial(&self) -> u32 {
        self.selection.serial
    }
}

/// Scan pages of any logical stream until the first beginning-of-stream page.
///
/// The page must hold exactly one complete packet. Returns the page and
/// the number of pages skipped before it.
pub fn read_identification_header<R: Read>(pages: &mut PageReader<R>) -> Result<(Page, u64)> {
    let mut skipped = 0u64;
    loop {
        let Some(page) = pages.next_page()? else {
            return Err(Error::MissingIdentificationHeader);
        };

        if !page.header.is_bos() {
            skipped += 1;
            continue;
        }

        if page.packets.len() != 1 || page.last_partial {
            return Err(Error::MalformedIdentificationHeader {
                serial: page.header.bitstream_serial,
                packets: page.packets.len(),
                partial: page.last_partial,
            });
        }
        if !is_opus_head(&page.packets[0]) {
            warn!(
                serial = page.header.bitstream_serial,
                "Identification header is not OpusHead"
            );
        }
        debug!(
            serial = page.header.bitstream_serial,
            offset = pages.last_offset(),
            "Selected logical stream"
        );
        return Ok((page, skipped));
    }
}

struct CommentHeader {
    bytes: Vec<u8>,
    pages: usize,
    foreign_pages: u64,
}

/// Collect the selected stream's pages up to and including the first page
/// with granule position 0. Pages are passed through byte for byte.
fn read_comment_header<R: Read>(
    pages: &mut PageReader<R>,
    selection: &mut StreamSelection,
) -> Result<CommentHeader> {
    let mut comment = CommentHeader {
        bytes: Vec::new(),
        pages: 0,
        foreign_pages: 0,
    };

    loop {
        let Some((page, skipped)) = pages.next_page_of(selection.serial)? else {
            return Err(Error::TruncatedStream {
                serial: selection.serial,
                offset: pages.position(),
            });
        };
        comment.foreign_pages += skipped;
        if comment.pages == 0 && !page.packets.first().is_some_and(|p| is_opus_tags(p)) {
            warn!(serial = selection.serial, "Comment header is not OpusTags");
        }

        comment.bytes.extend(page.to_bytes(ChecksumMode::Preserve)?);
        comment.pages += 1;

        if page.header.is_eos() {
            selection.ended = true;
        }
        if page.header.granule_position == 0 || selection.ended {
            debug!(
                pages = comment.pages,
                bytes = comment.bytes.len(),
                "Read comment header"
            );
            return Ok(comment);
        }
    }
}

/// Check whether a packet is an Opus identification header
pub fn is_opus_head(packet: &[u8]) -> bool {
    packet.starts_with(OPUS_SIGNATURE)
}

/// Check whether a packet is an Opus comment header
pub fn is_opus_tags(packet: &[u8]) -> bool {
    packet.starts_with(OPUS_TAGS)
}
