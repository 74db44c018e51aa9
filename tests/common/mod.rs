// Builders for in-memory Ogg Opus streams

#![allow(dead_code)]

use opus_remux::ogg::{OGG_HEADER_TYPE_BOS, OGG_HEADER_TYPE_CONTINUATION, OGG_HEADER_TYPE_EOS};
use opus_remux::{ChecksumMode, Page, PageHeader};

pub const SERIAL: u32 = 0x1234_5678;

pub fn page(flags: u8, granule: u64, serial: u32, seq: u32, packets: Vec<Vec<u8>>, partial: bool) -> Page {
    Page::new(PageHeader::new(flags, granule, serial, seq), packets, partial)
}

pub fn encode(pages: &[Page]) -> Vec<u8> {
    pages
        .iter()
        .flat_map(|p| p.to_bytes(ChecksumMode::Recompute).unwrap())
        .collect()
}

pub fn opus_head() -> Vec<u8> {
    let mut head = b"OpusHead".to_vec();
    head.extend_from_slice(&[1, 2, 0x38, 0x01, 0x80, 0xbb, 0, 0, 0, 0, 0]);
    head
}

pub fn opus_tags() -> Vec<u8> {
    let mut tags = b"OpusTags".to_vec();
    tags.extend_from_slice(&8u32.to_le_bytes());
    tags.extend_from_slice(b"testenc!");
    tags.extend_from_slice(&0u32.to_le_bytes());
    tags
}

pub fn header_pages(serial: u32) -> Vec<Page> {
    vec![
        page(OGG_HEADER_TYPE_BOS, 0, serial, 0, vec![opus_head()], false),
        page(0, 0, serial, 1, vec![opus_tags()], false),
    ]
}

/// Headers followed by audio pages holding `packets`, packed into pages of
/// at most `per_page` payload bytes so larger packets span pages.
/// `per_page` must exceed 255.
pub fn opus_stream(serial: u32, packets: &[Vec<u8>], per_page: usize) -> Vec<Page> {
    assert!(per_page > 255);
    let mut builder = StreamBuilder {
        pages: header_pages(serial),
        serial,
        seq: 2,
        current: Vec::new(),
        used: 0,
        continued: false,
    };
    let mut granule = 0u64;

    for packet in packets {
        let mut rest = &packet[..];
        loop {
            let room = per_page - builder.used;
            let segments_left = 255 - segments(&builder.current);
            if rest.len() < room && rest.len() / 255 < segments_left {
                builder.used += rest.len();
                builder.current.push(rest.to_vec());
                break;
            }

            let mut chunk = (room / 255).min(segments_left) * 255;
            if chunk >= rest.len() {
                chunk = rest.len().saturating_sub(1) / 255 * 255;
            }
            if chunk == 0 {
                builder.flush(false, granule);
                continue;
            }
            builder.current.push(rest[..chunk].to_vec());
            rest = &rest[chunk..];
            builder.flush(true, u64::MAX);
        }
        granule += 960;
    }

    let flags = OGG_HEADER_TYPE_EOS | builder.continuation_flag();
    let last = std::mem::take(&mut builder.current);
    builder
        .pages
        .push(page(flags, granule, serial, builder.seq, last, false));
    builder.pages
}

struct StreamBuilder {
    pages: Vec<Page>,
    serial: u32,
    seq: u32,
    current: Vec<Vec<u8>>,
    used: usize,
    continued: bool,
}

impl StreamBuilder {
    fn continuation_flag(&self) -> u8 {
        if self.continued {
            OGG_HEADER_TYPE_CONTINUATION
        } else {
            0
        }
    }

    fn flush(&mut self, partial: bool, granule: u64) {
        let packets = std::mem::take(&mut self.current);
        let flags = self.continuation_flag();
        self.pages
            .push(page(flags, granule, self.serial, self.seq, packets, partial));
        self.seq += 1;
        self.used = 0;
        self.continued = partial;
    }
}

fn segments(current: &[Vec<u8>]) -> usize {
    current.iter().map(|p| p.len() / 255 + 1).sum()
}
