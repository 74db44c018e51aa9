// Page listing for Ogg files

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::ogg::{crc, ChecksumMode, PageReader};
use crate::opus::is_opus_head;

/// One page of the input as seen by the page reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub offset: u64,
    pub serial: u32,
    pub sequence: u32,
    pub granule_position: u64,
    pub continued: bool,
    pub bos: bool,
    pub eos: bool,
    pub packets: usize,
    pub last_partial: bool,
    pub data_size: usize,
    pub checksum_ok: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    /// Serial numbers of streams whose first packet is an Opus identification header
    pub opus_streams: Vec<u32>,
    pub skipped_bytes: u64,
    pub pages: Vec<PageSummary>,
}

/// List every page of every logical stream in `input`
pub fn inspect_stream<R: Read>(input: R) -> Result<InspectReport> {
    let mut reader = PageReader::new(input);
    let mut report = InspectReport::default();

    while let Some(page) = reader.next_page()? {
        let stored = page.header.crc;
        let computed = crc::page_checksum(&page.to_bytes(ChecksumMode::Preserve)?);

        if page.header.is_bos() && page.packets.first().is_some_and(|p| is_opus_head(p)) {
            report.opus_streams.push(page.header.bitstream_serial);
        }

        report.pages.push(PageSummary {
            offset: reader.last_offset(),
            serial: page.header.bitstream_serial,
            sequence: page.header.page_sequence,
            granule_position: page.header.granule_position,
            continued: page.header.is_continued(),
            bos: page.header.is_bos(),
            eos: page.header.is_eos(),
            packets: page.packets.len(),
            last_partial: page.last_partial,
            data_size: page.data_size(),
            checksum_ok: stored == computed,
        });
    }

    report.skipped_bytes = reader.skipped_bytes();
    Ok(report)
}

/// List every page of the file at `path`
pub fn inspect_file(path: &Path) -> Result<InspectReport> {
    inspect_stream(BufReader::new(File::open(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ogg::{Page, PageHeader, OGG_HEADER_TYPE_BOS, OGG_HEADER_TYPE_EOS};
    use std::io::Cursor;

    #[test]
    fn lists_pages_and_flags_bad_checksums() {
        let id = Page::new(
            PageHeader::new(OGG_HEADER_TYPE_BOS, 0, 11, 0),
            vec![b"OpusHead\x01".to_vec()],
            false,
        );
        let last = Page::new(
            PageHeader::new(OGG_HEADER_TYPE_EOS, 48000, 11, 1),
            vec![vec![1u8; 300]],
            false,
        );
        let mut data = id.to_bytes(ChecksumMode::Recompute).unwrap();
        data.extend(last.to_bytes(ChecksumMode::Zero).unwrap());

        let report = inspect_stream(Cursor::new(data)).unwrap();
        assert_eq!(report.opus_streams, vec![11]);
        assert_eq!(report.pages.len(), 2);
        assert!(report.pages[0].bos && report.pages[0].checksum_ok);
        assert!(report.pages[1].eos);
        assert!(!report.pages[1].checksum_ok);
        assert_eq!(report.pages[1].data_size, 300);
        assert_eq!(report.pages[1].offset, 28 + 9);
    }
}
