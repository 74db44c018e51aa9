// Packet reassembly for one selected logical stream
//
// Pages of other logical streams are dropped. A packet that spans pages is
// buffered until the page that terminates it arrives.

use std::collections::VecDeque;
use std::io::Read;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::ogg::page::{Page, PageHeader};
use crate::ogg::sync::PageReader;

/// Continuation state carried between page reads
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Reassembly {
    /// No packet is pending
    #[default]
    Idle,
    /// The head of a packet is buffered, waiting for a continued page
    AwaitingContinuation(Vec<u8>),
}

/// The logical stream being followed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSelection {
    pub serial: u32,
    /// Set once the end-of-stream page has been seen; never cleared
    pub ended: bool,
}

impl StreamSelection {
    pub fn new(serial: u32) -> Self {
        StreamSelection {
            serial,
            ended: false,
        }
    }
}

/// Shape of a page read by the reassembler: its header and the length
/// of every packet fragment it carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLayout {
    pub header: PageHeader,
    pub fragments: Vec<usize>,
    pub last_partial: bool,
}

impl PageLayout {
    fn of(page: &Page) -> Self {
        PageLayout {
            header: page.header,
            fragments: page.packets.iter().map(Vec::len).collect(),
            last_partial: page.last_partial,
        }
    }

    pub fn data_size(&self) -> usize {
        self.fragments.iter().sum()
    }

    /// Build a page with this layout from `data`, which must hold exactly
    /// `data_size()` bytes.
    pub fn rebuild(&self, data: &[u8]) -> Page {
        debug_assert_eq!(data.len(), self.data_size());
        let mut packets = Vec::with_capacity(self.fragments.len());
        let mut start = 0;
        for &len in &self.fragments {
            packets.push(data[start..start + len].to_vec());
            start += len;
        }
        Page::new(self.header, packets, self.last_partial)
    }
}

/// Pulls complete packets of one logical stream out of a page reader
pub struct PacketReader<R> {
    pages: PageReader<R>,
    selection: StreamSelection,
    state: Reassembly,
    ready: VecDeque<Vec<u8>>,
    layouts: VecDeque<PageLayout>,
    track_layout: bool,
    failed: bool,
    stream_pages: u64,
    foreign_pages: u64,
}

impl<R: Read> PacketReader<R> {
    pub fn new(pages: PageReader<R>, selection: StreamSelection) -> Self {
        PacketReader {
            pages,
            selection,
            state: Reassembly::Idle,
            ready: VecDeque::new(),
            layouts: VecDeque::new(),
            track_layout: false,
            failed: false,
            stream_pages: 0,
            foreign_pages: 0,
        }
    }

    /// Record a `PageLayout` for every page of the selected stream
    pub fn with_layout_tracking(mut self) -> Self {
        self.track_layout = true;
        self
    }

    /// Next complete packet, or `None` once the stream has ended cleanly
    pub fn next_packet(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            if let Some(packet) = self.ready.pop_front() {
                return Ok(Some(packet));
            }

            if self.selection.ended {
                if let Reassembly::AwaitingContinuation(pending) = &self.state {
                    debug!(pending = pending.len(), "Stream ended inside a packet");
                    return Err(self.truncated(self.pages.last_offset()));
                }
                return Ok(None);
            }

            match self.pages.next_page_of(self.selection.serial)? {
                Some((page, skipped)) => {
                    self.foreign_pages += skipped;
                    self.accept(page)?;
                }
                None => return Err(self.truncated(self.pages.position())),
            }
        }
    }

    fn accept(&mut self, page: Page) -> Result<()> {
        self.stream_pages += 1;
        if self.track_layout {
            self.layouts.push_back(PageLayout::of(&page));
        }

        let continued = page.header.is_continued();
        let eos = page.header.is_eos();
        let last = page.packets.len().saturating_sub(1);
        let last_partial = page.last_partial;

        for (i, data) in page.packets.into_iter().enumerate() {
            let head = i == 0 && continued;
            let packet = match std::mem::take(&mut self.state) {
                Reassembly::AwaitingContinuation(mut buffered) => {
                    if !head {
                        return Err(self.truncated(self.pages.last_offset()));
                    }
                    buffered.extend_from_slice(&data);
                    buffered
                }
                Reassembly::Idle => {
                    if head {
                        warn!(
                            offset = self.pages.last_offset(),
                            len = data.len(),
                            "Continued page without a pending packet"
                        );
                    }
                    data
                }
            };

            if last_partial && i == last {
                self.state = Reassembly::AwaitingContinuation(packet);
            } else {
                self.ready.push_back(packet);
            }
        }

        if eos {
            debug!(serial = self.selection.serial, "End of stream");
            self.selection.ended = true;
        }
        Ok(())
    }

    fn truncated(&mut self, offset: u64) -> Error {
        self.failed = true;
        Error::TruncatedStream {
            serial: self.selection.serial,
            offset,
        }
    }

    /// Take the layouts recorded since the last call
    pub fn drain_layouts(&mut self) -> std::collections::vec_deque::Drain<'_, PageLayout> {
        self.layouts.drain(..)
    }

    pub fn state(&self) -> &Reassembly {
        &self.state
    }

    pub fn selection(&self) -> StreamSelection {
        self.selection
    }

    /// Pages of the selected stream consumed so far
    pub fn stream_pages(&self) -> u64 {
        self.stream_pages
    }

    /// Pages of other logical streams dropped so far
    pub fn foreign_pages(&self) -> u64 {
        self.foreign_pages
    }

    pub fn page_reader(&self) -> &PageReader<R> {
        &self.pages
    }
}

impl<R: Read> Iterator for PacketReader<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.next_packet().transpose();
        if matches!(item, Some(Err(_))) {
            self.failed = true;
        }
        item
    }
}
