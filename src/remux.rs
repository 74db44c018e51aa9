// Container rebuilding: headers, then every audio packet transformed and
// re-wrapped into pages shaped like the source pages.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::ogg::{ChecksumMode, PacketReader, PageLayout, PageReader};
use crate::opus::OpusHeaders;
use crate::transform::PacketTransform;

/// Options for one remux pass.
///
/// Header pages are always copied with their stored checksum, so they come
/// out byte for byte as read. `checksum` applies to rebuilt audio pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemuxOptions {
    /// Checksum written into rebuilt audio pages
    pub checksum: ChecksumMode,
    /// Warn about input pages whose checksum does not match
    pub verify_input_crc: bool,
}

/// Summary of a completed pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemuxReport {
    pub serial: u32,
    pub pages_read: u64,
    pub pages_written: u64,
    pub foreign_pages: u64,
    pub audio_packets: u64,
    pub header_bytes: u64,
    pub bytes_written: u64,
    pub skipped_bytes: u64,
}

/// Drives demultiplexing, transformation and remultiplexing
pub struct Remuxer<T> {
    transform: T,
    options: RemuxOptions,
}

impl<T: PacketTransform> Remuxer<T> {
    pub fn new(transform: T) -> Self {
        Remuxer {
            transform,
            options: RemuxOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RemuxOptions) -> Self {
        self.options = options;
        self
    }

    /// Run one pass from `input` to `output`.
    ///
    /// On error, bytes already written to `output` do not form a valid stream.
    pub fn run<R: Read, W: Write>(&mut self, input: R, output: &mut W) -> Result<RemuxReport> {
        let mut pages = PageReader::new(input).with_crc_verification(self.options.verify_input_crc);
        let headers = OpusHeaders::read(&mut pages)?;

        let mut report = RemuxReport {
            serial: headers.serial(),
            foreign_pages: headers.foreign_pages,
            ..RemuxReport::default()
        };

        let id_page = headers.identification.to_bytes(ChecksumMode::Preserve)?;
        output.write_all(&id_page)?;
        output.write_all(&headers.comment)?;
        report.header_bytes = (id_page.len() + headers.comment.len()) as u64;
        report.bytes_written = report.header_bytes;
        report.pages_written = 1 + headers.comment_pages as u64;

        let mut packets = PacketReader::new(pages, headers.selection).with_layout_tracking();
        let mut emitter = PageEmitter::new(self.options.checksum);

        loop {
            let next = packets.next_packet()?;
            emitter.queue.extend(packets.drain_layouts());
            let Some(mut packet) = next else {
                break;
            };

            self.transform.apply(&mut packet);
            emitter.pending.extend_from_slice(&packet);
            report.audio_packets += 1;
            emitter.emit_ready(output, &mut report)?;
        }
        emitter.emit_ready(output, &mut report)?;
        debug_assert!(emitter.queue.is_empty() && emitter.pending.is_empty());

        output.flush()?;

        report.foreign_pages += packets.foreign_pages();
        report.pages_read = packets.page_reader().pages_read();
        report.skipped_bytes = packets.page_reader().skipped_bytes();
        info!(
            serial = report.serial,
            packets = report.audio_packets,
            pages = report.pages_written,
            bytes = report.bytes_written,
            "Remux complete"
        );
        Ok(report)
    }
}

/// Emits recorded page layouts once all of their bytes have been transformed
struct PageEmitter {
    checksum: ChecksumMode,
    queue: VecDeque<PageLayout>,
    pending: Vec<u8>,
}

impl PageEmitter {
    fn new(checksum: ChecksumMode) -> Self {
        PageEmitter {
            checksum,
            queue: VecDeque::new(),
            pending: Vec::new(),
        }
    }

    fn emit_ready<W: Write>(&mut self, output: &mut W, report: &mut RemuxReport) -> Result<()> {
        while let Some(layout) = self.queue.front() {
            let size = layout.data_size();
            if size > self.pending.len() {
                break;
            }

            let page = layout.rebuild(&self.pending[..size]);
            let bytes = page.to_bytes(self.checksum)?;
            output.write_all(&bytes)?;
            debug!(
                sequence = page.header.page_sequence,
                bytes = bytes.len(),
                "Wrote page"
            );

            self.pending.drain(..size);
            self.queue.pop_front();
            report.pages_written += 1;
            report.bytes_written += bytes.len() as u64;
        }
        Ok(())
    }
}

/// Remux the file at `input` into a new file at `output`.
///
/// Fails with [`Error::SameFile`] before touching either file when `output`
/// resolves to `input`. The output file is flushed and closed on both
/// success and failure; after a failure its content is incomplete.
pub fn remux_file<T: PacketTransform>(
    input: &Path,
    output: &Path,
    transform: T,
    options: RemuxOptions,
) -> Result<RemuxReport> {
    let reader = BufReader::new(File::open(input)?);
    if is_same_file(input, output) {
        return Err(Error::SameFile {
            path: output.to_path_buf(),
        });
    }
    let mut writer = BufWriter::new(File::create(output)?);

    let result = Remuxer::new(transform)
        .with_options(options)
        .run(reader, &mut writer);
    if result.is_err() {
        // The error from the pass takes precedence
        if let Err(e) = writer.flush() {
            warn!(output = %output.display(), error = %e, "Failed to flush incomplete output");
        }
    }
    result
}

/// True when both paths resolve to the same existing file
fn is_same_file(input: &Path, output: &Path) -> bool {
    match (input.canonicalize(), output.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
