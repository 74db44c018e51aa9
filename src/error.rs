// Error types for opus-remux

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for opus-remux operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Every error is fatal to the current pass.
#[derive(Debug, Error)]
pub enum Error {
    /// Page version field was not 0.
    #[error("Unsupported Ogg page version {version} at offset {offset}")]
    UnsupportedVersion { version: u8, offset: u64 },

    /// Input ended without a beginning-of-stream page.
    #[error("No identification header: input has no beginning-of-stream page")]
    MissingIdentificationHeader,

    /// The beginning-of-stream page carried other data.
    #[error(
        "Malformed identification header in stream {serial:#010x}: {packets} packet(s), partial={partial}"
    )]
    MalformedIdentificationHeader {
        serial: u32,
        packets: usize,
        partial: bool,
    },

    /// Input ended before the stream was closed.
    #[error("Truncated stream {serial:#010x} at offset {offset}")]
    TruncatedStream { serial: u32, offset: u64 },

    /// A capture pattern was found but the page could not be read in full.
    #[error("Corrupt page at offset {offset}")]
    CorruptPage { offset: u64 },

    /// Packets could not be laced into a single page.
    #[error("Invalid page layout: {0}")]
    InvalidPageLayout(String),

    /// The output path names the input file.
    #[error("Output {} is the input file", path.display())]
    SameFile { path: PathBuf },

    /// I/O error on the source or sink.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Byte offset the error refers to, when there is one.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::UnsupportedVersion { offset, .. }
            | Error::TruncatedStream { offset, .. }
            | Error::CorruptPage { offset } => Some(*offset),
            _ => None,
        }
    }

    /// Serial number of the logical stream the error refers to, when there is one.
    pub fn serial(&self) -> Option<u32> {
        match self {
            Error::MalformedIdentificationHeader { serial, .. }
            | Error::TruncatedStream { serial, .. } => Some(*serial),
            _ => None,
        }
    }
}
