// opus-remux - Ogg Opus demultiplexing and remultiplexing
//
// Reads an Ogg-encapsulated Opus stream, reassembles the audio packets of
// the first logical stream, passes each one through a PacketTransform
// and writes a new Ogg bitstream whose pages keep the shape of the input.

pub mod error;
pub mod inspect;
pub mod ogg;
pub mod opus;
pub mod remux;
pub mod transform;
pub mod utils;

pub use error::{Error, Result};
pub use inspect::{inspect_file, inspect_stream, InspectReport, PageSummary};
pub use ogg::{ChecksumMode, PacketReader, Page, PageHeader, PageReader};
pub use opus::OpusHeaders;
pub use remux::{remux_file, RemuxOptions, RemuxReport, Remuxer};
pub use transform::{Complement, Identity, PacketTransform, TransformKind};
