// I/O utilities for reading Ogg streams

use std::io::{ErrorKind, Read};

/// Byte source that counts consumed bytes.
///
/// Distinguishes clean exhaustion (`read_u8_or_eof` returning `None`)
/// from a read past the end of data (`UnexpectedEof` from the other readers).
pub struct ByteSource<R> {
    inner: R,
    position: u64,
}

impl<R: Read> ByteSource<R> {
    pub fn new(inner: R) -> Self {
        ByteSource { inner, position: 0 }
    }

    /// Number of bytes consumed so far
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Read one byte, or `None` if the source is exhausted
    pub fn read_u8_or_eof(&mut self) -> std::io::Result<Option<u8>> {
        let mut buffer = [0u8; 1];
        loop {
            match self.inner.read(&mut buffer) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.position += 1;
                    return Ok(Some(buffer[0]));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Read unsigned byte
    pub fn read_u8(&mut self) -> std::io::Result<u8> {
        let buffer: [u8; 1] = self.read_array()?;
        Ok(buffer[0])
    }

    /// Read little-endian 32-bit integer
    pub fn read_le_u32(&mut self) -> std::io::Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read little-endian 64-bit integer
    pub fn read_le_u64(&mut self) -> std::io::Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Read exactly `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> std::io::Result<Vec<u8>> {
        let mut buffer = vec![0u8; len];
        self.read_into(&mut buffer)?;
        Ok(buffer)
    }

    fn read_array<const N: usize>(&mut self) -> std::io::Result<[u8; N]> {
        let mut buffer = [0u8; N];
        self.read_into(&mut buffer)?;
        Ok(buffer)
    }

    fn read_into(&mut self, buffer: &mut [u8]) -> std::io::Result<()> {
        self.inner.read_exact(buffer)?;
        self.position += buffer.len() as u64;
        Ok(())
    }
}
