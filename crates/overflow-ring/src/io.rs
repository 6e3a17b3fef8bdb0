//! `std::io` adapters over a shared [`RingBuffer`].
//!
//! Both adapters map onto the buffer's non-blocking operations: reading from
//! an empty buffer reports end-of-file (`Ok(0)`), and writing never blocks or
//! fails.

use crate::RingBuffer;
use std::io::{self, Read, Write};
use std::sync::Arc;

/// Byte input over a [`RingBuffer`].
#[derive(Debug, Clone)]
pub struct BufferReader {
    buffer: Arc<RingBuffer>,
}

impl BufferReader {
    pub fn new(buffer: Arc<RingBuffer>) -> Self {
        Self { buffer }
    }

    /// Reads one byte, or `None` at end of available data.
    pub fn read_byte(&mut self) -> Option<u8> {
        self.buffer.read_byte()
    }

    /// Discards up to `n` available bytes.
    pub fn skip(&mut self, n: usize) -> usize {
        self.buffer.skip(n)
    }

    /// Bytes that can be read without blocking.
    pub fn available(&self) -> usize {
        self.buffer.remaining()
    }

    pub fn get_ref(&self) -> &Arc<RingBuffer> {
        &self.buffer
    }

    pub fn into_inner(self) -> Arc<RingBuffer> {
        self.buffer
    }
}

impl Read for BufferReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.buffer.read(buf).unwrap_or(0))
    }
}

/// Byte output over a [`RingBuffer`].
#[derive(Debug, Clone)]
pub struct BufferWriter {
    buffer: Arc<RingBuffer>,
}

impl BufferWriter {
    pub fn new(buffer: Arc<RingBuffer>) -> Self {
        Self { buffer }
    }

    pub fn write_byte(&mut self, byte: u8) {
        self.buffer.write_byte(byte);
    }

    pub fn get_ref(&self) -> &Arc<RingBuffer> {
        &self.buffer
    }

    pub fn into_inner(self) -> Arc<RingBuffer> {
        self.buffer
    }
}

impl Write for BufferWriter {
    /// Accepts the whole slice; on overflow the oldest unread bytes are lost.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.write(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(capacity: usize) -> (BufferWriter, BufferReader) {
        let buffer = Arc::new(RingBuffer::new(capacity).unwrap());
        (BufferWriter::new(Arc::clone(&buffer)), BufferReader::new(buffer))
    }

    #[test]
    fn test_write_then_read_to_end() {
        let (mut tx, mut rx) = pair(32);
        tx.write_all(b"hello").unwrap();
        tx.write_byte(b'!');
        assert_eq!(rx.available(), 6);

        let mut out = Vec::new();
        rx.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"hello!");
        assert_eq!(rx.available(), 0);
    }

    #[test]
    fn test_empty_read_is_eof() {
        let (_tx, mut rx) = pair(8);
        let mut buf = [0u8; 4];
        assert_eq!(rx.read(&mut buf).unwrap(), 0);
        assert_eq!(rx.read_byte(), None);
    }

    #[test]
    fn test_skip_and_read_exact() {
        let (mut tx, mut rx) = pair(8);
        tx.write_all(&[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(rx.skip(2), 2);

        let mut buf = [0u8; 3];
        rx.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [3, 4, 5]);

        // Not enough data left: read_exact sees EOF.
        let err = rx.read_exact(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_writer_overflow_is_lossy() {
        let (mut tx, mut rx) = pair(4);
        assert_eq!(tx.write(&[1, 2, 3, 4, 5, 6]).unwrap(), 6);
        tx.flush().unwrap();

        let mut out = Vec::new();
        rx.read_to_end(&mut out).unwrap();
        assert_eq!(out, vec![3, 4, 5, 6]);
    }
}
