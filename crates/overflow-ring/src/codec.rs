//! Typed big-endian encoding on top of a [`RingBuffer`].
//!
//! [`DataReader`] is built only from the blocking reads, so each decode waits
//! until the whole value has arrived (or its timeout budget runs out).
//! Strings are a big-endian `u16` byte length followed by UTF-8 bytes.

use crate::{BufferError, RingBuffer};
use std::string::FromUtf8Error;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors produced while encoding or decoding typed values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The underlying blocking read failed.
    #[error(transparent)]
    Buffer(#[from] BufferError),

    /// The timeout budget ran out before the whole value arrived. The
    /// received bytes have been consumed.
    #[error("timed out after receiving {received} of {expected} bytes")]
    TimedOut { expected: usize, received: usize },

    /// A decoded string was not valid UTF-8.
    #[error("invalid UTF-8 in string: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    /// A string is too long for its `u16` length prefix.
    #[error("string of {len} bytes exceeds the {max} byte limit", max = u16::MAX)]
    StringTooLong { len: usize },
}

impl CodecError {
    /// Returns `true` if retrying later may succeed.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Buffer(err) => err.is_recoverable(),
            Self::TimedOut { .. } => true,
            Self::InvalidUtf8(_) | Self::StringTooLong { .. } => false,
        }
    }
}

macro_rules! read_be {
    ($($(#[$doc:meta])* $name:ident -> $ty:ty;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(&mut self) -> Result<$ty, CodecError> {
                let mut bytes = [0u8; std::mem::size_of::<$ty>()];
                self.read_exact(&mut bytes)?;
                Ok(<$ty>::from_be_bytes(bytes))
            }
        )*
    };
}

macro_rules! write_be {
    ($($name:ident($ty:ty);)*) => {
        $(
            pub fn $name(&mut self, value: $ty) {
                self.buffer.write(&value.to_be_bytes());
            }
        )*
    };
}

/// Decodes typed values from a [`RingBuffer`], blocking until each value is
/// complete.
#[derive(Debug, Clone)]
pub struct DataReader {
    buffer: Arc<RingBuffer>,
    timeout: Option<Duration>,
}

impl DataReader {
    /// Creates a reader that waits indefinitely for each value.
    pub fn new(buffer: Arc<RingBuffer>) -> Self {
        Self {
            buffer,
            timeout: None,
        }
    }

    /// Bounds the wait for each value to `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn into_inner(self) -> Arc<RingBuffer> {
        self.buffer
    }

    /// Fills `buf` completely.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), CodecError> {
        let received = match self.timeout {
            None => self.buffer.read_fully(buf)?,
            Some(timeout) => self.buffer.read_fully_timeout(buf, timeout)?,
        };
        if received < buf.len() {
            return Err(CodecError::TimedOut {
                expected: buf.len(),
                received,
            });
        }
        Ok(())
    }

    /// Discards exactly `n` bytes.
    pub fn skip_bytes(&mut self, n: usize) -> Result<(), CodecError> {
        let received = match self.timeout {
            None => self.buffer.skip_fully(n)?,
            Some(timeout) => self.buffer.skip_fully_timeout(n, timeout)?,
        };
        if received < n {
            return Err(CodecError::TimedOut {
                expected: n,
                received,
            });
        }
        Ok(())
    }

    /// Any non-zero byte is `true`.
    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        Ok(self.read_u8()? != 0)
    }

    read_be! {
        read_u8 -> u8;
        read_i8 -> i8;
        read_u16 -> u16;
        read_i16 -> i16;
        read_u32 -> u32;
        read_i32 -> i32;
        read_u64 -> u64;
        read_i64 -> i64;
        /// IEEE 754 single precision, big-endian bit pattern.
        read_f32 -> f32;
        /// IEEE 754 double precision, big-endian bit pattern.
        read_f64 -> f64;
    }

    /// Reads a `u16`-length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String, CodecError> {
        let len = usize::from(self.read_u16()?);
        let mut bytes = vec![0u8; len];
        self.read_exact(&mut bytes)?;
        Ok(String::from_utf8(bytes)?)
    }
}

/// Encodes typed values into a [`RingBuffer`]. Writes never block.
#[derive(Debug, Clone)]
pub struct DataWriter {
    buffer: Arc<RingBuffer>,
}

impl DataWriter {
    pub fn new(buffer: Arc<RingBuffer>) -> Self {
        Self { buffer }
    }

    pub fn into_inner(self) -> Arc<RingBuffer> {
        self.buffer
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.write(bytes);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buffer.write_byte(u8::from(value));
    }

    write_be! {
        write_u8(u8);
        write_i8(i8);
        write_u16(u16);
        write_i16(i16);
        write_u32(u32);
        write_i32(i32);
        write_u64(u64);
        write_i64(i64);
        write_f32(f32);
        write_f64(f64);
    }

    /// Writes a `u16`-length-prefixed UTF-8 string as a single buffer write,
    /// so readers never observe the prefix without the body.
    pub fn write_string(&mut self, value: &str) -> Result<(), CodecError> {
        let len = u16::try_from(value.len())
            .map_err(|_| CodecError::StringTooLong { len: value.len() })?;
        let mut frame = Vec::with_capacity(2 + value.len());
        frame.extend_from_slice(&len.to_be_bytes());
        frame.extend_from_slice(value.as_bytes());
        self.buffer.write(&frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(capacity: usize) -> (DataWriter, DataReader) {
        let buffer = Arc::new(RingBuffer::new(capacity).unwrap());
        (DataWriter::new(Arc::clone(&buffer)), DataReader::new(buffer))
    }

    #[test]
    fn test_big_endian_layout() {
        let buffer = Arc::new(RingBuffer::new(16).unwrap());
        let mut writer = DataWriter::new(Arc::clone(&buffer));
        writer.write_u32(0x0102_0304);
        writer.write_i16(-2);

        let mut raw = [0u8; 6];
        assert_eq!(buffer.read(&mut raw), Some(6));
        assert_eq!(raw, [1, 2, 3, 4, 0xFF, 0xFE]);
    }

    #[test]
    fn test_mixed_values() {
        let (mut tx, mut rx) = pair(64);
        tx.write_bool(true);
        tx.write_i64(-42);
        tx.write_f64(1.5);
        tx.write_string("héllo").unwrap();
        tx.write_u8(200);

        assert!(rx.read_bool().unwrap());
        assert_eq!(rx.read_i64().unwrap(), -42);
        assert_eq!(rx.read_f64().unwrap(), 1.5);
        assert_eq!(rx.read_string().unwrap(), "héllo");
        assert_eq!(rx.read_u8().unwrap(), 200);
    }

    #[test]
    fn test_timeout_reports_partial_value() {
        let (mut tx, rx) = pair(16);
        let mut rx = rx.with_timeout(Duration::from_millis(20));
        tx.write_bytes(&[0, 0]);

        assert_eq!(
            rx.read_u32(),
            Err(CodecError::TimedOut {
                expected: 4,
                received: 2
            })
        );
    }

    #[test]
    fn test_invalid_utf8() {
        let (mut tx, mut rx) = pair(16);
        tx.write_u16(2);
        tx.write_bytes(&[0xC3, 0x28]);

        let err = rx.read_string().unwrap_err();
        assert!(matches!(err, CodecError::InvalidUtf8(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_string_too_long() {
        let (mut tx, _rx) = pair(16);
        let long = "x".repeat(usize::from(u16::MAX) + 1);
        assert_eq!(
            tx.write_string(&long),
            Err(CodecError::StringTooLong { len: long.len() })
        );
    }

    #[test]
    fn test_skip_bytes() {
        let (mut tx, rx) = pair(16);
        let mut rx = rx.with_timeout(Duration::from_millis(10));
        tx.write_bytes(&[9, 9, 9, 7]);

        rx.skip_bytes(3).unwrap();
        assert_eq!(rx.read_u8().unwrap(), 7);
        assert_eq!(
            rx.skip_bytes(1),
            Err(CodecError::TimedOut {
                expected: 1,
                received: 0
            })
        );
    }
}
