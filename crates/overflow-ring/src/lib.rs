//! overflow-ring - Blocking Overflow Ring Buffer
//!
//! A fixed-capacity circular byte store shared by any number of producer and
//! consumer threads. Writers never wait: when the buffer is full, the oldest
//! unread bytes are overwritten. Readers choose between non-blocking reads
//! and "fully" reads that wait for data, optionally bounded by a timeout.
//!
//! # Key Features
//!
//! - Lossy, never-blocking writes (drop-oldest on overflow)
//! - Blocking reads and skips with a total timeout budget
//! - Broadcast wakeups, so readers waiting for different amounts all re-check
//! - `mark()`/`reset()` to roll back a speculative write
//! - `std::io` adapters and a big-endian typed codec
//!
//! # Example
//!
//! ```
//! use overflow_ring::RingBuffer;
//! use std::sync::Arc;
//! use std::thread;
//! use std::time::Duration;
//!
//! let ring = Arc::new(RingBuffer::new(64).unwrap());
//!
//! let reader = {
//!     let ring = Arc::clone(&ring);
//!     thread::spawn(move || {
//!         let mut buf = [0u8; 4];
//!         ring.read_fully_timeout(&mut buf, Duration::from_secs(5)).map(|n| (n, buf))
//!     })
//! };
//!
//! ring.write(&[1, 2]);
//! ring.write(&[3, 4]);
//!
//! let (n, buf) = reader.join().unwrap().unwrap();
//! assert_eq!(n, 4);
//! assert_eq!(buf, [1, 2, 3, 4]);
//!
//! // Speculative write, then roll it back.
//! ring.mark();
//! ring.write(b"oops");
//! ring.reset().unwrap();
//! assert!(ring.is_empty());
//! ```

mod codec;
mod config;
mod error;
mod index;
mod invariants;
mod io;
mod metrics;
mod ring;

pub use codec::{CodecError, DataReader, DataWriter};
pub use config::{Config, LARGE_CONFIG, SMALL_CONFIG};
pub use error::BufferError;
pub use io::{BufferReader, BufferWriter};
pub use metrics::MetricsSnapshot;
pub use ring::RingBuffer;
