//! Demonstration of overflow-ring features.
//!
//! Run with: `RUST_LOG=overflow_ring=debug cargo run -p overflow-ring --bin demo`

use anyhow::Context;
use overflow_ring::{
    BufferError, BufferReader, BufferWriter, Config, DataReader, DataWriter, RingBuffer,
};
use std::io::{Read, Write};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== overflow-ring Demo ===\n");

    demo_overflow()?;
    demo_blocking_reads()?;
    demo_speculative_write()?;
    demo_typed_codec()?;
    demo_interrupt()?;

    println!("\n=== All demos completed successfully! ===");
    Ok(())
}

/// Demo 1: Lossy writes drop the oldest unread bytes
fn demo_overflow() -> anyhow::Result<()> {
    println!("--- Demo 1: Overflow ---");

    let ring = Arc::new(RingBuffer::with_config(Config::new(8, true))?);
    let mut tx = BufferWriter::new(Arc::clone(&ring));
    let mut rx = BufferReader::new(Arc::clone(&ring));

    tx.write_all(b"0123456789ABCDEF")?;
    let mut out = String::new();
    rx.read_to_string(&mut out)?;

    println!("  Wrote 16 bytes into 8, read back: {:?}", out);
    println!("  Metrics: {:?}", ring.metrics());
    println!("  ✓ Overflow complete\n");
    Ok(())
}

/// Demo 2: Blocking reads assemble data from several writes
fn demo_blocking_reads() -> anyhow::Result<()> {
    println!("--- Demo 2: Blocking Reads ---");

    let ring = Arc::new(RingBuffer::new(64)?);
    let producer = {
        let ring = Arc::clone(&ring);
        thread::spawn(move || {
            for chunk in [&b"hel"[..], b"lo ", b"world"] {
                thread::sleep(Duration::from_millis(20));
                ring.write(chunk);
            }
        })
    };

    let mut buf = [0u8; 11];
    let n = ring.read_fully_timeout(&mut buf, Duration::from_secs(1))?;
    producer.join().map_err(|_| anyhow::anyhow!("producer panicked"))?;
    println!("  Received {} bytes: {:?}", n, String::from_utf8_lossy(&buf[..n]));

    let start = Instant::now();
    let n = ring.read_fully_timeout(&mut buf, Duration::from_millis(50))?;
    println!("  Empty buffer: read {} bytes, gave up after {:?}", n, start.elapsed());
    println!("  ✓ Blocking reads complete\n");
    Ok(())
}

/// Demo 3: Roll back a frame that turned out to be invalid
fn demo_speculative_write() -> anyhow::Result<()> {
    println!("--- Demo 3: Speculative Write ---");

    let ring = RingBuffer::new(32)?;
    ring.write(b"keep;");

    ring.mark();
    ring.write(b"half-built frame");
    let rolled_back = ring.reset()?;
    ring.write(b"good;");

    let mut out = vec![0u8; ring.remaining()];
    let n = ring.read(&mut out).unwrap_or(0);
    println!("  Rolled back {} bytes, buffer holds {:?}", rolled_back, String::from_utf8_lossy(&out[..n]));

    match ring.reset() {
        Err(BufferError::NoMark) => println!("  Second reset rejected: no mark"),
        other => anyhow::bail!("unexpected reset result: {:?}", other),
    }
    println!("  ✓ Speculative write complete\n");
    Ok(())
}

/// Demo 4: Typed values across threads
fn demo_typed_codec() -> anyhow::Result<()> {
    println!("--- Demo 4: Typed Codec ---");

    let ring = Arc::new(RingBuffer::new(128)?);
    let mut writer = DataWriter::new(Arc::clone(&ring));
    let mut reader = DataReader::new(Arc::clone(&ring)).with_timeout(Duration::from_secs(1));

    let producer = thread::spawn(move || -> Result<(), overflow_ring::CodecError> {
        writer.write_u32(0xCAFE_BABE);
        writer.write_f64(std::f64::consts::PI);
        writer.write_string("ring buffer")
    });

    let magic = reader.read_u32().context("reading magic")?;
    let pi = reader.read_f64().context("reading pi")?;
    let name = reader.read_string().context("reading name")?;
    producer
        .join()
        .map_err(|_| anyhow::anyhow!("producer panicked"))??;

    println!("  magic={:#x} pi={} name={:?}", magic, pi, name);
    println!("  ✓ Typed codec complete\n");
    Ok(())
}

/// Demo 5: Cancel a reader that would otherwise wait forever
fn demo_interrupt() -> anyhow::Result<()> {
    println!("--- Demo 5: Interrupt ---");

    let ring = Arc::new(RingBuffer::new(16)?);
    let reader = {
        let ring = Arc::clone(&ring);
        thread::spawn(move || ring.read_fully_byte())
    };

    while !reader.is_finished() {
        thread::sleep(Duration::from_millis(10));
        ring.interrupt();
    }
    let result = reader.join().map_err(|_| anyhow::anyhow!("reader panicked"))?;
    println!("  Blocked reader returned: {:?}", result);
    println!("  ✓ Interrupt complete\n");
    Ok(())
}
