use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use overflow_ring::{Config, RingBuffer};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const BYTES_PER_RUN: usize = 4 * 1024 * 1024; // 4 MiB per iteration
const CAPACITY: usize = 64 * 1024;

fn bench_single_thread(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_thread");
    group.throughput(Throughput::Bytes(BYTES_PER_RUN as u64));

    for chunk in [16usize, 256, 4096] {
        group.bench_with_input(BenchmarkId::new("write_read", chunk), &chunk, |b, &chunk| {
            let ring = RingBuffer::new(CAPACITY).unwrap();
            let data = vec![0xA5u8; chunk];
            let mut out = vec![0u8; chunk];
            b.iter(|| {
                let mut moved = 0;
                while moved < BYTES_PER_RUN {
                    ring.write(&data);
                    moved += ring.read(&mut out).unwrap_or(0);
                }
                black_box(&out);
            });
        });
    }

    group.bench_function("overflow_write", |b| {
        let ring = RingBuffer::new(CAPACITY).unwrap();
        let data = vec![0x5Au8; 4096];
        b.iter(|| {
            for _ in 0..BYTES_PER_RUN / data.len() {
                ring.write(black_box(&data));
            }
        });
    });

    group.finish();
}

fn bench_spsc_blocking(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc_blocking");
    group.throughput(Throughput::Bytes(BYTES_PER_RUN as u64));

    group.bench_function("read_fully", |b| {
        b.iter(|| {
            // Sized so the producer can never overflow the consumer.
            let ring = Arc::new(RingBuffer::with_config(Config::new(BYTES_PER_RUN, false)).unwrap());

            let producer = {
                let ring = Arc::clone(&ring);
                thread::spawn(move || {
                    let data = vec![1u8; 1024];
                    for _ in 0..BYTES_PER_RUN / data.len() {
                        ring.write(&data);
                    }
                })
            };

            let mut out = vec![0u8; 8192];
            let mut received = 0;
            while received < BYTES_PER_RUN {
                received += ring
                    .read_fully_timeout(&mut out, Duration::from_millis(10))
                    .unwrap();
            }

            producer.join().unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_single_thread, bench_spsc_blocking);
criterion_main!(benches);
