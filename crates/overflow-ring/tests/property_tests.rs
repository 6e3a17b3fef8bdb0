//! Property-based tests checking `RingBuffer` against a `VecDeque` model.
//!
//! The model keeps the unread bytes in order and applies the same
//! drop-oldest rule on overflow, so any divergence in content or occupancy
//! shows up as a failed comparison.

use overflow_ring::RingBuffer;
use proptest::prelude::*;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
enum Op {
    Write(Vec<u8>),
    Read(usize),
    Skip(usize),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => prop::collection::vec(any::<u8>(), 0..40).prop_map(Op::Write),
        3 => (0usize..40).prop_map(Op::Read),
        1 => (0usize..40).prop_map(Op::Skip),
        1 => Just(Op::Clear),
    ]
}

fn model_write(model: &mut VecDeque<u8>, data: &[u8], capacity: usize) {
    for &b in data {
        if model.len() == capacity {
            model.pop_front();
        }
        model.push_back(b);
    }
}

proptest! {
    /// `0 ≤ occupancy ≤ capacity` after every operation, and the content
    /// matches the model.
    #[test]
    fn prop_matches_model(
        capacity in 1usize..32,
        ops in prop::collection::vec(op_strategy(), 1..80),
    ) {
        let ring = RingBuffer::new(capacity).unwrap();
        let mut model = VecDeque::new();

        for op in ops {
            match op {
                Op::Write(data) => {
                    ring.write(&data);
                    model_write(&mut model, &data, capacity);
                }
                Op::Read(len) => {
                    let mut buf = vec![0u8; len];
                    let got = ring.read(&mut buf);
                    let expected: Vec<u8> = model.drain(..len.min(model.len())).collect();
                    if len > 0 && expected.is_empty() {
                        prop_assert_eq!(got, None);
                    } else {
                        prop_assert_eq!(got, Some(expected.len()));
                        prop_assert_eq!(&buf[..expected.len()], expected.as_slice());
                    }
                }
                Op::Skip(n) => {
                    let expected = n.min(model.len());
                    model.drain(..expected);
                    prop_assert_eq!(ring.skip(n), expected);
                }
                Op::Clear => {
                    prop_assert_eq!(ring.clear(), model.len());
                    model.clear();
                }
            }

            prop_assert!(ring.remaining() <= ring.capacity());
            prop_assert_eq!(ring.remaining(), model.len());
        }
    }

    /// Writing `capacity + k` bytes at once leaves exactly the last
    /// `capacity` bytes.
    #[test]
    fn prop_overflow_drops_oldest(
        capacity in 1usize..64,
        extra in 1usize..128,
        prefill in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let ring = RingBuffer::new(capacity).unwrap();
        ring.write(&prefill);

        let data: Vec<u8> = (0..capacity + extra).map(|i| i as u8).collect();
        ring.write(&data);

        let mut out = vec![0u8; capacity];
        prop_assert_eq!(ring.read(&mut out), Some(capacity));
        prop_assert_eq!(out.as_slice(), &data[extra..]);
        prop_assert!(ring.is_empty());
    }

    /// mark; write N (without losing the mark); reset restores occupancy and
    /// the write position.
    #[test]
    fn prop_mark_reset_restores_state(
        capacity in 2usize..64,
        before_seed in prop::collection::vec(any::<u8>(), 0..64),
        speculative_seed in prop::collection::vec(any::<u8>(), 1..64),
    ) {
        // Size both writes so nothing unread is overwritten and the mark
        // survives the speculative write.
        let before = &before_seed[..before_seed.len().min(capacity - 1)];
        let max_speculative = (capacity - before.len()).min(capacity - 1);
        let speculative = &speculative_seed[..speculative_seed.len().min(max_speculative)];

        let ring = RingBuffer::new(capacity).unwrap();
        ring.write(before);
        prop_assert_eq!(ring.remaining(), before.len());

        ring.mark();
        ring.write(speculative);
        prop_assert!(ring.has_mark());
        prop_assert_eq!(ring.reset(), Ok(speculative.len()));
        prop_assert_eq!(ring.remaining(), before.len());

        // Nothing written speculatively is visible; the next write follows
        // directly after the pre-mark data.
        ring.write(&[0xAB]);
        let mut out = vec![0u8; before.len() + 1];
        prop_assert_eq!(ring.read(&mut out), Some(before.len() + 1));
        prop_assert_eq!(&out[..before.len()], before);
        prop_assert_eq!(out[before.len()], 0xAB);
        prop_assert!(ring.is_empty());
    }
}
