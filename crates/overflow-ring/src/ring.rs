use crate::index;
use crate::invariants::{
    debug_assert_bounded_occupancy, debug_assert_index_in_range, debug_assert_occupancy_consistent,
};
use crate::metrics::Metrics;
use crate::{BufferError, Config, MetricsSnapshot};
use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

// =============================================================================
// MONITOR PROTOCOL
// =============================================================================
//
// All buffer state lives in one `State` behind one `Mutex`. There is no
// separate read/write lock split: writes are short copies and must never
// block, so one lock keeps every critical section small.
//
// ## Writers
//
// 1. Lock, copy into storage (at most two contiguous segments per lap),
//    advance `write_index`, and on overflow drag `read_index` forward.
// 2. Unlock, then `notify_all` on `data_ready`.
//
// Writers never wait. The wake is a broadcast because blocked readers may want
// different amounts of data and any subset of them can become satisfiable.
//
// ## Blocking readers (`*_fully*`)
//
// 1. Lock, take whatever is available.
// 2. If the request is still short, wait on `data_ready` (the wait releases
//    the lock) until woken or the deadline passes.
// 3. On wakeup re-check the interrupt epoch, then go to 1.
//
// The deadline is fixed once at call entry, so spurious wakeups and partial
// progress never extend the caller's budget. The loop is iterative; repeated
// short wakeups cannot grow the stack.
//
// ## Interrupts
//
// `interrupt()` bumps `interrupt_epoch` and broadcasts. A blocked reader that
// wakes to a different epoch than the one it saw on entry returns
// `BufferError::Interrupted` with the count already transferred.
//
// =============================================================================

/// Fixed-capacity byte ring buffer with lossy writes and blocking reads.
///
/// - Writes always succeed; when the buffer is full the oldest unread bytes
///   are overwritten.
/// - Plain reads and skips never block and return what is available.
/// - `*_fully` reads and skips block until satisfied, optionally bounded by a
///   total timeout budget.
/// - `mark()`/`reset()` roll back writes made since the mark.
///
/// Share it between threads with `Arc<RingBuffer>`.
pub struct RingBuffer {
    state: Mutex<State>,
    /// Broadcast on every write and on `interrupt()`.
    data_ready: Condvar,
    config: Config,
}

struct State {
    storage: Box<[u8]>,
    read_index: usize,
    write_index: usize,
    occupancy: usize,
    mark: Option<usize>,
    interrupt_epoch: u64,
    /// `None` when metrics are disabled.
    metrics: Option<Metrics>,
}

impl RingBuffer {
    /// Creates a buffer holding `capacity` bytes.
    pub fn new(capacity: usize) -> Result<Self, BufferError> {
        Self::with_config(Config::default().with_capacity(capacity))
    }

    /// Creates a buffer with the given configuration.
    pub fn with_config(config: Config) -> Result<Self, BufferError> {
        config.validate()?;
        Ok(Self {
            state: Mutex::new(State::new(&config)),
            data_ready: Condvar::new(),
            config,
        })
    }

    /// Lock the state. A panic in another thread cannot leave the state
    /// half-updated, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ---------------------------------------------------------------------
    // STATUS
    // ---------------------------------------------------------------------

    /// Returns the storage size in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Returns the number of written-but-unread bytes.
    pub fn remaining(&self) -> usize {
        self.lock().occupancy
    }

    /// Alias for [`remaining`](Self::remaining).
    #[inline]
    pub fn len(&self) -> usize {
        self.remaining()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns true if the next write will overwrite unread data.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.remaining() == self.capacity()
    }

    pub fn has_mark(&self) -> bool {
        self.lock().mark.is_some()
    }

    /// Get a snapshot of metrics if enabled.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.lock()
            .metrics
            .as_ref()
            .map(Metrics::snapshot)
            .unwrap_or_default()
    }

    // ---------------------------------------------------------------------
    // PRODUCER API
    // ---------------------------------------------------------------------

    /// Appends `data`, overwriting the oldest unread bytes if it does not fit.
    ///
    /// Never blocks. Wakes every blocked reader.
    pub fn write(&self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.lock().put(data);
        self.data_ready.notify_all();
    }

    /// Appends a single byte.
    #[inline]
    pub fn write_byte(&self, byte: u8) {
        self.write(&[byte]);
    }

    /// Remembers the current write position so that [`reset`](Self::reset)
    /// can roll back everything written after it. Replaces any earlier mark.
    ///
    /// The mark is dropped once a full capacity's worth of bytes has been
    /// written since it was set, because the marked position has then been
    /// overwritten.
    pub fn mark(&self) {
        let mut state = self.lock();
        state.mark = Some(state.write_index);
        trace!(position = state.write_index, "mark set");
    }

    /// Rolls the write position back to the mark and consumes the mark.
    ///
    /// If a reader already consumed part of the rolled-back bytes, the buffer
    /// ends up empty with the read position at the mark. Otherwise only the
    /// rolled-back bytes are removed from the unread count.
    ///
    /// Returns the number of bytes rolled back.
    pub fn reset(&self) -> Result<usize, BufferError> {
        self.lock().rewind()
    }

    /// Drops all unread bytes and returns how many were dropped.
    ///
    /// Storage contents are left in place; only positions change.
    pub fn clear(&self) -> usize {
        self.lock().clear()
    }

    /// Wakes every reader currently blocked in a `*_fully` call and makes it
    /// return [`BufferError::Interrupted`].
    pub fn interrupt(&self) {
        {
            let mut state = self.lock();
            state.interrupt_epoch = state.interrupt_epoch.wrapping_add(1);
            debug!(epoch = state.interrupt_epoch, "interrupting blocked readers");
        }
        self.data_ready.notify_all();
    }

    // ---------------------------------------------------------------------
    // NON-BLOCKING CONSUMER API
    // ---------------------------------------------------------------------

    /// Reads one byte, or `None` if the buffer is empty.
    pub fn read_byte(&self) -> Option<u8> {
        let mut byte = [0u8; 1];
        self.read(&mut byte).map(|_| byte[0])
    }

    /// Reads up to `buf.len()` bytes.
    ///
    /// Returns `None` when `buf` is non-empty and nothing is available, and
    /// `Some(0)` for an empty `buf`.
    pub fn read(&self, buf: &mut [u8]) -> Option<usize> {
        if buf.is_empty() {
            return Some(0);
        }
        let n = self.lock().take(buf);
        (n > 0).then_some(n)
    }

    /// Discards up to `n` unread bytes and returns how many were discarded.
    pub fn skip(&self, n: usize) -> usize {
        self.lock().discard(n)
    }

    // ---------------------------------------------------------------------
    // BLOCKING CONSUMER API
    // ---------------------------------------------------------------------

    /// Reads one byte, waiting as long as it takes.
    pub fn read_fully_byte(&self) -> Result<u8, BufferError> {
        let mut byte = [0u8; 1];
        self.read_fully(&mut byte)?;
        Ok(byte[0])
    }

    /// Reads one byte, waiting at most `timeout`. `Ok(None)` means the budget
    /// ran out.
    pub fn read_fully_byte_timeout(&self, timeout: Duration) -> Result<Option<u8>, BufferError> {
        let mut byte = [0u8; 1];
        let n = self.read_fully_timeout(&mut byte, timeout)?;
        Ok((n == 1).then_some(byte[0]))
    }

    /// Fills `buf` completely, waiting as long as it takes.
    pub fn read_fully(&self, buf: &mut [u8]) -> Result<usize, BufferError> {
        let wanted = buf.len();
        self.transfer_blocking(wanted, None, |state, done| state.take(&mut buf[done..]))
    }

    /// Fills as much of `buf` as possible within `timeout`.
    ///
    /// Returns the number of bytes read; less than `buf.len()` means the
    /// budget ran out.
    pub fn read_fully_timeout(&self, buf: &mut [u8], timeout: Duration) -> Result<usize, BufferError> {
        let wanted = buf.len();
        self.transfer_blocking(wanted, Some(timeout), |state, done| {
            state.take(&mut buf[done..])
        })
    }

    /// Discards exactly `n` bytes, waiting as long as it takes.
    pub fn skip_fully(&self, n: usize) -> Result<usize, BufferError> {
        self.transfer_blocking(n, None, |state, done| state.discard(n - done))
    }

    /// Discards up to `n` bytes within `timeout` and returns how many were
    /// discarded.
    pub fn skip_fully_timeout(&self, n: usize, timeout: Duration) -> Result<usize, BufferError> {
        self.transfer_blocking(n, Some(timeout), |state, done| state.discard(n - done))
    }

    /// Shared drain-then-wait loop behind every blocking call.
    ///
    /// `step` moves up to `wanted - done` bytes out of the buffer and returns
    /// how many it moved.
    fn transfer_blocking<F>(
        &self,
        wanted: usize,
        timeout: Option<Duration>,
        mut step: F,
    ) -> Result<usize, BufferError>
    where
        F: FnMut(&mut State, usize) -> usize,
    {
        // A budget too large to represent as an Instant is treated as unbounded.
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));

        let mut state = self.lock();
        let epoch = state.interrupt_epoch;
        let mut done = 0;

        loop {
            done += step(&mut *state, done);
            if done == wanted {
                return Ok(done);
            }

            state = match deadline {
                None => {
                    state.record(Metrics::add_wait);
                    trace!(done, wanted, "waiting for data");
                    self.data_ready
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner)
                }
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        state.record(Metrics::add_timeout);
                        debug!(done, wanted, "blocking read timed out");
                        return Ok(done);
                    }
                    state.record(Metrics::add_wait);
                    trace!(done, wanted, budget_left = ?(deadline - now), "waiting for data");
                    let (guard, _) = self
                        .data_ready
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner);
                    guard
                }
            };

            if state.interrupt_epoch != epoch {
                state.record(Metrics::add_interrupt);
                debug!(transferred = done, "blocking read interrupted");
                return Err(BufferError::Interrupted { transferred: done });
            }
        }
    }
}

impl fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("read_index", &state.read_index)
            .field("write_index", &state.write_index)
            .field("occupancy", &state.occupancy)
            .field("mark", &state.mark)
            .finish()
    }
}

impl State {
    fn new(config: &Config) -> Self {
        Self {
            storage: vec![0u8; config.capacity].into_boxed_slice(),
            read_index: 0,
            write_index: 0,
            occupancy: 0,
            mark: None,
            interrupt_epoch: 0,
            metrics: config.enable_metrics.then(Metrics::new),
        }
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    fn record(&mut self, update: impl FnOnce(&mut Metrics)) {
        if let Some(metrics) = self.metrics.as_mut() {
            update(metrics);
        }
    }

    /// Copies `data` in contiguous runs, one run per wrap.
    fn put(&mut self, mut data: &[u8]) {
        let capacity = self.capacity();
        let written = data.len();
        let mut dropped = 0;

        while !data.is_empty() {
            let start = self.write_index;
            let n = index::contiguous(start, data.len(), capacity);
            self.storage[start..start + n].copy_from_slice(&data[..n]);
            dropped += self.advance_write(n);
            data = &data[n..];
        }

        self.record(|m| m.add_bytes_written(written));
        if dropped > 0 {
            self.record(|m| m.add_overflow(dropped));
            debug!(dropped, written, capacity, "overflow: oldest unread bytes overwritten");
        }
        self.check_invariants();
    }

    /// Moves the write position past `n` freshly copied bytes. Returns the
    /// number of unread bytes that were overwritten.
    fn advance_write(&mut self, n: usize) -> usize {
        let capacity = self.capacity();

        if let Some(mark) = self.mark {
            if index::distance(mark, self.write_index, capacity) + n >= capacity {
                self.mark = None;
                self.record(Metrics::add_mark_invalidated);
                debug!(mark, "mark invalidated: marked position overwritten");
            }
        }

        self.write_index = index::advance(self.write_index, n, capacity);
        self.occupancy += n;
        if self.occupancy < capacity {
            return 0;
        }

        let dropped = self.occupancy - capacity;
        self.occupancy = capacity;
        self.read_index = self.write_index;
        dropped
    }

    /// Copies up to `out.len()` unread bytes into `out`.
    fn take(&mut self, out: &mut [u8]) -> usize {
        let capacity = self.capacity();
        let wanted = out.len().min(self.occupancy);
        let mut done = 0;

        while done < wanted {
            let start = self.read_index;
            let n = index::contiguous(start, wanted - done, capacity);
            out[done..done + n].copy_from_slice(&self.storage[start..start + n]);
            self.consume(n);
            done += n;
        }

        if done > 0 {
            self.record(|m| m.add_bytes_read(done));
            self.check_invariants();
        }
        done
    }

    fn discard(&mut self, n: usize) -> usize {
        let n = n.min(self.occupancy);
        if n > 0 {
            self.consume(n);
            self.record(|m| m.add_bytes_skipped(n));
            self.check_invariants();
        }
        n
    }

    #[inline]
    fn consume(&mut self, n: usize) {
        self.read_index = index::advance(self.read_index, n, self.capacity());
        self.occupancy -= n;
    }

    fn rewind(&mut self) -> Result<usize, BufferError> {
        let mark = self.mark.take().ok_or(BufferError::NoMark)?;
        let span = index::distance(mark, self.write_index, self.capacity());

        if span > self.occupancy {
            // The reader already consumed part of what is being rolled back.
            debug!(span, unread = self.occupancy, "reset past read position, replaying from mark");
            self.read_index = mark;
            self.occupancy = 0;
        } else {
            self.occupancy -= span;
        }
        self.write_index = mark;

        self.record(|m| m.add_bytes_rewound(span));
        trace!(position = mark, span, "reset to mark");
        self.check_invariants();
        Ok(span)
    }

    fn clear(&mut self) -> usize {
        let dropped = self.occupancy;
        self.occupancy = 0;
        self.read_index = self.write_index;

        if dropped > 0 {
            self.record(|m| m.add_bytes_cleared(dropped));
            debug!(dropped, "cleared unread bytes");
        }
        self.check_invariants();
        dropped
    }

    #[inline]
    fn check_invariants(&self) {
        let capacity = self.capacity();
        debug_assert_bounded_occupancy!(self.occupancy, capacity);
        debug_assert_index_in_range!("read_index", self.read_index, capacity);
        debug_assert_index_in_range!("write_index", self.write_index, capacity);
        if let Some(mark) = self.mark {
            debug_assert_index_in_range!("mark", mark, capacity);
        }
        debug_assert_occupancy_consistent!(self.read_index, self.write_index, self.occupancy, capacity);
    }
}
