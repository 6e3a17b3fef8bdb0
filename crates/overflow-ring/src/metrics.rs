/// Counters collected by a [`RingBuffer`](crate::RingBuffer) when
/// `Config::enable_metrics` is set.
///
/// Lives inside the buffer's lock, so plain integers are enough.
#[derive(Debug, Default)]
pub(crate) struct Metrics {
    bytes_written: u64,
    bytes_read: u64,
    bytes_skipped: u64,
    bytes_overwritten: u64,
    bytes_cleared: u64,
    bytes_rewound: u64,
    overflows: u64,
    marks_invalidated: u64,
    waits: u64,
    timeouts: u64,
    interrupts: u64,
}

impl Metrics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn add_bytes_written(&mut self, n: usize) {
        self.bytes_written += n as u64;
    }

    #[inline]
    pub(crate) fn add_bytes_read(&mut self, n: usize) {
        self.bytes_read += n as u64;
    }

    #[inline]
    pub(crate) fn add_bytes_skipped(&mut self, n: usize) {
        self.bytes_skipped += n as u64;
    }

    /// Records one overflow event that dropped `n` unread bytes.
    #[inline]
    pub(crate) fn add_overflow(&mut self, n: usize) {
        self.bytes_overwritten += n as u64;
        self.overflows += 1;
    }

    #[inline]
    pub(crate) fn add_bytes_cleared(&mut self, n: usize) {
        self.bytes_cleared += n as u64;
    }

    #[inline]
    pub(crate) fn add_bytes_rewound(&mut self, n: usize) {
        self.bytes_rewound += n as u64;
    }

    #[inline]
    pub(crate) fn add_mark_invalidated(&mut self) {
        self.marks_invalidated += 1;
    }

    #[inline]
    pub(crate) fn add_wait(&mut self) {
        self.waits += 1;
    }

    #[inline]
    pub(crate) fn add_timeout(&mut self) {
        self.timeouts += 1;
    }

    #[inline]
    pub(crate) fn add_interrupt(&mut self) {
        self.interrupts += 1;
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            bytes_written: self.bytes_written,
            bytes_read: self.bytes_read,
            bytes_skipped: self.bytes_skipped,
            bytes_overwritten: self.bytes_overwritten,
            bytes_cleared: self.bytes_cleared,
            bytes_rewound: self.bytes_rewound,
            overflows: self.overflows,
            marks_invalidated: self.marks_invalidated,
            waits: self.waits,
            timeouts: self.timeouts,
            interrupts: self.interrupts,
        }
    }
}

/// Point-in-time copy of buffer metrics. All zero when metrics are disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsSnapshot {
    pub bytes_written: u64,
    pub bytes_read: u64,
    pub bytes_skipped: u64,
    /// Unread bytes lost to overflow.
    pub bytes_overwritten: u64,
    /// Unread bytes dropped by `clear()`.
    pub bytes_cleared: u64,
    /// Bytes un-written by `reset()`.
    pub bytes_rewound: u64,
    /// Number of writes that overwrote unread data.
    pub overflows: u64,
    pub marks_invalidated: u64,
    /// Condition variable waits entered by blocking reads.
    pub waits: u64,
    pub timeouts: u64,
    pub interrupts: u64,
}
