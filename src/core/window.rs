use std::{
    fmt::{Debug, Display, Formatter},
    ops::Range,
};

use serde::{Deserialize, Serialize};

use crate::quantity::time::Hours;

/// Carbon series resolution: every bucket covers five minutes.
pub const BUCKET_SECONDS: i64 = 300;

/// Run window of a workload in seconds since the trace epoch.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[must_use]
pub struct Window {
    /// Inclusive.
    pub start: i64,

    /// Exclusive.
    pub end: i64,
}

impl Debug for Window {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl Display for Window {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

impl Window {
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Snap both bounds down onto the bucket grid.
    pub const fn aligned(start: i64, end: i64) -> Self {
        Self::new(Self::floor(start), Self::floor(end))
    }

    /// Window covering `length` buckets starting at the `start` bucket.
    pub const fn from_buckets(start: usize, length: usize) -> Self {
        #[expect(clippy::cast_possible_wrap)]
        let (start, length) = (start as i64, length as i64);
        Self::new(start * BUCKET_SECONDS, (start + length) * BUCKET_SECONDS)
    }

    const fn floor(seconds: i64) -> i64 {
        seconds.div_euclid(BUCKET_SECONDS) * BUCKET_SECONDS
    }

    #[must_use]
    pub const fn duration(self) -> i64 {
        self.end - self.start
    }

    #[must_use]
    pub fn hours(self) -> Hours {
        Hours::from_seconds(self.duration())
    }

    #[must_use]
    pub const fn is_aligned(self) -> bool {
        self.start % BUCKET_SECONDS == 0 && self.end % BUCKET_SECONDS == 0
    }

    /// Bucket indices covered by the window, `[start / 300, end / 300)`.
    ///
    /// Windows reaching before the trace epoch are clamped to it.
    #[must_use]
    pub fn buckets(self) -> Range<usize> {
        Self::bucket_of(self.start)..Self::bucket_of(self.end).max(Self::bucket_of(self.start))
    }

    /// Truncate the window so that it lasts at most `duration` seconds, staying on the grid.
    pub const fn truncated(self, duration: i64) -> Self {
        let end = Self::floor(self.start + duration);
        Self::new(self.start, if end < self.end { end } else { self.end })
    }

    #[expect(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn bucket_of(seconds: i64) -> usize {
        seconds.max(0).div_euclid(BUCKET_SECONDS) as usize
    }
}
