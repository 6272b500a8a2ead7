use std::ops::Range;

use crate::quantity::emissions::Moer;

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum SeriesError {
    #[error("carbon series must not be empty")]
    Empty,

    #[error("observed and forecast series differ in length: {observed} vs {forecast}")]
    LengthMismatch { observed: usize, forecast: usize },

    #[error("bucket {index} is out of range for a series of {len} buckets")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid bucket range {start}..{end} for a series of {len} buckets")]
    InvalidRange { start: usize, end: usize, len: usize },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SeriesKind {
    /// Observed marginal emissions rate.
    Observed,

    /// Forecast of the marginal emissions rate.
    Forecast,
}

/// Fixed-interval MOER trace: one observed and one forecast value per five-minute bucket.
///
/// Immutable once built, so it can be shared across independent cycles.
#[derive(Clone, Debug)]
#[must_use]
pub struct CarbonSeries {
    observed: Vec<u32>,
    forecast: Vec<u32>,

    /// `observed_sums[i]` is the sum of the first `i` observed values.
    observed_sums: Vec<u64>,

    /// `forecast_sums[i]` is the sum of the first `i` forecast values.
    forecast_sums: Vec<u64>,
}

impl CarbonSeries {
    pub fn try_new(observed: Vec<u32>, forecast: Vec<u32>) -> Result<Self, SeriesError> {
        if observed.is_empty() || forecast.is_empty() {
            return Err(SeriesError::Empty);
        }
        if observed.len() != forecast.len() {
            return Err(SeriesError::LengthMismatch {
                observed: observed.len(),
                forecast: forecast.len(),
            });
        }
        let observed_sums = Self::prefix_sums(&observed);
        let forecast_sums = Self::prefix_sums(&forecast);
        Ok(Self { observed, forecast, observed_sums, forecast_sums })
    }

    fn prefix_sums(values: &[u32]) -> Vec<u64> {
        let mut sums = Vec::with_capacity(values.len() + 1);
        sums.push(0);
        let mut total = 0_u64;
        for value in values {
            total += u64::from(*value);
            sums.push(total);
        }
        sums
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.observed.len()
    }

    /// Never true for a constructed series.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    pub fn observed_at(&self, index: usize) -> Result<u32, SeriesError> {
        self.observed
            .get(index)
            .copied()
            .ok_or(SeriesError::IndexOutOfRange { index, len: self.len() })
    }

    pub fn forecast_at(&self, index: usize) -> Result<u32, SeriesError> {
        self.forecast
            .get(index)
            .copied()
            .ok_or(SeriesError::IndexOutOfRange { index, len: self.len() })
    }

    #[must_use]
    pub fn values(&self, kind: SeriesKind) -> &[u32] {
        match kind {
            SeriesKind::Observed => &self.observed,
            SeriesKind::Forecast => &self.forecast,
        }
    }

    /// Arithmetic mean of the series over the half-open bucket range.
    pub fn window_average(
        &self,
        kind: SeriesKind,
        buckets: Range<usize>,
    ) -> Result<Moer, SeriesError> {
        let Range { start, end } = buckets;
        if start >= end || end > self.len() {
            return Err(SeriesError::InvalidRange { start, end, len: self.len() });
        }
        let sums = match kind {
            SeriesKind::Observed => &self.observed_sums,
            SeriesKind::Forecast => &self.forecast_sums,
        };
        #[expect(clippy::cast_precision_loss)]
        let average = (sums[end] - sums[start]) as f64 / (end - start) as f64;
        Ok(Moer(average))
    }

    /// Same as [`CarbonSeries::window_average`] but an empty range averages to zero.
    pub fn average_or_zero(
        &self,
        kind: SeriesKind,
        buckets: Range<usize>,
    ) -> Result<Moer, SeriesError> {
        if buckets.is_empty() {
            Ok(Moer::ZERO)
        } else {
            self.window_average(kind, buckets)
        }
    }
}
