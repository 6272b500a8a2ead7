use std::ops::Range;

use crate::{
    core::carbon::{CarbonSeries, SeriesKind},
    prelude::*,
    quantity::emissions::Moer,
};

/// Contiguous run of buckets whose forecast stays below the threshold.
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct LowCarbonWindow {
    /// Half-open bucket range.
    pub buckets: Range<usize>,

    /// Average forecast MOER over the run.
    pub average_forecast: Moer,
}

impl LowCarbonWindow {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.buckets.end - self.buckets.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Low-carbon windows ordered by their start bucket.
///
/// Built once per policy invocation and then queried for every workload.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct LowCarbonWindows(Vec<LowCarbonWindow>);

impl AsRef<[LowCarbonWindow]> for LowCarbonWindows {
    fn as_ref(&self) -> &[LowCarbonWindow] {
        &self.0
    }
}

impl LowCarbonWindows {
    /// Extract the below-threshold runs from the forecast in one pass.
    ///
    /// The forecast value at bucket `i` describes the interval starting at `i`,
    /// so it is accumulated only after the threshold crossing at `i` has been handled.
    /// A run still open at the end of the series is dropped since its end is unknown.
    #[instrument(skip_all, fields(threshold = threshold))]
    pub fn extract(series: &CarbonSeries, threshold: u32) -> Self {
        let forecast = series.values(SeriesKind::Forecast);
        let mut windows = Vec::new();

        let Some((&first, rest)) = forecast.split_first() else {
            return Self(windows);
        };
        let mut is_below = first < threshold;
        let mut run_start = 0;
        let mut sum = u64::from(first);

        for (index, &value) in rest.iter().enumerate().map(|(index, value)| (index + 1, value)) {
            if is_below && value >= threshold {
                #[expect(clippy::cast_precision_loss)]
                let average = sum as f64 / (index - run_start) as f64;
                windows.push(LowCarbonWindow {
                    buckets: run_start..index,
                    average_forecast: Moer(average),
                });
                is_below = false;
            } else if !is_below && value < threshold {
                run_start = index;
                sum = 0;
                is_below = true;
            }
            sum += u64::from(value);
        }

        debug!(n_windows = windows.len(), "extracted low-carbon windows");
        Self(windows)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Windows starting at or after the bucket, in order.
    #[must_use]
    pub fn starting_from(&self, bucket: usize) -> &[LowCarbonWindow] {
        let index = self.0.partition_point(|window| window.buckets.start < bucket);
        &self.0[index..]
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn extract(forecast: Vec<u32>, threshold: u32) -> LowCarbonWindows {
        let series = CarbonSeries::try_new(forecast.clone(), forecast).unwrap();
        LowCarbonWindows::extract(&series, threshold)
    }

    #[test]
    fn single_window() {
        let windows = extract(vec![900, 900, 700, 700, 700, 900], 800);
        assert_eq!(windows.len(), 1);
        let window = &windows.as_ref()[0];
        assert_eq!(window.buckets, 2..5);
        assert_eq!(window.len(), 3);
        assert_abs_diff_eq!(window.average_forecast.0, 700.0);
    }

    #[test]
    fn all_above_threshold() {
        assert!(extract(vec![800, 900, 1000, 810], 800).is_empty());
    }

    #[test]
    fn threshold_is_exclusive() {
        // 800 is not below 800, so it closes the run:
        let windows = extract(vec![900, 799, 800, 900], 800);
        assert_eq!(windows.as_ref()[0].buckets, 1..2);
    }

    #[test]
    fn leading_run_starts_at_zero() {
        let windows = extract(vec![100, 300, 900, 900], 800);
        let window = &windows.as_ref()[0];
        assert_eq!(window.buckets, 0..2);
        assert_abs_diff_eq!(window.average_forecast.0, 200.0);
    }

    #[test]
    fn trailing_run_is_dropped() {
        let windows = extract(vec![900, 100, 900, 100, 100], 800);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows.as_ref()[0].buckets, 1..2);
    }

    #[test]
    fn windows_are_ordered_disjoint_and_below_threshold() {
        let forecast = vec![
            850, 790, 600, 820, 400, 410, 420, 990, 100, 900, 805, 200, 300, 950, 780, 810,
        ];
        let windows = extract(forecast.clone(), 800);
        assert_eq!(windows.len(), 5);
        for window in windows.as_ref() {
            assert!(!window.is_empty());
            assert!(window.average_forecast < Moer(800.0));
            let values = &forecast[window.buckets.clone()];
            #[expect(clippy::cast_precision_loss)]
            let mean = values.iter().copied().map(f64::from).sum::<f64>() / values.len() as f64;
            assert_abs_diff_eq!(window.average_forecast.0, mean);
        }
        for (left, right) in windows.as_ref().iter().zip(windows.as_ref().iter().skip(1)) {
            assert!(left.buckets.end <= right.buckets.start);
        }
    }

    #[test]
    fn starting_from() {
        let windows = extract(vec![900, 100, 900, 100, 900, 100, 900], 800);
        assert_eq!(windows.len(), 3);
        assert_eq!(windows.starting_from(0).len(), 3);
        assert_eq!(windows.starting_from(1).len(), 3);
        assert_eq!(windows.starting_from(2)[0].buckets, 3..4);
        assert!(windows.starting_from(6).is_empty());
    }
}
