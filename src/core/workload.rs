pub mod model;
mod utilization;

use serde::{Deserialize, Serialize};

pub use self::utilization::Utilization;
use crate::{
    core::{
        carbon::{CarbonSeries, SeriesError, SeriesKind},
        window::Window,
    },
    quantity::{
        currency::{Dollars, DollarsPerHour},
        emissions::{Moer, Pounds},
        energy::MegawattHours,
        power::Watts,
        time::Hours,
    },
};

/// Single VM from the trace together with its schedulable window and resources.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct Workload {
    pub id: u32,

    /// Current run window, mutated by the rescheduling and shutdown policies.
    pub window: Window,

    /// Window as loaded from the trace, used for the delay metrics.
    pub original_window: Window,

    /// Runtime in seconds as recorded in the trace, before snapping onto the bucket grid.
    pub runtime: i64,

    pub cores: u32,
    pub ram_megabytes: u32,
    pub utilization: Utilization,
}

impl Workload {
    pub const fn new(
        id: u32,
        window: Window,
        cores: u32,
        ram_megabytes: u32,
        utilization: Utilization,
    ) -> Self {
        Self {
            id,
            window,
            original_window: window,
            runtime: window.duration(),
            cores,
            ram_megabytes,
            utilization,
        }
    }

    pub const fn with_runtime(mut self, runtime: i64) -> Self {
        self.runtime = runtime;
        self
    }

    /// Whole gigabytes, as the power regression was fitted on.
    #[must_use]
    pub const fn ram_gigabytes(&self) -> u32 {
        self.ram_megabytes / 1000
    }

    /// How far the workload has been postponed, in seconds.
    #[must_use]
    pub const fn delay(&self) -> i64 {
        self.window.start - self.original_window.start
    }

    #[must_use]
    pub fn is_rescheduled(&self) -> bool {
        self.window.start != self.original_window.start
    }

    #[must_use]
    pub fn power(&self) -> Watts {
        model::power(self.cores, self.ram_gigabytes(), self.utilization.average)
    }

    #[must_use]
    pub fn energy(&self) -> MegawattHours {
        if self.window.duration() == 0 {
            return MegawattHours::ZERO;
        }
        self.power() * self.window.hours()
    }

    /// Observed MOER averaged over the run window, zero if the window is shorter than a bucket.
    pub fn average_moer(&self, series: &CarbonSeries) -> Result<Moer, SeriesError> {
        series.average_or_zero(SeriesKind::Observed, self.window.buckets())
    }

    /// Forecast MOER averaged over the run window, zero if the window is shorter than a bucket.
    pub fn average_pmoer(&self, series: &CarbonSeries) -> Result<Moer, SeriesError> {
        series.average_or_zero(SeriesKind::Forecast, self.window.buckets())
    }

    pub fn carbon(&self, series: &CarbonSeries) -> Result<Pounds, SeriesError> {
        Ok(self.average_moer(series)? * self.energy())
    }

    /// Emissions as the forecast would have predicted them.
    pub fn predicted_carbon(&self, series: &CarbonSeries) -> Result<Pounds, SeriesError> {
        Ok(self.average_pmoer(series)? * self.energy())
    }

    #[must_use]
    pub fn price(&self) -> DollarsPerHour {
        model::price(self.cores, self.ram_megabytes)
    }

    #[must_use]
    pub fn cost(&self) -> Dollars {
        self.price() * self.window.hours()
    }

    /// Part of the cost spent on idle capacity.
    #[must_use]
    pub fn waste(&self) -> Dollars {
        self.cost() * (1.0 - self.utilization.average)
    }

    /// Final placement to hand over to an execution engine.
    pub const fn placement(&self) -> Placement {
        Placement {
            id: self.id,
            start: self.window.start,
            end: self.window.end,
            cores: self.cores,
            ram_megabytes: self.ram_megabytes,
        }
    }
}

/// What an execution engine needs to know to run the workload.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct Placement {
    pub id: u32,
    pub start: i64,
    pub end: i64,
    pub cores: u32,
    pub ram_megabytes: u32,
}

#[cfg(test)]
pub mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    /// Eight cores, 32 GB, idle most of the time, running for a day from bucket 0.
    pub fn idle_workload() -> Workload {
        Workload::new(
            1,
            Window::new(0, 86_400),
            8,
            32_000,
            Utilization { average: 0.1, maximum: 0.2, p95: 0.15 },
        )
    }

    fn series() -> CarbonSeries {
        CarbonSeries::try_new(vec![1000, 500, 600], vec![900, 900, 300]).unwrap()
    }

    #[test]
    fn energy_and_carbon() {
        let workload = Workload::new(
            7,
            Window::new(300, 900),
            8,
            8000,
            Utilization { average: 0.5, maximum: 0.9, p95: 0.8 },
        );
        let series = series();
        let power = 42.1392 * 0.5 + 16.6206;
        assert_abs_diff_eq!(workload.power().0, power, epsilon = 1e-9);
        assert_abs_diff_eq!(workload.energy().0, power * 600.0 / 3.6e9, epsilon = 1e-15);
        assert_abs_diff_eq!(workload.average_moer(&series).unwrap().0, 550.0);
        assert_abs_diff_eq!(workload.average_pmoer(&series).unwrap().0, 600.0);
        assert_abs_diff_eq!(
            workload.carbon(&series).unwrap().0,
            550.0 * power * 600.0 / 3.6e9,
            epsilon = 1e-12,
        );
        assert_abs_diff_eq!(
            workload.predicted_carbon(&series).unwrap().0,
            600.0 * power * 600.0 / 3.6e9,
            epsilon = 1e-12,
        );
    }

    #[test]
    fn degenerate_window_is_free() {
        let mut workload = idle_workload();
        workload.window = Window::new(300, 300);
        let series = series();
        assert_eq!(workload.average_moer(&series), Ok(Moer::ZERO));
        assert_eq!(workload.average_pmoer(&series), Ok(Moer::ZERO));
        assert_eq!(workload.energy(), MegawattHours::ZERO);
        assert_eq!(workload.carbon(&series), Ok(Pounds::ZERO));
        assert_eq!(workload.cost(), Dollars::ZERO);
    }

    #[test]
    fn window_past_the_series_is_an_error() {
        let workload = idle_workload();
        assert!(workload.average_moer(&series()).is_err());
    }

    #[test]
    fn cost_and_waste() {
        let workload = idle_workload();
        let price = -0.0038 + 0.0468 * 8.0 + 0.0017 * 32.0;
        assert_abs_diff_eq!(workload.price().0, price, epsilon = 1e-12);
        assert_abs_diff_eq!(workload.cost().0, price * 24.0, epsilon = 1e-9);
        assert_abs_diff_eq!(workload.waste().0, price * 24.0 * 0.9, epsilon = 1e-9);
    }

    #[test]
    fn delay_follows_the_original_window() {
        let mut workload = idle_workload();
        assert!(!workload.is_rescheduled());
        workload.window = Window::new(3600, 90_000);
        assert_eq!(workload.delay(), 3600);
        assert!(workload.is_rescheduled());
    }
}
