use serde::{Deserialize, Serialize};

use crate::{
    core::{
        acceptance::{AcceptanceRate, Decisions},
        carbon::{CarbonSeries, SeriesKind},
        delays::Delays,
        window::Window,
        workload::Workload,
    },
    prelude::*,
    quantity::emissions::Moer,
};

/// Rescheduling by averages: slide the run window forward and stop at the first local
/// minimum of the forecast moving average that beats the current placement by a margin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovingAverage {
    pub acceptance: AcceptanceRate,

    /// Minimal improvement of the average forecast MOER worth a postponement.
    pub confidence_threshold: Moer,

    /// How many buckets ahead the forecast can be trusted.
    pub lookahead: usize,
}

impl Default for MovingAverage {
    fn default() -> Self {
        Self {
            acceptance: AcceptanceRate::ALWAYS,
            confidence_threshold: Moer(50.0),
            lookahead: 288,
        }
    }
}

impl MovingAverage {
    pub fn validate(&self) -> Result {
        ensure!(self.lookahead != 0, "moving-average lookahead must be positive");
        ensure!(
            self.confidence_threshold >= Moer::ZERO,
            "confidence threshold must not be negative, got {}",
            self.confidence_threshold,
        );
        Ok(())
    }

    #[instrument(
        skip_all,
        fields(confidence = %self.confidence_threshold, lookahead = self.lookahead),
    )]
    pub fn apply<'w>(
        &self,
        series: &CarbonSeries,
        workloads: impl IntoIterator<Item = &'w mut Workload>,
        decisions: Decisions,
    ) -> Result<Delays> {
        let mut delays = Delays::default();

        for workload in workloads {
            delays.consider();
            if !self.acceptance.draw(&mut decisions.rng(workload.id)) {
                continue;
            }
            if let Some(window) = self.find_window(series, workload)? {
                let delay = window.start - workload.window.start;
                trace!(workload.id, from = ?workload.window, to = ?window, "rescheduled");
                workload.window = window;
                delays.record(delay);
            }
        }

        info!(delays.n_eligible, delays.n_adjusted, "done");
        Ok(delays)
    }

    fn find_window(&self, series: &CarbonSeries, workload: &Workload) -> Result<Option<Window>> {
        let buckets = workload.window.buckets();
        let run_length = buckets.len();
        if run_length == 0 {
            return Ok(None);
        }
        let target = workload.average_pmoer(series)? - self.confidence_threshold;
        let bound = buckets.start.saturating_add(self.lookahead).min(series.len());
        let average =
            |start: usize| series.window_average(SeriesKind::Forecast, start..start + run_length);

        // The successor window `[start + 1, start + 1 + run_length)` must stay inside the bound:
        for start in (buckets.start + 1..).take_while(|start| start + run_length + 1 < bound) {
            let current = average(start)?;
            if current < target && current <= average(start - 1)? && current <= average(start + 1)?
            {
                return Ok(Some(Window::from_buckets(start, run_length)));
            }
        }
        Ok(None)
    }
}
