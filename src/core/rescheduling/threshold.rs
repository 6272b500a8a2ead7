use serde::{Deserialize, Serialize};

use crate::{
    core::{
        acceptance::{AcceptanceRate, Decisions},
        carbon::CarbonSeries,
        delays::Delays,
        window::Window,
        windows::LowCarbonWindows,
        workload::Workload,
    },
    prelude::*,
};

/// Rescheduling by thresholds: move a workload into the first upcoming below-threshold window
/// that fits it and beats its current forecast MOER.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdWindow {
    pub acceptance: AcceptanceRate,

    /// Forecast MOER below which a bucket counts as low-carbon.
    pub moer_threshold: u32,

    /// How many buckets ahead the forecast can be trusted.
    pub lookahead: usize,
}

impl Default for ThresholdWindow {
    fn default() -> Self {
        Self { acceptance: AcceptanceRate::ALWAYS, moer_threshold: 810, lookahead: 288 }
    }
}

impl ThresholdWindow {
    pub fn validate(&self) -> Result {
        ensure!(self.lookahead != 0, "threshold lookahead must be positive");
        Ok(())
    }

    #[instrument(skip_all, fields(threshold = self.moer_threshold, lookahead = self.lookahead))]
    pub fn apply<'w>(
        &self,
        series: &CarbonSeries,
        workloads: impl IntoIterator<Item = &'w mut Workload>,
        decisions: Decisions,
    ) -> Result<Delays> {
        let windows = LowCarbonWindows::extract(series, self.moer_threshold);
        let mut delays = Delays::default();

        for workload in workloads {
            delays.consider();
            if !self.acceptance.draw(&mut decisions.rng(workload.id)) {
                continue;
            }
            if let Some(window) = self.find_window(series, &windows, workload)? {
                let delay = window.start - workload.window.start;
                trace!(workload.id, from = ?workload.window, to = ?window, "rescheduled");
                workload.window = window;
                delays.record(delay);
            }
        }

        info!(delays.n_eligible, delays.n_adjusted, "done");
        Ok(delays)
    }

    /// First fitting window within the forecast horizon.
    fn find_window(
        &self,
        series: &CarbonSeries,
        windows: &LowCarbonWindows,
        workload: &Workload,
    ) -> Result<Option<Window>> {
        let buckets = workload.window.buckets();
        let run_length = buckets.len();
        let horizon = buckets.start.saturating_add(self.lookahead);
        let current_average = workload.average_pmoer(series)?;

        for candidate in windows.starting_from(buckets.start) {
            if candidate.buckets.start >= horizon || candidate.buckets.end > horizon {
                // Ordered by start, so the following ones are out of reach as well:
                break;
            }
            if candidate.len() < run_length || candidate.average_forecast >= current_average {
                continue;
            }
            return Ok(Some(Window::from_buckets(candidate.buckets.start, run_length)));
        }
        Ok(None)
    }
}
