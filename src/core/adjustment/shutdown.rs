use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    core::{acceptance::AcceptanceRate, workload::Workload},
    prelude::*,
};

/// Shut down workloads whose utilisation is dominated by idling.
///
/// The workload is assumed to have done its useful work at peak utilisation, so its lifetime
/// shrinks to the share of the original runtime that the average utilisation accounts for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shutdown {
    pub acceptance: AcceptanceRate,

    /// Utilisation of a workload that does nothing.
    pub idle_floor: f64,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self { acceptance: AcceptanceRate::ALWAYS, idle_floor: 0.01 }
    }
}

impl Shutdown {
    /// Minimal ratio of the peak to the average busy utilisation.
    const MIN_PEAK_RATIO: f64 = 10.0;

    pub fn validate(&self) -> Result {
        ensure!(
            (0.0..1.0).contains(&self.idle_floor),
            "idle floor must be within `0..1`, got {}",
            self.idle_floor,
        );
        Ok(())
    }

    /// Returns `true` if the workload was shut down earlier.
    pub fn apply(&self, workload: &mut Workload, rng: &mut impl Rng) -> bool {
        let busy_average = workload.utilization.average - self.idle_floor;
        let busy_maximum = workload.utilization.maximum - self.idle_floor;

        // Also rejects `NaN` when both are at the idle floor:
        if !(busy_maximum / busy_average > Self::MIN_PEAK_RATIO) {
            return false;
        }
        if !self.acceptance.draw(rng) {
            return false;
        }

        let used_fraction = (busy_average / busy_maximum).clamp(0.0, 1.0);
        #[expect(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
        let used_seconds = (used_fraction * workload.original_window.duration() as f64) as i64;
        let window = workload.window.truncated(used_seconds);
        trace!(workload.id, from = ?workload.window, to = ?window, "shutting down");

        workload.window = window;
        workload.utilization.average = workload.utilization.maximum;
        workload.utilization.p95 = workload.utilization.maximum;
        true
    }
}
