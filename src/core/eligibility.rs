use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::{core::workload::Workload, prelude::*};

/// Original runtimes, in seconds, of the workloads that rescheduling may move.
///
/// Very short workloads are not worth moving and day-long ones have nowhere to go.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Eligibility {
    pub min_runtime: i64,
    pub max_runtime: i64,
}

impl Default for Eligibility {
    fn default() -> Self {
        Self { min_runtime: 2100, max_runtime: 86_100 }
    }
}

impl Eligibility {
    pub fn validate(&self) -> Result {
        ensure!(self.min_runtime >= 0, "minimal runtime must not be negative");
        ensure!(
            self.min_runtime <= self.max_runtime,
            "eligible runtimes are empty: {}..={}",
            self.min_runtime,
            self.max_runtime,
        );
        Ok(())
    }

    #[must_use]
    pub const fn runtimes(&self) -> RangeInclusive<i64> {
        self.min_runtime..=self.max_runtime
    }

    #[must_use]
    pub fn contains(&self, workload: &Workload) -> bool {
        self.runtimes().contains(&workload.runtime)
    }
}
