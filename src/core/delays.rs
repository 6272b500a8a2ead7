use crate::quantity::time::Hours;

/// Postponements made by one rescheduling pass.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[must_use]
pub struct Delays {
    /// Number of workloads the policy considered.
    pub n_eligible: usize,

    /// Number of workloads actually moved.
    pub n_adjusted: usize,

    /// Sum of the postponements in seconds.
    pub total_seconds: i64,
}

impl Delays {
    pub const fn consider(&mut self) {
        self.n_eligible += 1;
    }

    pub const fn record(&mut self, seconds: i64) {
        self.n_adjusted += 1;
        self.total_seconds += seconds;
    }

    /// Average postponement over every considered workload, `None` if there were none.
    #[must_use]
    pub fn average_over_eligible(self) -> Option<Hours> {
        Self::average(self.total_seconds, self.n_eligible)
    }

    /// Average postponement over the moved workloads only, `None` if nothing was moved.
    #[must_use]
    pub fn average_over_adjusted(self) -> Option<Hours> {
        Self::average(self.total_seconds, self.n_adjusted)
    }

    #[expect(clippy::cast_precision_loss)]
    fn average(total_seconds: i64, n: usize) -> Option<Hours> {
        (n != 0).then(|| Hours::from_seconds(total_seconds) / n as f64)
    }
}
