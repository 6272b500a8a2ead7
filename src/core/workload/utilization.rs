use serde::{Deserialize, Serialize};

/// CPU utilisation statistics of a workload, every field a fraction of the allocated cores.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Utilization {
    pub average: f64,
    pub maximum: f64,

    /// 95th percentile.
    pub p95: f64,
}

impl Utilization {
    /// Convert trace percentages (`0..=100`) into fractions.
    pub const fn from_percentages(average: f64, maximum: f64, p95: f64) -> Self {
        Self { average: average / 100.0, maximum: maximum / 100.0, p95: p95 / 100.0 }
    }

    /// Scale every statistic by the same ratio, for example when the core count changes.
    #[must_use]
    pub const fn rescaled(self, ratio: f64) -> Self {
        Self { average: self.average * ratio, maximum: self.maximum * ratio, p95: self.p95 * ratio }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn from_percentages() {
        let utilization = Utilization::from_percentages(12.5, 90.0, 50.0);
        assert_abs_diff_eq!(utilization.average, 0.125);
        assert_abs_diff_eq!(utilization.maximum, 0.9);
        assert_abs_diff_eq!(utilization.p95, 0.5);
    }

    #[test]
    fn rescaled() {
        let utilization = Utilization { average: 0.1, maximum: 0.2, p95: 0.15 }.rescaled(4.0);
        assert_abs_diff_eq!(utilization.average, 0.4);
        assert_abs_diff_eq!(utilization.maximum, 0.8);
        assert_abs_diff_eq!(utilization.p95, 0.6);
    }
}
