use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    core::{acceptance::AcceptanceRate, workload::Workload},
    prelude::*,
    quantity::currency::Dollars,
};

/// Reduce the core count of over-provisioned workloads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoreReduction {
    pub acceptance: AcceptanceRate,

    /// Allowed core counts, ascending.
    pub core_counts: Vec<u32>,

    /// p95 utilisation above which a workload is considered saturated.
    pub p95_threshold: f64,

    /// Workloads wasting no more than this are not worth the disruption.
    pub waste_threshold: Dollars,
}

impl Default for CoreReduction {
    fn default() -> Self {
        Self {
            acceptance: AcceptanceRate::ALWAYS,
            core_counts: vec![2, 4, 8, 12, 24, 30],
            p95_threshold: 0.8,
            waste_threshold: Dollars(5.0),
        }
    }
}

impl CoreReduction {
    pub fn validate(&self) -> Result {
        ensure!(!self.core_counts.is_empty(), "at least one core count is required");
        ensure!(!self.core_counts.contains(&0), "core counts must be positive");
        ensure!(
            self.core_counts.is_sorted_by(|lhs, rhs| lhs < rhs),
            "core counts must be strictly ascending: {:?}",
            self.core_counts,
        );
        ensure!(
            self.p95_threshold > 0.0 && self.p95_threshold <= 1.0,
            "p95 threshold must be within `(0, 1]`, got {}",
            self.p95_threshold,
        );
        ensure!(
            self.waste_threshold >= Dollars::ZERO,
            "waste threshold must not be negative, got {}",
            self.waste_threshold,
        );
        Ok(())
    }

    /// Returns `true` if the core count was reduced.
    pub fn apply(&self, workload: &mut Workload, rng: &mut impl Rng) -> bool {
        if workload.utilization.p95 >= self.p95_threshold {
            return false;
        }
        if workload.waste() <= self.waste_threshold {
            return false;
        }
        let Some(cores) = self.smallest_fitting(workload) else {
            return false;
        };
        if cores >= workload.cores || !self.acceptance.draw(rng) {
            return false;
        }

        let ratio = f64::from(workload.cores) / f64::from(cores);
        trace!(workload.id, from = workload.cores, to = cores, "reducing cores");
        workload.cores = cores;
        workload.utilization = workload.utilization.rescaled(ratio);
        true
    }

    /// Smallest allowed core count not above the current one that keeps the workload unsaturated.
    fn smallest_fitting(&self, workload: &Workload) -> Option<u32> {
        self.core_counts
            .iter()
            .copied()
            .take_while(|&cores| cores <= workload.cores)
            .find(|&cores| {
                let utilization =
                    workload.utilization.rescaled(f64::from(workload.cores) / f64::from(cores));
                utilization.p95 < self.p95_threshold && utilization.maximum <= 1.0
            })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rand::{SeedableRng, rngs::SmallRng};

    use super::*;
    use crate::core::workload::{Utilization, tests::idle_workload};

    fn policy(core_counts: Vec<u32>) -> CoreReduction {
        CoreReduction { core_counts, ..CoreReduction::default() }
    }

    #[test]
    fn reduces_to_smallest_fitting_count() {
        let mut workload = idle_workload();
        let waste_before = workload.waste();
        assert!(policy(vec![2, 4, 8]).apply(&mut workload, &mut SmallRng::seed_from_u64(42)));
        // 2 cores: p95 0.15 × 4 = 0.6 < 0.8 and max 0.2 × 4 = 0.8 <= 1.
        assert_eq!(workload.cores, 2);
        assert_abs_diff_eq!(workload.utilization.p95, 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(workload.utilization.maximum, 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(workload.utilization.average, 0.4, epsilon = 1e-12);
        assert!(workload.utilization.maximum <= 1.0);
        assert!(workload.waste() < waste_before);
    }

    #[test]
    fn peak_utilization_limits_the_reduction() {
        let mut workload = idle_workload();
        workload.utilization = Utilization { average: 0.1, maximum: 0.4, p95: 0.15 };
        assert!(policy(vec![2, 4, 8]).apply(&mut workload, &mut SmallRng::seed_from_u64(42)));
        // 2 cores would peak at 1.6, 4 cores peak at 0.8:
        assert_eq!(workload.cores, 4);
        assert_abs_diff_eq!(workload.utilization.maximum, 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(workload.utilization.p95, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn no_smaller_count_qualifies() {
        let mut workload = idle_workload();
        workload.utilization = Utilization { average: 0.1, maximum: 0.4, p95: 0.5 };
        let original = workload.clone();
        // 2 cores: p95 0.5 × 8 / 2 = 2.0, 4 cores: p95 0.5 × 8 / 4 = 1.0, 8 is the current count.
        assert!(!policy(vec![2, 4, 8]).apply(&mut workload, &mut SmallRng::seed_from_u64(42)));
        assert_eq!(workload, original);
    }

    #[test]
    fn saturated_workload_is_skipped() {
        let mut workload = idle_workload();
        workload.utilization.p95 = 0.8;
        let original = workload.clone();
        assert!(!policy(vec![2, 4, 8]).apply(&mut workload, &mut SmallRng::seed_from_u64(42)));
        assert_eq!(workload, original);
    }

    #[test]
    fn small_waste_is_skipped() {
        let mut workload = idle_workload();
        let policy = CoreReduction { waste_threshold: workload.waste(), ..policy(vec![2, 4, 8]) };
        assert!(!policy.apply(&mut workload, &mut SmallRng::seed_from_u64(42)));
        assert_eq!(workload.cores, 8);
    }

    #[test]
    fn is_idempotent() {
        let policy = policy(vec![2, 4, 8, 12, 24, 30]);
        let mut rng = SmallRng::seed_from_u64(42);
        let mut workload = idle_workload();
        assert!(policy.apply(&mut workload, &mut rng));
        let adjusted = workload.clone();
        assert!(!policy.apply(&mut workload, &mut rng));
        assert_eq!(workload, adjusted);
    }

    #[test]
    fn zero_acceptance_changes_nothing() {
        let mut workload = idle_workload();
        let original = workload.clone();
        let policy = CoreReduction { acceptance: AcceptanceRate::NEVER, ..policy(vec![2, 4, 8]) };
        assert!(!policy.apply(&mut workload, &mut SmallRng::seed_from_u64(42)));
        assert_eq!(workload, original);
    }

    #[test]
    fn validation() {
        assert!(CoreReduction::default().validate().is_ok());
        assert!(policy(vec![]).validate().is_err());
        assert!(policy(vec![4, 2]).validate().is_err());
        assert!(policy(vec![2, 2]).validate().is_err());
        assert!(policy(vec![0, 2]).validate().is_err());
        let policy = CoreReduction { p95_threshold: 0.0, ..CoreReduction::default() };
        assert!(policy.validate().is_err());
        assert!(
            CoreReduction { waste_threshold: Dollars(-1.0), ..CoreReduction::default() }
                .validate()
                .is_err()
        );
    }
}
