use enumset::EnumSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        adjustment::{Adjustment, AdjustmentKind, CoreReduction, Shutdown},
        eligibility::Eligibility,
        rescheduling::{MovingAverage, Rescheduling, ReschedulingKind, ThresholdWindow},
        scenario::Scenario,
    },
    prelude::*,
};

/// Every tunable of a simulation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// Seed of the acceptance draws.
    pub seed: u64,

    pub eligibility: Eligibility,
    pub threshold: ThresholdWindow,
    pub moving_average: MovingAverage,
    pub core_reduction: CoreReduction,
    pub shutdown: Shutdown,
}

impl Parameters {
    pub fn validate(&self) -> Result {
        self.eligibility.validate().context("invalid eligibility")?;
        self.threshold.validate().context("invalid RT parameters")?;
        self.moving_average.validate().context("invalid RA parameters")?;
        self.core_reduction.validate().context("invalid CR parameters")?;
        self.shutdown.validate().context("invalid SD parameters")?;
        Ok(())
    }

    #[must_use]
    pub fn rescheduling(&self, kind: ReschedulingKind) -> Rescheduling {
        match kind {
            ReschedulingKind::None => Rescheduling::None,
            ReschedulingKind::Threshold => Rescheduling::Threshold(self.threshold.clone()),
            ReschedulingKind::MovingAverage => {
                Rescheduling::MovingAverage(self.moving_average.clone())
            }
        }
    }

    #[must_use]
    pub fn adjustment(&self, kind: AdjustmentKind) -> Adjustment {
        match kind {
            AdjustmentKind::None => Adjustment::None,
            AdjustmentKind::CoreReduction => Adjustment::CoreReduction(self.core_reduction.clone()),
            AdjustmentKind::Shutdown => Adjustment::Shutdown(self.shutdown.clone()),
        }
    }

    /// Every combination of the selected policies, the baseline always first.
    pub fn scenarios(
        &self,
        reschedulings: EnumSet<ReschedulingKind>,
        adjustments: EnumSet<AdjustmentKind>,
    ) -> Vec<Scenario> {
        (reschedulings | ReschedulingKind::None)
            .iter()
            .cartesian_product((adjustments | AdjustmentKind::None).iter())
            .map(|(rescheduling, adjustment)| Scenario {
                rescheduling: self.rescheduling(rescheduling),
                adjustment: self.adjustment(adjustment),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_comes_first() {
        let scenarios = Parameters::default()
            .scenarios(ReschedulingKind::Threshold.into(), AdjustmentKind::CoreReduction.into());
        let names = scenarios.iter().map(Scenario::name).collect_vec();
        assert_eq!(names, ["baseline", "CR", "RT", "RT+CR"]);
        assert!(scenarios[0].is_baseline());
    }

    #[test]
    fn all_scenarios() {
        let scenarios = Parameters::default().scenarios(EnumSet::all(), EnumSet::all());
        assert_eq!(scenarios.len(), 9);
        assert_eq!(scenarios.iter().filter(|scenario| scenario.is_baseline()).count(), 1);
    }

    #[test]
    fn scenarios_carry_the_parameters() {
        let mut parameters = Parameters::default();
        parameters.threshold.moer_threshold = 500;
        let scenarios = parameters.scenarios(ReschedulingKind::Threshold.into(), EnumSet::empty());
        assert_eq!(
            scenarios[1].rescheduling,
            Rescheduling::Threshold(ThresholdWindow {
                moer_threshold: 500,
                ..ThresholdWindow::default()
            }),
        );
    }

    #[test]
    fn validation_names_the_policy() {
        let mut parameters = Parameters::default();
        assert!(parameters.validate().is_ok());
        parameters.core_reduction.core_counts = vec![4, 2];
        let error = parameters.validate().unwrap_err();
        assert_eq!(error.to_string(), "invalid CR parameters");
    }

    #[test]
    fn toml_roundtrip() {
        let parameters = Parameters { seed: 7, ..Parameters::default() };
        let serialized = toml::to_string(&parameters).unwrap();
        assert_eq!(toml::from_str::<Parameters>(&serialized).unwrap(), parameters);
    }
}
