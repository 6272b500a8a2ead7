use bon::Builder;

use crate::{
    core::{
        acceptance::Decisions,
        carbon::CarbonSeries,
        delays::Delays,
        eligibility::Eligibility,
        scenario::Scenario,
        workload::{Placement, Workload},
    },
    prelude::*,
    quantity::{currency::Dollars, emissions::Pounds},
};

/// Salts that give every policy stage its own acceptance decisions.
const RESCHEDULING_SALT: u64 = 0x5245_5343_4845_4455;
const ADJUSTMENT_SALT: u64 = 0x4144_4a55_5354_4d54;

/// Run context: the workloads as loaded from the trace and the shared carbon series.
///
/// Every scenario runs on a fresh copy of the workloads.
#[derive(Builder)]
pub struct Cycle<'a> {
    series: &'a CarbonSeries,
    workloads: &'a [Workload],

    #[builder(default)]
    eligibility: Eligibility,

    /// Seed of the acceptance draws.
    #[builder(default)]
    seed: u64,
}

impl Cycle<'_> {
    /// Apply the scenario policies and aggregate the results.
    ///
    /// The parameters are validated before any workload is touched.
    #[instrument(skip_all, fields(scenario = %scenario, n_workloads = self.workloads.len()))]
    pub fn run(&self, scenario: &Scenario) -> Result<Outcome> {
        scenario.validate()?;
        self.eligibility.validate()?;

        let mut workloads = self.workloads.to_vec();

        let decisions = Decisions::new(self.seed);

        let delays = {
            let eligible =
                workloads.iter_mut().filter(|workload| self.eligibility.contains(workload));
            let decisions = decisions.salted(RESCHEDULING_SALT);
            scenario.rescheduling.apply(self.series, eligible, decisions)?
        };

        let n_adjusted = {
            let decisions = decisions.salted(ADJUSTMENT_SALT);
            workloads
                .iter_mut()
                .map(|workload| {
                    scenario.adjustment.apply(workload, &mut decisions.rng(workload.id))
                })
                .filter(|is_adjusted| *is_adjusted)
                .count()
        };

        let outcome =
            Outcome::try_aggregate(scenario.name(), self.series, workloads, delays, n_adjusted)?;
        info!(
            %outcome.carbon,
            %outcome.waste,
            outcome.delays.n_eligible,
            outcome.delays.n_adjusted,
            outcome.n_adjusted,
            "done",
        );
        Ok(outcome)
    }
}

/// Aggregated results of a single scenario together with the final workloads.
#[derive(Clone, Debug)]
#[must_use]
pub struct Outcome {
    pub scenario: String,

    /// Emissions under the observed MOER.
    pub carbon: Pounds,

    /// Emissions as the forecast predicted them.
    pub predicted_carbon: Pounds,

    pub cost: Dollars,
    pub waste: Dollars,

    /// Postponements made by the rescheduling policy.
    pub delays: Delays,

    /// Number of workloads changed by the adjustment policy.
    pub n_adjusted: usize,

    pub workloads: Vec<Workload>,
}

impl Outcome {
    fn try_aggregate(
        scenario: String,
        series: &CarbonSeries,
        workloads: Vec<Workload>,
        delays: Delays,
        n_adjusted: usize,
    ) -> Result<Self> {
        let mut carbon = Pounds::ZERO;
        let mut predicted_carbon = Pounds::ZERO;
        for workload in &workloads {
            carbon += workload
                .carbon(series)
                .with_context(|| format!("workload #{} is out of the carbon series", workload.id))?;
            predicted_carbon += workload.predicted_carbon(series)?;
        }
        Ok(Self {
            scenario,
            carbon,
            predicted_carbon,
            cost: workloads.iter().map(Workload::cost).sum(),
            waste: workloads.iter().map(Workload::waste).sum(),
            delays,
            n_adjusted,
            workloads,
        })
    }

    /// Number of workloads that start later than originally.
    #[must_use]
    pub fn n_rescheduled(&self) -> usize {
        self.workloads.iter().filter(|workload| workload.is_rescheduled()).count()
    }

    pub fn placements(&self) -> impl Iterator<Item = Placement> {
        self.workloads.iter().map(Workload::placement)
    }
}
