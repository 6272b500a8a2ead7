mod moving_average;
mod threshold;

pub use self::{moving_average::MovingAverage, threshold::ThresholdWindow};
use crate::{
    core::{acceptance::Decisions, carbon::CarbonSeries, delays::Delays, workload::Workload},
    prelude::*,
};

/// Policy that moves workload run windows in time.
#[derive(Clone, Debug, PartialEq)]
pub enum Rescheduling {
    /// Keep the original windows.
    None,

    Threshold(ThresholdWindow),

    MovingAverage(MovingAverage),
}

impl Rescheduling {
    #[must_use]
    pub const fn kind(&self) -> ReschedulingKind {
        match self {
            Self::None => ReschedulingKind::None,
            Self::Threshold(_) => ReschedulingKind::Threshold,
            Self::MovingAverage(_) => ReschedulingKind::MovingAverage,
        }
    }

    pub fn validate(&self) -> Result {
        match self {
            Self::None => Ok(()),
            Self::Threshold(policy) => policy.validate(),
            Self::MovingAverage(policy) => policy.validate(),
        }
    }

    /// Apply the policy to the workloads and return the postponement statistics.
    pub fn apply<'w>(
        &self,
        series: &CarbonSeries,
        workloads: impl IntoIterator<Item = &'w mut Workload>,
        decisions: Decisions,
    ) -> Result<Delays> {
        match self {
            Self::None => {
                let mut delays = Delays::default();
                workloads.into_iter().for_each(|_| delays.consider());
                Ok(delays)
            }
            Self::Threshold(policy) => policy.apply(series, workloads, decisions),
            Self::MovingAverage(policy) => policy.apply(series, workloads, decisions),
        }
    }
}

#[derive(Debug, clap::ValueEnum, enumset::EnumSetType, derive_more::Display)]
pub enum ReschedulingKind {
    /// Keep the original run windows.
    #[display("none")]
    None,

    /// Move into the first fitting below-threshold forecast window (RT).
    #[display("RT")]
    Threshold,

    /// Move to the first local minimum of the forecast moving average (RA).
    #[display("RA")]
    MovingAverage,
}
