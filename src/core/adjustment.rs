mod core_reduction;
mod shutdown;

use rand::Rng;

pub use self::{core_reduction::CoreReduction, shutdown::Shutdown};
use crate::{core::workload::Workload, prelude::*};

/// Per-workload policy that right-sizes the allocated resources.
#[derive(Clone, Debug, PartialEq)]
pub enum Adjustment {
    /// Keep the original resources.
    None,

    CoreReduction(CoreReduction),

    Shutdown(Shutdown),
}

impl Adjustment {
    #[must_use]
    pub const fn kind(&self) -> AdjustmentKind {
        match self {
            Self::None => AdjustmentKind::None,
            Self::CoreReduction(_) => AdjustmentKind::CoreReduction,
            Self::Shutdown(_) => AdjustmentKind::Shutdown,
        }
    }

    pub fn validate(&self) -> Result {
        match self {
            Self::None => Ok(()),
            Self::CoreReduction(policy) => policy.validate(),
            Self::Shutdown(policy) => policy.validate(),
        }
    }

    /// Adjust the workload in place and tell whether anything changed.
    pub fn apply(&self, workload: &mut Workload, rng: &mut impl Rng) -> bool {
        match self {
            Self::None => false,
            Self::CoreReduction(policy) => policy.apply(workload, rng),
            Self::Shutdown(policy) => policy.apply(workload, rng),
        }
    }
}

#[derive(Debug, clap::ValueEnum, enumset::EnumSetType, derive_more::Display)]
pub enum AdjustmentKind {
    /// Keep the original resources.
    #[display("none")]
    None,

    /// Shrink the core count while the peak utilisation still fits (CR).
    #[display("CR")]
    CoreReduction,

    /// Shut idle-dominated workloads down early (SD).
    #[display("SD")]
    Shutdown,
}
