use std::fmt::{Display, Formatter};

use crate::{
    core::{
        adjustment::{Adjustment, AdjustmentKind},
        rescheduling::{Rescheduling, ReschedulingKind},
    },
    prelude::*,
};

/// One rescheduling policy followed by one adjustment policy.
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct Scenario {
    pub rescheduling: Rescheduling,
    pub adjustment: Adjustment,
}

impl Scenario {
    /// Do-nothing scenario the others are compared against.
    pub const BASELINE: Self =
        Self { rescheduling: Rescheduling::None, adjustment: Adjustment::None };

    #[must_use]
    pub const fn is_baseline(&self) -> bool {
        matches!(self.rescheduling, Rescheduling::None)
            && matches!(self.adjustment, Adjustment::None)
    }

    pub fn validate(&self) -> Result {
        self.rescheduling.validate().with_context(|| format!("invalid `{self}` rescheduling"))?;
        self.adjustment.validate().with_context(|| format!("invalid `{self}` adjustment"))?;
        Ok(())
    }

    /// Short name, for example `RT+CR`.
    #[must_use]
    pub fn name(&self) -> String {
        match (self.rescheduling.kind(), self.adjustment.kind()) {
            (ReschedulingKind::None, AdjustmentKind::None) => "baseline".to_string(),
            (rescheduling, AdjustmentKind::None) => rescheduling.to_string(),
            (ReschedulingKind::None, adjustment) => adjustment.to_string(),
            (rescheduling, adjustment) => format!("{rescheduling}+{adjustment}"),
        }
    }
}

impl Display for Scenario {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{adjustment::Shutdown, rescheduling::ThresholdWindow};

    #[test]
    fn names() {
        assert_eq!(Scenario::BASELINE.name(), "baseline");
        assert!(Scenario::BASELINE.is_baseline());

        let scenario = Scenario {
            rescheduling: Rescheduling::Threshold(ThresholdWindow::default()),
            adjustment: Adjustment::Shutdown(Shutdown::default()),
        };
        assert_eq!(scenario.to_string(), "RT+SD");
        assert!(!scenario.is_baseline());

        let scenario = Scenario { adjustment: Adjustment::None, ..scenario };
        assert_eq!(scenario.name(), "RT");
    }
}
