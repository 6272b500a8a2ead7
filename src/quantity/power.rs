use std::ops::Mul;

use crate::quantity::{energy::MegawattHours, time::Hours};

quantity!(Watts, via: f64, suffix: "W", precision: 1);

impl Watts {
    /// Clamp negative regression outputs to zero.
    #[must_use]
    pub const fn non_negative(self) -> Self {
        Self(self.0.max(0.0))
    }
}

impl Mul<Hours> for Watts {
    type Output = MegawattHours;

    fn mul(self, hours: Hours) -> Self::Output {
        MegawattHours(self.0 * hours.0 / 1_000_000.0)
    }
}
