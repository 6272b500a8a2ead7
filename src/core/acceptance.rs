use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use rand::{Rng, SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Probability that a user adopts a recommendation.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct AcceptanceRate(f64);

impl AcceptanceRate {
    pub const ALWAYS: Self = Self(1.0);
    pub const NEVER: Self = Self(0.0);

    pub fn try_new(rate: f64) -> Result<Self> {
        ensure!((0.0..=1.0).contains(&rate), "acceptance rate must be within `0..=1`, got {rate}");
        Ok(Self(rate))
    }

    /// Draw whether the recommendation is accepted.
    ///
    /// Consumes at most one value from the generator.
    pub fn draw(self, rng: &mut impl Rng) -> bool {
        rng.random_bool(self.0)
    }
}

impl Default for AcceptanceRate {
    fn default() -> Self {
        Self::ALWAYS
    }
}

impl TryFrom<f64> for AcceptanceRate {
    type Error = Error;

    fn try_from(rate: f64) -> Result<Self> {
        Self::try_new(rate)
    }
}

impl From<AcceptanceRate> for f64 {
    fn from(rate: AcceptanceRate) -> Self {
        rate.0
    }
}

impl FromStr for AcceptanceRate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_new(s.parse().with_context(|| format!("`{s}` is not a number"))?)
    }
}

/// Acceptance generators of a single policy stage, one independent stream per workload.
///
/// A decision for one workload never depends on how many draws were made for the others.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[must_use]
pub struct Decisions(u64);

impl Decisions {
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Derive the decisions of another stage from the same seed.
    pub const fn salted(self, salt: u64) -> Self {
        Self(self.0 ^ salt)
    }

    pub fn rng(self, workload_id: u32) -> SmallRng {
        SmallRng::seed_from_u64(self.0 ^ u64::from(workload_id).rotate_left(32))
    }
}

impl Display for AcceptanceRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}%", self.0 * 100.0)
    }
}
