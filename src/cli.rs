use std::path::PathBuf;

use clap::{Parser, Subcommand};
use enumset::EnumSet;

use crate::{
    core::{
        acceptance::AcceptanceRate,
        adjustment::{AdjustmentKind, CoreReduction, Shutdown},
        eligibility::Eligibility,
        parameters::Parameters,
        rescheduling::{MovingAverage, ReschedulingKind, ThresholdWindow},
    },
    quantity::{currency::Dollars, emissions::Moer},
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: run every selected scenario over the traces and compare them.
    #[clap(name = "simulate")]
    Simulate(Box<SimulateArgs>),

    /// List the low-carbon windows of the forecast.
    #[clap(name = "windows")]
    Windows(WindowsArgs),
}

#[derive(Parser)]
pub struct CarbonTraceArgs {
    /// CSV with the observed and forecast MOER, one row per five-minute bucket.
    #[clap(long = "carbon-trace", env = "CARBON_TRACE")]
    pub path: PathBuf,
}

#[derive(Parser)]
pub struct SimulateArgs {
    #[clap(flatten)]
    pub carbon_trace: CarbonTraceArgs,

    /// CSV with the VM table.
    #[clap(long = "vm-trace", env = "VM_TRACE")]
    pub vm_trace: PathBuf,

    /// Load at most this many workloads.
    #[clap(long = "vm-limit", env = "VM_LIMIT")]
    pub vm_limit: Option<usize>,

    /// Write the final placements and the parameters into this directory.
    #[clap(long = "output-dir", env = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    #[clap(
        long = "reschedulings",
        env = "RESCHEDULINGS",
        value_delimiter = ',',
        num_args = 1..,
        default_value = "threshold,moving-average",
    )]
    pub reschedulings: Vec<ReschedulingKind>,

    #[clap(
        long = "adjustments",
        env = "ADJUSTMENTS",
        value_delimiter = ',',
        num_args = 1..,
        default_value = "core-reduction,shutdown",
    )]
    pub adjustments: Vec<AdjustmentKind>,

    #[clap(flatten)]
    pub parameters: ParameterArgs,
}

impl SimulateArgs {
    #[must_use]
    pub fn reschedulings(&self) -> EnumSet<ReschedulingKind> {
        self.reschedulings.iter().copied().collect()
    }

    #[must_use]
    pub fn adjustments(&self) -> EnumSet<AdjustmentKind> {
        self.adjustments.iter().copied().collect()
    }
}

#[derive(Parser)]
pub struct ParameterArgs {
    /// Seed of the acceptance draws.
    #[clap(long, env = "SEED", default_value = "0")]
    pub seed: u64,

    /// Shortest original runtime, in seconds, that rescheduling may move.
    #[clap(long = "min-runtime", env = "MIN_RUNTIME", default_value = "2100")]
    pub min_runtime: i64,

    /// Longest original runtime, in seconds, that rescheduling may move.
    #[clap(long = "max-runtime", env = "MAX_RUNTIME", default_value = "86100")]
    pub max_runtime: i64,

    /// How many five-minute buckets ahead the forecast can be trusted.
    #[clap(long, env = "LOOKAHEAD", default_value = "288")]
    pub lookahead: usize,

    /// Forecast MOER below which a bucket counts as low-carbon (RT).
    #[clap(long = "moer-threshold", env = "MOER_THRESHOLD", default_value = "810")]
    pub moer_threshold: u32,

    /// Minimal improvement of the forecast MOER worth a postponement (RA).
    #[clap(long = "confidence-threshold", env = "CONFIDENCE_THRESHOLD", default_value = "50")]
    pub confidence_threshold: Moer,

    /// Allowed core counts, ascending (CR).
    #[clap(
        long = "core-counts",
        env = "CORE_COUNTS",
        value_delimiter = ',',
        num_args = 1..,
        default_value = "2,4,8,12,24,30",
    )]
    pub core_counts: Vec<u32>,

    /// p95 utilisation above which a workload is saturated (CR).
    #[clap(long = "p95-threshold", env = "P95_THRESHOLD", default_value = "0.8")]
    pub p95_threshold: f64,

    /// Wasted spend below which a workload is left alone (CR).
    #[clap(long = "waste-threshold", env = "WASTE_THRESHOLD", default_value = "5")]
    pub waste_threshold: Dollars,

    /// Utilisation of a workload that does nothing (SD).
    #[clap(long = "idle-floor", env = "IDLE_FLOOR", default_value = "0.01")]
    pub idle_floor: f64,

    #[clap(flatten)]
    pub acceptance: AcceptanceArgs,
}

/// Probabilities that a user adopts the recommendation of each policy.
#[derive(Copy, Clone, Parser)]
pub struct AcceptanceArgs {
    #[clap(long = "rt-acceptance", env = "RT_ACCEPTANCE", default_value = "1")]
    pub threshold: AcceptanceRate,

    #[clap(long = "ra-acceptance", env = "RA_ACCEPTANCE", default_value = "1")]
    pub moving_average: AcceptanceRate,

    #[clap(long = "cr-acceptance", env = "CR_ACCEPTANCE", default_value = "1")]
    pub core_reduction: AcceptanceRate,

    #[clap(long = "sd-acceptance", env = "SD_ACCEPTANCE", default_value = "1")]
    pub shutdown: AcceptanceRate,
}

impl ParameterArgs {
    #[must_use]
    pub fn parameters(&self) -> Parameters {
        Parameters {
            seed: self.seed,
            eligibility: Eligibility {
                min_runtime: self.min_runtime,
                max_runtime: self.max_runtime,
            },
            threshold: ThresholdWindow {
                acceptance: self.acceptance.threshold,
                moer_threshold: self.moer_threshold,
                lookahead: self.lookahead,
            },
            moving_average: MovingAverage {
                acceptance: self.acceptance.moving_average,
                confidence_threshold: self.confidence_threshold,
                lookahead: self.lookahead,
            },
            core_reduction: CoreReduction {
                acceptance: self.acceptance.core_reduction,
                core_counts: self.core_counts.clone(),
                p95_threshold: self.p95_threshold,
                waste_threshold: self.waste_threshold,
            },
            shutdown: Shutdown {
                acceptance: self.acceptance.shutdown,
                idle_floor: self.idle_floor,
            },
        }
    }
}

#[derive(Parser)]
pub struct WindowsArgs {
    #[clap(flatten)]
    pub carbon_trace: CarbonTraceArgs,

    /// Forecast MOER below which a bucket counts as low-carbon.
    #[clap(long = "moer-threshold", env = "MOER_THRESHOLD", default_value = "810")]
    pub moer_threshold: u32,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_parameters() {
        let args = Args::try_parse_from([
            "carbon-shift",
            "simulate",
            "--carbon-trace",
            "carbon.csv",
            "--vm-trace",
            "vms.csv",
        ])
        .unwrap();
        let Command::Simulate(args) = args.command else {
            panic!("expected `simulate`");
        };
        assert_eq!(args.parameters.parameters(), Parameters::default());
        assert_eq!(
            args.reschedulings(),
            ReschedulingKind::Threshold | ReschedulingKind::MovingAverage,
        );
        assert_eq!(args.adjustments(), AdjustmentKind::CoreReduction | AdjustmentKind::Shutdown);
    }

    #[test]
    fn overrides() {
        let args = Args::try_parse_from([
            "carbon-shift",
            "simulate",
            "--carbon-trace=carbon.csv",
            "--vm-trace=vms.csv",
            "--reschedulings=threshold",
            "--adjustments=none",
            "--core-counts=4,16",
            "--rt-acceptance=0.5",
        ])
        .unwrap();
        let Command::Simulate(args) = args.command else {
            panic!("expected `simulate`");
        };
        let parameters = args.parameters.parameters();
        assert_eq!(parameters.core_reduction.core_counts, [4, 16]);
        assert_eq!(f64::from(parameters.threshold.acceptance), 0.5);
        assert_eq!(args.reschedulings(), EnumSet::only(ReschedulingKind::Threshold));
        assert_eq!(args.adjustments(), EnumSet::only(AdjustmentKind::None));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let result = Args::try_parse_from([
            "carbon-shift",
            "windows",
            "--carbon-trace=carbon.csv",
            "--moer-threshold=-1",
        ]);
        assert!(result.is_err());

        let result = Args::try_parse_from([
            "carbon-shift",
            "simulate",
            "--carbon-trace=carbon.csv",
            "--vm-trace=vms.csv",
            "--sd-acceptance=1.5",
        ]);
        assert!(result.is_err());
    }
}
