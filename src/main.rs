use std::{
    fs::{self, File},
    io::BufWriter,
    path::Path,
};

use carbon_shift::{
    cli::{Args, Command, SimulateArgs, WindowsArgs},
    core::{
        cycle::{Cycle, Outcome},
        parameters::Parameters,
        windows::LowCarbonWindows,
    },
    prelude::*,
    tables::{build_outcomes_table, build_windows_table},
    trace,
};
use clap::{Parser, crate_version};
use tracing_subscriber::EnvFilter;

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .without_time()
        .compact()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Simulate(args) => simulate(&args)?,
        Command::Windows(args) => windows(&args)?,
    }

    info!("done!");
    Ok(())
}

#[instrument(skip_all)]
fn simulate(args: &SimulateArgs) -> Result {
    let parameters = args.parameters.parameters();
    parameters.validate()?;

    let series = trace::load_carbon_series(&args.carbon_trace.path)?;
    let workloads = trace::load_workloads(&args.vm_trace, &series, args.vm_limit)?;
    if workloads.is_empty() {
        warn!("no workloads to simulate");
    }

    let cycle = Cycle::builder()
        .series(&series)
        .workloads(&workloads)
        .eligibility(parameters.eligibility)
        .seed(parameters.seed)
        .build();
    let outcomes = parameters
        .scenarios(args.reschedulings(), args.adjustments())
        .iter()
        .map(|scenario| cycle.run(scenario))
        .collect::<Result<Vec<_>>>()?;
    println!("{}", build_outcomes_table(&outcomes));

    if let Some(output_dir) = &args.output_dir {
        save(output_dir, &parameters, &outcomes)?;
    }
    Ok(())
}

/// Save the effective parameters and the final placements of every scenario.
fn save(output_dir: &Path, parameters: &Parameters, outcomes: &[Outcome]) -> Result {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create `{}`", output_dir.display()))?;

    let path = output_dir.join("parameters.toml");
    fs::write(&path, toml::to_string_pretty(parameters)?)
        .with_context(|| format!("failed to write `{}`", path.display()))?;

    for outcome in outcomes {
        let path = output_dir.join(format!("{}.csv", outcome.scenario));
        let file =
            File::create(&path).with_context(|| format!("failed to create `{}`", path.display()))?;
        trace::write_placements(BufWriter::new(file), outcome.placements())
            .with_context(|| format!("failed to write `{}`", path.display()))?;
    }
    info!(output_dir = %output_dir.display(), n_scenarios = outcomes.len(), "saved");
    Ok(())
}

fn windows(args: &WindowsArgs) -> Result {
    let series = trace::load_carbon_series(&args.carbon_trace.path)?;
    let windows = LowCarbonWindows::extract(&series, args.moer_threshold);
    info!(n_windows = windows.len(), "extracted low-carbon windows");
    println!("{}", build_windows_table(&windows));
    Ok(())
}
