//! CSV traces: the carbon series and the VM table in, the final placements out.

use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::{
    core::{
        carbon::CarbonSeries,
        window::Window,
        workload::{Placement, Utilization, Workload},
    },
    prelude::*,
};

/// Columns of the VM table. Further columns are ignored.
mod column {
    pub const START: usize = 0;
    pub const END: usize = 1;
    pub const MAX_UTILIZATION: usize = 2;
    pub const AVERAGE_UTILIZATION: usize = 3;
    pub const P95_UTILIZATION: usize = 4;
    pub const CORES: usize = 5;
    pub const RAM_GIGABYTES: usize = 6;

    pub const COUNT: usize = 7;
}

pub fn load_carbon_series(path: &Path) -> Result<CarbonSeries> {
    let file = File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
    read_carbon_series(file).with_context(|| format!("failed to read `{}`", path.display()))
}

/// Read the observed and forecast MOER, one row per five-minute bucket.
///
/// Decimal values are truncated to whole pounds per megawatt-hour.
pub fn read_carbon_series(reader: impl Read) -> Result<CarbonSeries> {
    let mut observed = Vec::new();
    let mut forecast = Vec::new();
    for record in reader_builder().from_reader(reader).records() {
        let record = record?;
        observed.push(moer(&record, 0)?);
        forecast.push(moer(&record, 1)?);
    }
    let series = CarbonSeries::try_new(observed, forecast)?;
    info!(len = series.len(), "loaded carbon series");
    Ok(series)
}

pub fn load_workloads(
    path: &Path,
    series: &CarbonSeries,
    limit: Option<usize>,
) -> Result<Vec<Workload>> {
    let file = File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
    read_workloads(file, series, limit)
        .with_context(|| format!("failed to read `{}`", path.display()))
}

/// Read at most `limit` workloads from the VM table.
///
/// Rows missing any of the used values are skipped. Run windows are floored onto the bucket grid,
/// and workloads running outside the carbon series are dropped.
pub fn read_workloads(
    reader: impl Read,
    series: &CarbonSeries,
    limit: Option<usize>,
) -> Result<Vec<Workload>> {
    let limit = limit.unwrap_or(usize::MAX);
    let mut workloads = Vec::new();
    let (mut n_incomplete, mut n_outside) = (0_usize, 0_usize);

    for record in reader_builder().from_reader(reader).records() {
        if workloads.len() >= limit {
            break;
        }
        let record = record?;
        if (0..column::COUNT).any(|index| record.get(index).is_none_or(str::is_empty)) {
            n_incomplete += 1;
            continue;
        }
        let line = record.position().map_or(0, csv::Position::line);
        let id = u32::try_from(workloads.len())?;
        let workload = parse_workload(id, &record).with_context(|| format!("line {line}"))?;
        if workload.window.buckets().end > series.len() {
            trace!(line, window = ?workload.window, "outside the carbon series");
            n_outside += 1;
            continue;
        }
        workloads.push(workload);
    }

    if n_incomplete != 0 {
        debug!(n_incomplete, "skipped incomplete rows");
    }
    if n_outside != 0 {
        warn!(n_outside, series_len = series.len(), "dropped workloads outside the carbon series");
    }
    info!(n_workloads = workloads.len(), "loaded workloads");
    Ok(workloads)
}

/// Write the placements with a header row.
pub fn write_placements(
    writer: impl Write,
    placements: impl IntoIterator<Item = Placement>,
) -> Result {
    let mut writer = csv::Writer::from_writer(writer);
    for placement in placements {
        writer.serialize(placement)?;
    }
    writer.flush()?;
    Ok(())
}

fn reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.has_headers(true).flexible(true).trim(Trim::All);
    builder
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_workload(id: u32, record: &StringRecord) -> Result<Workload> {
    let start = number(record, column::START)?;
    let end = number(record, column::END)?;
    ensure!(
        0.0 <= start && start <= end && end.is_finite(),
        "invalid run window: {start}..{end}",
    );

    let cores = number(record, column::CORES)?;
    ensure!(cores >= 1.0, "invalid core count: {cores}");
    let ram_gigabytes = number(record, column::RAM_GIGABYTES)?;
    ensure!(ram_gigabytes >= 0.0, "invalid memory size: {ram_gigabytes}");

    let utilization = Utilization::from_percentages(
        percentage(record, column::AVERAGE_UTILIZATION)?,
        percentage(record, column::MAX_UTILIZATION)?,
        percentage(record, column::P95_UTILIZATION)?,
    );
    let (start, end) = (start as i64, end as i64);
    let workload = Workload::new(
        id,
        Window::aligned(start, end),
        cores as u32,
        (ram_gigabytes as u32).saturating_mul(1000),
        utilization,
    );
    Ok(workload.with_runtime(end - start))
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn moer(record: &StringRecord, index: usize) -> Result<u32> {
    let value = number(record, index)?;
    ensure!(value >= 0.0, "negative MOER: {value}");
    Ok(value as u32)
}

fn percentage(record: &StringRecord, index: usize) -> Result<f64> {
    let value = number(record, index)?;
    ensure!((0.0..=100.0).contains(&value), "column #{index}: invalid percentage {value}");
    Ok(value)
}

fn number(record: &StringRecord, index: usize) -> Result<f64> {
    let field = record.get(index).with_context(|| format!("missing column #{index}"))?;
    field.parse().with_context(|| format!("column #{index}: `{field}` is not a number"))
}
