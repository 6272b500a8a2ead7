use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::{cycle::Outcome, window::Window, windows::LowCarbonWindows},
    quantity::time::Hours,
};

/// Scenario summary, compared against the first outcome which is the baseline.
pub fn build_outcomes_table(outcomes: &[Outcome]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Scenario",
        "Carbon",
        "Predicted",
        "Savings",
        "Cost",
        "Waste",
        "Savings",
        "Delay (all)",
        "Delay (moved)",
        "Moved",
        "Adjusted",
    ]);
    let Some(baseline) = outcomes.first() else {
        return table;
    };
    for outcome in outcomes {
        table.add_row(vec![
            Cell::new(&outcome.scenario).add_attribute(Attribute::Bold),
            Cell::new(outcome.carbon).set_alignment(CellAlignment::Right),
            Cell::new(outcome.predicted_carbon)
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            savings_cell(baseline.carbon.0, outcome.carbon.0),
            Cell::new(outcome.cost).set_alignment(CellAlignment::Right),
            Cell::new(outcome.waste).set_alignment(CellAlignment::Right),
            savings_cell(baseline.waste.0, outcome.waste.0),
            delay_cell(outcome.delays.average_over_eligible()),
            delay_cell(outcome.delays.average_over_adjusted()),
            Cell::new(outcome.n_rescheduled()).set_alignment(CellAlignment::Right),
            Cell::new(outcome.n_adjusted).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn build_windows_table(windows: &LowCarbonWindows) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Buckets", "Start", "End", "Duration", "Forecast"]);
    for window in windows.as_ref() {
        let seconds = Window::from_buckets(window.buckets.start, window.len());
        table.add_row(vec![
            Cell::new(format!("{:?}", window.buckets)).add_attribute(Attribute::Dim),
            Cell::new(seconds.start).set_alignment(CellAlignment::Right),
            Cell::new(seconds.end).set_alignment(CellAlignment::Right),
            Cell::new(seconds.hours()).set_alignment(CellAlignment::Right),
            Cell::new(window.average_forecast).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

fn savings_cell(baseline: f64, value: f64) -> Cell {
    if baseline == 0.0 {
        return Cell::new("n/a").set_alignment(CellAlignment::Right).add_attribute(Attribute::Dim);
    }
    let savings = (baseline - value) / baseline;
    Cell::new(format!("{:.1}%", savings * 100.0)).set_alignment(CellAlignment::Right).fg(
        if savings > 0.0 {
            Color::Green
        } else if savings < 0.0 {
            Color::Red
        } else {
            Color::Reset
        },
    )
}

fn delay_cell(delay: Option<Hours>) -> Cell {
    match delay {
        Some(delay) => Cell::new(delay).set_alignment(CellAlignment::Right),
        None => Cell::new("n/a").set_alignment(CellAlignment::Right).add_attribute(Attribute::Dim),
    }
}
