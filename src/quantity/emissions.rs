use crate::quantity::energy::MegawattHours;

quantity!(
    /// Marginal operating emissions rate, pounds of CO₂ per megawatt-hour.
    Moer, via: f64, suffix: "lbs/MWh", precision: 1
);

quantity!(
    /// Pounds of CO₂.
    Pounds, via: f64, suffix: "lbs", precision: 3
);

implement_mul!(Moer, MegawattHours, Pounds);
