use crate::quantity::time::Hours;

quantity!(Dollars, via: f64, suffix: "$", precision: 2);

quantity!(
    /// Hourly on-demand price.
    DollarsPerHour, via: f64, suffix: "$/h", precision: 4
);

implement_mul!(DollarsPerHour, Hours, Dollars);
