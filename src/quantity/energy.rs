quantity!(MegawattHours, via: f64, suffix: "MWh", precision: 6);
