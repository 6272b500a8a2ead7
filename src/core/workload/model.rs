//! Linear-regression power and price models fitted on Azure VM measurements.

use crate::quantity::{currency::DollarsPerHour, power::Watts};

/// Power draw by core count, as a function of whole gigabytes of RAM and average utilisation.
#[must_use]
pub fn power(cores: u32, ram_gigabytes: u32, average_utilization: f64) -> Watts {
    let ram = f64::from(ram_gigabytes);
    let utilization = average_utilization;
    let watts = match cores {
        2 => -12.1318 * ram + 42.1 * utilization + 120.023,
        4 => -0.792_386 * ram + 40.41 * utilization + 23.2432,
        8 => 42.1392 * utilization + 16.6206,
        _ => -0.020_012_8 * ram + 188.199 * utilization + 112.653,
    };
    Watts(watts).non_negative()
}

/// On-demand hourly price.
#[must_use]
pub fn price(cores: u32, ram_megabytes: u32) -> DollarsPerHour {
    DollarsPerHour(-0.0038 + 0.0468 * f64::from(cores) + 0.0017 * f64::from(ram_megabytes) / 1000.0)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn power_by_core_count() {
        let expected = -12.1318 * 4.0 + 42.1 * 0.5 + 120.023;
        assert_abs_diff_eq!(power(2, 4, 0.5).0, expected, epsilon = 1e-9);
        assert_abs_diff_eq!(power(4, 16, 0.0).0, -0.792_386 * 16.0 + 23.2432, epsilon = 1e-9);
        assert_abs_diff_eq!(power(8, 1000, 1.0).0, 42.1392 + 16.6206, epsilon = 1e-9);
        let expected = -0.020_012_8 * 64.0 + 188.199 * 0.25 + 112.653;
        assert_abs_diff_eq!(power(16, 64, 0.25).0, expected, epsilon = 1e-9);
    }

    #[test]
    fn power_never_negative() {
        // Two cores with a lot of memory drive the regression below zero:
        assert_eq!(power(2, 100, 0.0), Watts::ZERO);
    }

    #[test]
    fn price_is_linear() {
        let expected = -0.0038 + 0.0468 * 8.0 + 0.0017 * 32.0;
        assert_abs_diff_eq!(price(8, 32_000).0, expected, epsilon = 1e-12);
        let expected = -0.0038 + 0.0468 * 2.0 + 0.0017 * 0.5;
        assert_abs_diff_eq!(price(2, 500).0, expected, epsilon = 1e-12);
    }
}
