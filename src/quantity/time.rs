quantity!(Hours, via: f64, suffix: "h", precision: 2);

impl Hours {
    pub const SECONDS: f64 = 3600.0;

    #[expect(clippy::cast_precision_loss)]
    pub fn from_seconds(seconds: i64) -> Self {
        Self(seconds as f64 / Self::SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_seconds() {
        assert_eq!(Hours::from_seconds(5400), Hours(1.5));
        assert_eq!(Hours::from_seconds(-1800), Hours(-0.5));
    }
}
