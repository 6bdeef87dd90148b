//! Rounding helpers shared by the scoring engines. Scores round to two
//! decimals, currency amounts to whole units.

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn round_currency(value: f64) -> f64 {
    value.round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(0.124), 0.12);
        assert_eq!(round1(7.25), 7.3);
        assert_eq!(round_currency(1234.5), 1235.0);
    }
}
