use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};

/// Rounds half-up to cents.
pub fn round2(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(2, RoundingMode::HalfUp)
}

/// Cent-rounded value as a JSON friendly float.
pub fn to_f64(value: &BigDecimal) -> f64 {
    round2(value).to_f64().unwrap_or(0.0)
}

/// Rounds a float to two decimals, mapping non-finite values to zero.
pub fn round_f64(value: f64) -> f64 {
    if value.is_finite() {
        (value * 100.0).round() / 100.0
    } else {
        0.0
    }
}

/// `numerator / denominator * scale`, or 0 when the denominator is 0.
pub fn ratio(numerator: f64, denominator: f64, scale: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        round_f64(numerator / denominator * scale)
    }
}

/// Parses a float amount into a cent-rounded decimal. Non-finite input
/// yields `None`.
pub fn from_f64(value: f64) -> Option<BigDecimal> {
    if !value.is_finite() {
        return None;
    }
    value.to_string().parse::<BigDecimal>().ok().map(|v| round2(&v))
}

/// Multiplies an amount by a float rate, rounding to cents.
pub fn apply_rate(amount: &BigDecimal, rate: f64) -> BigDecimal {
    let rate: BigDecimal = rate.to_string().parse().unwrap_or_else(|_| BigDecimal::from(0));
    round2(&(amount * rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_round2_half_up() {
        let v = BigDecimal::from_str("1.005").unwrap();
        assert_eq!(round2(&v), BigDecimal::from_str("1.01").unwrap());
    }

    #[test]
    fn test_apply_rate() {
        let amount = BigDecimal::from_str("39.90").unwrap();
        assert_eq!(apply_rate(&amount, 0.2), BigDecimal::from_str("7.98").unwrap());
        assert_eq!(apply_rate(&amount, 0.0), BigDecimal::from_str("0.00").unwrap());
    }

    #[test]
    fn test_ratio_zero_denominator() {
        assert_eq!(ratio(5.0, 0.0, 100.0), 0.0);
        assert_eq!(ratio(1.0, 3.0, 100.0), 33.33);
    }

    #[test]
    fn test_from_f64() {
        assert_eq!(from_f64(9.9), Some(BigDecimal::from_str("9.90").unwrap()));
        assert_eq!(from_f64(f64::NAN), None);
    }

    #[test]
    fn test_to_f64() {
        assert_eq!(to_f64(&BigDecimal::from_str("12.345").unwrap()), 12.35);
    }
}
