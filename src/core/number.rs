//! Numeric coercion shared by the catalog, cart and exporter

use serde::{Deserialize, Deserializer};

/// Coerce cell text to a number, yielding `0.0` for blank or invalid input
pub fn coerce_number(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Replace NaN and infinities with `0.0`
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a quantity without a trailing `.0` for whole numbers
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Deserialize a number that may have been stored as a number or as text
///
/// Anything that is not a finite number becomes `0.0`.
pub fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().map(finite_or_zero).unwrap_or(0.0),
        serde_json::Value::String(s) => coerce_number(&s),
        _ => 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number("12.5"), 12.5);
        assert_eq!(coerce_number(" 3 "), 3.0);
        assert_eq!(coerce_number(""), 0.0);
        assert_eq!(coerce_number("n/a"), 0.0);
        assert_eq!(coerce_number("inf"), 0.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(30.0), 30.0);
        assert_eq!(round2(3.0 * 0.333), 1.0);
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.236), 1.24);
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(5.0), "5");
        assert_eq!(format_quantity(2.5), "2.5");
    }

    #[test]
    fn test_lenient_number() {
        #[derive(serde::Deserialize)]
        struct Probe {
            #[serde(deserialize_with = "lenient_number")]
            value: f64,
        }

        let parse = |json: &str| serde_json::from_str::<Probe>(json).unwrap().value;
        assert_eq!(parse(r#"{"value": 4}"#), 4.0);
        assert_eq!(parse(r#"{"value": "7.25"}"#), 7.25);
        assert_eq!(parse(r#"{"value": "abc"}"#), 0.0);
        assert_eq!(parse(r#"{"value": null}"#), 0.0);
    }
}
