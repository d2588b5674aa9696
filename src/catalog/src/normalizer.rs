//! Numeric clean-up of the feed values.
//!
//! The feeds are scraped from localized pages: costs carry currency symbols
//! and separators, quantities carry units and non-breaking spaces.

use regex::Regex;
use std::sync::LazyLock;

use crate::constants::{COST_SCALE, GIB_TO_MIB, INCLUDED_SENTINEL};
use crate::skip::SkipReason;

static QUANTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:[.,][0-9]+)?").expect("static pattern"));

/// Parse a monetary string. `Ok(None)` means the price is bundled elsewhere.
pub fn parse_cost(raw: &str) -> Result<Option<f64>, SkipReason> {
    if raw.contains(INCLUDED_SENTINEL) {
        return Ok(None);
    }

    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    let commas = kept.matches(',').count();
    let normalized = if kept.contains('.') || commas > 1 {
        kept.replace(',', "")
    } else {
        // single comma, no dot: decimal comma
        kept.replace(',', ".")
    };

    normalized
        .parse::<f64>()
        .map(Some)
        .map_err(|_| SkipReason::MalformedNumber(raw.to_string()))
}

/// First number of a free-text quantity such as `7\u{a0}GB` or `2 vCores`.
pub fn parse_quantity(raw: &str) -> Result<f64, SkipReason> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    QUANTITY
        .find(&compact)
        .and_then(|m| m.as_str().replace(',', ".").parse::<f64>().ok())
        .ok_or_else(|| SkipReason::MalformedNumber(raw.to_string()))
}

pub fn round3(value: f64) -> f64 {
    (value * COST_SCALE).round() / COST_SCALE
}

/// Hourly list price to the monthly-equivalent cost of the consumption term.
pub fn hourly_cost(hourly: f64, hours_month: f64) -> f64 {
    round3(hourly * hours_month)
}

/// Monthly list price to the cost of a term lasting `period` months.
pub fn period_cost(monthly: f64, period: u32) -> f64 {
    round3(monthly * f64::from(period.max(1)))
}

pub fn gib_to_mib(gib: f64) -> u32 {
    (gib * GIB_TO_MIB).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("0.04", Some(0.04))]
    #[case::currency("€0.0445", Some(0.0445))]
    #[case::suffix("12.50 € HT", Some(12.5))]
    #[case::decimal_comma("0,02", Some(0.02))]
    #[case::thousands("1,234.5", Some(1234.5))]
    #[case::many_thousands("1,234,567", Some(1234567.0))]
    #[case::included("Included", None)]
    #[case::included_sentence("Included in the offer", None)]
    fn test_parse_cost(#[case] raw: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_cost(raw).unwrap(), expected);
    }

    #[rstest]
    #[case::empty("")]
    #[case::words("on demand")]
    #[case::two_dots("1.2.3")]
    fn test_parse_cost_rejects(#[case] raw: &str) {
        assert_eq!(
            parse_cost(raw),
            Err(SkipReason::MalformedNumber(raw.to_string()))
        );
    }

    #[rstest]
    #[case::unit("7 GB", 7.0)]
    #[case::nbsp("30\u{a0}GB", 30.0)]
    #[case::narrow_nbsp("1\u{202f}000 GB", 1000.0)]
    #[case::cores("2 vCores", 2.0)]
    #[case::decimal_comma("0,5 Go", 0.5)]
    #[case::prefix("up to 250 Mbit/s", 250.0)]
    fn test_parse_quantity(#[case] raw: &str, #[case] expected: f64) {
        assert_eq!(parse_quantity(raw).unwrap(), expected);
    }

    #[test]
    fn test_parse_quantity_without_digit() {
        assert!(parse_quantity("Unlimited").is_err());
    }

    #[test]
    fn test_hourly_cost_uses_hours_month() {
        assert_eq!(hourly_cost(0.02, 672.0), 13.44);
        assert_eq!(hourly_cost(0.0445, 730.0), 32.485);
    }

    #[test]
    fn test_period_cost() {
        assert_eq!(period_cost(12.5, 1), 12.5);
        assert_eq!(period_cost(12.5, 0), 12.5);
        assert_eq!(period_cost(10.0, 12), 120.0);
        assert_eq!(round3(0.04), 0.04);
        assert_eq!(round3(1.23456), 1.235);
    }

    #[test]
    fn test_gib_to_mib() {
        assert_eq!(gib_to_mib(7.0), 7168);
        assert_eq!(gib_to_mib(0.5), 512);
    }
}
