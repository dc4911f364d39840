//! Formatting utilities for simulation results display.

/// Format a percent value (already scaled to 0..100) with 2 decimal places.
#[must_use]
pub fn format_pct(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}%")
    } else {
        "N/A".to_string()
    }
}

/// Format a currency amount with thousands separators, e.g. `-$1,234.50`.
#[must_use]
pub fn format_money(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }

    let formatted = format!("{:.2}", value.abs());
    let (whole, frac) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // -0.001 rounds to zero and should not keep its sign
    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}

/// Format a ratio with 2 decimal places.
#[must_use]
pub fn format_ratio(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}")
    } else {
        "N/A".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_format_pct() {
        assert_eq!(format_pct(15.234), "15.23%");
        assert_eq!(format_pct(-4.5), "-4.50%");
        assert_eq!(format_pct(f64::NAN), "N/A");
    }

    #[test_case(0.0, "$0.00" ; "zero")]
    #[test_case(999.0, "$999.00" ; "no separator")]
    #[test_case(1234.5, "$1,234.50" ; "thousands")]
    #[test_case(1_000_000.0, "$1,000,000.00" ; "millions")]
    #[test_case(-50.25, "-$50.25" ; "negative")]
    #[test_case(-123_456.0, "-$123,456.00" ; "negative thousands")]
    #[test_case(-0.001, "$0.00" ; "negative rounds to zero")]
    fn test_format_money(value: f64, expected: &str) {
        assert_eq!(format_money(value), expected);
    }

    #[test]
    fn test_format_ratio() {
        assert_eq!(format_ratio(2.35), "2.35");
        assert_eq!(format_ratio(0.0), "0.00");
        assert_eq!(format_ratio(f64::INFINITY), "N/A");
    }
}
