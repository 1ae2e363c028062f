//! # Money Module
//!
//! Amount helpers shared by the calculator, the renderer and the reports.
//!
//! ## Why Floating Point Here?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Sheets are priced per square meter:                                    │
//! │                                                                         │
//! │    quantity × length × width × unit price                               │
//! │       3     ×  1.25  ×  0.8  ×   42.5     = 127.50                      │
//! │                                                                         │
//! │  Dimensions are fractional meters typed by the user, so amounts are    │
//! │  carried as f64 and only rounded when they are DISPLAYED or EXPORTED.  │
//! │  Rounding happens in exactly one place: format_money().                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::numeric::finite_or_zero;

/// Sums amounts, dropping any NaN/infinite term individually. A sum
/// that overflows to infinity is 0 as well.
///
/// ## Example
/// ```rust
/// use billbook_core::money::sum_finite;
///
/// assert_eq!(sum_finite([10.0, f64::NAN, 5.0]), 15.0);
/// assert_eq!(sum_finite([f64::MAX, f64::MAX]), 0.0);
/// ```
pub fn sum_finite<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let sum = values
        .into_iter()
        .fold(0.0, |acc, value| acc + finite_or_zero(value));
    finite_or_zero(sum)
}

/// Formats an amount with exactly two decimals.
///
/// NaN and infinities print as `0.00`, and negative zero never leaks out
/// as `-0.00`.
///
/// ## Example
/// ```rust
/// use billbook_core::money::format_money;
///
/// assert_eq!(format_money(1650.0), "1650.00");
/// assert_eq!(format_money(12.346), "12.35");
/// assert_eq!(format_money(f64::NAN), "0.00");
/// ```
pub fn format_money(amount: f64) -> String {
    let formatted = format!("{:.2}", finite_or_zero(amount));
    if formatted == "-0.00" {
        "0.00".to_string()
    } else {
        formatted
    }
}

/// Formats a plain quantity or dimension without trailing zeros
/// (`2` rather than `2.00`, `1.5` rather than `1.50`).
pub fn format_number(value: f64) -> String {
    let value = finite_or_zero(value);
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "0.00");
        assert_eq!(format_money(5.0), "5.00");
        assert_eq!(format_money(1450.5), "1450.50");
        assert_eq!(format_money(-12.5), "-12.50");
        assert_eq!(format_money(-0.001), "0.00");
        assert_eq!(format_money(f64::INFINITY), "0.00");
    }

    #[test]
    fn test_format_money_is_stable_when_repeated() {
        // Formatting the parsed output again must not drift.
        let once = format_money(1234.5678);
        let twice = format_money(once.parse::<f64>().unwrap());
        assert_eq!(once, "1234.57");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::NAN), "0");
    }

    #[test]
    fn test_sum_finite() {
        assert_eq!(sum_finite(Vec::<f64>::new()), 0.0);
        assert_eq!(sum_finite([1.0, 2.0, 3.5]), 6.5);
        assert_eq!(sum_finite([f64::INFINITY, 1.0, f64::NAN]), 1.0);
    }
}
