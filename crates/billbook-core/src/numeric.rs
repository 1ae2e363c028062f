//! # Numeric Input
//!
//! Lenient parsing for numbers typed into invoice forms.
//!
//! ## Leniency Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Form fields are recalculated on every keystroke, so half-typed values │
//! │  are normal. They degrade to "not a number" instead of failing:        │
//! │                                                                         │
//! │    "12"      → 12.0                                                     │
//! │    " 2.5 m"  → 2.5     (longest numeric prefix wins)                    │
//! │    ".5"      → 0.5                                                      │
//! │    "1e3"     → 1000.0                                                   │
//! │    ""        → none                                                     │
//! │    "abc"     → none                                                     │
//! │    "-"       → none                                                     │
//! │                                                                         │
//! │  Calculations then treat "none" as 0 at every summation step.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Deserializer, Serialize};

/// The raw value of an editable numeric field.
///
/// Drafts arrive either from a UI (text as typed) or from JSON files
/// (plain numbers), so both shapes are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    /// A number supplied directly.
    Number(f64),
    /// Text exactly as the user typed it.
    Text(String),
}

impl NumericInput {
    /// An empty field.
    pub fn blank() -> Self {
        NumericInput::Text(String::new())
    }

    /// Parses the field; `None` when blank, unparsable or non-finite.
    pub fn parse(&self) -> Option<f64> {
        match self {
            NumericInput::Number(n) => Some(*n).filter(|n| n.is_finite()),
            NumericInput::Text(text) => parse_float(text),
        }
    }

    /// Parsed value, or 0 when the field is not a usable number.
    #[inline]
    pub fn value_or_zero(&self) -> f64 {
        self.parse().unwrap_or(0.0)
    }

    /// True when the field holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        matches!(self, NumericInput::Text(text) if text.trim().is_empty())
    }
}

impl Default for NumericInput {
    fn default() -> Self {
        NumericInput::blank()
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

impl From<String> for NumericInput {
    fn from(value: String) -> Self {
        NumericInput::Text(value)
    }
}

/// Parses the longest numeric prefix of `input`, the way browsers parse
/// form values.
///
/// Returns `None` when no digits lead the string or the result is not
/// finite.
///
/// ## Example
/// ```rust
/// use billbook_core::numeric::parse_float;
///
/// assert_eq!(parse_float("42"), Some(42.0));
/// assert_eq!(parse_float("  3.5kg"), Some(3.5));
/// assert_eq!(parse_float("abc"), None);
/// ```
pub fn parse_float(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        // "5." is a number, "." alone is not
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Replaces NaN and infinities with 0.
///
/// Applied to every intermediate product before it is summed.
#[inline]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Serde helper: reads a number that may be missing, null, text or
/// garbage, yielding 0 for anything unusable.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<LenientValue>::deserialize(deserializer)?;
    Ok(raw.and_then(LenientValue::parse).unwrap_or(0.0))
}

/// Serde helper for optional numbers (e.g. sheet dimensions).
pub fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<LenientValue>::deserialize(deserializer)?;
    Ok(raw.and_then(LenientValue::parse))
}

/// Any JSON scalar a stored numeric field has been seen holding.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl LenientValue {
    fn parse(self) -> Option<f64> {
        match self {
            LenientValue::Number(n) => Some(n).filter(|n| n.is_finite()),
            LenientValue::Text(text) => parse_float(&text),
            LenientValue::Other(_) => None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
