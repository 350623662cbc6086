//! Probability text parsing.
//!
//! Accepted forms, tried in this order on the trimmed input:
//!
//! 1. Percentage: `"15.38%"` → `0.1538`.
//! 2. Fraction: `"1/6.5"` → `0.1538`. Exactly one `/`, both sides numeric, non-zero denominator.
//! 3. Decimal: `"0.1538"` → `0.1538`. A value above 1 is read as a denominator, so `"6.5"` is
//!    shorthand for one in 6.5.
//!
//! The result is not clamped: `"150%"` parses to `1.5`, and downstream inference treats any
//! value outside `(0,1)` as "unset".

#![forbid(unsafe_code)]

use crate::{DiscernError, Result};

fn invalid(input: &str, reason: &'static str) -> DiscernError {
    DiscernError::InvalidProbability {
        input: input.to_string(),
        reason,
    }
}

fn number(text: &str, input: &str) -> Result<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Err(invalid(input, "missing number"));
    }
    let v: f64 = text.parse().map_err(|_| invalid(input, "not a number"))?;
    if !v.is_finite() {
        return Err(invalid(input, "not a finite number"));
    }
    Ok(v)
}

/// Parse free-form probability text into a probability.
///
/// # Errors
///
/// Returns [`DiscernError::InvalidProbability`] for empty or non-numeric text, a fraction
/// without exactly two parts, or a zero denominator.
///
/// # Examples
///
/// ```
/// use discern::parse_probability;
///
/// let a = parse_probability("1/6.5").unwrap();
/// let b = parse_probability("6.5").unwrap();
/// let c = parse_probability("15.3846%").unwrap();
/// assert!((a - b).abs() < 1e-12);
/// assert!((a - c).abs() < 1e-6);
///
/// assert_eq!(parse_probability("0.2").unwrap(), 0.2);
/// assert!(parse_probability("1/0").is_err());
/// ```
pub fn parse_probability(text: &str) -> Result<f64> {
    let s = text.trim();
    if s.is_empty() {
        return Err(invalid(text, "empty"));
    }

    if let Some(prefix) = s.strip_suffix('%') {
        return Ok(number(prefix, text)? / 100.0);
    }

    if s.contains('/') {
        let mut parts = s.split('/');
        let (Some(num), Some(den), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid(text, "fraction must have exactly one '/'"));
        };
        let num = number(num, text)?;
        let den = number(den, text)?;
        if den == 0.0 {
            return Err(invalid(text, "zero denominator"));
        }
        return Ok(num / den);
    }

    let v = number(s, text)?;
    if v > 1.0 {
        Ok(1.0 / v)
    } else {
        Ok(v)
    }
}

/// [`parse_probability`], falling back to `0.0` ("unset") on malformed text.
///
/// The fallback keeps an analysis total: an unparsable setting is excluded from inference and
/// shown as unset rather than aborting the whole run.
#[must_use]
pub fn parse_probability_or_unset(text: &str) -> f64 {
    match parse_probability(text) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, "treating probability as unset");
            0.0
        }
    }
}
