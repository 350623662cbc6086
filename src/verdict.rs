//! Qualitative reading of an exact-test p-value.

#![forbid(unsafe_code)]

use serde::Serialize;
use std::fmt;

/// Significance level used when the caller does not pick one.
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

/// p-values at or above this are read as strong support, whatever the significance level.
pub const LIKELY_THRESHOLD: f64 = 0.25;

/// Verdict on one candidate, ordered from most to least compatible with the data.
///
/// `Unset` sorts last: the candidate had no usable probability and was never tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Likely,
    Possible,
    MildlyNegative,
    Negative,
    Unset,
}

/// How a verdict is presented: a positive, neutral or negative highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Positive,
    Neutral,
    Negative,
}

impl Verdict {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Likely => "◎",
            Self::Possible => "○",
            Self::MildlyNegative => "△",
            Self::Negative => "✗",
            Self::Unset => "?",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Likely => "likely",
            Self::Possible => "possible",
            Self::MildlyNegative => "mildly negative",
            Self::Negative => "negative",
            Self::Unset => "probability not set",
        }
    }

    #[must_use]
    pub fn tone(self) -> Tone {
        match self {
            Self::Likely => Tone::Positive,
            Self::Possible | Self::MildlyNegative => Tone::Neutral,
            Self::Negative | Self::Unset => Tone::Negative,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.symbol(), self.label())
    }
}

/// Classify an exact-test p-value.
///
/// | p-value                              | verdict                    |
/// |--------------------------------------|----------------------------|
/// | `p < significance / 2`               | [`Verdict::Negative`]      |
/// | `significance / 2 <= p < significance` | [`Verdict::MildlyNegative`] |
/// | `significance <= p < 0.25`           | [`Verdict::Possible`]      |
/// | `p >= 0.25`                          | [`Verdict::Likely`]        |
///
/// The `0.25` cut ([`LIKELY_THRESHOLD`]) does not move with `significance`. A NaN p-value
/// fails every comparison and lands on [`Verdict::Likely`], matching "no evidence against".
///
/// # Examples
///
/// ```
/// use discern::{classify_verdict, Verdict, DEFAULT_SIGNIFICANCE};
///
/// assert_eq!(classify_verdict(0.01, DEFAULT_SIGNIFICANCE), Verdict::Negative);
/// assert_eq!(classify_verdict(0.03, DEFAULT_SIGNIFICANCE), Verdict::MildlyNegative);
/// assert_eq!(classify_verdict(0.05, DEFAULT_SIGNIFICANCE), Verdict::Possible);
/// assert_eq!(classify_verdict(0.30, DEFAULT_SIGNIFICANCE), Verdict::Likely);
/// ```
#[must_use]
pub fn classify_verdict(p_value: f64, significance: f64) -> Verdict {
    if p_value < significance / 2.0 {
        Verdict::Negative
    } else if p_value < significance {
        Verdict::MildlyNegative
    } else if p_value < LIKELY_THRESHOLD {
        Verdict::Possible
    } else {
        Verdict::Likely
    }
}
