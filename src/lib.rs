//! `discern`: pick the most plausible success probability for observed binomial counts.
//!
//! Given `k` successes in `n` independent trials and a small, fixed set of named candidate
//! probabilities ("settings"), this crate answers two questions per candidate:
//!
//! 1. **How surprising is the observation?** An exact two-sided binomial test
//!    ([`binomial_p_value`]), summarized as a qualitative [`Verdict`].
//! 2. **How does it rank against the others?** The binomial likelihood at `k`, normalized
//!    across the candidate set ([`relative_likelihoods`]). This is a likelihood ranking, not a
//!    posterior: no prior is involved.
//!
//! Supporting pieces:
//!
//! - [`parse`]: free-form probability text (`"1/6.5"`, `"15.4%"`, `"0.1538"`, `"6.5"`).
//! - [`interval`]: normal-approximation expected ranges and PMF series for plotting how well
//!   candidates separate as `n` grows.
//! - [`analysis`]: one-call assembly of the per-candidate results.
//! - [`config`]: TOML description of categories, counts and settings for the CLI shell.
//!
//! Every numeric function is total: degenerate inputs (`n == 0`, `p` outside `(0,1)`,
//! `k > n`) map to documented values instead of errors.
//!
//! ## Quick example
//!
//! ```rust
//! use discern::{analyze, Candidate, Trial, Verdict, DEFAULT_SIGNIFICANCE};
//!
//! let candidates = [
//!     Candidate::new("low", 1.0 / 7.0),
//!     Candidate::new("high", 1.0 / 5.5),
//! ];
//! let analysis = analyze(Trial::new(1000, 150), &candidates, DEFAULT_SIGNIFICANCE);
//!
//! let best = analysis.best().unwrap();
//! assert_eq!(best.name, "low");
//! assert_eq!(analysis.results[1].verdict, Verdict::Negative);
//! ```

#![forbid(unsafe_code)]

use statrs::function::gamma::ln_gamma;
use std::path::PathBuf;
use thiserror::Error;

pub mod analysis;
pub mod config;
pub mod interval;
pub mod parse;
pub mod verdict;

pub use analysis::{analyze, Analysis, Candidate, InferenceResult, Trial};
pub use config::{Category, CategoryConfig, Config, SettingSpec};
pub use interval::{
    confidence_interval, curve_series, distribution_series, expected_count_range, Curve,
    CurvePoint, CurveSeries, DistributionSeries, Pmf, DEFAULT_CONFIDENCE,
};
pub use parse::{parse_probability, parse_probability_or_unset};
pub use verdict::{classify_verdict, Tone, Verdict, DEFAULT_SIGNIFICANCE, LIKELY_THRESHOLD};

/// Errors raised at the crate's text and configuration boundaries.
///
/// The statistical functions themselves never fail.
#[derive(Debug, Error)]
pub enum DiscernError {
    #[error("invalid probability {input:?}: {reason}")]
    InvalidProbability { input: String, reason: &'static str },

    #[error("invalid input: {0}")]
    Invalid(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = core::result::Result<T, DiscernError>;

/// Relative tolerance used when deciding whether an outcome is "at least as extreme" as the
/// observation in the two-sided exact test.
pub const TIE_TOLERANCE: f64 = 1e-7;

/// `true` when `p` can act as a Bernoulli success probability for inference.
///
/// Zero, one, anything outside the unit interval and NaN are all "unset".
#[must_use]
pub fn is_usable_probability(p: f64) -> bool {
    p > 0.0 && p < 1.0
}

/// Natural log of the binomial PMF \(P(K = k)\) for \(K \sim \mathrm{Bin}(n, p)\).
///
/// \[
/// \ln P(k) = \ln\Gamma(n+1) - \ln\Gamma(k+1) - \ln\Gamma(n-k+1) + k \ln p + (n-k)\ln(1-p)
/// \]
///
/// Evaluated entirely in log space so that `n` in the tens of thousands neither overflows the
/// coefficient nor underflows the power terms.
///
/// Returns `-inf` when `k > n`. The boundary probabilities are handled exactly
/// (`p == 0` puts all mass on `k == 0`, `p == 1` on `k == n`); other values outside `[0,1]`
/// yield `-inf`.
///
/// # Examples
///
/// ```
/// use discern::binomial_ln_pmf;
///
/// // P(K = 1) for Bin(2, 0.5) is 1/2.
/// assert!((binomial_ln_pmf(2, 1, 0.5) - 0.5_f64.ln()).abs() < 1e-12);
/// assert_eq!(binomial_ln_pmf(3, 4, 0.5), f64::NEG_INFINITY);
/// ```
#[must_use]
pub fn binomial_ln_pmf(n: u64, k: u64, p: f64) -> f64 {
    if k > n || !(0.0..=1.0).contains(&p) {
        return f64::NEG_INFINITY;
    }
    if p == 0.0 {
        return if k == 0 { 0.0 } else { f64::NEG_INFINITY };
    }
    if p == 1.0 {
        return if k == n { 0.0 } else { f64::NEG_INFINITY };
    }
    let (nf, kf) = (n as f64, k as f64);
    let ln_coeff = ln_gamma(nf + 1.0) - ln_gamma(kf + 1.0) - ln_gamma(nf - kf + 1.0);
    ln_coeff + kf * p.ln() + (nf - kf) * (-p).ln_1p()
}

/// Binomial PMF \(P(K = k)\) for \(K \sim \mathrm{Bin}(n, p)\).
///
/// `exp` of [`binomial_ln_pmf`]; may underflow to 0 far in the tails.
#[must_use]
pub fn binomial_pmf(n: u64, k: u64, p: f64) -> f64 {
    binomial_ln_pmf(n, k, p).exp()
}

/// Exact two-sided binomial test p-value for observing `k` successes in `n` trials under
/// success probability `p`.
///
/// Sums the PMF over every outcome that is no more likely than the observed one:
///
/// \[
/// p\text{-value} = \sum_{j=0}^{n} P(j)\,\mathbf{1}\!\left[P(j) \le P(k)\,(1 + \varepsilon)\right]
/// \]
///
/// with \(\varepsilon\) = [`TIE_TOLERANCE`]. This is the "minimum likelihood" definition of the
/// exact test; it is not twice the smaller tail, and the two differ noticeably for skewed `p`.
/// Comparisons happen in log space, which keeps large `n` stable.
///
/// Degenerate inputs:
/// - `n == 0`, or `p` not strictly inside `(0,1)`: 1.0 (no evidence against);
/// - `k > n`: 0.0 (the observation is impossible under any `p`).
///
/// # Examples
///
/// ```
/// use discern::binomial_p_value;
///
/// // The mode of a symmetric binomial is never surprising.
/// assert!((binomial_p_value(10, 5, 0.5) - 1.0).abs() < 1e-12);
/// // Zero heads in ten fair tosses: only 0 and 10 are that extreme.
/// assert!((binomial_p_value(10, 0, 0.5) - 2.0 / 1024.0).abs() < 1e-12);
/// assert_eq!(binomial_p_value(0, 0, 0.5), 1.0);
/// ```
#[must_use]
pub fn binomial_p_value(n: u64, k: u64, p: f64) -> f64 {
    if n == 0 || !is_usable_probability(p) {
        return 1.0;
    }
    if k > n {
        return 0.0;
    }
    let threshold = binomial_ln_pmf(n, k, p) + TIE_TOLERANCE.ln_1p();
    let mut total = 0.0;
    for j in 0..=n {
        let ln_pj = binomial_ln_pmf(n, j, p);
        if ln_pj <= threshold {
            total += ln_pj.exp();
        }
    }
    total.clamp(0.0, 1.0)
}

/// Raw likelihood of `p` given `k` successes in `n` trials: the binomial PMF at `k`.
///
/// Zero when `n == 0` or `p` is not strictly inside `(0,1)`; such candidates take no part in
/// the ranking.
#[must_use]
pub fn likelihood(n: u64, k: u64, p: f64) -> f64 {
    if n == 0 || !is_usable_probability(p) {
        return 0.0;
    }
    binomial_pmf(n, k, p)
}

/// Normalize the likelihoods of `probabilities` so they sum to 1.
///
/// \[
/// r_i = \frac{L(p_i)}{\sum_j L(p_j)}, \qquad L(p) = P(k; n, p)
/// \]
///
/// Each \(L(p_i)\) is [`likelihood`], the log-space PMF exponentiated. Output order matches
/// input order.
///
/// If the raw likelihoods sum to exactly 0 (every probability unset, `n == 0`, `k > n`, or
/// every PMF underflowing far in the tails), the result is uniform: `1/len` for every entry.
/// Empty input yields an empty vector.
///
/// # Examples
///
/// ```
/// use discern::relative_likelihoods;
///
/// let r = relative_likelihoods(100, 20, &[0.1, 0.2, 0.3]);
/// assert!((r.iter().sum::<f64>() - 1.0).abs() < 1e-12);
/// assert!(r[1] > r[0] && r[1] > r[2]);
///
/// let uniform = relative_likelihoods(100, 10, &[0.0, 0.0, 0.0]);
/// assert!(uniform.iter().all(|&x| (x - 1.0 / 3.0).abs() < 1e-12));
/// ```
#[must_use]
pub fn relative_likelihoods(n: u64, k: u64, probabilities: &[f64]) -> Vec<f64> {
    if probabilities.is_empty() {
        return Vec::new();
    }
    let raw: Vec<f64> = probabilities
        .iter()
        .map(|&p| likelihood(n, k, p))
        .collect();
    let total: f64 = raw.iter().sum();
    if total == 0.0 {
        let u = 1.0 / probabilities.len() as f64;
        return vec![u; probabilities.len()];
    }
    raw.into_iter().map(|l| l / total).collect()
}
