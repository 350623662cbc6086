//! Expected ranges and plotting series.
//!
//! These are presentation aids: they show how far apart the candidates' plausible outcome
//! ranges are at a given number of trials, and where the observation falls among the
//! candidates' distributions. The ranges use the normal approximation to the binomial, which is
//! adequate for the trial counts where the curves are informative (tens of expected events and
//! up). Inference itself never uses them.

#![forbid(unsafe_code)]

use serde::Serialize;
use statrs::function::erf::erf_inv;

use crate::{binomial_pmf, is_usable_probability, Candidate};

/// Confidence level used when the caller does not pick one.
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Half-width of the distribution window, in standard deviations of the widest candidate.
const DISTRIBUTION_HALF_WIDTH_SD: f64 = 4.0;

/// Two-sided standard normal quantile \(z = \Phi^{-1}\!\left(\frac{1 + c}{2}\right)\).
///
/// Uses \(\Phi^{-1}(q) = \sqrt{2}\,\operatorname{erf}^{-1}(2q - 1)\), which here reduces to
/// \(\sqrt{2}\,\operatorname{erf}^{-1}(c)\).
fn two_sided_z(confidence: f64) -> f64 {
    std::f64::consts::SQRT_2 * erf_inv(confidence)
}

/// Normal-approximation interval for the observed rate when the true rate is `p`.
///
/// \[
/// z = \Phi^{-1}\!\left(\tfrac{1 + c}{2}\right), \quad
/// \mathrm{se} = \sqrt{p(1-p)/n}, \quad
/// [\max(0, p - z\,\mathrm{se}),\; \min(1, p + z\,\mathrm{se})]
/// \]
///
/// Returns `(0, 1)` when `n == 0`, when `p` is outside `[0, 1]`, or when `confidence` is
/// outside `[0, 1)`.
///
/// # Examples
///
/// ```
/// use discern::confidence_interval;
///
/// let (lo, hi) = confidence_interval(0.15, 1000, 0.95);
/// assert!((lo - 0.128).abs() < 1e-3);
/// assert!((hi - 0.172).abs() < 1e-3);
/// assert_eq!(confidence_interval(0.15, 0, 0.95), (0.0, 1.0));
/// ```
#[must_use]
pub fn confidence_interval(p: f64, n: u64, confidence: f64) -> (f64, f64) {
    if n == 0 || !(0.0..=1.0).contains(&p) || !(0.0..1.0).contains(&confidence) {
        return (0.0, 1.0);
    }
    let z = two_sided_z(confidence);
    let se = (p * (1.0 - p) / n as f64).sqrt();
    ((p - z * se).max(0.0), (p + z * se).min(1.0))
}

/// [`confidence_interval`] scaled to counts: `(lower * n, upper * n)`.
#[must_use]
pub fn expected_count_range(p: f64, n: u64, confidence: f64) -> (f64, f64) {
    let (lo, hi) = confidence_interval(p, n, confidence);
    (lo * n as f64, hi * n as f64)
}

/// `p·n`, or 0 when `p` is not a probability.
fn expected_count(p: f64, n: u64) -> f64 {
    if (0.0..=1.0).contains(&p) {
        p * n as f64
    } else {
        0.0
    }
}

/// One point of an expected-range curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub n: u64,
    pub expected: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Expected count and its range, for one candidate, as a function of trial count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Curve {
    pub name: String,
    pub probability: f64,
    pub points: Vec<CurvePoint>,
}

/// Expected-range curves for every candidate over a shared trial axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveSeries {
    pub n_values: Vec<u64>,
    pub curves: Vec<Curve>,
}

fn trial_axis(max_n: u64, step: u64) -> Vec<u64> {
    let step = step.max(1);
    let mut n_values: Vec<u64> = (step..=max_n).step_by(step as usize).collect();
    if n_values.last() != Some(&max_n) {
        n_values.push(max_n);
    }
    n_values
}

/// Build expected-range curves for `candidates` at `n = step, 2·step, …` up to `max_n`.
///
/// `max_n` is always the last point, appended if it is not a multiple of `step`. A `step` of 0
/// is treated as 1. Curves follow the order of `candidates`; unset candidates are included so a
/// plot can show every row the caller configured. A probability outside `[0,1]` plots an
/// expected count of 0 under its `(0, n)` range.
///
/// # Examples
///
/// ```
/// use discern::{curve_series, Candidate, DEFAULT_CONFIDENCE};
///
/// let s = curve_series(&[Candidate::new("a", 0.2)], 25, 10, DEFAULT_CONFIDENCE);
/// assert_eq!(s.n_values, vec![10, 20, 25]);
/// assert!((s.curves[0].points[2].expected - 5.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn curve_series(
    candidates: &[Candidate],
    max_n: u64,
    step: u64,
    confidence: f64,
) -> CurveSeries {
    let n_values = trial_axis(max_n, step);
    let curves = candidates
        .iter()
        .map(|c| Curve {
            name: c.name.clone(),
            probability: c.probability,
            points: n_values
                .iter()
                .map(|&n| {
                    let (lower, upper) = expected_count_range(c.probability, n, confidence);
                    CurvePoint {
                        n,
                        expected: expected_count(c.probability, n),
                        lower,
                        upper,
                    }
                })
                .collect(),
        })
        .collect();
    CurveSeries { n_values, curves }
}

/// PMF of one candidate over the window of a [`DistributionSeries`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pmf {
    pub name: String,
    pub probability: f64,
    pub values: Vec<f64>,
}

/// Binomial PMFs of the participating candidates at a fixed trial count, over a window of
/// outcome counts wide enough to show all of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSeries {
    pub n: u64,
    pub x_values: Vec<u64>,
    pub pmfs: Vec<Pmf>,
}

/// Build PMF series for the candidates with a usable probability at `n` trials.
///
/// The window is centred on the mean of the candidates' expected counts and extends
/// 4 standard deviations of the widest candidate on each side, floored at 0. With no usable
/// candidate the window is `0..=n` and `pmfs` is empty.
#[must_use]
pub fn distribution_series(candidates: &[Candidate], n: u64) -> DistributionSeries {
    let usable: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| is_usable_probability(c.probability))
        .collect();

    let (x_min, x_max) = if usable.is_empty() {
        (0, n)
    } else {
        let nf = n as f64;
        let center =
            usable.iter().map(|c| c.probability * nf).sum::<f64>() / usable.len() as f64;
        let widest = usable
            .iter()
            .map(|c| (c.probability * (1.0 - c.probability) * nf).sqrt())
            .fold(0.0, f64::max);
        let half = DISTRIBUTION_HALF_WIDTH_SD * widest;
        ((center - half).max(0.0) as u64, (center + half) as u64)
    };

    let x_values: Vec<u64> = (x_min..=x_max).collect();
    let pmfs = usable
        .iter()
        .map(|c| Pmf {
            name: c.name.clone(),
            probability: c.probability,
            values: x_values
                .iter()
                .map(|&x| binomial_pmf(n, x, c.probability))
                .collect(),
        })
        .collect();
    DistributionSeries { n, x_values, pmfs }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn interval_contains_p_and_stays_in_unit_interval(
            p in 0.0f64..=1.0,
            n in 1u64..100_000,
            c in 0.5f64..0.999,
        ) {
            let (lo, hi) = confidence_interval(p, n, c);
            prop_assert!(0.0 <= lo && lo <= p + 1e-15);
            prop_assert!(p - 1e-15 <= hi && hi <= 1.0);
        }

        #[test]
        fn interval_narrows_with_n(p in 0.01f64..0.99, n in 1u64..10_000) {
            let (lo1, hi1) = confidence_interval(p, n, DEFAULT_CONFIDENCE);
            let (lo4, hi4) = confidence_interval(p, 4 * n, DEFAULT_CONFIDENCE);
            prop_assert!(hi4 - lo4 <= hi1 - lo1 + 1e-15);
        }

        #[test]
        fn trial_axis_ends_at_max_n(max_n in 0u64..5_000, step in 0u64..500) {
            let axis = trial_axis(max_n, step);
            prop_assert_eq!(axis.last().copied(), Some(max_n));
            prop_assert!(axis.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn z_matches_known_quantiles() {
        assert!((two_sided_z(0.95) - 1.959_964).abs() < 1e-5);
        assert!((two_sided_z(0.99) - 2.575_829).abs() < 1e-5);
        assert!(two_sided_z(0.0).abs() < 1e-12);
    }

    #[test]
    fn reference_interval() {
        // se = sqrt(0.15 * 0.85 / 1000) ~ 0.01129, z ~ 1.96.
        let (lo, hi) = confidence_interval(0.15, 1000, 0.95);
        assert!((lo - 0.127_869).abs() < 1e-5, "lo={lo}");
        assert!((hi - 0.172_131).abs() < 1e-5, "hi={hi}");
    }

    #[test]
    fn interval_degenerate_inputs() {
        assert_eq!(confidence_interval(0.3, 0, 0.95), (0.0, 1.0));
        assert_eq!(confidence_interval(1.5, 10, 0.95), (0.0, 1.0));
        assert_eq!(confidence_interval(-0.1, 10, 0.95), (0.0, 1.0));
        assert_eq!(confidence_interval(f64::NAN, 10, 0.95), (0.0, 1.0));
        assert_eq!(confidence_interval(0.3, 10, 1.0), (0.0, 1.0));
        assert_eq!(confidence_interval(0.3, 10, -0.5), (0.0, 1.0));
        // Boundary probabilities have no spread.
        assert_eq!(confidence_interval(0.0, 10, 0.95), (0.0, 0.0));
        assert_eq!(confidence_interval(1.0, 10, 0.95), (1.0, 1.0));
    }

    #[test]
    fn interval_is_clipped() {
        let (lo, hi) = confidence_interval(0.01, 10, 0.95);
        assert_eq!(lo, 0.0);
        assert!(hi > 0.01);
    }

    #[test]
    fn count_range_scales_interval() {
        let (lo, hi) = confidence_interval(0.2, 500, 0.9);
        let (clo, chi) = expected_count_range(0.2, 500, 0.9);
        assert!((clo - 500.0 * lo).abs() < 1e-9);
        assert!((chi - 500.0 * hi).abs() < 1e-9);
        assert_eq!(expected_count_range(0.2, 0, 0.9), (0.0, 0.0));
    }

    #[test]
    fn trial_axis_shapes() {
        assert_eq!(trial_axis(100, 10).len(), 10);
        assert_eq!(trial_axis(100, 10).last(), Some(&100));
        assert_eq!(trial_axis(25, 10), vec![10, 20, 25]);
        assert_eq!(trial_axis(5, 10), vec![5]);
        assert_eq!(trial_axis(0, 10), vec![0]);
        assert_eq!(trial_axis(3, 0), vec![1, 2, 3]);
    }

    #[test]
    fn curves_follow_candidate_order() {
        let candidates = [
            Candidate::new("six", 1.0 / 5.5),
            Candidate::new("one", 1.0 / 7.0),
            Candidate::new("unset", 0.0),
        ];
        let s = curve_series(&candidates, 1000, 100, DEFAULT_CONFIDENCE);
        assert_eq!(s.n_values.len(), 10);
        let names: Vec<&str> = s.curves.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["six", "one", "unset"]);

        for curve in &s.curves {
            assert_eq!(curve.points.len(), s.n_values.len());
            for pt in &curve.points {
                assert!(pt.lower <= pt.expected + 1e-9);
                assert!(pt.expected <= pt.upper + 1e-9);
            }
        }
        // Separation grows with n: at n = 1000 the two ranges overlap less than at n = 100.
        let gap = |i: usize| s.curves[0].points[i].lower - s.curves[1].points[i].upper;
        assert!(gap(9) / 1000.0 > gap(0) / 100.0);

        assert!(s.curves[2].points.iter().all(|p| p.expected == 0.0 && p.upper == 0.0));
    }

    #[test]
    fn out_of_range_probability_stays_inside_its_range() {
        // "7/2" parses to 3.5, which no interval can hold.
        let s = curve_series(&[Candidate::new("typo", 3.5)], 300, 100, DEFAULT_CONFIDENCE);
        for pt in &s.curves[0].points {
            assert_eq!(pt.expected, 0.0);
            assert_eq!((pt.lower, pt.upper), (0.0, pt.n as f64));
        }
    }

    #[test]
    fn distribution_window_covers_candidates() {
        let candidates = [
            Candidate::new("one", 1.0 / 7.0),
            Candidate::new("six", 1.0 / 5.5),
            Candidate::new("unset", 0.0),
        ];
        let d = distribution_series(&candidates, 1000);
        assert_eq!(d.pmfs.len(), 2);
        assert!(d.x_values.contains(&143));
        assert!(d.x_values.contains(&182));
        for pmf in &d.pmfs {
            assert_eq!(pmf.values.len(), d.x_values.len());
            // The window holds nearly all of each candidate's mass.
            let mass: f64 = pmf.values.iter().sum();
            assert!(mass > 0.98, "{} mass {mass}", pmf.name);
        }
    }

    #[test]
    fn distribution_without_usable_candidates() {
        let d = distribution_series(&[Candidate::new("x", 0.0)], 20);
        assert_eq!(d.x_values, (0..=20).collect::<Vec<_>>());
        assert!(d.pmfs.is_empty());
    }

    #[test]
    fn distribution_window_floors_at_zero() {
        let d = distribution_series(&[Candidate::new("rare", 0.01)], 50);
        assert_eq!(d.x_values[0], 0);
    }
}
