//! Per-candidate inference: test, classify and rank in one call.

#![forbid(unsafe_code)]

use serde::Serialize;
use tracing::debug;

use crate::{
    binomial_p_value, classify_verdict, is_usable_probability, parse_probability_or_unset,
    relative_likelihoods, Verdict,
};

/// A named hypothesis about the true success probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub name: String,
    pub probability: f64,
}

impl Candidate {
    pub fn new(name: impl Into<String>, probability: f64) -> Self {
        Self {
            name: name.into(),
            probability,
        }
    }

    /// Build a candidate from probability text; malformed text yields an unset candidate.
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        Self::new(name, parse_probability_or_unset(text))
    }

    /// `true` when the probability lies strictly inside `(0,1)`.
    #[must_use]
    pub fn is_set(&self) -> bool {
        is_usable_probability(self.probability)
    }
}

/// `k` observed successes in `n` trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Trial {
    pub n: u64,
    pub k: u64,
}

impl Trial {
    #[must_use]
    pub fn new(n: u64, k: u64) -> Self {
        Self { n, k }
    }

    /// `k / n`, or `None` before any trial.
    #[must_use]
    pub fn observed_rate(&self) -> Option<f64> {
        (self.n > 0).then(|| self.k as f64 / self.n as f64)
    }
}

/// Outcome for one candidate.
///
/// Unset candidates carry a p-value and relative likelihood of 0 and [`Verdict::Unset`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceResult {
    pub name: String,
    pub probability: f64,
    pub p_value: f64,
    pub verdict: Verdict,
    pub relative_likelihood: f64,
}

/// Results for every candidate of one inference call, in candidate order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub trial: Trial,
    pub significance: f64,
    pub results: Vec<InferenceResult>,
}

impl Analysis {
    /// The set candidate with the highest relative likelihood; the first one on ties.
    #[must_use]
    pub fn best(&self) -> Option<&InferenceResult> {
        self.results
            .iter()
            .filter(|r| r.verdict != Verdict::Unset)
            .fold(None, |best: Option<&InferenceResult>, r| match best {
                Some(b) if b.relative_likelihood >= r.relative_likelihood => Some(b),
                _ => Some(r),
            })
    }

    /// Results sorted by relative likelihood, highest first. Ties keep candidate order.
    #[must_use]
    pub fn ranked(&self) -> Vec<&InferenceResult> {
        let mut out: Vec<&InferenceResult> = self.results.iter().collect();
        out.sort_by(|a, b| b.relative_likelihood.total_cmp(&a.relative_likelihood));
        out
    }
}

/// Test every candidate against `trial` and rank them.
///
/// Set candidates get the exact two-sided p-value, its [`Verdict`] at `significance`, and
/// their share of the likelihood summed over set candidates. Unset candidates are excluded from
/// the ranking. Nothing here fails: `n == 0`, or every set PMF underflowing, gives every set
/// candidate an even share.
///
/// # Examples
///
/// ```
/// use discern::{analyze, Candidate, Trial, Verdict};
///
/// let candidates = [Candidate::new("fair", 0.5), Candidate::from_text("broken", "n/a")];
/// let a = analyze(Trial::new(10, 5), &candidates, 0.05);
///
/// assert_eq!(a.results[0].verdict, Verdict::Likely);
/// assert!((a.results[0].relative_likelihood - 1.0).abs() < 1e-12);
/// assert_eq!(a.results[1].verdict, Verdict::Unset);
/// assert_eq!(a.results[1].relative_likelihood, 0.0);
/// ```
#[must_use]
pub fn analyze(trial: Trial, candidates: &[Candidate], significance: f64) -> Analysis {
    // Only set candidates share the likelihood mass, uniform fallback included.
    let participating: Vec<f64> = candidates
        .iter()
        .filter(|c| c.is_set())
        .map(|c| c.probability)
        .collect();
    let mut shares = relative_likelihoods(trial.n, trial.k, &participating).into_iter();

    let results: Vec<InferenceResult> = candidates
        .iter()
        .map(|c| {
            let (p_value, verdict, relative_likelihood) = if c.is_set() {
                let pv = binomial_p_value(trial.n, trial.k, c.probability);
                let share = shares.next().unwrap_or(0.0);
                (pv, classify_verdict(pv, significance), share)
            } else {
                (0.0, Verdict::Unset, 0.0)
            };
            debug!(
                candidate = %c.name,
                p = c.probability,
                p_value,
                relative_likelihood,
                verdict = verdict.label(),
                "candidate scored"
            );
            InferenceResult {
                name: c.name.clone(),
                probability: c.probability,
                p_value,
                verdict,
                relative_likelihood,
            }
        })
        .collect();

    Analysis {
        trial,
        significance,
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_SIGNIFICANCE;
    use proptest::prelude::*;

    fn reference_settings() -> Vec<Candidate> {
        ["7.0", "6.8", "6.5", "6.2", "5.8", "5.5"]
            .iter()
            .enumerate()
            .map(|(i, d)| Candidate::from_text(format!("S{}", i + 1), d))
            .collect()
    }

    proptest! {
        #[test]
        fn set_shares_sum_to_one(
            n in 1u64..3000,
            frac in 0.0f64..=1.0,
            ps in prop::collection::vec(prop_oneof![Just(0.0), 0.01f64..0.99], 1..8),
        ) {
            let k = ((n as f64) * frac).round() as u64;
            let candidates: Vec<Candidate> =
                ps.iter().enumerate().map(|(i, &p)| Candidate::new(i.to_string(), p)).collect();
            let a = analyze(Trial::new(n, k), &candidates, DEFAULT_SIGNIFICANCE);
            prop_assert_eq!(a.results.len(), candidates.len());

            let any_set = candidates.iter().any(Candidate::is_set);
            let total: f64 = a.results.iter().map(|r| r.relative_likelihood).sum();
            if any_set {
                prop_assert!((total - 1.0).abs() < 1e-9);
                prop_assert!(a.best().is_some());
            } else {
                prop_assert_eq!(total, 0.0);
                prop_assert!(a.best().is_none());
            }
            for (r, c) in a.results.iter().zip(&candidates) {
                prop_assert_eq!(&r.name, &c.name);
                prop_assert_eq!(r.verdict == Verdict::Unset, !c.is_set());
            }
        }
    }

    #[test]
    fn reference_scenario_ranks_nearest_settings_first() {
        let candidates = reference_settings();
        let a = analyze(Trial::new(1000, 150), &candidates, DEFAULT_SIGNIFICANCE);
        let r: Vec<f64> = a.results.iter().map(|r| r.relative_likelihood).collect();
        let pv: Vec<f64> = a.results.iter().map(|r| r.p_value).collect();

        assert!((r.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        // 1/6.8 and 1/6.5 bracket the observed 0.15 and lead the ranking.
        assert_eq!(a.best().map(|b| b.name.as_str()), Some("S2"));
        assert!(r[2] > r[0] && r[2] > r[3]);
        // The far end is least likely; 1/7.0 beats 1/5.8 on both measures.
        assert!(r.iter().all(|&x| x >= r[5]));
        assert!(r[0] > r[4]);
        assert!(pv[0] > pv[4]);

        assert_eq!(a.results[0].verdict, Verdict::Likely);
        assert_eq!(a.results[5].verdict, Verdict::Negative);

        let ranked: Vec<&str> = a.ranked().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(ranked[0], "S2");
        assert_eq!(ranked[5], "S6");
    }

    #[test]
    fn unset_candidates_are_flagged_not_scored() {
        let candidates = [
            Candidate::from_text("blank", ""),
            Candidate::new("certain", 1.0),
            Candidate::new("ok", 0.2),
        ];
        let a = analyze(Trial::new(50, 10), &candidates, DEFAULT_SIGNIFICANCE);
        for r in &a.results[..2] {
            assert_eq!(r.verdict, Verdict::Unset);
            assert_eq!(r.p_value, 0.0);
            assert_eq!(r.relative_likelihood, 0.0);
        }
        assert!((a.results[2].relative_likelihood - 1.0).abs() < 1e-12);
        assert_eq!(a.best().map(|b| b.name.as_str()), Some("ok"));
    }

    #[test]
    fn no_trials_is_no_evidence() {
        let a = analyze(Trial::new(0, 0), &reference_settings(), DEFAULT_SIGNIFICANCE);
        for r in &a.results {
            assert_eq!(r.p_value, 1.0);
            assert_eq!(r.verdict, Verdict::Likely);
            assert!((r.relative_likelihood - 1.0 / 6.0).abs() < 1e-12);
        }
        // Ties resolve to the first candidate.
        assert_eq!(a.best().map(|b| b.name.as_str()), Some("S1"));
    }

    #[test]
    fn underflowed_likelihoods_split_evenly_among_set_candidates() {
        let candidates = [
            Candidate::new("a", 0.3),
            Candidate::from_text("blank", ""),
            Candidate::new("b", 0.4),
        ];
        let a = analyze(Trial::new(20_000, 3_000), &candidates, DEFAULT_SIGNIFICANCE);
        assert_eq!(a.results[0].relative_likelihood, 0.5);
        assert_eq!(a.results[1].relative_likelihood, 0.0);
        assert_eq!(a.results[2].relative_likelihood, 0.5);
        assert!(a.results.iter().all(|r| r.verdict != Verdict::Likely));
    }

    #[test]
    fn impossible_count_rejects_everything() {
        let a = analyze(Trial::new(10, 11), &reference_settings(), DEFAULT_SIGNIFICANCE);
        assert!(a.results.iter().all(|r| r.verdict == Verdict::Negative));
    }

    #[test]
    fn observed_rate() {
        assert_eq!(Trial::new(0, 0).observed_rate(), None);
        assert_eq!(Trial::new(200, 30).observed_rate(), Some(0.15));
    }
}
