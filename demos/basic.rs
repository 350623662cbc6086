use discern::{
    analyze, binomial_p_value, confidence_interval, parse_probability, relative_likelihoods,
    Candidate, Trial, DEFAULT_CONFIDENCE, DEFAULT_SIGNIFICANCE,
};

fn main() {
    // Six settings, written the way they are usually quoted: one in x.
    let texts = ["7.0", "6.8", "6.5", "6.2", "5.8", "5.5"];
    let probabilities: Vec<f64> = texts.iter().map(|t| parse_probability(t).unwrap()).collect();

    let (n, k) = (1000, 150);
    let shares = relative_likelihoods(n, k, &probabilities);
    assert!((shares.iter().sum::<f64>() - 1.0).abs() < 1e-9);

    for &p in &probabilities {
        let pv = binomial_p_value(n, k, p);
        let (lo, hi) = confidence_interval(p, n, DEFAULT_CONFIDENCE);
        assert!((0.0..=1.0).contains(&pv));
        assert!(lo <= p && p <= hi);
    }

    let candidates: Vec<Candidate> = texts
        .iter()
        .enumerate()
        .map(|(i, t)| Candidate::from_text(format!("S{}", i + 1), t))
        .collect();
    let analysis = analyze(Trial::new(n, k), &candidates, DEFAULT_SIGNIFICANCE);
    let best = analysis.best().unwrap();

    println!(
        "k={k} n={n} best={} ({:.1}%) p-values: {}",
        best.name,
        best.relative_likelihood * 100.0,
        analysis
            .results
            .iter()
            .map(|r| format!("{}={:.3}", r.name, r.p_value))
            .collect::<Vec<_>>()
            .join(" ")
    );
}
