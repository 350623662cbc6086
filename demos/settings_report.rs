use discern::{analyze, curve_series, Candidate, Trial, DEFAULT_CONFIDENCE, DEFAULT_SIGNIFICANCE};

fn usage() -> ! {
    eprintln!(
        "Usage:\n  cargo run --example settings_report -- <n> <k> <prob1> <prob2> ...\n\n\
If no arguments are provided, 150 of 1000 against six default settings is used.\n\
Probabilities accept 1/6.5, 6.5, 15.4% or 0.154."
    );
    std::process::exit(2);
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        usage();
    }

    let (n, k, texts): (u64, u64, Vec<String>) = if args.is_empty() {
        (
            1000,
            150,
            ["7.0", "6.8", "6.5", "6.2", "5.8", "5.5"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    } else if args.len() < 3 {
        usage()
    } else {
        let n = args[0].parse().unwrap_or_else(|_| usage());
        let k = args[1].parse().unwrap_or_else(|_| usage());
        (n, k, args[2..].to_vec())
    };

    let candidates: Vec<Candidate> = texts
        .iter()
        .enumerate()
        .map(|(i, t)| Candidate::from_text(format!("setting {}", i + 1), t))
        .collect();

    let analysis = analyze(Trial::new(n, k), &candidates, DEFAULT_SIGNIFICANCE);
    println!("observed {k} of {n}");
    for r in analysis.ranked() {
        println!(
            "  {:<10} p={:<8.4} {} {:<16} likelihood {:>5.1}%",
            r.name,
            r.p_value,
            r.verdict.symbol(),
            r.verdict.label(),
            r.relative_likelihood * 100.0
        );
    }
    println!();

    // Expected ranges at a few trial counts show when the settings become separable.
    let series = curve_series(&candidates, n.max(1), (n / 4).max(1), DEFAULT_CONFIDENCE);
    for curve in &series.curves {
        let last = curve.points.last().unwrap();
        println!(
            "  {:<10} at n={}: expected {:.1}, 95% range [{:.1}, {:.1}]",
            curve.name, last.n, last.expected, last.lower, last.upper
        );
    }
}
