//! discern CLI - rank candidate settings against observed counts.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use discern::{
    curve_series, distribution_series, Analysis, Category, CategoryConfig, Config, InferenceResult,
};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "discern")]
#[command(version)]
#[command(about = "Rank candidate success probabilities against observed counts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "discern.toml")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Test and rank every setting of each category
    Analyze {
        /// Only this category
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,

        /// List settings last to first (the table otherwise follows the config order)
        #[arg(long)]
        descending: bool,
    },

    /// Expected count ranges per setting as the trial count grows
    Curves {
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,

        /// Last trial count (defaults to total_trials)
        #[arg(long)]
        max_n: Option<u64>,

        /// Trial count step
        #[arg(long, default_value = "100")]
        step: u64,

        #[arg(long)]
        json: bool,
    },

    /// Binomial PMF of each setting around the observed count
    Distribution {
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,

        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file
    Validate,

    /// Show example configuration
    Example,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum CategoryArg {
    Yellow,
    Red,
    Green,
    Blue,
}

impl From<CategoryArg> for Category {
    fn from(c: CategoryArg) -> Self {
        match c {
            CategoryArg::Yellow => Category::Yellow,
            CategoryArg::Red => Category::Red,
            CategoryArg::Green => Category::Green,
            CategoryArg::Blue => Category::Blue,
        }
    }
}

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to set subscriber")
}

fn print_example_config() {
    let example = r#"# discern configuration file

# Trials observed so far, shared by all categories
total_trials = 1000
significance = 0.05
confidence = 0.95

# Probabilities accept "1/6.5", "6.5" (read as 1 in 6.5), "15.4%" or "0.154".
# Unparsable entries are reported as "probability not set".
[[categories]]
category = "yellow"
count = 150
settings = [
    { name = "Setting 1", probability = "7.0" },
    { name = "Setting 2", probability = "6.8" },
    { name = "Setting 3", probability = "6.5" },
    { name = "Setting 4", probability = "6.2" },
    { name = "Setting 5", probability = "5.8" },
    { name = "Setting 6", probability = "5.5" },
]

# Omitting settings uses the six defaults above.
[[categories]]
category = "red"
count = 62
"#;
    println!("{example}");
}

fn load_config(path: &Path) -> Result<Config> {
    let config =
        Config::from_file(path).with_context(|| format!("Failed to load config from {path:?}"))?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn selected(config: &Config, only: Option<CategoryArg>) -> Result<Vec<&CategoryConfig>> {
    match only {
        Some(c) => {
            let c = Category::from(c);
            let cat = config
                .category(c)
                .with_context(|| format!("category {c} is not configured"))?;
            Ok(vec![cat])
        }
        None => Ok(config.categories.iter().collect()),
    }
}

/// Results in config order, or last to first.
fn display_rows(analysis: &Analysis, descending: bool) -> Vec<&InferenceResult> {
    let mut rows: Vec<&InferenceResult> = analysis.results.iter().collect();
    if descending {
        rows.reverse();
    }
    rows
}

fn print_analysis(category: Category, analysis: &Analysis, descending: bool) {
    println!(
        "\n=== {category}: {} / {} ===",
        analysis.trial.k, analysis.trial.n
    );
    for r in display_rows(analysis, descending) {
        let prob = if r.verdict == discern::Verdict::Unset {
            "unset".to_string()
        } else {
            format!("1/{:.1}", 1.0 / r.probability)
        };
        println!(
            "{:<12} {:>8}  {} {:<20} p={:<8.4} likelihood {:>5.1}%",
            r.name,
            prob,
            r.verdict.symbol(),
            r.verdict.label(),
            r.p_value,
            r.relative_likelihood * 100.0
        );
    }
    match analysis.best() {
        Some(best) => println!(
            "Most likely: {} ({:.1}%)",
            best.name,
            best.relative_likelihood * 100.0
        ),
        None => println!("Most likely: no setting has a usable probability"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Example => {
            print_example_config();
        }

        Commands::Validate => {
            let config = load_config(&cli.config)?;
            info!("Configuration is valid");
            info!("  Total trials: {}", config.total_trials);
            for c in &config.categories {
                let unset = c.candidates().iter().filter(|s| !s.is_set()).count();
                info!(
                    "  {}: count {}, {} settings ({} unset)",
                    c.category,
                    c.count,
                    c.settings.len(),
                    unset
                );
            }
        }

        Commands::Analyze {
            category,
            json,
            descending,
        } => {
            let config = load_config(&cli.config)?;
            let mut all = Vec::new();
            for c in selected(&config, category)? {
                let analysis = config.analyze(c);
                if json {
                    all.push(serde_json::json!({
                        "category": c.category,
                        "analysis": analysis,
                    }));
                } else {
                    print_analysis(c.category, &analysis, descending);
                }
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&all)?);
            }
        }

        Commands::Curves {
            category,
            max_n,
            step,
            json,
        } => {
            let config = load_config(&cli.config)?;
            let max_n = max_n.unwrap_or(config.total_trials);
            let mut all = Vec::new();
            for c in selected(&config, category)? {
                let series = curve_series(&c.candidates(), max_n, step, config.confidence);
                if json {
                    all.push(serde_json::json!({ "category": c.category, "series": series }));
                    continue;
                }
                println!(
                    "\n=== {}: expected counts ({:.0}% range) ===",
                    c.category,
                    config.confidence * 100.0
                );
                for curve in &series.curves {
                    println!("{}", curve.name);
                    for pt in &curve.points {
                        println!(
                            "  n={:<7} {:>9.1}  [{:.1}, {:.1}]",
                            pt.n, pt.expected, pt.lower, pt.upper
                        );
                    }
                }
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&all)?);
            }
        }

        Commands::Distribution { category, json } => {
            let config = load_config(&cli.config)?;
            let mut all = Vec::new();
            for c in selected(&config, category)? {
                let series = distribution_series(&c.candidates(), config.total_trials);
                if json {
                    all.push(serde_json::json!({
                        "category": c.category,
                        "observed": c.count,
                        "series": series,
                    }));
                    continue;
                }
                println!(
                    "\n=== {}: PMF at n={} (observed {}) ===",
                    c.category, series.n, c.count
                );
                let header: Vec<String> = series
                    .pmfs
                    .iter()
                    .map(|p| format!("{:>w$}", p.name, w = p.name.len().max(7)))
                    .collect();
                println!("{:>6}  {}", "x", header.join("  "));
                for (i, x) in series.x_values.iter().enumerate() {
                    let marker = if *x == c.count { "<" } else { " " };
                    let row: Vec<String> = series
                        .pmfs
                        .iter()
                        .map(|p| format!("{:>w$.5}", p.values[i], w = p.name.len().max(7)))
                        .collect();
                    println!("{x:>6}{marker} {}", row.join("  "));
                }
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&all)?);
            }
        }
    }

    Ok(())
}
