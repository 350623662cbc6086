//! Caller-owned state for the command-line shell.
//!
//! A config holds everything the shell needs between runs of the engine: the total trial
//! count, the observed count per category, and the probability text of each setting. The
//! engine only ever sees the parsed [`Candidate`]s and a [`Trial`] built from it.
//!
//! ```toml
//! total_trials = 1000
//! significance = 0.05
//!
//! [[categories]]
//! category = "yellow"
//! count = 150
//! settings = [
//!     { name = "Setting 1", probability = "7.0" },
//!     { name = "Setting 6", probability = "1/5.5" },
//! ]
//! ```

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::{analyze, Analysis, Candidate, DiscernError, Result, Trial};

/// Event categories tracked side by side. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Yellow,
    Red,
    Green,
    Blue,
}

impl Category {
    pub const ALL: [Category; 4] = [Self::Yellow, Self::Red, Self::Green, Self::Blue];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Total number of trials, shared by every category
    #[serde(default = "default_total_trials")]
    pub total_trials: u64,

    /// Significance level for verdicts
    #[serde(default = "default_significance")]
    pub significance: f64,

    /// Confidence level for expected-range curves
    #[serde(default = "default_confidence")]
    pub confidence: f64,

    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryConfig>,
}

/// Observed count and candidate settings for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub category: Category,

    /// Observed successes
    #[serde(default)]
    pub count: u64,

    /// Candidate settings, in display order
    #[serde(default = "default_settings")]
    pub settings: Vec<SettingSpec>,
}

/// A setting as typed by the user; `probability` is parsed at analysis time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingSpec {
    pub name: String,
    pub probability: String,
}

fn default_total_trials() -> u64 {
    1000
}

fn default_significance() -> f64 {
    crate::DEFAULT_SIGNIFICANCE
}

fn default_confidence() -> f64 {
    crate::DEFAULT_CONFIDENCE
}

/// Six settings, one in 7.0 up to one in 5.5.
fn default_settings() -> Vec<SettingSpec> {
    ["7.0", "6.8", "6.5", "6.2", "5.8", "5.5"]
        .iter()
        .enumerate()
        .map(|(i, d)| SettingSpec {
            name: format!("Setting {}", i + 1),
            probability: (*d).to_string(),
        })
        .collect()
}

fn default_categories() -> Vec<CategoryConfig> {
    Category::ALL
        .iter()
        .map(|&category| CategoryConfig {
            category,
            count: 0,
            settings: default_settings(),
        })
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            total_trials: default_total_trials(),
            significance: default_significance(),
            confidence: default_confidence(),
            categories: default_categories(),
        }
    }
}

impl CategoryConfig {
    /// Parse every setting; unparsable text becomes an unset candidate.
    #[must_use]
    pub fn candidates(&self) -> Vec<Candidate> {
        self.settings
            .iter()
            .map(|s| Candidate::from_text(s.name.clone(), &s.probability))
            .collect()
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// [`DiscernError::ConfigRead`] if the file cannot be read, [`DiscernError::ConfigParse`]
    /// if it is not valid TOML for this schema.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DiscernError::ConfigRead {
            path: path.to_owned(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| DiscernError::ConfigParse {
            path: path.to_owned(),
            source: e,
        })
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// [`DiscernError::Toml`] if the text does not match the schema.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Check the invariants the schema cannot express.
    ///
    /// # Errors
    ///
    /// [`DiscernError::Invalid`] naming the first violation.
    pub fn validate(&self) -> Result<()> {
        if !(self.significance > 0.0 && self.significance < 1.0) {
            return Err(DiscernError::Invalid(format!(
                "significance must be in (0, 1), got {}",
                self.significance
            )));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(DiscernError::Invalid(format!(
                "confidence must be in (0, 1), got {}",
                self.confidence
            )));
        }

        let mut seen = HashSet::new();
        for c in &self.categories {
            if !seen.insert(c.category) {
                return Err(DiscernError::Invalid(format!(
                    "category {} is configured twice",
                    c.category
                )));
            }
            if c.count > self.total_trials {
                return Err(DiscernError::Invalid(format!(
                    "{}: count {} exceeds total_trials {}",
                    c.category, c.count, self.total_trials
                )));
            }
            if c.settings.is_empty() {
                return Err(DiscernError::Invalid(format!("{}: no settings", c.category)));
            }
            let mut names = HashSet::new();
            for s in &c.settings {
                if !names.insert(s.name.as_str()) {
                    return Err(DiscernError::Invalid(format!(
                        "{}: setting {:?} is listed twice",
                        c.category, s.name
                    )));
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn category(&self, category: Category) -> Option<&CategoryConfig> {
        self.categories.iter().find(|c| c.category == category)
    }

    /// The trial for `category`: its count out of the shared total.
    #[must_use]
    pub fn trial(&self, category: &CategoryConfig) -> Trial {
        Trial::new(self.total_trials, category.count)
    }

    /// Run the engine for one category.
    #[must_use]
    pub fn analyze(&self, category: &CategoryConfig) -> Analysis {
        analyze(
            self.trial(category),
            &category.candidates(),
            self.significance,
        )
    }
}
