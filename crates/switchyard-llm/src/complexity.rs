//! Prompt complexity estimation
//!
//! The router biases backend choice by a coarse [`Complexity`] class. The
//! estimate is a pluggable strategy; [`KeywordEstimator`] is the default.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse estimate of how demanding a prompt is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// Quick or simple task
    Low,
    /// Anything in between
    Medium,
    /// Design, security, review or long prompts
    High,
}

impl Complexity {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a prompt to a complexity class
///
/// Implementations must be pure: the same prompt always yields the same class.
pub trait ComplexityEstimator: Send + Sync {
    /// Estimate the complexity of `prompt`
    fn estimate(&self, prompt: &str) -> Complexity;
}

/// Default high-signal terms
pub const DEFAULT_HIGH_KEYWORDS: &[&str] = &[
    "architecture",
    "design pattern",
    "optimize",
    "optimise",
    "security",
    "review",
    "架构",
    "设计模式",
    "优化",
    "安全",
    "审查",
];

/// Default low-signal terms
pub const DEFAULT_LOW_KEYWORDS: &[&str] = &["simple", "basic", "quick", "简单", "基础", "快速"];

/// Prompts longer than this many characters are treated as high complexity
pub const DEFAULT_LENGTH_THRESHOLD: usize = 500;

/// Keyword and length heuristic
///
/// Checks run in order and short-circuit: high-signal keywords, low-signal
/// keywords, prompt length, then `Medium`.
#[derive(Debug, Clone)]
pub struct KeywordEstimator {
    high: Vec<String>,
    low: Vec<String>,
    length_threshold: usize,
}

impl KeywordEstimator {
    /// Create an estimator with custom keyword sets and length threshold
    #[must_use]
    pub fn new<S: AsRef<str>>(high: &[S], low: &[S], length_threshold: usize) -> Self {
        let lower = |words: &[S]| {
            words
                .iter()
                .map(|w| w.as_ref().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        };
        Self {
            high: lower(high),
            low: lower(low),
            length_threshold,
        }
    }
}

impl Default for KeywordEstimator {
    fn default() -> Self {
        Self::new(
            DEFAULT_HIGH_KEYWORDS,
            DEFAULT_LOW_KEYWORDS,
            DEFAULT_LENGTH_THRESHOLD,
        )
    }
}

impl ComplexityEstimator for KeywordEstimator {
    fn estimate(&self, prompt: &str) -> Complexity {
        let lower = prompt.to_lowercase();

        if self.high.iter().any(|k| lower.contains(k.as_str())) {
            Complexity::High
        } else if self.low.iter().any(|k| lower.contains(k.as_str())) {
            Complexity::Low
        } else if prompt.chars().count() > self.length_threshold {
            Complexity::High
        } else {
            Complexity::Medium
        }
    }
}
