//! Per-skill progress tracker

use serde::{Deserialize, Serialize};

/// Examples a specialization needs before it counts as complete
pub const DEFAULT_SPECIALIZATION_TARGET: u64 = 500;

fn default_target() -> u64 {
    DEFAULT_SPECIALIZATION_TARGET
}

/// Counts examples and their quality for one skill of one egg.
///
/// `examples_collected` always equals `quality_scores.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialization {
    examples_collected: u64,
    quality_scores: Vec<f64>,
    #[serde(default = "default_target")]
    target_examples: u64,
}

impl Specialization {
    pub fn new(target_examples: u64) -> Self {
        Self {
            examples_collected: 0,
            quality_scores: Vec::new(),
            target_examples,
        }
    }

    /// Record one example. Scores are expected in `[0, 10]` but not checked.
    pub fn add_example(&mut self, quality_score: f64) {
        self.examples_collected += 1;
        self.quality_scores.push(quality_score);
    }

    /// Fraction of the target collected, capped at 1.0
    pub fn progress(&self) -> f64 {
        if self.target_examples == 0 {
            return 1.0;
        }
        (self.examples_collected as f64 / self.target_examples as f64).min(1.0)
    }

    /// Mean quality, or 0.0 with no examples
    pub fn average_quality(&self) -> f64 {
        if self.quality_scores.is_empty() {
            return 0.0;
        }
        self.quality_scores.iter().sum::<f64>() / self.quality_scores.len() as f64
    }

    pub fn examples_collected(&self) -> u64 {
        self.examples_collected
    }

    pub fn quality_scores(&self) -> &[f64] {
        &self.quality_scores
    }

    pub fn target_examples(&self) -> u64 {
        self.target_examples
    }

    pub fn is_populated(&self) -> bool {
        self.examples_collected > 0
    }
}

impl Default for Specialization {
    fn default() -> Self {
        Self::new(DEFAULT_SPECIALIZATION_TARGET)
    }
}
