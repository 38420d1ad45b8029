//! Structured results returned by egg operations

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use eggfarm_types::Skill;
use serde::Serialize;

/// Outcome of feeding one example into an egg
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedResult {
    pub example_id: String,
    pub total_examples: u64,
    /// One line per registry skill that grew, e.g. `academic_writing: +1 example (0.2%)`
    pub specialization_growth: Vec<String>,
    pub new_achievements: Vec<String>,
    pub hatching_ready: bool,
    pub overall_progress: f64,
    pub quality_average: f64,
}

/// What an egg still lacks before it can hatch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HatchGap {
    pub examples_needed: u64,
    pub quality_needed: f64,
    pub diversity_needed: usize,
    pub already_hatched: bool,
}

impl HatchGap {
    /// No volume, quality or diversity shortfall
    pub fn is_met(&self) -> bool {
        self.examples_needed == 0 && self.quality_needed <= 0.0 && self.diversity_needed == 0
    }
}

impl fmt::Display for HatchGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.already_hatched {
            return f.write_str("already hatched");
        }
        write!(
            f,
            "needs {} more examples, {:.2} more average quality, {} more specializations",
            self.examples_needed, self.quality_needed, self.diversity_needed
        )
    }
}

/// Description of the dataset certified by a successful hatch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HatchManifest {
    pub model_name: String,
    pub model_path: String,
    pub training_dataset_size: u64,
    pub specializations_learned: Vec<Skill>,
    pub estimated_training_time: String,
    pub hatch_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HatchOutcome {
    Hatched(HatchManifest),
    NotReady(HatchGap),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecializationStats {
    pub progress: f64,
    pub examples: u64,
    pub quality: f64,
}

/// Progress along each hatch dimension, each in `[0, 1]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedProgress {
    pub examples: f64,
    pub quality: f64,
    pub diversity: f64,
    pub combined_average: f64,
}

/// Full statistics for one egg
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EggStats {
    pub name: String,
    #[serde(rename = "type")]
    pub egg_type: String,
    pub age_days: i64,
    pub total_examples: u64,
    pub target_examples: u64,
    pub overall_progress: f64,
    pub quality_average: f64,
    /// Only specializations with at least one example
    pub specializations: BTreeMap<String, SpecializationStats>,
    pub achievements: Vec<String>,
    pub hatching_ready: bool,
    pub hatched: bool,
    pub last_fed: Option<DateTime<Utc>>,
    pub detailed_progress: DetailedProgress,
}

/// One row of a farm listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EggSummary {
    #[serde(rename = "type")]
    pub egg_type: String,
    pub progress: f64,
    pub examples: u64,
    pub quality: f64,
    pub hatched: bool,
    pub hatching_ready: bool,
}
