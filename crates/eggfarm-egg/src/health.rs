//! Data health diagnostics
//!
//! The report is advisory. The auto-feeder stops feeding eggs whose status is
//! [`HealthStatus::Unhealthy`], nothing else reads it as a gate.

use std::collections::{HashMap, HashSet};

use eggfarm_types::{Skill, TrainingExample};
use serde::Serialize;

/// Examples needed before the quality trend is evaluated
const TREND_MIN_EXAMPLES: usize = 20;
/// Size of the "recent" slice for the quality trend
const TREND_RECENT: usize = 10;
const TREND_DELTA: f64 = 0.5;
/// Absorbs float noise when comparing means against a threshold
const EPSILON: f64 = 1e-9;
const MAX_REPETITION_RATE: f64 = 0.1;
const MIN_DIVERSITY: f64 = 0.3;
/// Examples inspected by the overingestion check
const FRESHNESS_WINDOW: usize = 100;
const FRESHNESS_MIN_WORD_LEN: usize = 4;
const MAX_WORD_SHARE: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTrend {
    Stable,
    Improving,
    Declining,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub warnings: Vec<String>,
    pub quality_trend: QualityTrend,
    /// Share of the skill registry present in the examples
    pub diversity_score: f64,
    /// 1.0 when fresh, 0.5 when overingestion was detected
    pub freshness_score: f64,
    /// Share of examples repeating earlier content
    pub repetition_rate: f64,
}

impl HealthReport {
    fn empty() -> Self {
        Self {
            status: HealthStatus::Healthy,
            warnings: Vec::new(),
            quality_trend: QualityTrend::Stable,
            diversity_score: 0.0,
            freshness_score: 1.0,
            repetition_rate: 0.0,
        }
    }
}

fn mean(scores: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = scores.fold((0.0, 0usize), |(sum, count), s| (sum + s, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn quality_trend(examples: &[TrainingExample]) -> QualityTrend {
    if examples.len() < TREND_MIN_EXAMPLES {
        return QualityTrend::Stable;
    }

    let split = examples.len() - TREND_RECENT;
    let older = mean(examples[..split].iter().map(TrainingExample::quality_score));
    let recent = mean(examples[split..].iter().map(TrainingExample::quality_score));

    if older - recent + EPSILON >= TREND_DELTA {
        QualityTrend::Declining
    } else if recent - older + EPSILON >= TREND_DELTA {
        QualityTrend::Improving
    } else {
        QualityTrend::Stable
    }
}

fn repetition_rate(examples: &[TrainingExample]) -> f64 {
    let mut seen = HashSet::new();
    let repeated = examples
        .iter()
        .filter(|example| !seen.insert(example.content_hash()))
        .count();
    repeated as f64 / examples.len() as f64
}

fn diversity_score(examples: &[TrainingExample]) -> f64 {
    let skills: HashSet<Skill> = examples.iter().flat_map(|e| e.known_skills()).collect();
    skills.len() as f64 / Skill::COUNT as f64
}

/// True when one significant input word shows up in too many recent examples
fn is_overingested(examples: &[TrainingExample]) -> bool {
    let window = &examples[examples.len().saturating_sub(FRESHNESS_WINDOW)..];

    let mut frequency: HashMap<String, usize> = HashMap::new();
    for example in window {
        let lowered = example.input().to_lowercase();
        let words: HashSet<&str> = lowered
            .split_whitespace()
            .filter(|word| word.chars().count() > FRESHNESS_MIN_WORD_LEN)
            .collect();
        for word in words {
            *frequency.entry(word.to_string()).or_default() += 1;
        }
    }

    let max_frequency = frequency.values().copied().max().unwrap_or(0);
    max_frequency as f64 > window.len() as f64 * MAX_WORD_SHARE
}

/// Assess an egg's examples
pub fn assess(examples: &[TrainingExample]) -> HealthReport {
    let mut report = HealthReport::empty();
    if examples.is_empty() {
        return report;
    }

    report.quality_trend = quality_trend(examples);
    if report.quality_trend == QualityTrend::Declining {
        report.warnings.push("Quality degradation detected".to_string());
    }

    report.repetition_rate = repetition_rate(examples);
    if report.repetition_rate > MAX_REPETITION_RATE {
        report.warnings.push(format!(
            "High content repetition: {:.1}%",
            report.repetition_rate * 100.0
        ));
    }

    report.diversity_score = diversity_score(examples);
    if report.diversity_score < MIN_DIVERSITY {
        report
            .warnings
            .push("Low skill diversity - risk of overfitting".to_string());
    }

    if is_overingested(examples) {
        report
            .warnings
            .push("Overingestion detected - similar contexts repeated".to_string());
        report.freshness_score = 0.5;
    }

    report.status = match report.warnings.len() {
        0 => HealthStatus::Healthy,
        1..=2 => HealthStatus::Warning,
        _ => HealthStatus::Unhealthy,
    };

    report
}
