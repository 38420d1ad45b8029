//! The egg aggregate

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use eggfarm_types::{Skill, TrainingExample};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::health::{self, HealthReport};
use crate::milestone;
use crate::report::{
    DetailedProgress, EggStats, EggSummary, FeedResult, HatchGap, HatchManifest, HatchOutcome,
    SpecializationStats,
};
use crate::specialization::Specialization;

/// Default minimum running quality for hatching
pub const DEFAULT_QUALITY_THRESHOLD: f64 = 7.0;
/// Default minimum example count for hatching
pub const DEFAULT_TARGET_EXAMPLES: u64 = 2000;
/// Populated specializations required for hatching
pub const MIN_POPULATED_SPECIALIZATIONS: usize = 3;
const ESTIMATED_TRAINING_TIME: &str = "2-6 hours";

/// Hatch bookkeeping and earned achievements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EggMetadata {
    pub hatched: bool,
    pub hatch_date: Option<DateTime<Utc>>,
    pub model_path: Option<String>,
    pub generation: u32,
    /// Milestone names in the order they were earned
    pub achievements: Vec<String>,
    pub last_fed: Option<DateTime<Utc>>,
}

impl Default for EggMetadata {
    fn default() -> Self {
        Self {
            hatched: false,
            hatch_date: None,
            model_path: None,
            generation: 1,
            achievements: Vec::new(),
            last_fed: None,
        }
    }
}

/// An example waiting to be fed
#[derive(Debug, Clone, PartialEq)]
pub struct NewExample {
    pub input_text: String,
    pub output_text: String,
    pub skill_tags: Vec<String>,
    pub quality_score: f64,
    pub user_feedback: Option<String>,
}

impl NewExample {
    pub fn new(input_text: impl Into<String>, output_text: impl Into<String>, quality_score: f64) -> Self {
        Self {
            input_text: input_text.into(),
            output_text: output_text.into(),
            skill_tags: Vec::new(),
            quality_score,
            user_feedback: None,
        }
    }

    pub fn with_skill_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skill_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_feedback(mut self, feedback: Option<String>) -> Self {
        self.user_feedback = feedback;
        self
    }
}

fn full_registry() -> BTreeMap<Skill, Specialization> {
    Skill::ALL
        .into_iter()
        .map(|skill| (skill, Specialization::default()))
        .collect()
}

/// Egg files key specializations by skill identifier. Every registry skill is
/// present after loading; unknown keys are dropped.
mod specializations_format {
    use super::*;
    use serde::{Deserializer, Serializer};
    use tracing::warn;

    pub fn serialize<S: Serializer>(
        specs: &BTreeMap<Skill, Specialization>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(specs.iter().map(|(skill, spec)| (skill.as_str(), spec)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<Skill, Specialization>, D::Error> {
        let raw = BTreeMap::<String, Specialization>::deserialize(deserializer)?;
        let mut specs = full_registry();
        for (name, spec) in raw {
            match Skill::from_tag(&name) {
                Some(skill) => {
                    specs.insert(skill, spec);
                }
                None => warn!(specialization = %name, "Dropping unknown specialization"),
            }
        }
        Ok(specs)
    }
}

/// A training dataset growing toward a hatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Egg {
    name: String,
    egg_type: String,
    created_date: DateTime<Utc>,
    focus_areas: Vec<Skill>,
    total_examples: u64,
    quality_threshold: f64,
    target_examples: u64,
    #[serde(with = "specializations_format")]
    specializations: BTreeMap<Skill, Specialization>,
    training_examples: Vec<TrainingExample>,
    metadata: EggMetadata,
}

impl Egg {
    /// Create an empty egg with default thresholds
    pub fn new(name: impl Into<String>, focus_areas: Vec<Skill>, egg_type: impl Into<String>) -> Self {
        Self::created_at(name, focus_areas, egg_type, Utc::now())
    }

    pub fn created_at(
        name: impl Into<String>,
        focus_areas: Vec<Skill>,
        egg_type: impl Into<String>,
        created_date: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            egg_type: egg_type.into(),
            created_date,
            focus_areas,
            total_examples: 0,
            quality_threshold: DEFAULT_QUALITY_THRESHOLD,
            target_examples: DEFAULT_TARGET_EXAMPLES,
            specializations: full_registry(),
            training_examples: Vec::new(),
            metadata: EggMetadata::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn egg_type(&self) -> &str {
        &self.egg_type
    }

    pub fn created_date(&self) -> DateTime<Utc> {
        self.created_date
    }

    pub fn focus_areas(&self) -> &[Skill] {
        &self.focus_areas
    }

    pub fn total_examples(&self) -> u64 {
        self.total_examples
    }

    pub fn quality_threshold(&self) -> f64 {
        self.quality_threshold
    }

    pub fn target_examples(&self) -> u64 {
        self.target_examples
    }

    pub fn specializations(&self) -> &BTreeMap<Skill, Specialization> {
        &self.specializations
    }

    pub fn specialization(&self, skill: Skill) -> Option<&Specialization> {
        self.specializations.get(&skill)
    }

    pub fn training_examples(&self) -> &[TrainingExample] {
        &self.training_examples
    }

    pub fn metadata(&self) -> &EggMetadata {
        &self.metadata
    }

    pub fn is_hatched(&self) -> bool {
        self.metadata.hatched
    }

    /// Whether any of `skills` is one of this egg's focus areas
    pub fn accepts_any(&self, skills: &[Skill]) -> bool {
        skills.iter().any(|skill| self.focus_areas.contains(skill))
    }

    /// Feed one example, stamped with the current time
    pub fn feed(&mut self, example: NewExample) -> FeedResult {
        self.feed_at(example, Utc::now())
    }

    /// Feed one example. Never fails; tags outside the registry are kept on
    /// the example but grow no specialization.
    pub fn feed_at(&mut self, example: NewExample, now: DateTime<Utc>) -> FeedResult {
        let NewExample {
            input_text,
            output_text,
            skill_tags,
            quality_score,
            user_feedback,
        } = example;

        let example = TrainingExample::new(
            input_text,
            output_text,
            &skill_tags,
            quality_score,
            user_feedback,
            now,
        );
        let example_id = example.id().to_string();
        let skills: Vec<Skill> = example.known_skills().collect();

        self.training_examples.push(example);
        self.total_examples += 1;
        self.metadata.last_fed = Some(now);

        let mut growth = Vec::with_capacity(skills.len());
        for skill in skills {
            if let Some(spec) = self.specializations.get_mut(&skill) {
                spec.add_example(quality_score);
                growth.push(format!(
                    "{}: +1 example ({:.1}%)",
                    skill,
                    spec.progress() * 100.0
                ));
            }
        }

        let new_achievements = self.award_achievements();
        if !new_achievements.is_empty() {
            debug!(egg = %self.name, achievements = ?new_achievements, "Achievements unlocked");
        }

        FeedResult {
            example_id,
            total_examples: self.total_examples,
            specialization_growth: growth,
            new_achievements,
            hatching_ready: self.is_ready_to_hatch(),
            overall_progress: self.overall_progress(),
            quality_average: self.average_quality(),
        }
    }

    fn award_achievements(&mut self) -> Vec<String> {
        let reached = milestone::newly_reached(
            &self.metadata.achievements,
            self.total_examples,
            self.average_quality(),
        );
        let names: Vec<String> = reached.iter().map(|m| m.name().to_string()).collect();
        self.metadata.achievements.extend(names.iter().cloned());
        names
    }

    /// Mean quality over every example
    pub fn average_quality(&self) -> f64 {
        if self.training_examples.is_empty() {
            return 0.0;
        }
        let sum: f64 = self
            .training_examples
            .iter()
            .map(TrainingExample::quality_score)
            .sum();
        sum / self.training_examples.len() as f64
    }

    /// Progress toward the example target, in `[0, 1]`
    pub fn overall_progress(&self) -> f64 {
        if self.target_examples == 0 {
            return 1.0;
        }
        (self.total_examples as f64 / self.target_examples as f64).min(1.0)
    }

    pub fn populated_specializations(&self) -> usize {
        self.specializations
            .values()
            .filter(|spec| spec.is_populated())
            .count()
    }

    pub fn detailed_progress(&self) -> DetailedProgress {
        let examples = self.overall_progress();
        let quality = (self.average_quality() / 10.0).min(1.0);
        let diversity = self.populated_specializations() as f64 / Skill::COUNT as f64;
        DetailedProgress {
            examples,
            quality,
            diversity,
            combined_average: (examples + quality + diversity) / 3.0,
        }
    }

    /// Shortfall against every hatch condition
    pub fn hatch_gap(&self) -> HatchGap {
        HatchGap {
            examples_needed: self.target_examples.saturating_sub(self.total_examples),
            quality_needed: (self.quality_threshold - self.average_quality()).max(0.0),
            diversity_needed: MIN_POPULATED_SPECIALIZATIONS
                .saturating_sub(self.populated_specializations()),
            already_hatched: self.metadata.hatched,
        }
    }

    /// Volume, quality and breadth are met and the egg has not hatched yet
    pub fn is_ready_to_hatch(&self) -> bool {
        let gap = self.hatch_gap();
        gap.is_met() && !gap.already_hatched
    }

    pub fn hatch(&mut self) -> HatchOutcome {
        self.hatch_at(Utc::now())
    }

    /// Certify the dataset and freeze the egg. No training happens here.
    pub fn hatch_at(&mut self, now: DateTime<Utc>) -> HatchOutcome {
        if !self.is_ready_to_hatch() {
            return HatchOutcome::NotReady(self.hatch_gap());
        }

        let model_name = format!("{}-v{}", self.name, self.metadata.generation);
        let model_path = format!("models/{model_name}.gguf");

        self.metadata.hatched = true;
        self.metadata.hatch_date = Some(now);
        self.metadata.model_path = Some(model_path.clone());

        HatchOutcome::Hatched(HatchManifest {
            model_name,
            model_path,
            training_dataset_size: self.total_examples,
            specializations_learned: self
                .specializations
                .iter()
                .filter(|(_, spec)| spec.is_populated())
                .map(|(skill, _)| *skill)
                .collect(),
            estimated_training_time: ESTIMATED_TRAINING_TIME.to_string(),
            hatch_date: now,
        })
    }

    pub fn check_data_health(&self) -> HealthReport {
        health::assess(&self.training_examples)
    }

    pub fn stats(&self) -> EggStats {
        self.stats_at(Utc::now())
    }

    pub fn stats_at(&self, now: DateTime<Utc>) -> EggStats {
        EggStats {
            name: self.name.clone(),
            egg_type: self.egg_type.clone(),
            age_days: (now - self.created_date).num_days(),
            total_examples: self.total_examples,
            target_examples: self.target_examples,
            overall_progress: self.overall_progress(),
            quality_average: self.average_quality(),
            specializations: self
                .specializations
                .iter()
                .filter(|(_, spec)| spec.is_populated())
                .map(|(skill, spec)| {
                    (
                        skill.as_str().to_string(),
                        SpecializationStats {
                            progress: spec.progress(),
                            examples: spec.examples_collected(),
                            quality: spec.average_quality(),
                        },
                    )
                })
                .collect(),
            achievements: self.metadata.achievements.clone(),
            hatching_ready: self.is_ready_to_hatch(),
            hatched: self.metadata.hatched,
            last_fed: self.metadata.last_fed,
            detailed_progress: self.detailed_progress(),
        }
    }

    pub fn summary(&self) -> EggSummary {
        EggSummary {
            egg_type: self.egg_type.clone(),
            progress: self.overall_progress(),
            examples: self.total_examples,
            quality: self.average_quality(),
            hatched: self.metadata.hatched,
            hatching_ready: self.is_ready_to_hatch(),
        }
    }
}
