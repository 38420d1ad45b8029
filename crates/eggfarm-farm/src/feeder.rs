//! Auto-feeder: routes generated content into compatible eggs
//!
//! Every call walks the same gates in order: disabled switch, freshness,
//! rate limit, skill detection, quality trend and quality threshold. The
//! first gate that refuses ends the call with a [`Rejection`]. Nothing here
//! returns an error to the producer.

use chrono::{DateTime, Utc};
use eggfarm_egg::{HealthStatus, NewExample};
use eggfarm_skills::{calculate_quality_score, SkillRegistry};
use eggfarm_types::Skill;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::FeederConfig;
use crate::error::Result;
use crate::farm::Farm;
use crate::protection::{combined_content, ProtectionState};

/// Gate that refused a piece of content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    /// Auto-feeding is switched off
    Disabled,
    /// Content repeats recent feeds
    Freshness,
    /// Hourly feed budget is spent
    RateLimit,
    /// No registry skill recognised
    Skills,
    /// Recent scores fell below the earlier baseline
    QualityTrend,
    /// Score under the configured threshold
    QualityThreshold,
}

/// Why content was not fed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    /// Refusing gate
    pub gate: Gate,
    /// Human readable reason
    pub reason: String,
}

/// Outcome of one protection check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// Checked and passed
    Pass,
    /// Checked and refused
    Blocked,
    /// Not evaluated
    Skipped,
}

/// Per-gate protection outcome of one auto-feed call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtectionChecks {
    /// Duplicate content check
    pub freshness: CheckStatus,
    /// Hourly rate limit
    pub rate_limit: CheckStatus,
    /// Quality trend check
    pub quality_trend: CheckStatus,
    /// Blocked when any gate refused the content
    pub overall: CheckStatus,
}

impl Default for ProtectionChecks {
    fn default() -> Self {
        Self {
            freshness: CheckStatus::Skipped,
            rate_limit: CheckStatus::Skipped,
            quality_trend: CheckStatus::Skipped,
            overall: CheckStatus::Pass,
        }
    }
}

/// One egg that received the content
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FedEgg {
    /// Egg name
    pub name: String,
    /// Skills the example was tagged with
    pub skills: Vec<Skill>,
    /// Score the example was stored with
    pub quality: f64,
    /// Egg total after the feed
    pub total_examples: u64,
    /// Achievements unlocked by this feed
    pub new_achievements: Vec<String>,
    /// Egg can hatch now
    pub hatching_ready: bool,
}

/// An egg that should have been fed but could not be
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedFailure {
    /// Egg name
    pub name: String,
    /// Error message
    pub error: String,
}

/// Result of one auto-feed call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedBatchResult {
    /// Auto-feeding was switched on
    pub enabled: bool,
    /// Eggs fed, in name order
    pub fed_eggs: Vec<FedEgg>,
    /// Skills recognised in the content, empty when detection did not run
    pub detected_skills: Vec<Skill>,
    /// Heuristic score, when scoring ran
    pub quality_score: Option<f64>,
    /// Per-gate protection outcome
    pub protection: ProtectionChecks,
    /// Set when a gate refused the content
    pub rejection: Option<Rejection>,
    /// Compatible eggs whose feed failed
    pub failures: Vec<FeedFailure>,
}

impl FeedBatchResult {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            fed_eggs: Vec::new(),
            detected_skills: Vec::new(),
            quality_score: None,
            protection: ProtectionChecks::default(),
            rejection: None,
            failures: Vec::new(),
        }
    }

    fn reject(mut self, gate: Gate, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        debug!(gate = ?gate, reason = %reason, "Content rejected");
        self.protection.overall = CheckStatus::Blocked;
        self.rejection = Some(Rejection { gate, reason });
        self
    }

    /// Number of eggs fed
    pub fn total_fed(&self) -> usize {
        self.fed_eggs.len()
    }
}

/// Snapshot of the feeder's switches and protection state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtectionStatus {
    /// Auto-feeding is switched on
    pub enabled: bool,
    /// Minimum accepted score
    pub quality_threshold: f64,
    /// Content strings in the duplicate cache
    pub content_cache_size: usize,
    /// Scores in the trend window
    pub quality_samples: usize,
    /// Mean of the last 10 scores
    pub recent_quality_average: Option<f64>,
    /// Successful feeds in the last hour
    pub feeds_last_hour: usize,
    /// Hourly budget, `0` when unlimited
    pub max_feeds_per_hour: usize,
    /// Protections currently in force
    pub active_protections: Vec<String>,
}

/// Policy engine deciding which eggs ingest a piece of content
pub struct AutoFeeder {
    farm: Farm,
    registry: SkillRegistry,
    config: FeederConfig,
    state: ProtectionState,
}

impl AutoFeeder {
    /// Wrap a farm. Validates the configuration and, when state persistence
    /// is on, restores protection state from the farm's sidecar.
    pub fn new(farm: Farm, config: FeederConfig) -> Result<Self> {
        config.validate()?;

        let registry = if config.skill_patterns.is_empty() {
            SkillRegistry::new()
        } else {
            SkillRegistry::with_overrides(&config.skill_patterns)?
        };

        let mut state: ProtectionState = if config.persist_state {
            farm.store().load_feeder_state()
        } else {
            ProtectionState::default()
        };
        while state.recent_content.len() > config.cache_size {
            state.recent_content.pop_front();
        }
        while state.quality_history.len() > config.quality_window {
            state.quality_history.pop_front();
        }

        debug!(
            cached = state.recent_content.len(),
            samples = state.quality_history.len(),
            "Auto-feeder ready"
        );
        Ok(Self {
            farm,
            registry,
            config,
            state,
        })
    }

    /// Farm being fed
    pub fn farm(&self) -> &Farm {
        &self.farm
    }

    /// Mutable farm access for direct feeds and hatching
    pub fn farm_mut(&mut self) -> &mut Farm {
        &mut self.farm
    }

    /// Give the farm back
    pub fn into_farm(self) -> Farm {
        self.farm
    }

    /// Active configuration, including runtime switches
    pub fn config(&self) -> &FeederConfig {
        &self.config
    }

    /// Current protection collections
    pub fn protection_state(&self) -> &ProtectionState {
        &self.state
    }

    /// Registry skills exercised by `text`
    pub fn detect_skills(&self, text: &str) -> Vec<Skill> {
        self.registry.detect(text)
    }

    /// Heuristic quality score in `[0, 9.5]`
    pub fn calculate_quality_score(&self, input: &str, output: &str, context: &str) -> f64 {
        calculate_quality_score(input, output, context)
    }

    /// Whether the egg `name` should receive content exercising `skills`
    pub fn should_feed_egg(&self, name: &str, skills: &[Skill]) -> bool {
        if !self.config.enabled {
            return false;
        }

        let Some(egg) = self.farm.egg(name) else {
            return false;
        };
        if egg.is_hatched() {
            return false;
        }

        if egg.check_data_health().status == HealthStatus::Unhealthy {
            debug!(egg = name, "Skipping unhealthy egg");
            return false;
        }

        egg.accepts_any(skills)
    }

    /// Feed content into every compatible egg if the protections allow it
    pub fn auto_feed_compatible_eggs(
        &mut self,
        input: &str,
        output: &str,
        context: &str,
        user_feedback: Option<&str>,
    ) -> FeedBatchResult {
        self.auto_feed_at(input, output, context, user_feedback, Utc::now())
    }

    /// [`Self::auto_feed_compatible_eggs`] with an explicit clock
    pub fn auto_feed_at(
        &mut self,
        input: &str,
        output: &str,
        context: &str,
        user_feedback: Option<&str>,
        now: DateTime<Utc>,
    ) -> FeedBatchResult {
        let mut result = FeedBatchResult::new(self.config.enabled);
        if !self.config.enabled {
            return result.reject(Gate::Disabled, "Auto-feeding is disabled");
        }

        let content = combined_content(input, output);
        if let Some(reason) = self.state.freshness_violation(&content) {
            result.protection.freshness = CheckStatus::Blocked;
            return result.reject(Gate::Freshness, reason);
        }
        result.protection.freshness = CheckStatus::Pass;

        if self.config.max_feeds_per_hour > 0 {
            if let Some(reason) = self.state.rate_violation(now, self.config.max_feeds_per_hour) {
                result.protection.rate_limit = CheckStatus::Blocked;
                return result.reject(Gate::RateLimit, reason);
            }
            result.protection.rate_limit = CheckStatus::Pass;
        }

        result.detected_skills = self.detect_skills(&content);
        if result.detected_skills.is_empty() {
            return result.reject(Gate::Skills, "No relevant skills detected");
        }

        let score = self.calculate_quality_score(input, output, context);
        result.quality_score = Some(score);

        let trend = self.state.record_quality(score, self.config.quality_window);
        self.save_state();
        if let Some(reason) = trend {
            result.protection.quality_trend = CheckStatus::Blocked;
            return result.reject(Gate::QualityTrend, reason);
        }
        result.protection.quality_trend = CheckStatus::Pass;

        if score < self.config.quality_threshold {
            return result.reject(Gate::QualityThreshold, format!("Quality too low: {score:.1}"));
        }

        let names: Vec<String> = self.farm.egg_names().map(str::to_string).collect();
        for name in names {
            if !self.should_feed_egg(&name, &result.detected_skills) {
                continue;
            }

            let example = NewExample::new(input, output, score)
                .with_skill_tags(result.detected_skills.iter().map(Skill::as_str))
                .with_feedback(user_feedback.map(str::to_string));

            match self.farm.feed_egg_at(&name, example, now) {
                Ok(fed) => result.fed_eggs.push(FedEgg {
                    name,
                    skills: result.detected_skills.clone(),
                    quality: score,
                    total_examples: fed.total_examples,
                    new_achievements: fed.new_achievements,
                    hatching_ready: fed.hatching_ready,
                }),
                Err(e) => {
                    warn!(egg = %name, "Auto-feed failed: {}", e);
                    result.failures.push(FeedFailure {
                        name,
                        error: e.to_string(),
                    });
                }
            }
        }

        if !result.fed_eggs.is_empty() {
            self.state.remember_content(content, self.config.cache_size);
            self.state.record_feed(now);
            self.save_state();
        }

        info!(
            fed = result.total_fed(),
            failed = result.failures.len(),
            score,
            "Auto-feed complete"
        );
        result
    }

    /// Sidecar writes are best effort; a failure only costs protection
    /// history on the next run
    fn save_state(&self) {
        if !self.config.persist_state {
            return;
        }
        if let Err(e) = self.farm.store().save_feeder_state(&self.state) {
            warn!("Failed to save feeder state: {:#}", e);
        }
    }

    /// Switch auto-feeding on
    pub fn enable(&mut self) {
        self.config.enabled = true;
        info!("Auto-feeding enabled");
    }

    /// Switch auto-feeding off
    pub fn disable(&mut self) {
        self.config.enabled = false;
        info!("Auto-feeding disabled");
    }

    /// Auto-feeding is switched on
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Set the minimum accepted score, clamped to `[0, 10]`
    pub fn set_quality_threshold(&mut self, threshold: f64) {
        self.config.quality_threshold = threshold.clamp(0.0, 10.0);
        info!(threshold = self.config.quality_threshold, "Quality threshold updated");
    }

    /// Minimum accepted score
    pub fn quality_threshold(&self) -> f64 {
        self.config.quality_threshold
    }

    /// Protection snapshot as of now
    pub fn protection_status(&self) -> ProtectionStatus {
        self.protection_status_at(Utc::now())
    }

    /// Protection snapshot as of `now`
    pub fn protection_status_at(&self, now: DateTime<Utc>) -> ProtectionStatus {
        let mut active_protections = vec![
            "content_deduplication".to_string(),
            "quality_trend_monitoring".to_string(),
        ];
        if self.config.max_feeds_per_hour > 0 {
            active_protections.push("rate_limiting".to_string());
        }

        ProtectionStatus {
            enabled: self.config.enabled,
            quality_threshold: self.config.quality_threshold,
            content_cache_size: self.state.recent_content.len(),
            quality_samples: self.state.quality_history.len(),
            recent_quality_average: self.state.recent_quality_average(),
            feeds_last_hour: self.state.feeds_in_last_hour(now),
            max_feeds_per_hour: self.config.max_feeds_per_hour,
            active_protections,
        }
    }
}
