//! Configuration types for the auto-feeder

use serde::Deserialize;
use std::collections::HashMap;

use crate::error::{FarmError, Result};
use crate::protection::TREND_MIN_SAMPLES;

/// Auto-feeder configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FeederConfig {
    /// Master switch for automatic feeding
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Minimum score for content to be fed, in `[0, 10]`
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f64,

    /// Recently fed content strings kept for duplicate detection
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// Quality samples kept for trend detection
    #[serde(default = "default_quality_window")]
    pub quality_window: usize,

    /// Successful auto-feeds allowed per rolling hour; `0` disables the limit
    #[serde(default = "default_max_feeds_per_hour")]
    pub max_feeds_per_hour: usize,

    /// Keep protection state in the farm's sidecar file between runs
    #[serde(default = "default_persist_state")]
    pub persist_state: bool,

    /// Keyword list overrides keyed by skill identifier
    #[serde(default)]
    pub skill_patterns: HashMap<String, Vec<String>>,
}

fn default_enabled() -> bool {
    true
}

fn default_quality_threshold() -> f64 {
    6.0
}

fn default_cache_size() -> usize {
    100
}

fn default_quality_window() -> usize {
    20
}

fn default_max_feeds_per_hour() -> usize {
    10
}

fn default_persist_state() -> bool {
    true
}

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            quality_threshold: default_quality_threshold(),
            cache_size: default_cache_size(),
            quality_window: default_quality_window(),
            max_feeds_per_hour: default_max_feeds_per_hour(),
            persist_state: default_persist_state(),
            skill_patterns: HashMap::new(),
        }
    }
}

impl FeederConfig {
    /// Reject values the feeder cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=10.0).contains(&self.quality_threshold) {
            return Err(FarmError::Config(format!(
                "quality_threshold must be within 0-10, got {}",
                self.quality_threshold
            )));
        }

        if self.cache_size == 0 {
            return Err(FarmError::Config("cache_size must be at least 1".into()));
        }

        if self.quality_window < TREND_MIN_SAMPLES {
            return Err(FarmError::Config(format!(
                "quality_window must hold at least {TREND_MIN_SAMPLES} samples, got {}",
                self.quality_window
            )));
        }

        Ok(())
    }
}
