//! Auto-feeder protection state
//!
//! Three bounded collections guard the eggs against degradation: a cache of
//! recently fed content for duplicate detection, a window of quality scores
//! for trend detection and the timestamps of recent feeds for rate limiting.
//! Similarity is lexical only: bag-of-words Jaccard over lower-cased
//! whitespace tokens, so paraphrases pass and reordered text does not.

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Quality samples needed before the trend is evaluated
pub const TREND_MIN_SAMPLES: usize = 15;
const TREND_RECENT: usize = 5;
const TREND_BASELINE: usize = 10;
/// Drop of the recent mean below the baseline mean that blocks feeding
const TREND_MAX_DROP: f64 = 0.3;
const EPSILON: f64 = 1e-9;

/// Similarity above which a cached item counts as "similar"
const SIMILAR_THRESHOLD: f64 = 0.7;
/// Similar cached items tolerated before content is refused
const MAX_SIMILAR_ITEMS: usize = 3;
/// Similarity above which content is a near-duplicate
const DUPLICATE_THRESHOLD: f64 = 0.8;

/// Samples averaged for the status view
const STATUS_QUALITY_SAMPLES: usize = 10;

fn rate_window() -> Duration {
    Duration::hours(1)
}

/// The text remembered for duplicate detection
pub fn combined_content(input: &str, output: &str) -> String {
    format!("{input} {output}")
}

fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

fn jaccard_similarity(set_a: &HashSet<String>, set_b: &HashSet<String>) -> f64 {
    let intersection = set_a.intersection(set_b).count();
    let union = set_a.union(set_b).count();

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

fn mean<'a>(values: impl Iterator<Item = &'a f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Persistent protection state, stored in the farm's sidecar document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtectionState {
    /// Combined content of recent successful feeds, oldest first
    pub recent_content: VecDeque<String>,
    /// Recent quality scores, oldest first
    pub quality_history: VecDeque<f64>,
    /// Times of recent successful feeds, oldest first
    pub feed_times: VecDeque<DateTime<Utc>>,
}

impl ProtectionState {
    /// Reason to refuse `content` as a near-duplicate of recent feeds, if any
    pub fn freshness_violation(&self, content: &str) -> Option<String> {
        if self.recent_content.is_empty() {
            return None;
        }

        let words = word_set(content);
        let similarities: Vec<f64> = self
            .recent_content
            .iter()
            .map(|cached| jaccard_similarity(&words, &word_set(cached)))
            .collect();

        let similar = similarities.iter().filter(|s| **s > SIMILAR_THRESHOLD).count();
        if similar > MAX_SIMILAR_ITEMS {
            return Some(format!("Too many similar items ({similar})"));
        }

        let max_similarity = similarities.iter().copied().fold(0.0, f64::max);
        if max_similarity > DUPLICATE_THRESHOLD {
            return Some(format!("Content too similar ({:.1}%)", max_similarity * 100.0));
        }

        None
    }

    /// Successful feeds inside the sliding hour ending at `now`
    pub fn feeds_in_last_hour(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - rate_window();
        self.feed_times.iter().filter(|t| **t > cutoff).count()
    }

    /// Reason to refuse a feed at `now` under the hourly limit, if any.
    /// A limit of `0` disables rate limiting.
    pub fn rate_violation(&self, now: DateTime<Utc>, max_per_hour: usize) -> Option<String> {
        if max_per_hour == 0 {
            return None;
        }

        let recent = self.feeds_in_last_hour(now);
        (recent >= max_per_hour)
            .then(|| format!("Rate limit reached ({recent} feeds in the last hour)"))
    }

    /// How far the last 5 samples fall below the 10 before them; positive
    /// means quality is dropping
    pub fn quality_degradation(&self) -> Option<f64> {
        if self.quality_history.len() < TREND_MIN_SAMPLES {
            return None;
        }

        let len = self.quality_history.len();
        let recent = mean(self.quality_history.range(len - TREND_RECENT..))?;
        let baseline =
            mean(self.quality_history.range(len - TREND_RECENT - TREND_BASELINE..len - TREND_RECENT))?;
        Some(baseline - recent)
    }

    /// Push a score into the bounded window, then report a declining trend
    pub fn record_quality(&mut self, score: f64, window: usize) -> Option<String> {
        self.quality_history.push_back(score);
        while self.quality_history.len() > window {
            self.quality_history.pop_front();
        }

        match self.quality_degradation() {
            Some(drop) if drop + EPSILON >= TREND_MAX_DROP => {
                Some(format!("Quality dropped {drop:.2} points"))
            }
            _ => None,
        }
    }

    /// Remember fed content, evicting the oldest beyond `capacity`
    pub fn remember_content(&mut self, content: String, capacity: usize) {
        self.recent_content.push_back(content);
        while self.recent_content.len() > capacity {
            self.recent_content.pop_front();
        }
    }

    /// Record a successful feed and forget feeds older than the rate window
    pub fn record_feed(&mut self, now: DateTime<Utc>) {
        let cutoff = now - rate_window();
        while self.feed_times.front().is_some_and(|t| *t <= cutoff) {
            self.feed_times.pop_front();
        }
        self.feed_times.push_back(now);
    }

    /// Mean of the last 10 quality samples
    pub fn recent_quality_average(&self) -> Option<f64> {
        let skip = self.quality_history.len().saturating_sub(STATUS_QUALITY_SAMPLES);
        mean(self.quality_history.iter().skip(skip))
    }
}
