//! Egg Farm Eggs
//!
//! An egg is a named training-data container. It collects examples, tracks
//! per-skill progress and decides when its corpus is good enough to hatch.

pub mod egg;
pub mod health;
pub mod milestone;
pub mod report;
pub mod specialization;

pub use egg::{Egg, EggMetadata, NewExample};
pub use health::{HealthReport, HealthStatus, QualityTrend};
pub use milestone::{Milestone, MilestoneRule};
pub use report::{
    DetailedProgress, EggStats, EggSummary, FeedResult, HatchGap, HatchManifest, HatchOutcome,
    SpecializationStats,
};
pub use specialization::Specialization;
