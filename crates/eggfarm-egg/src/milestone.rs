//! Achievement ladders
//!
//! Two independent ladders: example count and running-average quality.
//! A milestone is awarded once and never taken back.

/// Condition that unlocks a milestone
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MilestoneRule {
    /// At least this many examples fed
    Examples(u64),
    /// Running quality average at or above this value
    AverageQuality(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Milestone {
    FirstCentury,
    DataCollector,
    TrainingMaster,
    HatchReady,
    QualityThreshold,
    HighQuality,
    ExceptionalQuality,
}

impl Milestone {
    /// Evaluation order: example ladder first, then quality ladder
    pub const ALL: [Milestone; 7] = [
        Milestone::FirstCentury,
        Milestone::DataCollector,
        Milestone::TrainingMaster,
        Milestone::HatchReady,
        Milestone::QualityThreshold,
        Milestone::HighQuality,
        Milestone::ExceptionalQuality,
    ];

    /// Name recorded in the egg's achievements
    pub fn name(&self) -> &'static str {
        match self {
            Milestone::FirstCentury => "First Century",
            Milestone::DataCollector => "Data Collector",
            Milestone::TrainingMaster => "Training Master",
            Milestone::HatchReady => "Hatch Ready",
            Milestone::QualityThreshold => "Quality Threshold",
            Milestone::HighQuality => "High Quality",
            Milestone::ExceptionalQuality => "Exceptional Quality",
        }
    }

    pub fn rule(&self) -> MilestoneRule {
        match self {
            Milestone::FirstCentury => MilestoneRule::Examples(100),
            Milestone::DataCollector => MilestoneRule::Examples(500),
            Milestone::TrainingMaster => MilestoneRule::Examples(1000),
            Milestone::HatchReady => MilestoneRule::Examples(2000),
            Milestone::QualityThreshold => MilestoneRule::AverageQuality(7.0),
            Milestone::HighQuality => MilestoneRule::AverageQuality(8.0),
            Milestone::ExceptionalQuality => MilestoneRule::AverageQuality(9.0),
        }
    }

    pub fn is_reached(&self, total_examples: u64, average_quality: f64) -> bool {
        match self.rule() {
            MilestoneRule::Examples(count) => total_examples >= count,
            MilestoneRule::AverageQuality(threshold) => average_quality >= threshold,
        }
    }
}

/// Milestones reached by the given state that are not in `earned` yet
pub fn newly_reached(earned: &[String], total_examples: u64, average_quality: f64) -> Vec<Milestone> {
    Milestone::ALL
        .into_iter()
        .filter(|m| m.is_reached(total_examples, average_quality))
        .filter(|m| !earned.iter().any(|name| name == m.name()))
        .collect()
}
