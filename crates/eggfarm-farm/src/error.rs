//! Error types for farm operations

use eggfarm_egg::HatchGap;
use eggfarm_skills::SkillTableError;
use thiserror::Error;

/// Farm operation errors
#[derive(Debug, Error)]
pub enum FarmError {
    /// No egg with this name in the farm
    #[error("Egg '{0}' not found")]
    NotFound(String),

    /// Spawning a name that is already taken
    #[error("Egg '{0}' already exists")]
    AlreadyExists(String),

    /// Name cannot be used as an egg file name
    #[error("Invalid egg name '{name}': {reason}")]
    InvalidName {
        /// Rejected name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// Hatched eggs are frozen and accept no more examples
    #[error("Egg '{0}' has already hatched")]
    AlreadyHatched(String),

    /// Hatch attempted before the thresholds were met
    #[error("Egg '{name}' is not ready to hatch: {gap}")]
    NotReady {
        /// Egg name
        name: String,
        /// Quantified shortfall
        gap: HatchGap,
    },

    /// Writing an egg document failed
    #[error("Failed to persist egg '{name}': {source:#}")]
    Persistence {
        /// Egg name
        name: String,
        /// Underlying I/O or encoding error
        source: anyhow::Error,
    },

    /// Opening or reading the farm directory failed
    #[error("Failed to open farm: {0:#}")]
    Open(anyhow::Error),

    /// Feeder configuration is out of range
    #[error("Configuration error: {0}")]
    Config(String),

    /// Skill keyword table failed validation
    #[error(transparent)]
    SkillTable(#[from] SkillTableError),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, FarmError>;
