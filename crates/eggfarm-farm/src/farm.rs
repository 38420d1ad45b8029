//! The farm: a named collection of eggs backed by a directory of documents

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use eggfarm_egg::{
    Egg, EggStats, EggSummary, FeedResult, HatchManifest, HatchOutcome, HealthReport, NewExample,
};
use eggfarm_persistence::FarmStore;
use eggfarm_types::Skill;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{FarmError, Result};

/// Longest accepted egg name
pub const MAX_NAME_LENGTH: usize = 64;

/// Reply to a successful spawn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpawnResult {
    /// Name of the new egg
    pub name: String,
    /// Free-form egg label
    pub egg_type: String,
    /// Skills the egg accepts
    pub focus_areas: Vec<Skill>,
    /// Examples needed before the egg can hatch
    pub target_examples: u64,
}

/// Listing of every egg in the farm
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarmSummary {
    /// Number of eggs
    pub total_eggs: usize,
    /// One row per egg, by name
    pub eggs: BTreeMap<String, EggSummary>,
    /// Eggs that have hatched
    pub hatched_models: usize,
}

/// Preset focus areas for common egg kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EggTemplate {
    /// Formal papers and reports
    Academic,
    /// Writing in the user's own voice
    Voice,
    /// Technical documentation
    Technical,
}

impl EggTemplate {
    /// Every template
    pub const ALL: [EggTemplate; 3] = [Self::Academic, Self::Voice, Self::Technical];

    /// Template identifier, also used as the egg type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Academic => "academic",
            Self::Voice => "voice",
            Self::Technical => "technical",
        }
    }

    /// Name used when the caller does not pick one
    pub fn default_name(&self) -> &'static str {
        match self {
            Self::Academic => "academic-writer",
            Self::Voice => "voice-mimic",
            Self::Technical => "tech-writer",
        }
    }

    /// Focus areas of eggs spawned from this template
    pub fn focus_areas(&self) -> Vec<Skill> {
        match self {
            Self::Academic => vec![
                Skill::AcademicWriting,
                Skill::IeeeFormatting,
                Skill::ResearchSynthesis,
            ],
            Self::Voice => vec![
                Skill::VoiceMimicry,
                Skill::AntiAiPatterns,
                Skill::ContentTransformation,
            ],
            Self::Technical => vec![
                Skill::TechnicalDocumentation,
                Skill::ContentTransformation,
                Skill::AntiAiPatterns,
            ],
        }
    }
}

impl fmt::Display for EggTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EggTemplate {
    type Err = FarmError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|template| template.as_str() == s)
            .ok_or_else(|| FarmError::Config(format!("unknown egg template '{s}'")))
    }
}

/// Check that `name` can be used as an egg file name
fn validate_name(name: &str) -> Result<()> {
    let invalid = |reason: String| FarmError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name cannot be empty".into()));
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(invalid(format!(
            "name exceeds {MAX_NAME_LENGTH} characters (was {})",
            name.len()
        )));
    }

    let name_re = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$")
        .map_err(|e| invalid(format!("failed to compile name validation regex: {e}")))?;

    if !name_re.is_match(name) {
        return Err(invalid(
            "must start with a letter or digit and contain only letters, digits, '.', '_' and '-'"
                .into(),
        ));
    }

    Ok(())
}

/// A collection of eggs persisted one document per egg
pub struct Farm {
    store: FarmStore,
    eggs: BTreeMap<String, Egg>,
}

impl Farm {
    /// Open a farm directory and load every egg in it
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let store = FarmStore::open(dir).map_err(FarmError::Open)?;

        let mut eggs = BTreeMap::new();
        for egg in store.load_eggs().map_err(FarmError::Open)? {
            if let Err(e) = validate_name(egg.name()) {
                warn!("Skipping stored egg: {}", e);
                continue;
            }
            eggs.insert(egg.name().to_string(), egg);
        }

        info!("Farm opened with {} eggs", eggs.len());
        Ok(Self { store, eggs })
    }

    /// Underlying document store
    pub fn store(&self) -> &FarmStore {
        &self.store
    }

    /// Farm directory
    pub fn dir(&self) -> &Path {
        self.store.dir()
    }

    /// Read-only view of one egg
    pub fn egg(&self, name: &str) -> Option<&Egg> {
        self.eggs.get(name)
    }

    /// Egg names in order
    pub fn egg_names(&self) -> impl Iterator<Item = &str> {
        self.eggs.keys().map(String::as_str)
    }

    /// Number of eggs
    pub fn len(&self) -> usize {
        self.eggs.len()
    }

    /// No eggs yet
    pub fn is_empty(&self) -> bool {
        self.eggs.is_empty()
    }

    fn egg_or_not_found(&self, name: &str) -> Result<&Egg> {
        self.eggs
            .get(name)
            .ok_or_else(|| FarmError::NotFound(name.to_string()))
    }

    fn persist(&self, egg: &Egg) -> Result<()> {
        self.store
            .save_egg(egg)
            .map_err(|source| FarmError::Persistence {
                name: egg.name().to_string(),
                source,
            })
    }

    /// Create and persist a new egg
    pub fn spawn_egg(
        &mut self,
        name: &str,
        focus_areas: Vec<Skill>,
        egg_type: &str,
    ) -> Result<SpawnResult> {
        self.spawn_egg_at(name, focus_areas, egg_type, Utc::now())
    }

    /// Create and persist a new egg with an explicit creation time
    pub fn spawn_egg_at(
        &mut self,
        name: &str,
        focus_areas: Vec<Skill>,
        egg_type: &str,
        now: DateTime<Utc>,
    ) -> Result<SpawnResult> {
        validate_name(name)?;
        if self.eggs.contains_key(name) {
            return Err(FarmError::AlreadyExists(name.to_string()));
        }

        let egg = Egg::created_at(name, focus_areas, egg_type, now);
        self.persist(&egg)?;

        let result = SpawnResult {
            name: name.to_string(),
            egg_type: egg.egg_type().to_string(),
            focus_areas: egg.focus_areas().to_vec(),
            target_examples: egg.target_examples(),
        };

        info!(egg = name, egg_type, "Spawned egg");
        self.eggs.insert(name.to_string(), egg);
        Ok(result)
    }

    /// Spawn an egg with a template's focus areas. `name` falls back to the
    /// template's default name.
    pub fn spawn_from_template(
        &mut self,
        name: Option<&str>,
        template: EggTemplate,
    ) -> Result<SpawnResult> {
        let name = name.unwrap_or_else(|| template.default_name());
        self.spawn_egg(name, template.focus_areas(), template.as_str())
    }

    /// Feed one example into an egg and rewrite its document
    pub fn feed_egg(&mut self, name: &str, example: NewExample) -> Result<FeedResult> {
        self.feed_egg_at(name, example, Utc::now())
    }

    /// Feed one example stamped with `now`. The egg in memory only changes
    /// once its document is written.
    pub fn feed_egg_at(
        &mut self,
        name: &str,
        example: NewExample,
        now: DateTime<Utc>,
    ) -> Result<FeedResult> {
        let current = self.egg_or_not_found(name)?;
        if current.is_hatched() {
            return Err(FarmError::AlreadyHatched(name.to_string()));
        }

        let mut egg = current.clone();
        let result = egg.feed_at(example, now);
        self.persist(&egg)?;
        self.eggs.insert(name.to_string(), egg);

        for achievement in &result.new_achievements {
            info!(egg = name, achievement = %achievement, "Achievement unlocked");
        }
        debug!(egg = name, total = result.total_examples, "Fed egg");
        Ok(result)
    }

    /// Full statistics for one egg
    pub fn get_egg_stats(&self, name: &str) -> Result<EggStats> {
        Ok(self.egg_or_not_found(name)?.stats())
    }

    /// One summary row per egg plus farm totals
    pub fn list_eggs(&self) -> FarmSummary {
        FarmSummary {
            total_eggs: self.eggs.len(),
            eggs: self
                .eggs
                .iter()
                .map(|(name, egg)| (name.clone(), egg.summary()))
                .collect(),
            hatched_models: self.eggs.values().filter(|egg| egg.is_hatched()).count(),
        }
    }

    /// Data health report for one egg
    pub fn check_egg_health(&self, name: &str) -> Result<HealthReport> {
        Ok(self.egg_or_not_found(name)?.check_data_health())
    }

    /// Hatch an egg and persist the frozen document
    pub fn hatch_egg(&mut self, name: &str) -> Result<HatchManifest> {
        self.hatch_egg_at(name, Utc::now())
    }

    /// Hatch an egg stamped with `now`
    pub fn hatch_egg_at(&mut self, name: &str, now: DateTime<Utc>) -> Result<HatchManifest> {
        let mut egg = self.egg_or_not_found(name)?.clone();

        match egg.hatch_at(now) {
            HatchOutcome::NotReady(gap) => Err(FarmError::NotReady {
                name: name.to_string(),
                gap,
            }),
            HatchOutcome::Hatched(manifest) => {
                self.persist(&egg)?;
                self.eggs.insert(name.to_string(), egg);
                info!(
                    egg = name,
                    model = %manifest.model_name,
                    examples = manifest.training_dataset_size,
                    "Egg hatched"
                );
                Ok(manifest)
            }
        }
    }

    /// Write an egg's examples as JSON Lines to `dest`
    pub fn export_dataset(&self, name: &str, dest: &Path) -> Result<usize> {
        let egg = self.egg_or_not_found(name)?;
        self.store
            .export_dataset(egg, dest)
            .map_err(|source| FarmError::Persistence {
                name: name.to_string(),
                source,
            })
    }
}
