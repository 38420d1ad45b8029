use anyhow::{Context, Result};
use eggfarm_egg::Egg;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Suffix of per-egg documents
pub const EGG_FILE_SUFFIX: &str = ".egg.json";
/// Sidecar document holding auto-feeder protection state
pub const FEEDER_STATE_FILE: &str = "feeder.state.json";

/// One line of an exported dataset
#[derive(Serialize)]
struct DatasetRecord<'a> {
    input: &'a str,
    output: &'a str,
    quality_score: f64,
    skill_tags: &'a [String],
}

/// File-backed storage for a farm directory.
///
/// Every egg lives in its own JSON document so one corrupted file cannot take
/// the rest of the farm down with it.
pub struct FarmStore {
    dir: PathBuf,
}

impl FarmStore {
    /// Open a farm directory, creating it if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create farm directory {:?}", dir))?;

        info!("Farm store opened at {:?}", dir);
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for the egg called `name`
    pub fn egg_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}{EGG_FILE_SUFFIX}"))
    }

    /// Rewrite an egg's whole document
    pub fn save_egg(&self, egg: &Egg) -> Result<()> {
        let path = self.egg_path(egg.name());
        let json = serde_json::to_vec_pretty(egg)
            .with_context(|| format!("Failed to encode egg '{}'", egg.name()))?;
        write_atomically(&path, &json)?;

        debug!("Saved egg '{}' ({} examples)", egg.name(), egg.total_examples());
        Ok(())
    }

    /// Load a single egg document
    pub fn load_egg(&self, path: &Path) -> Result<Egg> {
        let content =
            fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
        let egg: Egg = serde_json::from_slice(&content)
            .with_context(|| format!("Failed to parse egg from {:?}", path))?;

        if egg.total_examples() != egg.training_examples().len() as u64 {
            warn!(
                "Egg '{}' records {} examples but stores {}",
                egg.name(),
                egg.total_examples(),
                egg.training_examples().len()
            );
        }

        for (skill, spec) in egg.specializations() {
            if spec.examples_collected() != spec.quality_scores().len() as u64 {
                warn!(
                    "Egg '{}' specialization {} counts {} examples but holds {} scores",
                    egg.name(),
                    skill,
                    spec.examples_collected(),
                    spec.quality_scores().len()
                );
            }
        }

        Ok(egg)
    }

    /// Load every egg document in the farm directory.
    ///
    /// Files that cannot be read or parsed are logged and skipped, and so is
    /// any document not stored at the path [`Self::egg_path`] gives its name.
    /// Only a failure to list the directory itself is an error.
    pub fn load_eggs(&self) -> Result<Vec<Egg>> {
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read directory {:?}", self.dir))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_egg = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(EGG_FILE_SUFFIX));
            if is_egg && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut eggs = Vec::with_capacity(paths.len());
        for path in paths {
            match self.load_egg(&path) {
                Ok(egg) if self.egg_path(egg.name()) != path => {
                    warn!(
                        "Ignoring {:?}: egg '{}' belongs in {:?}",
                        path,
                        egg.name(),
                        self.egg_path(egg.name())
                    );
                }
                Ok(egg) => {
                    debug!("Loaded egg '{}' from {:?}", egg.name(), path);
                    eggs.push(egg);
                }
                Err(e) => {
                    warn!("Failed to load egg from {:?}: {:#}", path, e);
                }
            }
        }

        info!("Loaded {} eggs from {:?}", eggs.len(), self.dir);
        Ok(eggs)
    }

    fn feeder_state_path(&self) -> PathBuf {
        self.dir.join(FEEDER_STATE_FILE)
    }

    /// Load the feeder sidecar, falling back to fresh state when it is
    /// missing or unreadable
    pub fn load_feeder_state<T: DeserializeOwned + Default>(&self) -> T {
        let path = self.feeder_state_path();
        if !path.exists() {
            return T::default();
        }

        let parsed = fs::read(&path)
            .with_context(|| format!("Failed to read {:?}", path))
            .and_then(|content| {
                serde_json::from_slice(&content)
                    .with_context(|| format!("Failed to parse {:?}", path))
            });

        match parsed {
            Ok(state) => state,
            Err(e) => {
                warn!("Resetting feeder state: {:#}", e);
                T::default()
            }
        }
    }

    pub fn save_feeder_state<T: Serialize>(&self, state: &T) -> Result<()> {
        let json = serde_json::to_vec_pretty(state).context("Failed to encode feeder state")?;
        write_atomically(&self.feeder_state_path(), &json)
    }

    /// Write an egg's examples as JSON Lines for an external training job.
    ///
    /// Returns the number of records written.
    pub fn export_dataset(&self, egg: &Egg, dest: &Path) -> Result<usize> {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let file = fs::File::create(dest).with_context(|| format!("Failed to create {:?}", dest))?;
        let mut writer = BufWriter::new(file);

        for example in egg.training_examples() {
            let record = DatasetRecord {
                input: example.input(),
                output: example.output(),
                quality_score: example.quality_score(),
                skill_tags: example.skill_tags(),
            };
            serde_json::to_writer(&mut writer, &record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        info!(
            "Exported {} examples from egg '{}' to {:?}",
            egg.training_examples().len(),
            egg.name(),
            dest
        );
        Ok(egg.training_examples().len())
    }
}

/// Write through a temporary sibling and rename over the target, so readers
/// never see a half-written document
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Invalid file name {:?}", path))?;
    let tmp = path.with_file_name(format!("{file_name}.tmp"));

    fs::write(&tmp, bytes).with_context(|| format!("Failed to write {:?}", tmp))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace {:?}", path))?;
    Ok(())
}
