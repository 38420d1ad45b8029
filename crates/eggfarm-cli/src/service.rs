use crate::cli::Command;
use crate::config::Config;
use anyhow::{anyhow, Result};
use eggfarm_egg::NewExample;
use eggfarm_farm::{AutoFeeder, Farm};
use serde::Serialize;
use serde_json::json;
use tracing::info;

/// Farm service - runs one command against the configured farm
pub struct FarmService {
    config: Config,
}

impl FarmService {
    /// Create a new farm service
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn open_farm(&self) -> Result<Farm> {
        Ok(Farm::open(&self.config.farm.directory)?)
    }

    fn open_feeder(&self) -> Result<AutoFeeder> {
        let farm = self.open_farm()?;
        Ok(AutoFeeder::new(farm, self.config.feeder.clone())?)
    }

    /// Run a command and print its result as JSON on stdout
    pub fn run(self, command: Command) -> Result<()> {
        info!("Using farm directory {:?}", self.config.farm.directory);

        match command {
            Command::Spawn {
                name,
                focus,
                egg_type,
                template,
            } => {
                let mut farm = self.open_farm()?;
                let result = match template {
                    Some(template) => farm.spawn_from_template(name.as_deref(), template)?,
                    None => {
                        let name =
                            name.ok_or_else(|| anyhow!("An egg name is required without --template"))?;
                        farm.spawn_egg(&name, focus, &egg_type)?
                    }
                };
                print_json(&result)
            }

            Command::Feed {
                name,
                input,
                output,
                skills,
                quality,
                feedback,
            } => {
                if !(0.0..=10.0).contains(&quality) {
                    return Err(anyhow!("Quality must be within 0-10, got {quality}"));
                }
                let mut farm = self.open_farm()?;
                let example = NewExample::new(input, output, quality)
                    .with_skill_tags(skills)
                    .with_feedback(feedback);
                print_json(&farm.feed_egg(&name, example)?)
            }

            Command::AutoFeed {
                input,
                output,
                context,
                feedback,
            } => {
                let mut feeder = self.open_feeder()?;
                let result =
                    feeder.auto_feed_compatible_eggs(&input, &output, &context, feedback.as_deref());
                print_json(&result)
            }

            Command::Stats { name } => print_json(&self.open_farm()?.get_egg_stats(&name)?),

            Command::List => print_json(&self.open_farm()?.list_eggs()),

            Command::Hatch { name } => print_json(&self.open_farm()?.hatch_egg(&name)?),

            Command::Health { name } => print_json(&self.open_farm()?.check_egg_health(&name)?),

            Command::Export { name, dest } => {
                let written = self.open_farm()?.export_dataset(&name, &dest)?;
                print_json(&json!({
                    "egg": name,
                    "path": dest,
                    "examples_written": written,
                }))
            }

            Command::Protection => print_json(&self.open_feeder()?.protection_status()),
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
