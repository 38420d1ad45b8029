use anyhow::Context;
use eggfarm_farm::FeederConfig;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config template created when no config exists
const DEFAULT_CONFIG: &str = r#"
[farm]
directory = "output/egg-farm"  # Set via EGGFARM_DIR env var

[feeder]
enabled = true
quality_threshold = 6.0     # 0-10
cache_size = 100            # recent feeds remembered for duplicate detection
quality_window = 20         # quality samples kept for trend detection
max_feeds_per_hour = 10     # 0 disables rate limiting
persist_state = true        # keep protection state in feeder.state.json

# Replace a skill's keyword list:
# [feeder.skill_patterns]
# voice_mimicry = ["voice", "tone", "style"]

[logging]
level = "info"  # trace, debug, info, warn, error
json = false
"#;

#[derive(Debug, Deserialize, Clone)]
pub struct FarmConfig {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
}

fn default_directory() -> PathBuf {
    PathBuf::from("output/egg-farm")
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub farm: FarmConfig,
    #[serde(default)]
    pub feeder: FeederConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Get the global config path: ~/.eggfarm/eggfarm.toml
    fn global_config_path() -> anyhow::Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".eggfarm").join("eggfarm.toml"))
    }

    /// Ensure global config directory and file exist, creating defaults if needed
    fn ensure_global_config() -> anyhow::Result<PathBuf> {
        let config_path = Self::global_config_path()?;
        if let Some(config_dir) = config_path.parent() {
            if !config_dir.exists() {
                fs::create_dir_all(config_dir).with_context(|| {
                    format!("Failed to create config directory {}", config_dir.display())
                })?;
                eprintln!("Created config directory: {}", config_dir.display());
            }
        }

        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG.trim())
                .with_context(|| format!("Failed to write {}", config_path.display()))?;
            eprintln!("Created default config: {}", config_path.display());
        }

        Ok(config_path)
    }

    /// Load configuration with layered approach:
    /// 1. Global config: ~/.eggfarm/eggfarm.toml (auto-created if missing)
    /// 2. Local override: ./eggfarm.toml (optional)
    /// 3. Environment variables with the EGGFARM__ prefix
    /// 4. EGGFARM_DIR for the farm directory
    /// 5. `farm_dir` from the command line (highest priority)
    pub fn load(farm_dir: Option<&Path>) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let global_config_path = Self::ensure_global_config()?;

        let mut config_builder = config::Config::builder()
            .add_source(config::File::from(global_config_path))
            .add_source(config::File::with_name("eggfarm").required(false))
            .add_source(config::Environment::with_prefix("EGGFARM").separator("__"));

        if let Ok(dir) = env::var("EGGFARM_DIR") {
            config_builder = config_builder.set_override("farm.directory", dir)?;
        }

        if let Some(dir) = farm_dir {
            config_builder =
                config_builder.set_override("farm.directory", dir.to_string_lossy().into_owned())?;
        }

        let config: Self = config_builder
            .build()
            .context("Failed to assemble configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_template_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).expect("Failed to parse template");
        assert_eq!(config.farm.directory, PathBuf::from("output/egg-farm"));
        assert_eq!(config.feeder, FeederConfig::default());
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str(
            r#"
            [feeder]
            max_feeds_per_hour = 3

            [feeder.skill_patterns]
            academic_writing = ["thesis", "abstract"]
            "#,
        )
        .unwrap();

        assert_eq!(config.farm.directory, default_directory());
        assert_eq!(config.feeder.max_feeds_per_hour, 3);
        assert_eq!(config.feeder.quality_threshold, 6.0);
        assert_eq!(config.feeder.skill_patterns["academic_writing"].len(), 2);
    }
}
