use clap::{Parser, Subcommand};
use eggfarm_farm::EggTemplate;
use eggfarm_types::Skill;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "eggfarm")]
#[command(version)]
#[command(about = "Curate per-topic training datasets from generated content")]
pub struct Cli {
    /// Farm directory, overriding config and EGGFARM_DIR
    #[arg(long, global = true, value_name = "DIR")]
    pub farm_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new egg
    Spawn {
        /// Egg name; defaults to the template's name when --template is given
        name: Option<String>,

        /// Focus skills, comma separated (e.g. academic_writing,ieee_formatting)
        #[arg(long, value_delimiter = ',')]
        focus: Vec<Skill>,

        /// Free-form egg label
        #[arg(long = "type", default_value = "custom")]
        egg_type: String,

        /// Preset focus areas: academic, voice or technical
        #[arg(long, conflicts_with = "focus")]
        template: Option<EggTemplate>,
    },

    /// Feed one example into an egg
    Feed {
        name: String,

        #[arg(long)]
        input: String,

        #[arg(long)]
        output: String,

        /// Skill tags, comma separated
        #[arg(long, value_delimiter = ',')]
        skills: Vec<String>,

        /// Quality score in [0, 10]
        #[arg(long)]
        quality: f64,

        #[arg(long)]
        feedback: Option<String>,
    },

    /// Route content to every compatible egg through the auto-feeder
    AutoFeed {
        #[arg(long)]
        input: String,

        #[arg(long)]
        output: String,

        /// Producer label such as "academic" or "sensei"
        #[arg(long, default_value = "")]
        context: String,

        #[arg(long)]
        feedback: Option<String>,
    },

    /// Show full statistics for an egg
    Stats { name: String },

    /// List every egg in the farm
    List,

    /// Hatch an egg that met its thresholds
    Hatch { name: String },

    /// Show the data health report of an egg
    Health { name: String },

    /// Write an egg's examples as JSON Lines
    Export { name: String, dest: PathBuf },

    /// Show auto-feeder protection status
    Protection,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_spawn_with_focus() {
        let cli = Cli::try_parse_from([
            "eggfarm",
            "--farm-dir",
            "/tmp/farm",
            "spawn",
            "paper-bot",
            "--focus",
            "academic_writing,research_synthesis",
        ])
        .unwrap();

        assert_eq!(cli.farm_dir, Some(PathBuf::from("/tmp/farm")));
        match cli.command {
            Command::Spawn { name, focus, egg_type, template } => {
                assert_eq!(name.as_deref(), Some("paper-bot"));
                assert_eq!(focus, vec![Skill::AcademicWriting, Skill::ResearchSynthesis]);
                assert_eq!(egg_type, "custom");
                assert_eq!(template, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_skill_and_template() {
        assert!(Cli::try_parse_from(["eggfarm", "spawn", "x", "--focus", "poetry"]).is_err());
        assert!(Cli::try_parse_from(["eggfarm", "spawn", "--template", "poetry"]).is_err());
    }

    #[test]
    fn test_parse_auto_feed() {
        let cli = Cli::try_parse_from([
            "eggfarm",
            "auto-feed",
            "--input",
            "q",
            "--output",
            "a",
            "--context",
            "academic",
        ])
        .unwrap();

        match cli.command {
            Command::AutoFeed { context, feedback, .. } => {
                assert_eq!(context, "academic");
                assert_eq!(feedback, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
