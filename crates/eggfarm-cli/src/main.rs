mod cli;
mod config;
mod service;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::Config;
use service::FarmService;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.farm_dir.as_deref())?;
    eggfarm_logging::init_logging(&config.logging.level, config.logging.json)?;

    // Run the requested command
    let service = FarmService::new(config);
    service.run(cli.command)
}
