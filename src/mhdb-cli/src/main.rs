mod cli;
mod commands;
mod config;
mod progress;

use anyhow::Result;
use clap::Parser;
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mhdb=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let database = config.database_path(cli.database);

    match cli.command {
        Commands::Export(args) => commands::export::handle(&database, &config, args)?,

        Commands::Db { command } => commands::db::dispatch(&database, command)?,

        Commands::Configure {
            database,
            export_path,
            asset_timeout,
            show,
        } => {
            let settings = commands::configure::Settings {
                database,
                export_path,
                asset_timeout,
            };
            commands::configure::handle(settings, show)?;
        }

        Commands::ImportWeapons { input } => commands::import::handle(&database, &input)?,
    }

    Ok(())
}
