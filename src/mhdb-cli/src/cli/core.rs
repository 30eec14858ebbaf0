//! Core CLI definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::db::DbCommand;
use super::export::ExportArgs;

#[derive(Parser)]
#[command(name = "mhdb")]
#[command(about = "Game reference database tools", long_about = None)]
pub struct Cli {
    /// Path to database file (defaults to the configured database)
    #[arg(long, env = "MHDB_DATABASE")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export the database to a static JSON tree
    #[command(visible_alias = "e")]
    Export(ExportArgs),

    /// Database operations (init, stats, show)
    Db {
        #[command(subcommand)]
        command: DbCommand,
    },

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set default database path
        #[arg(long)]
        database: Option<PathBuf>,

        /// Set default export directory
        #[arg(long)]
        export_path: Option<PathBuf>,

        /// Set the asset download timeout in seconds
        #[arg(long)]
        asset_timeout: Option<u64>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },

    /// Import captured weapon pages (JSON) through the scraper interpreters
    ImportWeapons {
        /// JSON file holding an array of captured weapons
        input: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_export_args() {
        let cli = Cli::try_parse_from([
            "mhdb",
            "export",
            "out",
            "--entity=Weapon",
            "--target=Weapon:5",
            "--target=Weapon:9",
            "--yes",
        ])
        .unwrap();

        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.output_path, Some(PathBuf::from("out")));
                assert_eq!(args.entities, vec!["Weapon"]);
                assert_eq!(args.targets, vec!["Weapon:5", "Weapon:9"]);
                assert!(args.yes);
                assert!(!args.no_clean);
            }
            _ => panic!("expected export"),
        }
    }
}
