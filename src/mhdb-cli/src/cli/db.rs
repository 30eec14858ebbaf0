//! Database command CLI definitions

use clap::Subcommand;

#[derive(Subcommand)]
pub enum DbCommand {
    /// Create the database and run migrations
    Init,

    /// Show row counts per entity
    Stats,

    /// Print one entity as JSON
    Show {
        /// Entity name (e.g. Weapon, armor-set)
        entity: String,

        /// Entity ID
        id: i64,

        /// Projection as a JSON object of dotted paths, e.g. '{"crafting": false}'
        #[arg(short, long)]
        projection: Option<String>,
    },
}
