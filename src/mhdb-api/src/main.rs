//! Game Reference Database API Server

use std::sync::Arc;

use clap::Parser;
use mhdb::{EntityRepository, SqliteDb};
use mhdb_api::{router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mhdb-api")]
#[command(about = "REST API server for the game reference database")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Start the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3030")]
        port: u16,

        /// Database path
        #[arg(short, long, env = "MHDB_DATABASE", default_value = mhdb::DEFAULT_DB_PATH)]
        database: String,

        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,

        /// Tokens granting the editor role (comma-separated)
        #[arg(long, env = "MHDB_EDITOR_TOKENS", value_delimiter = ',')]
        editor_tokens: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            port,
            database,
            bind,
            editor_tokens,
        } => {
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "mhdb=info,mhdb_api=info,tower_http=debug".into()),
                )
                .with(tracing_subscriber::fmt::layer())
                .init();

            tracing::info!("Opening database: {}", database);
            let db = SqliteDb::open(&database)?;
            db.init()?;
            tracing::info!("Database initialized");

            if editor_tokens.is_empty() {
                tracing::warn!("No editor tokens configured; the API is read-only");
            }

            let state = Arc::new(AppState::new(db, editor_tokens));
            let app = router(state);

            let bind_addr = format!("{}:{}", bind, port);
            tracing::info!("Starting server on {}", bind_addr);

            let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
