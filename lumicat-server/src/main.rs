//! lumicat: luminaire catalog service
//!
//! Serves the catalog query, CRUD, import, designer, asset, timeline,
//! settings and photo-search API over one SQLite file in the root folder.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lumicat_common::config::{load_config, RootFolderInitializer, RootFolderResolver};
use lumicat_common::db::init_database;
use lumicat_server::{build_router, AppState};
use tracing::{error, info};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5780;

/// Command-line arguments; each falls back to its environment variable
#[derive(Parser, Debug)]
#[command(name = "lumicat")]
#[command(about = "Luminaire catalog service")]
#[command(version)]
struct Args {
    /// Folder holding lumicat.db
    #[arg(short, long, env = "LUMICAT_ROOT")]
    root_folder: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "LUMICAT_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "LUMICAT_PORT")]
    port: Option<u16>,

    /// TOML config file
    #[arg(short, long, env = "LUMICAT_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Build identification first, before any I/O can stall startup
    info!(
        "Starting lumicat v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;

    let root_folder = RootFolderResolver::new("lumicat").resolve(args.root_folder.as_deref(), &config);
    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let host = args
        .host
        .or_else(|| config.host.clone())
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = args.port.or(config.port).unwrap_or(DEFAULT_PORT);

    let state = AppState::new(pool, config).context("Failed to build similarity client")?;
    if state.similarity.is_none() {
        info!("Photo search disabled (no similarity endpoint configured)");
    }
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("lumicat listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
