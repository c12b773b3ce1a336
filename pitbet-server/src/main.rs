//! pitbet server
//!
//! Peer-to-peer fight betting backend: bet matching, wallet freezing, PAGO
//! negotiation and settlement behind a signed HTTP API.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::{Parser, ValueEnum};
use config::{ConfigLoader, get_database_url};
use pitbet_core::processors::PagoExpiryWatcher;
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum LogFormat {
    #[default]
    Text,
    Json,
}

/// pitbet - peer-to-peer fight betting server
#[derive(Parser, Debug)]
#[command(name = "pitbet-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./pitbet-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "PITBET_LOG_FORMAT")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "pitbet-server starting");

    let loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded = loader.load().inspect_err(|e| {
        tracing::error!(error = %e, path = ?args.config, "Cannot load configuration");
    })?;
    let listen_addr = loaded.server.listen;
    tracing::info!(
        path = ?args.config,
        min_bet = %loaded.betting.min_bet,
        max_bet = %loaded.betting.max_bet,
        commission_rate = %loaded.betting.commission_rate,
        "Configuration loaded"
    );

    let db_pool = open_database(args.migrate).await?;
    let state = AppState::new(db_pool.clone(), loaded.into_shared());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let expiry = tokio::spawn(PagoExpiryWatcher::new(state.bets.clone(), shutdown_rx).run());
    let reload_stop = spawn_config_reload_handler(state.clone(), loader);

    let served = run_server(build_router(state), listen_addr).await;

    reload_stop.notify_one();
    let _ = shutdown_tx.send(true);
    if let Err(e) = expiry.await {
        tracing::error!(error = %e, "PAGO expiry task panicked");
    }
    db_pool.close().await;
    tracing::info!("pitbet-server stopped");

    served.map_err(Into::into)
}

async fn open_database(migrate: bool) -> anyhow::Result<PgPool> {
    let database_url = get_database_url().inspect_err(|_| {
        tracing::error!("DATABASE_URL is not set");
    })?;
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Cannot connect to the database"))?;
    tracing::info!("Database connected");

    if migrate {
        sqlx::migrate!("../migrations")
            .run(&pool)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Migration failed"))?;
        tracing::info!("Migrations applied");
    }
    Ok(pool)
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=debug"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .init(),
    }
}
