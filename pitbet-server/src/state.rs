//! Application state shared across all request handlers.

use pitbet_core::config::SharedConfig;
use pitbet_core::framework::DatabaseProcessor;
use pitbet_core::notify::EventBus;
use pitbet_core::services::BetService;
use sqlx::PgPool;

/// Cheap to clone; everything inside is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Reloaded on SIGHUP.
    pub config: SharedConfig,
    pub bets: BetService,
}

impl AppState {
    pub fn new(db: PgPool, config: SharedConfig) -> Self {
        let bets = BetService::new(
            DatabaseProcessor { pool: db.clone() },
            EventBus::default(),
            config.betting.clone(),
        );
        Self { db, config, bets }
    }

    pub fn processor(&self) -> DatabaseProcessor {
        DatabaseProcessor {
            pool: self.db.clone(),
        }
    }
}
