//! Runtime configuration types for pitbet.
//!
//! These are the validated values the server and the bet service work with.
//! Reading and parsing the config file is the server crate's job.

mod admin;
mod betting;
mod config_store;
mod server;
mod service;

pub use admin::AdminConfig;
pub use betting::{BettingRules, RulesError};
pub use config_store::{ConfigStore, ConfigWatcher};
pub use server::ServerConfig;
pub use service::ServiceConfig;

use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared configuration state with separate locks for each section.
///
/// Betting rules live in a [`ConfigStore`] so that background processors
/// can react when a reload changes them.
#[derive(Clone)]
pub struct SharedConfig {
    pub server: Arc<RwLock<ServerConfig>>,
    pub admin: Arc<RwLock<AdminConfig>>,
    /// Key shared with the player frontend backend.
    pub service: Arc<RwLock<ServiceConfig>>,
    pub betting: ConfigStore<BettingRules>,
}
