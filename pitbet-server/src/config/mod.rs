//! Configuration loading for pitbet-server.
//!
//! Reads the TOML file, applies CLI overrides, validates the betting rules
//! and replaces a plaintext admin secret with its argon2 hash.

pub mod file;

use crate::config::file::{BettingConfig, FileConfig};
use pitbet_core::config::{
    AdminConfig, BettingRules, ConfigStore, RulesError, ServerConfig, ServiceConfig,
    SharedConfig,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid betting rules: {0}")]
    Rules(#[from] RulesError),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("password hashing error: {0}")]
    Hash(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

pub struct LoadedConfig {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub service: ServiceConfig,
    pub betting: BettingRules,
}

impl LoadedConfig {
    pub fn into_shared(self) -> SharedConfig {
        SharedConfig {
            server: Arc::new(RwLock::new(self.server)),
            admin: Arc::new(RwLock::new(self.admin)),
            service: Arc::new(RwLock::new(self.service)),
            betting: ConfigStore::new(self.betting),
        }
    }
}

pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Read, validate and convert the config file. A plaintext admin secret
    /// is hashed and the file rewritten before anything else uses it.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        let betting = rules_from_file(&file_config.betting);
        validate(&file_config, &betting)?;

        let secret_hash = if file_config.is_admin_secret_hashed() {
            file_config.admin.secret.clone()
        } else {
            let hash = hash_secret(&file_config.admin.secret)?;
            file_config.admin.secret = hash.clone();
            self.rewrite_config(&file_config)?;
            tracing::info!("Admin secret hashed and config file updated");
            hash
        };

        Ok(LoadedConfig {
            server: ServerConfig {
                listen: file_config.server.listen,
            },
            admin: AdminConfig::new(secret_hash),
            service: ServiceConfig::new(file_config.service.secret.into_bytes()),
            betting,
        })
    }

    /// Used on SIGHUP.
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn rewrite_config(&self, config: &FileConfig) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(config)?;

        // Written beside the target, then renamed into place.
        let temp_path = self.config_path.with_extension("toml.tmp");
        std::fs::write(&temp_path, toml_string)?;
        std::fs::rename(&temp_path, &self.config_path)?;
        Ok(())
    }
}

fn rules_from_file(betting: &BettingConfig) -> BettingRules {
    BettingRules {
        min_bet: betting.min_bet,
        max_bet: betting.max_bet,
        commission_rate: betting.commission_rate,
        max_pago_ratio: betting.max_pago_ratio,
        pago_ttl: Duration::from_secs(betting.pago_ttl_secs),
        expiry_scan_interval: Duration::from_secs(betting.expiry_scan_secs),
    }
}

fn validate(config: &FileConfig, rules: &BettingRules) -> Result<(), ConfigError> {
    if config.admin.secret.is_empty() {
        return Err(ConfigError::Validation("admin secret is empty".into()));
    }
    if config.service.secret.len() < 16 {
        return Err(ConfigError::Validation(
            "service secret must be at least 16 bytes".into(),
        ));
    }
    rules.validate()?;
    Ok(())
}

fn hash_secret(plaintext: &str) -> Result<String, ConfigError> {
    use argon2::{
        Argon2, PasswordHasher,
        password_hash::{SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ConfigError::Hash(e.to_string()))
}

pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("pitbet-config.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pitbet-{name}-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    const CONFIG: &str = r#"
[server]
listen = "127.0.0.1:4000"

[admin]
secret = "let-me-in"

[service]
secret = "0123456789abcdef0123"
"#;

    #[test]
    fn hashes_plaintext_secret_and_rewrites_file() {
        let dir = temp_dir("hash");
        let path = write_config(&dir, CONFIG);

        let loaded = ConfigLoader::new(&path, None).load().unwrap();
        assert!(loaded.admin.verify_secret("let-me-in"));
        assert_eq!(loaded.server.listen.port(), 4000);

        let rewritten: FileConfig =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(rewritten.is_admin_secret_hashed());

        // A second load keeps the existing hash.
        let again = ConfigLoader::new(&path, None).load().unwrap();
        assert!(again.admin.verify_secret("let-me-in"));

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn listen_override_wins() {
        let dir = temp_dir("listen");
        let path = write_config(&dir, CONFIG);
        let addr: SocketAddr = "0.0.0.0:9999".parse().unwrap();

        let loaded = ConfigLoader::new(&path, Some(addr)).load().unwrap();
        assert_eq!(loaded.server.listen, addr);
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn rejects_invalid_rules() {
        let dir = temp_dir("rules");
        let body = format!("{CONFIG}\n[betting]\nmin_bet = \"500\"\nmax_bet = \"100\"\n");
        let path = write_config(&dir, &body);

        let err = ConfigLoader::new(&path, None).load().err().unwrap();
        assert!(matches!(err, ConfigError::Rules(RulesError::InvertedLimits { .. })));
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn rejects_short_service_secret() {
        let dir = temp_dir("short");
        let path = write_config(
            &dir,
            "[admin]\nsecret = \"x\"\n\n[service]\nsecret = \"short\"\n",
        );
        let err = ConfigLoader::new(&path, None).load().err().unwrap();
        assert!(matches!(err, ConfigError::Validation(_)));
        std::fs::remove_dir_all(dir).unwrap();
    }
}
