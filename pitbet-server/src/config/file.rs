//! TOML file configuration structures.
//!
//! These structs map directly to the `pitbet-config.toml` file format.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub service: ServiceConfig,
    #[serde(default)]
    pub betting: BettingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Plaintext on first start; replaced by its argon2 hash (`$argon2...`)
    /// and written back to the file.
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HMAC key shared with the player frontend backend.
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BettingConfig {
    #[serde(default = "default_min_bet")]
    pub min_bet: Decimal,
    #[serde(default = "default_max_bet")]
    pub max_bet: Decimal,
    #[serde(default = "default_commission_rate")]
    pub commission_rate: Decimal,
    #[serde(default = "default_max_pago_ratio")]
    pub max_pago_ratio: Decimal,
    #[serde(default = "default_pago_ttl_secs")]
    pub pago_ttl_secs: u64,
    #[serde(default = "default_expiry_scan_secs")]
    pub expiry_scan_secs: u64,
}

impl Default for BettingConfig {
    fn default() -> Self {
        Self {
            min_bet: default_min_bet(),
            max_bet: default_max_bet(),
            commission_rate: default_commission_rate(),
            max_pago_ratio: default_max_pago_ratio(),
            pago_ttl_secs: default_pago_ttl_secs(),
            expiry_scan_secs: default_expiry_scan_secs(),
        }
    }
}

fn default_min_bet() -> Decimal {
    Decimal::from(10)
}

fn default_max_bet() -> Decimal {
    Decimal::from(100_000)
}

fn default_commission_rate() -> Decimal {
    Decimal::new(10, 2)
}

fn default_max_pago_ratio() -> Decimal {
    Decimal::from(3)
}

fn default_pago_ttl_secs() -> u64 {
    300
}

fn default_expiry_scan_secs() -> u64 {
    15
}

impl FileConfig {
    pub fn is_admin_secret_hashed(&self) -> bool {
        self.admin.secret.starts_with("$argon2")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_full_config() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[admin]
secret = "test-secret"

[service]
secret = "frontend-key"

[betting]
min_bet = "20"
max_bet = "5000.50"
commission_rate = "0.075"
max_pago_ratio = "2.5"
pago_ttl_secs = 120
expiry_scan_secs = 5
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.service.secret, "frontend-key");
        assert_eq!(config.betting.max_bet, dec!(5000.50));
        assert_eq!(config.betting.commission_rate, dec!(0.075));
        assert_eq!(config.betting.pago_ttl_secs, 120);
        assert!(!config.is_admin_secret_hashed());
    }

    #[test]
    fn optional_sections_fall_back_to_defaults() {
        let toml_str = r#"
[admin]
secret = "$argon2id$v=19$m=19456,t=2,p=1$abc123"

[service]
secret = "frontend-key"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen, default_listen_addr());
        assert_eq!(config.betting.min_bet, dec!(10));
        assert_eq!(config.betting.expiry_scan_secs, 15);
        assert!(config.is_admin_secret_hashed());
    }

    #[test]
    fn missing_service_section_is_an_error() {
        let toml_str = r#"
[admin]
secret = "x"
"#;
        assert!(toml::from_str::<FileConfig>(toml_str).is_err());
    }
}
