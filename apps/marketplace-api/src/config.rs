//! Marketplace API configuration.
//!
//! Layered with the `config` crate, later sources winning:
//!
//! 1. built-in defaults
//! 2. `motorhub.toml` in the working directory, if present
//! 3. `MOTORHUB_*` environment variables, `__` between sections
//!    (`MOTORHUB_SERVER__PORT=9090`, `MOTORHUB_DATABASE__PATH=/data/motorhub.db`)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use ::config::{Config, Environment, File};
use motorhub_core::PaymentLinks;
use motorhub_db::DbConfig;
use serde::Deserialize;

const CONFIG_FILE: &str = "motorhub";
const ENV_PREFIX: &str = "MOTORHUB";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub payment_links: PaymentLinks,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// SQLite settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
    pub busy_timeout_secs: u64,
    pub run_migrations: bool,
}

impl AppConfig {
    /// Loads defaults, then the optional config file, then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let config: AppConfig = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080_i64)?
            .set_default("database.path", "motorhub.db")?
            .set_default("database.max_connections", 5_i64)?
            .set_default("database.busy_timeout_secs", 5_i64)?
            .set_default("database.run_migrations", true)?
            .set_default("log_level", "info,motorhub=debug,sqlx=warn")?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        for (key, url) in [
            ("payment_links.card_gateway", &self.payment_links.card_gateway),
            ("payment_links.financing_partner", &self.payment_links.financing_partner),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!("{key} must be an http(s) URL")));
            }
        }
        Ok(())
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

impl DatabaseConfig {
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.path)
            .max_connections(self.max_connections)
            .busy_timeout(Duration::from_secs(self.busy_timeout_secs))
            .run_migrations(self.run_migrations)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("server.host must parse to an IPv4 or IPv6 address")]
    InvalidHost { source: std::net::AddrParseError },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "MOTORHUB_SERVER__HOST",
            "MOTORHUB_SERVER__PORT",
            "MOTORHUB_DATABASE__PATH",
            "MOTORHUB_DATABASE__MAX_CONNECTIONS",
            "MOTORHUB_PAYMENT_LINKS__CARD_GATEWAY",
            "MOTORHUB_LOG_LEVEL",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();

        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path, PathBuf::from("motorhub.db"));
        assert_eq!(config.database.max_connections, 5);
        assert!(config.database.run_migrations);
        assert_eq!(config.payment_links, PaymentLinks::default());
        assert_eq!(config.log_level, "info,motorhub=debug,sqlx=warn");
    }

    #[test]
    fn env_overrides_nested_keys() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MOTORHUB_SERVER__PORT", "9090");
        env::set_var("MOTORHUB_DATABASE__PATH", "/tmp/motorhub-test.db");
        env::set_var("MOTORHUB_PAYMENT_LINKS__CARD_GATEWAY", "https://pay.example.com");

        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.path, PathBuf::from("/tmp/motorhub-test.db"));
        assert_eq!(config.payment_links.card_gateway, "https://pay.example.com");
        assert_eq!(
            config.payment_links.financing_partner,
            "https://financing-partner.com"
        );
    }

    #[test]
    fn rejects_zero_connections() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MOTORHUB_DATABASE__MAX_CONNECTIONS", "0");

        let result = AppConfig::load();
        reset_env();

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn accepts_localhost_host() {
        let server = ServerConfig {
            host: "localhost".to_string(),
            port: 8080,
        };
        assert_eq!(
            server.socket_addr().expect("localhost resolves"),
            SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 8080)
        );

        let bad = ServerConfig {
            host: "not-an-ip".to_string(),
            port: 8080,
        };
        assert!(matches!(bad.socket_addr(), Err(ConfigError::InvalidHost { .. })));
    }
}
