//! Server Configuration
//!
//! Layered in increasing precedence: built-in defaults, an optional config
//! file, `config/default` and `config/local`, `AGENTMART__*` environment
//! variables, then CLI flags (applied in `main`).

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use agentmart_api::ApiConfig;
use agentmart_auth::AuthConfig;
use agentmart_db::DatabaseConfig;

/// Secret used when `--dev-mode` is set and no JWT secret was configured
pub const DEV_JWT_SECRET: &str = "agentmart-development-secret-not-for-production";

/// Server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server binding configuration
    pub server: ServerSettings,

    /// SQLite database
    pub database: DatabaseConfig,

    /// Tokens, password hashing and the settlement webhook
    pub auth: AuthConfig,

    /// HTTP surface
    pub api: ApiSettings,

    pub logging: LoggingConfig,
}

/// Server binding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerSettings {
    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid bind address {}:{}: {}", self.host, self.port, e))?;
        Ok(addr)
    }
}

/// API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub enable_cors: bool,

    /// CORS allowed origins (comma-separated in the environment)
    pub cors_origins: Vec<String>,

    /// Enable request tracing
    pub enable_tracing: bool,

    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        let api = ApiConfig::default();
        Self {
            enable_cors: api.enable_cors,
            cors_origins: api.cors_origins,
            enable_tracing: api.enable_tracing,
            max_body_size: api.max_body_size,
        }
    }
}

impl From<&ApiSettings> for ApiConfig {
    fn from(settings: &ApiSettings) -> Self {
        ApiConfig {
            enable_cors: settings.enable_cors,
            cors_origins: settings.cors_origins.clone(),
            enable_tracing: settings.enable_tracing,
            max_body_size: settings.max_body_size,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

impl ServerConfig {
    /// Load configuration from environment and optional config file
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("AGENTMART")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("api.cors_origins")
                    .try_parsing(true),
            );

        let server_config: ServerConfig = builder.build()?.try_deserialize()?;
        Ok(server_config)
    }

    /// Fill in development defaults for anything production would refuse
    pub fn apply_dev_defaults(&mut self) {
        if self.auth.jwt.secret.is_empty() {
            self.auth.jwt.secret = DEV_JWT_SECRET.to_string();
        }
        self.auth.allow_anonymous = true;
        if self.logging.level == "info" {
            self.logging.level = "debug".to_string();
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Err(errors) = self.auth.validate() {
            anyhow::bail!("invalid auth configuration: {}", errors.join("; "));
        }
        if !self.database.url.starts_with("sqlite:") {
            anyhow::bail!("database.url must be a sqlite: URL, got '{}'", self.database.url);
        }
        if self.database.max_connections == 0 {
            anyhow::bail!("database.max_connections must be at least 1");
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            anyhow::bail!("logging.format must be 'json' or 'pretty'");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_need_a_secret() {
        let config = ServerConfig::default();
        assert_eq!(config.server.port, 3000);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dev_defaults_validate() {
        let mut config = ServerConfig::default();
        config.apply_dev_defaults();
        assert!(config.validate().is_ok());
        assert!(config.auth.allow_anonymous);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_database_url_must_be_sqlite() {
        let mut config = ServerConfig::default();
        config.apply_dev_defaults();
        config.database.url = "postgresql://localhost/agentmart".to_string();
        assert!(config.validate().is_err());

        config.database.url = "sqlite::memory:".to_string();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8088

[auth]
allow_anonymous = true

[auth.jwt]
secret = "file-secret-that-is-long-enough-for-hs256"
token_lifetime = "2h"

[database]
url = "sqlite:///var/lib/agentmart/mart.db"
max_connections = 4
"#
        )
        .unwrap();

        let config = ServerConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.auth.jwt.token_lifetime.as_secs(), 2 * 3600);
        assert!(config.database.is_persistent());
        assert_eq!(config.database.max_connections, 4);
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_settings_convert() {
        let settings = ApiSettings {
            cors_origins: vec!["https://mart.example".to_string()],
            ..Default::default()
        };
        let api: ApiConfig = (&settings).into();
        assert_eq!(api.cors_origins, vec!["https://mart.example".to_string()]);
        assert_eq!(api.max_body_size, settings.max_body_size);
    }
}
