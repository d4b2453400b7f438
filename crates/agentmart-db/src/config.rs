//! Database configuration

use serde::{Deserialize, Serialize};

/// Connection string for a private in-memory database
pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite connection URL, e.g. `sqlite://agentmart.db` or `sqlite::memory:`
    pub url: String,
    /// Maximum pooled connections (forced to 1 for in-memory databases)
    pub max_connections: u32,
    /// Connection acquire timeout in seconds
    pub acquire_timeout_secs: u64,
    /// How long a writer waits on a locked database, in milliseconds
    pub busy_timeout_ms: u64,
    /// Apply pending migrations on connect
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://agentmart.db".to_string(),
            max_connections: 8,
            acquire_timeout_secs: 30,
            busy_timeout_ms: 5_000,
            run_migrations: true,
        }
    }
}

impl DatabaseConfig {
    /// Private in-memory database, gone when the pool closes
    pub fn in_memory() -> Self {
        Self {
            url: IN_MEMORY_URL.to_string(),
            ..Self::default()
        }
    }

    /// Database file at `path`
    pub fn file(path: impl AsRef<std::path::Path>) -> Self {
        Self {
            url: format!("sqlite://{}", path.as_ref().display()),
            ..Self::default()
        }
    }

    pub fn is_persistent(&self) -> bool {
        !self.url.contains(":memory:") && !self.url.contains("mode=memory")
    }
}
