//! AgentMart Server
//!
//! REST API server for the AgentMart agent marketplace.
//!
//! # Usage
//!
//! ```bash
//! # Local development with a throwaway secret
//! agentmart-server --dev-mode
//!
//! # Choose where the SQLite database lives
//! agentmart-server --config config/prod.toml --database-url sqlite:///var/lib/agentmart/mart.db
//!
//! # Environment overrides
//! AGENTMART__SERVER__PORT=8080 AGENTMART__AUTH__JWT__SECRET=... agentmart-server
//! ```

mod config;

use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use agentmart_api::{create_router, ApiConfig, AppState};
use agentmart_auth::AuthService;
use agentmart_db::Database;
use agentmart_marketplace::Marketplace;

use crate::config::{LoggingConfig, ServerConfig};

// =============================================================================
// CLI Arguments
// =============================================================================

/// AgentMart Server - marketplace API for AI agents
#[derive(Parser, Debug)]
#[command(name = "agentmart-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "AGENTMART_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "AGENTMART_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "AGENTMART_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "AGENTMART_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "AGENTMART_LOG_FORMAT")]
    log_format: Option<String>,

    /// JWT secret key
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Shared secret for signed payment webhooks
    #[arg(long, env = "PAYMENT_WEBHOOK_SECRET", hide_env_values = true)]
    webhook_secret: Option<String>,

    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Enable development mode (generated secret, guest sign-in, debug logs)
    #[arg(long, env = "AGENTMART_DEV_MODE")]
    dev_mode: bool,
}

impl Args {
    /// CLI flags win over every other configuration source
    fn apply(self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if let Some(secret) = self.jwt_secret {
            config.auth.jwt.secret = secret;
        }
        if let Some(secret) = self.webhook_secret {
            config.auth.webhook.secret = Some(secret);
        }
        if let Some(url) = self.database_url {
            config.database.url = url;
        }
        if self.dev_mode {
            config.apply_dev_defaults();
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut server_config = ServerConfig::load(args.config.as_deref())?;
    let dev_mode = args.dev_mode;
    args.apply(&mut server_config);

    init_logging(&server_config.logging);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), dev_mode, "Starting AgentMart server");
    if dev_mode {
        tracing::warn!("Development mode: do not expose this instance publicly");
    }

    server_config.validate()?;

    let db = Database::connect(&server_config.database).await?;
    let auth = Arc::new(AuthService::new(db.clone(), server_config.auth.clone()));
    if server_config.auth.webhook.secret.is_none() {
        tracing::warn!("No payment webhook secret configured; settlement callbacks will be refused");
    }

    let market = Marketplace::new(db.clone());
    let state = Arc::new(AppState::new(market, auth));
    let app = create_router(state, ApiConfig::from(&server_config.api));

    let addr = server_config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    db.close().await;

    tracing::info!("Server shutdown complete");
    Ok(())
}

// =============================================================================
// Initialization Functions
// =============================================================================

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber.with(fmt::layer().json().with_target(true)).init();
        }
        _ => {
            subscriber.with(fmt::layer().pretty().with_target(true)).init();
        }
    }
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
