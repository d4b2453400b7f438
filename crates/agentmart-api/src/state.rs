//! Application state shared across handlers

use std::sync::Arc;

use agentmart_auth::{AuthConfig, AuthService};
use agentmart_db::{Database, DbResult};
use agentmart_marketplace::Marketplace;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Marketplace services over the database
    pub market: Marketplace,
    /// Identity provider
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(market: Marketplace, auth: Arc<AuthService>) -> Self {
        Self { market, auth }
    }

    /// Fresh in-memory database shared by the marketplace and the
    /// identity provider
    pub async fn in_memory(auth_config: AuthConfig) -> DbResult<Self> {
        let db = Database::in_memory().await?;
        Ok(Self::new(
            Marketplace::new(db.clone()),
            Arc::new(AuthService::new(db, auth_config)),
        ))
    }
}
