//! Repository implementations

mod profile;
mod credential;
mod agent;
mod post;
mod subscription;
mod transaction;
mod analytics;
mod settings;

pub use profile::{ProfileRepo, SetRoleOutcome};
pub use credential::CredentialRepo;
pub use agent::AgentRepo;
pub use post::PostRepo;
pub use subscription::SubscriptionRepo;
pub use transaction::TransactionRepo;
pub use analytics::AnalyticsRepo;
pub use settings::SettingsRepo;
