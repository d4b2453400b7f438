//! AgentMart Types - Canonical domain types for the agent marketplace
//!
//! This crate contains all foundational types for AgentMart with zero
//! dependencies on other agentmart crates. It defines:
//!
//! - Identity types (UserId, AgentId, SubscriptionId, etc.)
//! - Entity records persisted by the storage layer
//! - Inputs and partial updates accepted by the marketplace operations
//! - Aggregated report views
//! - The shared error type
//!
//! # Entity Graph
//!
//! ```text
//! Profile (1:1 caller) ──creates──▶ Agent ◀──about── Post
//!    │                                ▲
//!    ├──subscribes──▶ Subscription ───┘
//!    ├──pays────────▶ Transaction ──(optional)──▶ Agent
//!    └──(optional)──▶ AnalyticsEvent ───────────▶ Agent
//! ```
//!
//! All relationships are by identifier; nothing holds another record in memory.

pub mod identity;
pub mod profile;
pub mod agent;
pub mod post;
pub mod subscription;
pub mod transaction;
pub mod analytics;
pub mod settings;
pub mod report;
pub mod error;

pub use identity::*;
pub use profile::*;
pub use agent::*;
pub use post::*;
pub use subscription::*;
pub use transaction::*;
pub use analytics::*;
pub use settings::*;
pub use report::*;
pub use error::*;

/// Version of the AgentMart types schema
pub const TYPES_VERSION: &str = "0.1.0";
