//! Marketplace request bodies

use serde::{Deserialize, Serialize};

use agentmart_types::{Role, TransactionStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: TransactionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingValueRequest {
    pub value: String,
}
