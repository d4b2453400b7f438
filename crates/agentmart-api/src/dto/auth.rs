//! Authentication DTOs

use serde::{Deserialize, Serialize};

/// Email/password credentials for sign-up and sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}
