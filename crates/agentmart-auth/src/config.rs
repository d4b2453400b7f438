//! Authentication configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main authentication configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Password hashing configuration
    pub password: PasswordConfig,
    /// Settlement webhook configuration
    pub webhook: WebhookConfig,
    /// Allow guest sign-in without credentials
    pub allow_anonymous: bool,
}

/// JWT token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Secret key for signing tokens (should be at least 256 bits)
    pub secret: String,
    /// Access token lifetime
    #[serde(with = "humantime_serde")]
    pub token_lifetime: Duration,
    /// Token issuer claim
    pub issuer: String,
    /// Token audience claim
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            token_lifetime: Duration::from_secs(24 * 60 * 60),
            issuer: "agentmart".to_string(),
            audience: "agentmart-api".to_string(),
        }
    }
}

/// Password hashing configuration (Argon2id)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Iterations
    pub time_cost: u32,
    pub parallelism: u32,
    /// Output hash length in bytes
    pub hash_length: u32,
    /// Additional server-side secret mixed into every password
    pub pepper: Option<String>,
    pub min_password_length: usize,
    /// Upper bound to keep hashing cost bounded
    pub max_password_length: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_cost: 19456, // 19 MiB
            time_cost: 2,
            parallelism: 1,
            hash_length: 32,
            pepper: None,
            min_password_length: 8,
            max_password_length: 128,
        }
    }
}

/// Signed settlement callback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Shared secret with the payment provider. Webhooks are refused when unset.
    pub secret: Option<String>,
    /// How far a signed timestamp may drift from server time
    #[serde(with = "humantime_serde")]
    pub timestamp_tolerance: Duration,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            secret: None,
            timestamp_tolerance: Duration::from_secs(5 * 60),
        }
    }
}

impl AuthConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.jwt.secret.is_empty() {
            errors.push("JWT secret must be set".to_string());
        } else if self.jwt.secret.len() < 32 {
            errors.push("JWT secret should be at least 256 bits (32 bytes)".to_string());
        }
        if self.jwt.token_lifetime.is_zero() {
            errors.push("JWT token lifetime must be positive".to_string());
        }

        if self.password.memory_cost < 8 * self.password.parallelism {
            errors.push("Argon2 memory cost must be at least 8 KiB per lane".to_string());
        }
        if self.password.time_cost < 1 {
            errors.push("Argon2 time cost must be at least 1".to_string());
        }
        if self.password.min_password_length > self.password.max_password_length {
            errors.push("Minimum password length exceeds maximum".to_string());
        }

        if let Some(secret) = &self.webhook.secret {
            if secret.len() < 16 {
                errors.push("Webhook secret should be at least 16 bytes".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuthConfig::default();
        assert_eq!(config.jwt.token_lifetime, Duration::from_secs(24 * 60 * 60));
        assert_eq!(config.password.memory_cost, 19456);
        assert!(config.webhook.secret.is_none());
    }

    #[test]
    fn test_config_validation_missing_secret() {
        let config = AuthConfig::default();
        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("JWT secret")));
    }

    #[test]
    fn test_config_validation_valid() {
        let mut config = AuthConfig::default();
        config.jwt.secret = "a".repeat(32);
        config.webhook.secret = Some("w".repeat(16));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_humantime_lifetime() {
        let config: JwtConfig = serde_json::from_str(r#"{"secret": "s", "token_lifetime": "2h"}"#).unwrap();
        assert_eq!(config.token_lifetime, Duration::from_secs(7200));
        assert_eq!(config.issuer, "agentmart");
    }
}
