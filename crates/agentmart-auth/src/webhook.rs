//! Settlement webhook signatures
//!
//! The payment provider signs each callback with HMAC-SHA256 over
//! `"{timestamp}.{raw body}"` and sends `t=<unix seconds>,v1=<hex digest>`
//! in the signature header.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::Duration;
use subtle::ConstantTimeEq;

use crate::config::WebhookConfig;
use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature
pub const SIGNATURE_HEADER: &str = "x-agentmart-signature";

/// Verifies signed settlement callbacks
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
    tolerance: Duration,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>, tolerance: Duration) -> Self {
        Self {
            secret: secret.into(),
            tolerance,
        }
    }

    /// `None` when no secret is configured
    pub fn from_config(config: &WebhookConfig) -> Option<Self> {
        config
            .secret
            .as_ref()
            .map(|secret| Self::new(secret.clone(), config.timestamp_tolerance))
    }

    /// Check `header` against `body` at the current time
    pub fn verify(&self, header: &str, body: &[u8]) -> AuthResult<()> {
        self.verify_at(header, body, Utc::now().timestamp())
    }

    pub fn verify_at(&self, header: &str, body: &[u8], now: i64) -> AuthResult<()> {
        let (timestamp, signature) = parse_header(header)?;

        let drift = now.abs_diff(timestamp);
        if drift > self.tolerance.as_secs() {
            return Err(AuthError::InvalidTimestamp);
        }

        let expected = self.sign(timestamp, body)?;
        let is_valid: bool = expected.as_bytes().ct_eq(signature.as_bytes()).into();
        if is_valid {
            Ok(())
        } else {
            Err(AuthError::InvalidSignature)
        }
    }

    /// Hex signature of `body` at `timestamp`
    pub fn sign(&self, timestamp: i64, body: &[u8]) -> AuthResult<String> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes()).map_err(|_| AuthError::CryptoError)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(body);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Full header value for `body` at `timestamp`
    pub fn header_value(&self, timestamp: i64, body: &[u8]) -> AuthResult<String> {
        Ok(format!("t={},v1={}", timestamp, self.sign(timestamp, body)?))
    }
}

fn parse_header(header: &str) -> AuthResult<(i64, &str)> {
    let mut timestamp = None;
    let mut signature = None;
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signature = Some(value),
            _ => {}
        }
    }
    match (timestamp, signature) {
        (Some(t), Some(s)) => Ok((t, s)),
        _ => Err(AuthError::InvalidSignature),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new("whsec_test_secret_value", Duration::from_secs(300))
    }

    #[test]
    fn test_valid_signature() {
        let v = verifier();
        let body = br#"{"external_payment_ref":"pi_1","status":"completed"}"#;
        let header = v.header_value(1_700_000_000, body).unwrap();
        assert!(v.verify_at(&header, body, 1_700_000_100).is_ok());
    }

    #[test]
    fn test_tampered_body() {
        let v = verifier();
        let header = v.header_value(1_700_000_000, b"original").unwrap();
        let result = v.verify_at(&header, b"tampered", 1_700_000_000);
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn test_stale_timestamp() {
        let v = verifier();
        let header = v.header_value(1_700_000_000, b"body").unwrap();
        let result = v.verify_at(&header, b"body", 1_700_000_000 + 301);
        assert!(matches!(result, Err(AuthError::InvalidTimestamp)));
    }

    #[test]
    fn test_malformed_header() {
        let v = verifier();
        assert!(v.verify_at("garbage", b"body", 0).is_err());
        assert!(v.verify_at("t=abc,v1=00", b"body", 0).is_err());
    }

    #[test]
    fn test_disabled_without_secret() {
        assert!(WebhookVerifier::from_config(&WebhookConfig::default()).is_none());
    }
}
