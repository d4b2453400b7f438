//! Site settings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{MarketError, Result, UserId};

/// Longest accepted setting key
pub const MAX_SETTING_KEY_LEN: usize = 128;

/// A key/value site setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub updated_by: UserId,
    pub updated_at: DateTime<Utc>,
}

pub fn validate_setting_key(key: &str) -> Result<()> {
    if key.is_empty() || key.len() > MAX_SETTING_KEY_LEN {
        return Err(MarketError::invalid_input(
            "key",
            format!("must be 1-{} characters", MAX_SETTING_KEY_LEN),
        ));
    }
    if !key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')) {
        return Err(MarketError::invalid_input("key", "only [A-Za-z0-9._-] allowed"));
    }
    Ok(())
}
