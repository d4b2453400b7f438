//! Payment ledger types
//!
//! Transactions are ledger entries only. Settlement happens outside this
//! system and is reported back through [`PaymentEvent`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{AgentId, MarketError, Result, TransactionId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// Paying identity
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
    pub amount: Decimal,
    pub currency: String,
    pub status: TransactionStatus,
    pub payment_method: String,
    /// Reference assigned by the payment provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_payment_ref: Option<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(default)]
    pub agent_id: Option<AgentId>,
    pub amount: Decimal,
    pub currency: String,
    pub payment_method: String,
    #[serde(default)]
    pub external_payment_ref: Option<String>,
    pub description: String,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<()> {
        if self.amount < Decimal::ZERO {
            return Err(MarketError::invalid_input("amount", "must not be negative"));
        }
        if self.currency.trim().is_empty() {
            return Err(MarketError::invalid_input("currency", "must not be empty"));
        }
        Ok(())
    }
}

/// Settlement notification from the payment provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEvent {
    /// The provider's reference, matched against `external_payment_ref`
    pub external_payment_ref: String,
    pub status: TransactionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_transaction_validation() {
        let mut tx = NewTransaction {
            agent_id: None,
            amount: dec!(9.99),
            currency: "USD".to_string(),
            payment_method: "card".to_string(),
            external_payment_ref: None,
            description: "Bot monthly".to_string(),
        };
        assert!(tx.validate().is_ok());
        tx.amount = dec!(-0.01);
        assert!(tx.validate().is_err());
        tx.amount = dec!(1);
        tx.currency = " ".to_string();
        assert!(tx.validate().is_err());
    }
}
