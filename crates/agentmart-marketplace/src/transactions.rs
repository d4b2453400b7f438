//! Payment ledger operations
//!
//! Entries start `pending`. Status moves either through an admin override or
//! a verified settlement event from the payment provider.

use std::collections::HashMap;
use tracing::{debug, info, warn};

use agentmart_policy::Operation;
use agentmart_types::{
    Caller, MarketError, NewTransaction, PaymentEvent, Result, Transaction, TransactionId, TransactionStatus,
    TransactionView,
};

use crate::access::gate;
use crate::Context;

pub struct TransactionService {
    ctx: Context,
}

impl TransactionService {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Record a pending payment by the caller
    pub async fn create(&self, caller: Caller, input: NewTransaction) -> Result<Transaction> {
        let subject = self.ctx.subject(caller).await?;
        gate(Operation::TransactionCreate, &subject)?;
        let user_id = subject.user_id().ok_or(MarketError::Unauthenticated)?;
        input.validate()?;

        let tx = self
            .ctx
            .db
            .transaction_repo()
            .create(Transaction {
                id: TransactionId::new(),
                user_id,
                agent_id: input.agent_id,
                amount: input.amount,
                currency: input.currency,
                status: TransactionStatus::Pending,
                payment_method: input.payment_method,
                external_payment_ref: input.external_payment_ref,
                description: input.description,
                created_at: self.ctx.now(),
            })
            .await?;

        info!(tx_id = %tx.id, user_id = %user_id, amount = %tx.amount, currency = %tx.currency, "Transaction recorded");
        Ok(tx)
    }

    /// Admin override of a ledger entry's status
    pub async fn update_status(&self, caller: Caller, id: TransactionId, status: TransactionStatus) -> Result<Transaction> {
        let subject = self.ctx.subject(caller).await?;
        gate(Operation::TransactionUpdateStatus, &subject)?;

        let repo = self.ctx.db.transaction_repo();
        let previous = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| MarketError::not_found("Transaction", id))?;
        let tx = repo.set_status(id, status).await?;

        info!(tx_id = %id, from = %previous.status, to = %status, "Transaction status overridden");
        Ok(tx)
    }

    /// Apply a settlement event to every entry carrying its payment reference,
    /// all in one statement.
    ///
    /// The event must already be authenticated by the caller.
    pub async fn apply_payment_event(&self, event: PaymentEvent) -> Result<Vec<Transaction>> {
        let subject = self.ctx.subject(Caller::Anonymous).await?;
        gate(Operation::TransactionSettle, &subject)?;

        let settled = self
            .ctx
            .db
            .transaction_repo()
            .set_status_by_payment_ref(&event.external_payment_ref, event.status)
            .await?;
        if settled.is_empty() {
            warn!(payment_ref = %event.external_payment_ref, "Settlement for unknown payment reference");
            return Err(MarketError::not_found("Transaction", &event.external_payment_ref));
        }

        info!(
            payment_ref = %event.external_payment_ref,
            status = %event.status,
            entries = settled.len(),
            "Transactions settled"
        );
        Ok(settled)
    }

    /// The caller's ledger entries, newest first
    pub async fn list_mine(&self, caller: Caller) -> Result<Vec<Transaction>> {
        let subject = self.ctx.subject(caller).await?;
        if let Err(denied) = gate(Operation::TransactionListMine, &subject) {
            return denied.resolve(Vec::new());
        }
        let Some(user_id) = subject.user_id() else {
            return Ok(Vec::new());
        };
        let mut txs = self.ctx.db.transaction_repo().list_by_user(user_id).await?;
        newest_first(&mut txs);
        Ok(txs)
    }

    /// The whole ledger with payer and agent (admin only)
    pub async fn list_all(&self, caller: Caller) -> Result<Vec<TransactionView>> {
        let subject = self.ctx.subject(caller).await?;
        if let Err(denied) = gate(Operation::TransactionListAll, &subject) {
            return denied.resolve(Vec::new());
        }

        let mut txs = self.ctx.db.transaction_repo().list_all().await?;
        newest_first(&mut txs);

        let payers: HashMap<_, _> = self
            .ctx
            .db
            .profile_repo()
            .list_all()
            .await?
            .into_iter()
            .map(|p| (p.user_id, p))
            .collect();
        let agents: HashMap<_, _> = self
            .ctx
            .db
            .agent_repo()
            .list_all()
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        debug!(count = txs.len(), "Ledger listed");
        Ok(txs
            .into_iter()
            .map(|transaction| TransactionView {
                payer: payers.get(&transaction.user_id).cloned(),
                agent: transaction.agent_id.and_then(|id| agents.get(&id).cloned()),
                transaction,
            })
            .collect())
    }
}

fn newest_first(txs: &mut [Transaction]) {
    txs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
