use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::notify::{Dispatcher, Notice, TransferDetails};
use crate::store::models::{status, Deposit, Withdrawal};
use crate::store::{DebitOutcome, DynBalanceStore, DynDepositStore, DynWithdrawalStore};
use crate::workflow::recipient::RecipientResolver;
use crate::workflow::{Outcome, WorkflowError};

/// Drives the approve/reject transitions for transfer requests.
///
/// Every transition follows the same shape: load the record, resolve the
/// notification recipient, apply the guarded state change, then hand the
/// notice to the dispatcher on a spawned task. The recipient is resolved
/// before anything is written so an unresolvable address aborts the
/// transition instead of leaving an approved record nobody was told about.
pub struct ApprovalEngine {
    deposits: DynDepositStore,
    withdrawals: DynWithdrawalStore,
    balances: DynBalanceStore,
    resolver: Arc<RecipientResolver>,
    dispatcher: Arc<Dispatcher>,
}

impl ApprovalEngine {
    pub fn new(
        deposits: DynDepositStore,
        withdrawals: DynWithdrawalStore,
        balances: DynBalanceStore,
        resolver: Arc<RecipientResolver>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            deposits,
            withdrawals,
            balances,
            resolver,
            dispatcher,
        }
    }

    pub async fn approve_deposit(&self, id: i64) -> Result<Outcome<Deposit>, WorkflowError> {
        let deposit = self
            .deposits
            .find(id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Deposit #{id} not found")))?;
        let recipient = self
            .resolver
            .resolve(deposit.user_email.as_deref(), deposit.user_id)
            .await?;

        let Some(updated) = self.deposits.mark_approved_if_pending(id, Utc::now()).await? else {
            return Ok(Outcome::AlreadyProcessed);
        };

        info!(id, recipient = %recipient.email, "Deposit approved");
        self.dispatcher.spawn(Notice::DepositStatus {
            email: recipient.email,
            status: status::APPROVED.to_string(),
            details: deposit_details(&updated),
        });
        Ok(Outcome::Completed(updated))
    }

    pub async fn reject_deposit(&self, id: i64) -> Result<Outcome<Deposit>, WorkflowError> {
        let deposit = self
            .deposits
            .find(id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Deposit #{id} not found")))?;
        let recipient = self
            .resolver
            .resolve(deposit.user_email.as_deref(), deposit.user_id)
            .await?;

        let Some(updated) = self.deposits.mark_rejected_if_pending(id, Utc::now()).await? else {
            return Ok(Outcome::AlreadyProcessed);
        };

        info!(id, recipient = %recipient.email, "Deposit rejected");
        self.dispatcher.spawn(Notice::DepositStatus {
            email: recipient.email,
            status: status::REJECTED.to_string(),
            details: deposit_details(&updated),
        });
        Ok(Outcome::Completed(updated))
    }

    pub async fn approve_withdrawal(&self, id: i64) -> Result<Outcome<Withdrawal>, WorkflowError> {
        let withdrawal = self
            .withdrawals
            .find(id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Withdrawal #{id} not found")))?;
        let recipient = self
            .resolver
            .resolve(withdrawal.user_email.as_deref(), withdrawal.user_id)
            .await?;

        // Friendly pre-check; the debit transaction below is authoritative.
        let balance = self
            .balances
            .amount(withdrawal.user_id, &withdrawal.coin)
            .await?
            .unwrap_or_default();
        if balance < withdrawal.amount {
            return Err(WorkflowError::InsufficientFunds(format!(
                "Insufficient {} balance: {} available, {} requested",
                withdrawal.coin, balance, withdrawal.amount
            )));
        }

        match self.withdrawals.approve_with_debit(id, Utc::now()).await? {
            DebitOutcome::Approved(updated) => {
                info!(id, recipient = %recipient.email, amount = %updated.amount,
                      "Withdrawal approved and wallet debited");
                self.dispatcher.spawn(Notice::WithdrawalStatus {
                    email: recipient.email,
                    status: status::APPROVED.to_string(),
                    details: withdrawal_details(&updated),
                });
                Ok(Outcome::Completed(updated))
            }
            DebitOutcome::InsufficientFunds => Err(WorkflowError::InsufficientFunds(format!(
                "Insufficient {} balance for withdrawal #{id}",
                withdrawal.coin
            ))),
            DebitOutcome::NotPending => Ok(Outcome::AlreadyProcessed),
        }
    }

    pub async fn reject_withdrawal(&self, id: i64) -> Result<Outcome<Withdrawal>, WorkflowError> {
        let withdrawal = self
            .withdrawals
            .find(id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Withdrawal #{id} not found")))?;
        let recipient = self
            .resolver
            .resolve(withdrawal.user_email.as_deref(), withdrawal.user_id)
            .await?;

        let Some(updated) = self
            .withdrawals
            .mark_rejected_if_pending(id, Utc::now())
            .await?
        else {
            return Ok(Outcome::AlreadyProcessed);
        };

        info!(id, recipient = %recipient.email, "Withdrawal rejected");
        self.dispatcher.spawn(Notice::WithdrawalStatus {
            email: recipient.email,
            status: status::REJECTED.to_string(),
            details: withdrawal_details(&updated),
        });
        Ok(Outcome::Completed(updated))
    }
}

pub fn deposit_details(deposit: &Deposit) -> TransferDetails {
    TransferDetails {
        id: deposit.id,
        coin: deposit.coin.clone(),
        amount: deposit.amount,
        fee: None,
        address: deposit.address_used.clone(),
        txid: deposit.txid.clone(),
        note: deposit.note.clone(),
        at: deposit
            .updated_at
            .or(deposit.approved_at)
            .unwrap_or(deposit.created_at),
    }
}

pub fn withdrawal_details(withdrawal: &Withdrawal) -> TransferDetails {
    TransferDetails {
        id: withdrawal.id,
        coin: withdrawal.coin.clone(),
        amount: withdrawal.amount,
        fee: Some(withdrawal.fee),
        address: withdrawal.to_address.clone(),
        txid: withdrawal.txid.clone(),
        note: withdrawal.note.clone(),
        at: withdrawal.processed_at.unwrap_or(withdrawal.created_at),
    }
}
