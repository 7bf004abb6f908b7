//! The two-phase submission pipeline for one logical send.
//!
//! A send is two dependent remote calls: the value transfer, then the
//! human-readable log append. They are deliberately not atomic; a transfer
//! that succeeds while the log append fails is surfaced as a terminal
//! [`SubmissionPhase::Failed`] submission that still carries the confirmed
//! transfer hash, rather than silently losing the discrepancy.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, U256};
use tracing::{error, info, warn};

use crate::cache::ReadCache;
use crate::error::{Error, Result};
use crate::gateway::{ContractGateway, TxHash};
use crate::session::SessionManager;

/// Phases move strictly forward; `Failed` is reachable from any non-terminal
/// phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Created,
    TransferSubmitted,
    TransferConfirmed,
    LogSubmitted,
    LogConfirmed,
    Failed,
}

impl SubmissionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::LogConfirmed | Self::Failed)
    }
}

/// State of one logical send. Owned by the pipeline while in flight and
/// handed back to the caller once terminal; history is not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: u64,
    pub phase: SubmissionPhase,
    pub to: Address,
    pub amount: U256,
    pub message: String,
    pub keyword: String,
    pub transfer_hash: Option<TxHash>,
    pub log_hash: Option<TxHash>,
    pub error: Option<Error>,
}

pub struct SubmissionPipeline {
    gateway: Arc<dyn ContractGateway>,
    session: Arc<SessionManager>,
    cache: Arc<ReadCache>,
    is_loading: AtomicBool,
    // Sole mutual-exclusion invariant: at most one non-terminal submission
    // per session. An id slot suffices, no global lock.
    in_flight: Mutex<Option<u64>>,
    next_id: AtomicU64,
}

impl SubmissionPipeline {
    pub fn new(
        gateway: Arc<dyn ContractGateway>,
        session: Arc<SessionManager>,
        cache: Arc<ReadCache>,
    ) -> Self {
        Self {
            gateway,
            session,
            cache,
            is_loading: AtomicBool::new(false),
            in_flight: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// True while a submission is between acceptance and its terminal phase.
    pub fn is_loading(&self) -> bool {
        self.is_loading.load(Ordering::SeqCst)
    }

    /// Run one logical send to a terminal phase.
    ///
    /// Precondition violations (`NoActiveSession`, `SubmissionInProgress`)
    /// are returned as `Err` before any gateway call. Network-phase failures
    /// return `Ok` with a `Failed` submission carrying the error kind; no
    /// automatic retry is attempted.
    pub async fn submit(
        &self,
        to: Address,
        amount: U256,
        message: &str,
        keyword: &str,
    ) -> Result<Submission> {
        let account = self
            .session
            .current_account()
            .ok_or(Error::NoActiveSession)?;

        let id = {
            let mut in_flight = self.in_flight.lock().unwrap();
            if in_flight.is_some() {
                return Err(Error::SubmissionInProgress);
            }
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            *in_flight = Some(id);
            id
        };
        self.is_loading.store(true, Ordering::SeqCst);

        let mut submission = Submission {
            id,
            phase: SubmissionPhase::Created,
            to,
            amount,
            message: message.to_owned(),
            keyword: keyword.to_owned(),
            transfer_hash: None,
            log_hash: None,
            error: None,
        };

        let outcome = self.run_phases(&mut submission, account).await;

        self.is_loading.store(false, Ordering::SeqCst);
        *self.in_flight.lock().unwrap() = None;

        match outcome {
            Ok(()) => {
                if let Err(err) = self.cache.refresh_all(account).await {
                    warn!(id, %err, "post-submission cache refresh failed");
                }
                Ok(submission)
            }
            Err(err) => {
                error!(id, phase = ?submission.phase, %err, "submission failed");
                submission.error = Some(err);
                submission.phase = SubmissionPhase::Failed;
                Ok(submission)
            }
        }
    }

    async fn run_phases(&self, submission: &mut Submission, account: Address) -> Result<()> {
        let confirmation = self.gateway.transfer(submission.to, submission.amount).await?;
        submission.transfer_hash = Some(confirmation.tx_hash());
        submission.phase = SubmissionPhase::TransferSubmitted;
        info!(id = submission.id, tx = %confirmation.tx_hash(), "transfer submitted");

        let receipt = confirmation.confirmed().await?;
        submission.phase = SubmissionPhase::TransferConfirmed;
        info!(id = submission.id, tx = %receipt.tx_hash, "transfer confirmed");

        // Refresh the balance now, so the cache stays accurate even if the
        // log-append phase fails below.
        if let Err(err) = self.cache.refresh_balance(account).await {
            warn!(id = submission.id, %err, "interim balance refresh failed");
        }

        let confirmation = self
            .gateway
            .add_to_blockchain(
                submission.to,
                submission.amount,
                &submission.message,
                &submission.keyword,
            )
            .await?;
        submission.log_hash = Some(confirmation.tx_hash());
        submission.phase = SubmissionPhase::LogSubmitted;
        info!(id = submission.id, tx = %confirmation.tx_hash(), "log entry submitted");

        let receipt = confirmation.confirmed().await?;
        submission.phase = SubmissionPhase::LogConfirmed;
        info!(id = submission.id, tx = %receipt.tx_hash, "log entry confirmed");
        Ok(())
    }
}
