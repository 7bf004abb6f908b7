//! Thin capability surface over the ledger contract.
//!
//! Read operations return raw, unscaled values; decimal scaling is the
//! caller's job via [`crate::units`]. Write operations return a confirmation
//! handle carrying the transaction hash, which suspends until the network
//! finalizes the call.

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;

use crate::error::Result;

/// Transaction identifier usable for logging and diagnostics.
pub type TxHash = B256;

/// Receipt yielded once a write call is finalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
}

/// One entry of the contract's append-only transfer log, as returned by the
/// chain. `amount` is unscaled; `timestamp` is unix seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLogEntry {
    pub sender: Address,
    pub receiver: Address,
    pub amount: U256,
    pub message: String,
    pub keyword: String,
    pub timestamp: i64,
}

/// A write call that has been handed to the network but not yet finalized.
#[async_trait]
pub trait Confirmation: Send {
    /// Hash of the submitted transaction.
    fn tx_hash(&self) -> TxHash;

    /// Suspend until the call is finalized. Fails with `ConfirmationTimeout`
    /// or `ContractCallFailure`; there is no caller-initiated cancellation
    /// once the call is in flight.
    async fn confirmed(self: Box<Self>) -> Result<Receipt>;
}

/// Read/write operations of the ledger contract.
#[async_trait]
pub trait ContractGateway: Send + Sync {
    async fn balance_of(&self, account: Address) -> Result<U256>;
    async fn decimals(&self) -> Result<u8>;
    async fn name(&self) -> Result<String>;
    async fn symbol(&self) -> Result<String>;
    async fn transaction_count(&self) -> Result<u64>;

    /// Full transfer log in append order.
    async fn all_transactions(&self) -> Result<Vec<RawLogEntry>>;

    /// Move `amount` base units to `to`.
    async fn transfer(&self, to: Address, amount: U256) -> Result<Box<dyn Confirmation>>;

    /// Append the human-readable log entry for a transfer.
    async fn add_to_blockchain(
        &self,
        to: Address,
        amount: U256,
        message: &str,
        keyword: &str,
    ) -> Result<Box<dyn Confirmation>>;
}
