//! Locally held mirror of remote balance/log/count state.
//!
//! The cache is only ever mutated by its refresh operations; callers get
//! cloned snapshots. A refresh fetches everything first and commits under a
//! single lock, so a partial overwrite is never observable: either all
//! fetched values land or the previous values stay.

use std::sync::{Arc, Mutex};

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::Result;
use crate::gateway::{ContractGateway, RawLogEntry};
use crate::store::CountStore;
use crate::units::format_units;

/// Token metadata, fetched once per session establishment and discarded on
/// chain change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMeta {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// One materialized entry of the remote transfer log. `amount` has already
/// passed through the decimal formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub from: Address,
    pub to: Address,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub keyword: String,
    pub amount: String,
}

#[derive(Debug, Clone, Default)]
struct CacheState {
    balance: Option<String>,
    transaction_count: Option<u64>,
    transactions: Vec<TransactionRecord>,
    token_meta: Option<TokenMeta>,
}

pub struct ReadCache {
    gateway: Arc<dyn ContractGateway>,
    store: Option<CountStore>,
    state: Mutex<CacheState>,
}

impl ReadCache {
    pub fn new(gateway: Arc<dyn ContractGateway>, store: Option<CountStore>) -> Self {
        Self {
            gateway,
            store,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn balance(&self) -> Option<String> {
        self.state.lock().unwrap().balance.clone()
    }

    pub fn transaction_count(&self) -> Option<u64> {
        self.state.lock().unwrap().transaction_count
    }

    pub fn transactions(&self) -> Vec<TransactionRecord> {
        self.state.lock().unwrap().transactions.clone()
    }

    pub fn token_meta(&self) -> Option<TokenMeta> {
        self.state.lock().unwrap().token_meta.clone()
    }

    /// Fetch name, symbol and decimals.
    pub async fn refresh_token_meta(&self) -> Result<TokenMeta> {
        let name = self.gateway.name().await?;
        let symbol = self.gateway.symbol().await?;
        let decimals = self.gateway.decimals().await?;
        let meta = TokenMeta {
            name,
            symbol,
            decimals,
        };
        self.state.lock().unwrap().token_meta = Some(meta.clone());
        Ok(meta)
    }

    /// Re-fetch count, transfer log and balance, then commit all three
    /// together. The persisted count is written afterwards; a write failure
    /// is logged and does not fail the refresh.
    pub async fn refresh_all(&self, account: Address) -> Result<()> {
        let decimals = self.decimals().await?;
        let count = self.gateway.transaction_count().await?;
        let raw = self.gateway.all_transactions().await?;
        let balance = self.gateway.balance_of(account).await?;

        let transactions: Vec<TransactionRecord> = raw
            .iter()
            .map(|entry| materialize(entry, decimals))
            .collect();
        {
            let mut state = self.state.lock().unwrap();
            state.transaction_count = Some(count);
            state.transactions = transactions;
            state.balance = Some(format_units(balance, decimals));
        }
        debug!(count, "read cache refreshed");

        if let Some(store) = &self.store {
            if let Err(err) = store.save(count) {
                warn!(%err, "failed to persist transaction count");
            }
        }
        Ok(())
    }

    /// Cheaper partial refresh used mid-pipeline.
    pub async fn refresh_balance(&self, account: Address) -> Result<()> {
        let decimals = self.decimals().await?;
        let balance = self.gateway.balance_of(account).await?;
        self.state.lock().unwrap().balance = Some(format_units(balance, decimals));
        Ok(())
    }

    /// Discard everything, including token metadata. Used on chain change,
    /// where contract addresses and token semantics may differ.
    pub fn clear(&self) {
        *self.state.lock().unwrap() = CacheState::default();
    }

    /// Forget the balance without touching the rest. Used when the wallet
    /// disconnects its accounts.
    pub fn clear_balance(&self) {
        self.state.lock().unwrap().balance = None;
    }

    async fn decimals(&self) -> Result<u8> {
        let cached = self.state.lock().unwrap().token_meta.as_ref().map(|m| m.decimals);
        match cached {
            Some(d) => Ok(d),
            None => self.gateway.decimals().await,
        }
    }
}

fn materialize(entry: &RawLogEntry, decimals: u8) -> TransactionRecord {
    TransactionRecord {
        from: entry.sender,
        to: entry.receiver,
        timestamp: DateTime::from_timestamp(entry.timestamp, 0).unwrap_or(DateTime::UNIX_EPOCH),
        message: entry.message.clone(),
        keyword: entry.keyword.clone(),
        amount: format_units(entry.amount, decimals),
    }
}
