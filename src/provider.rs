//! The injected wallet-provider boundary.
//!
//! The host environment hands the client a wallet it does not own: the wallet
//! keeps the keys and decides prompts, the client only asks for the account
//! list and listens for externally-triggered changes. Absence of a provider is
//! a detectable condition, not a panic; the client signals
//! [`Error::ProviderUnavailable`](crate::Error::ProviderUnavailable) from
//! every public operation when constructed without one.

use alloy_primitives::Address;
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;

/// Externally-triggered wallet notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// The authorized account list changed. Empty means the wallet
    /// disconnected from this client.
    AccountsChanged(Vec<Address>),
    /// The wallet switched chains; all local bindings are stale.
    ChainChanged(u64),
}

/// Capability surface of an injected browser wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Accounts the wallet has already authorized for this client. Never
    /// prompts the user.
    async fn authorized_accounts(&self) -> Result<Vec<Address>>;

    /// Request authorization, prompting the user if needed. Fails with
    /// `UserRejected` when the user declines.
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    /// Subscribe to account/chain change notifications. Events are consumed
    /// from a queue by the session event loop rather than handled inside the
    /// wallet's callback context.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<WalletEvent>;
}
