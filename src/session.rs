//! Wallet session: the currently authorized account and its connection state.

use std::sync::{Arc, Mutex};

use alloy_primitives::Address;
use tracing::{debug, info};

use crate::error::Result;
use crate::provider::WalletProvider;

/// At most one account is active at a time; `None` means disconnected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub account: Option<Address>,
}

impl Session {
    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }
}

/// Owns the session and talks to the wallet provider for authorization.
///
/// Cache refreshes triggered by session establishment are orchestrated one
/// level up, in [`crate::client::TransactionClient`].
pub struct SessionManager {
    provider: Arc<dyn WalletProvider>,
    session: Mutex<Session>,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self {
            provider,
            session: Mutex::new(Session::default()),
        }
    }

    pub fn current_account(&self) -> Option<Address> {
        self.session.lock().unwrap().account
    }

    pub fn is_connected(&self) -> bool {
        self.current_account().is_some()
    }

    /// Adopt an already-authorized account without prompting the user.
    /// `Ok(None)` is the no-account-found outcome, not an error.
    pub async fn check_existing_session(&self) -> Result<Option<Address>> {
        let accounts = self.provider.authorized_accounts().await?;
        match accounts.first() {
            Some(&account) => {
                self.set_account(Some(account));
                info!(%account, "existing wallet session adopted");
                Ok(Some(account))
            }
            None => {
                debug!("no authorized accounts found");
                Ok(None)
            }
        }
    }

    /// Prompt the wallet for authorization. May suspend on user interaction;
    /// fails with `UserRejected` when the user declines.
    pub async fn request_connection(&self) -> Result<Option<Address>> {
        let accounts = self.provider.request_accounts().await?;
        match accounts.first() {
            Some(&account) => {
                self.set_account(Some(account));
                info!(%account, "wallet connected");
                Ok(Some(account))
            }
            None => {
                debug!("wallet granted authorization with an empty account list");
                Ok(None)
            }
        }
    }

    pub(crate) fn set_account(&self, account: Option<Address>) {
        self.session.lock().unwrap().account = account;
    }

    pub(crate) fn disconnect(&self) {
        let mut session = self.session.lock().unwrap();
        if session.is_connected() {
            info!("wallet session disconnected");
        }
        *session = Session::default();
    }
}
