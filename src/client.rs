//! The context surface exposed to the host UI layer.
//!
//! [`TransactionClient`] wires the session manager, read cache and submission
//! pipeline together and owns the event loop that reacts to wallet
//! account/chain changes. It mirrors what a browser dapp context provides:
//! connect, current account, a form draft, a submission trigger, a loading
//! flag and the cached read state.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, U256};
use tracing::{info, warn};

use crate::cache::{ReadCache, TransactionRecord};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::gateway::ContractGateway;
use crate::pipeline::{Submission, SubmissionPipeline};
use crate::provider::{WalletEvent, WalletProvider};
use crate::session::SessionManager;
use crate::store::CountStore;
use crate::units::parse_units;

/// Draft input for one send, filled in field by field by the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDraft {
    pub address_to: String,
    pub amount: String,
    pub message: String,
    pub keyword: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    AddressTo,
    Amount,
    Message,
    Keyword,
}

/// The injected wallet pair: authorization surface plus the contract bound to
/// its signer. Both come from the same host wallet object, so they are absent
/// or present together.
#[derive(Clone)]
pub struct WalletStack {
    pub provider: Arc<dyn WalletProvider>,
    pub gateway: Arc<dyn ContractGateway>,
}

struct ClientInner {
    provider: Arc<dyn WalletProvider>,
    gateway: Arc<dyn ContractGateway>,
    session: Arc<SessionManager>,
    cache: Arc<ReadCache>,
    pipeline: Arc<SubmissionPipeline>,
    store: Option<CountStore>,
}

impl ClientInner {
    async fn establish(&self, account: Address) -> Result<()> {
        self.cache.refresh_token_meta().await?;
        self.cache.refresh_all(account).await?;
        Ok(())
    }

    async fn check_existing_session(&self) -> Result<Option<Address>> {
        match self.session.check_existing_session().await? {
            Some(account) => {
                self.establish(account).await?;
                Ok(Some(account))
            }
            None => Ok(None),
        }
    }

    async fn handle_event(&self, event: WalletEvent) {
        match event {
            WalletEvent::AccountsChanged(accounts) => match accounts.first() {
                Some(&account) => {
                    info!(%account, "wallet switched accounts");
                    self.session.set_account(Some(account));
                    if let Err(err) = self.cache.refresh_balance(account).await {
                        warn!(%err, "balance refresh after account change failed");
                    }
                }
                None => {
                    self.session.disconnect();
                    self.cache.clear_balance();
                }
            },
            WalletEvent::ChainChanged(chain_id) => {
                // Contract bindings and token semantics may differ per chain;
                // discard everything and rebuild from the provider. In-flight
                // submissions are left to fail naturally.
                info!(chain_id, "chain changed, reloading client context");
                self.session.disconnect();
                self.cache.clear();
                if let Err(err) = self.check_existing_session().await {
                    warn!(%err, "session re-check after chain change failed");
                }
            }
        }
    }
}

pub struct TransactionClient {
    inner: Option<Arc<ClientInner>>,
    form: Mutex<FormDraft>,
    started: AtomicBool,
}

impl TransactionClient {
    /// Build a client over an injected wallet. `None` models the host
    /// environment having no wallet at all; every operation then signals
    /// [`Error::ProviderUnavailable`].
    pub fn new(stack: Option<WalletStack>, config: &ClientConfig) -> Arc<Self> {
        let inner = stack.map(|stack| {
            let store = config.state_dir().map(CountStore::new);
            let session = Arc::new(SessionManager::new(Arc::clone(&stack.provider)));
            let cache = Arc::new(ReadCache::new(Arc::clone(&stack.gateway), store.clone()));
            let pipeline = Arc::new(SubmissionPipeline::new(
                Arc::clone(&stack.gateway),
                Arc::clone(&session),
                Arc::clone(&cache),
            ));
            Arc::new(ClientInner {
                provider: stack.provider,
                gateway: stack.gateway,
                session,
                cache,
                pipeline,
                store,
            })
        });
        Arc::new(Self {
            inner,
            form: Mutex::new(FormDraft::default()),
            started: AtomicBool::new(false),
        })
    }

    fn inner(&self) -> Result<&Arc<ClientInner>> {
        self.inner.as_ref().ok_or(Error::ProviderUnavailable)
    }

    /// Startup sequence: adopt an already-authorized session if there is one
    /// and run the cheap prior-activity existence check.
    pub async fn bootstrap(&self) -> Result<Option<Address>> {
        let account = self.check_existing_session().await?;
        if let Err(err) = self.check_prior_activity().await {
            warn!(%err, "startup transaction count check failed");
        }
        Ok(account)
    }

    /// Query for an already-authorized account without prompting; on success
    /// the token metadata is fetched and the cache fully refreshed.
    pub async fn check_existing_session(&self) -> Result<Option<Address>> {
        self.inner()?.check_existing_session().await
    }

    /// Prompt the wallet for authorization; same post-conditions as a
    /// successful existing-session check.
    pub async fn connect(&self) -> Result<Option<Address>> {
        let inner = self.inner()?;
        match inner.session.request_connection().await? {
            Some(account) => {
                inner.establish(account).await?;
                Ok(Some(account))
            }
            None => Ok(None),
        }
    }

    /// Fetch the remote transaction count, persist it, and report whether any
    /// prior activity exists.
    pub async fn check_prior_activity(&self) -> Result<bool> {
        let inner = self.inner()?;
        let count = inner.gateway.transaction_count().await?;
        if let Some(store) = &inner.store {
            if let Err(err) = store.save(count) {
                warn!(%err, "failed to persist transaction count");
            }
        }
        Ok(count > 0)
    }

    /// Whether the persisted count from an earlier run records any activity.
    pub fn has_prior_activity(&self) -> bool {
        self.inner
            .as_ref()
            .and_then(|inner| inner.store.as_ref())
            .and_then(|store| store.load().ok().flatten())
            .map_or(false, |count| count > 0)
    }

    /// Subscribe to wallet events and spawn the handler task. Established
    /// once per client lifetime; later calls are no-ops.
    pub fn start(&self) -> Result<()> {
        let inner = self.inner()?;
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let mut events = inner.provider.subscribe();
        let inner = Arc::clone(inner);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                inner.handle_event(event).await;
            }
        });
        Ok(())
    }

    pub fn form(&self) -> FormDraft {
        self.form.lock().unwrap().clone()
    }

    /// Field-set update for the draft, the way a form binds its inputs.
    pub fn update_form(&self, field: FormField, value: impl Into<String>) {
        let mut form = self.form.lock().unwrap();
        let value = value.into();
        match field {
            FormField::AddressTo => form.address_to = value,
            FormField::Amount => form.amount = value,
            FormField::Message => form.message = value,
            FormField::Keyword => form.keyword = value,
        }
    }

    /// Parse the current draft and run it through the submission pipeline.
    pub async fn submit_draft(&self) -> Result<Submission> {
        let inner = self.inner()?;
        if !inner.session.is_connected() {
            return Err(Error::NoActiveSession);
        }
        let draft = self.form();
        let to = Address::from_str(draft.address_to.trim())
            .map_err(|_| Error::InvalidAddress(draft.address_to.clone()))?;
        let decimals = match inner.cache.token_meta() {
            Some(meta) => meta.decimals,
            None => inner.gateway.decimals().await?,
        };
        let amount = parse_units(&draft.amount, decimals)?;
        inner
            .pipeline
            .submit(to, amount, &draft.message, &draft.keyword)
            .await
    }

    /// Submit a fully-parsed send, bypassing the draft.
    pub async fn submit(
        &self,
        to: Address,
        amount: U256,
        message: &str,
        keyword: &str,
    ) -> Result<Submission> {
        self.inner()?.pipeline.submit(to, amount, message, keyword).await
    }

    pub fn account(&self) -> Option<Address> {
        self.inner.as_ref().and_then(|inner| inner.session.current_account())
    }

    pub fn is_connected(&self) -> bool {
        self.account().is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.inner
            .as_ref()
            .map_or(false, |inner| inner.pipeline.is_loading())
    }

    pub fn balance(&self) -> Option<String> {
        self.inner.as_ref().and_then(|inner| inner.cache.balance())
    }

    pub fn transactions(&self) -> Vec<TransactionRecord> {
        self.inner
            .as_ref()
            .map(|inner| inner.cache.transactions())
            .unwrap_or_default()
    }

    pub fn transaction_count(&self) -> Option<u64> {
        self.inner.as_ref().and_then(|inner| inner.cache.transaction_count())
    }

    pub fn token_name(&self) -> Option<String> {
        self.inner
            .as_ref()
            .and_then(|inner| inner.cache.token_meta())
            .map(|meta| meta.name)
    }

    pub fn token_symbol(&self) -> Option<String> {
        self.inner
            .as_ref()
            .and_then(|inner| inner.cache.token_meta())
            .map(|meta| meta.symbol)
    }
}
