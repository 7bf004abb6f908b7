//! In-memory wallet provider and contract chain used by the integration
//! tests. Failures and confirmation timing are controllable per test.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use tokengram::{
    Confirmation, ContractGateway, Error, RawLogEntry, Receipt, Result, TxHash, WalletEvent,
    WalletProvider,
};

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

/// `n` whole tokens at the given decimals.
pub fn tokens(n: u64, decimals: u8) -> U256 {
    U256::from(n) * U256::from(10u8).pow(U256::from(decimals))
}

pub struct MockProvider {
    accounts: Mutex<Vec<Address>>,
    rejecting: AtomicBool,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<WalletEvent>>>,
}

impl MockProvider {
    pub fn new(accounts: Vec<Address>) -> Arc<Self> {
        Arc::new(Self {
            accounts: Mutex::new(accounts),
            rejecting: AtomicBool::new(false),
            subscribers: Mutex::new(Vec::new()),
        })
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        *self.accounts.lock().unwrap() = accounts;
    }

    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::SeqCst);
    }

    /// Push a wallet event to every subscriber.
    pub fn emit(&self, event: WalletEvent) {
        for tx in self.subscribers.lock().unwrap().iter() {
            let _ = tx.send(event.clone());
        }
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    async fn authorized_accounts(&self) -> Result<Vec<Address>> {
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        if self.rejecting.load(Ordering::SeqCst) {
            return Err(Error::UserRejected);
        }
        Ok(self.accounts.lock().unwrap().clone())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<WalletEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }
}

pub struct ChainState {
    pub balances: HashMap<Address, U256>,
    pub log: Vec<RawLogEntry>,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub now: i64,
}

impl ChainState {
    pub fn new(name: &str, symbol: &str, decimals: u8) -> Self {
        Self {
            balances: HashMap::new(),
            log: Vec::new(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
            now: 1_700_000_000,
        }
    }

    pub fn fund(&mut self, account: Address, amount: U256) {
        self.balances.insert(account, amount);
    }

    pub fn append_log(&mut self, sender: Address, receiver: Address, amount: U256, message: &str) {
        self.now += 1;
        self.log.push(RawLogEntry {
            sender,
            receiver,
            amount,
            message: message.to_string(),
            keyword: String::new(),
            timestamp: self.now,
        });
    }
}

struct MockConfirmation {
    hash: TxHash,
    outcome: Result<()>,
    effect: Option<Box<dyn FnOnce() + Send>>,
    gate: Option<watch::Receiver<bool>>,
}

#[async_trait]
impl Confirmation for MockConfirmation {
    fn tx_hash(&self) -> TxHash {
        self.hash
    }

    async fn confirmed(self: Box<Self>) -> Result<Receipt> {
        let me = *self;
        if let Some(mut gate) = me.gate {
            while !*gate.borrow() {
                gate.changed().await.expect("confirmation gate dropped");
            }
        }
        me.outcome?;
        if let Some(effect) = me.effect {
            effect();
        }
        Ok(Receipt { tx_hash: me.hash })
    }
}

/// Contract gateway over the in-memory chain, "signed" by a fixed account.
pub struct MockGateway {
    pub state: Arc<Mutex<ChainState>>,
    signer: Address,
    pub write_calls: AtomicU64,
    fail_transfer: AtomicBool,
    fail_log_append: AtomicBool,
    next_hash: AtomicU64,
    gate: Mutex<Option<watch::Receiver<bool>>>,
}

impl MockGateway {
    pub fn new(state: Arc<Mutex<ChainState>>, signer: Address) -> Arc<Self> {
        Arc::new(Self {
            state,
            signer,
            write_calls: AtomicU64::new(0),
            fail_transfer: AtomicBool::new(false),
            fail_log_append: AtomicBool::new(false),
            next_hash: AtomicU64::new(1),
            gate: Mutex::new(None),
        })
    }

    pub fn fail_transfer(&self, fail: bool) {
        self.fail_transfer.store(fail, Ordering::SeqCst);
    }

    pub fn fail_log_append(&self, fail: bool) {
        self.fail_log_append.store(fail, Ordering::SeqCst);
    }

    pub fn write_calls(&self) -> u64 {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// Hold every subsequent confirmation until the returned sender releases
    /// them with `send(true)`.
    pub fn hold_confirmations(&self) -> watch::Sender<bool> {
        let (tx, rx) = watch::channel(false);
        *self.gate.lock().unwrap() = Some(rx);
        tx
    }

    fn hash(&self) -> TxHash {
        let n = self.next_hash.fetch_add(1, Ordering::Relaxed);
        B256::new(U256::from(n).to_be_bytes::<32>())
    }

    fn gate_rx(&self) -> Option<watch::Receiver<bool>> {
        self.gate.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContractGateway for MockGateway {
    async fn balance_of(&self, account: Address) -> Result<U256> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .balances
            .get(&account)
            .copied()
            .unwrap_or(U256::ZERO))
    }

    async fn decimals(&self) -> Result<u8> {
        Ok(self.state.lock().unwrap().decimals)
    }

    async fn name(&self) -> Result<String> {
        Ok(self.state.lock().unwrap().name.clone())
    }

    async fn symbol(&self) -> Result<String> {
        Ok(self.state.lock().unwrap().symbol.clone())
    }

    async fn transaction_count(&self) -> Result<u64> {
        Ok(self.state.lock().unwrap().log.len() as u64)
    }

    async fn all_transactions(&self) -> Result<Vec<RawLogEntry>> {
        Ok(self.state.lock().unwrap().log.clone())
    }

    async fn transfer(&self, to: Address, amount: U256) -> Result<Box<dyn Confirmation>> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        let outcome = if self.fail_transfer.load(Ordering::SeqCst) {
            Err(Error::ContractCallFailure("transfer reverted".into()))
        } else {
            Ok(())
        };
        let state = Arc::clone(&self.state);
        let from = self.signer;
        Ok(Box::new(MockConfirmation {
            hash: self.hash(),
            outcome,
            effect: Some(Box::new(move || {
                let mut state = state.lock().unwrap();
                let sender_balance = state.balances.get(&from).copied().unwrap_or(U256::ZERO);
                state.balances.insert(from, sender_balance - amount);
                let receiver_balance = state.balances.get(&to).copied().unwrap_or(U256::ZERO);
                state.balances.insert(to, receiver_balance + amount);
            })),
            gate: self.gate_rx(),
        }))
    }

    async fn add_to_blockchain(
        &self,
        to: Address,
        amount: U256,
        message: &str,
        keyword: &str,
    ) -> Result<Box<dyn Confirmation>> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        let outcome = if self.fail_log_append.load(Ordering::SeqCst) {
            Err(Error::ContractCallFailure("log append reverted".into()))
        } else {
            Ok(())
        };
        let state = Arc::clone(&self.state);
        let from = self.signer;
        let message = message.to_string();
        let keyword = keyword.to_string();
        Ok(Box::new(MockConfirmation {
            hash: self.hash(),
            outcome,
            effect: Some(Box::new(move || {
                let mut state = state.lock().unwrap();
                state.now += 1;
                let timestamp = state.now;
                state.log.push(RawLogEntry {
                    sender: from,
                    receiver: to,
                    amount,
                    message,
                    keyword,
                    timestamp,
                });
            })),
            gate: self.gate_rx(),
        }))
    }
}
