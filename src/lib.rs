//! tokengram — client-side wallet session and transaction orchestration.
//!
//! Sits between an injected wallet provider and a remote ledger contract
//! with token-transfer plus append-only-log semantics. The crate tracks the
//! wallet session, sequences the two dependent calls of one logical send,
//! keeps a local read cache consistent across confirmations and external
//! wallet events, and converts unscaled on-chain integers into decimal-safe
//! display strings.
//!
//! The UI layer, the wallet's signing internals and the contract's on-chain
//! logic live elsewhere; they meet this crate at the [`provider`] and
//! [`gateway`] trait boundaries.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod pipeline;
pub mod provider;
pub mod session;
pub mod store;
pub mod units;

pub use cache::{ReadCache, TokenMeta, TransactionRecord};
pub use client::{FormDraft, FormField, TransactionClient, WalletStack};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use gateway::{Confirmation, ContractGateway, RawLogEntry, Receipt, TxHash};
pub use pipeline::{Submission, SubmissionPhase, SubmissionPipeline};
pub use provider::{WalletEvent, WalletProvider};
pub use session::{Session, SessionManager};
pub use store::CountStore;
pub use units::{format_units, parse_units};
