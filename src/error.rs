use thiserror::Error;

/// Every failure the orchestration layer can surface. Local precondition
/// violations (`NoActiveSession`, `SubmissionInProgress`) are resolved
/// synchronously and never reach the network; network-originated failures are
/// caught at the pipeline/gateway boundary and attached to the terminal
/// submission state instead of tearing down the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No wallet provider is injected at all.
    #[error("no wallet provider available")]
    ProviderUnavailable,

    /// The user declined the wallet authorization prompt.
    #[error("wallet authorization rejected by user")]
    UserRejected,

    /// A remote contract call reverted or errored.
    #[error("contract call failed: {0}")]
    ContractCallFailure(String),

    /// Waiting for a confirmation exceeded the provider's bounds.
    #[error("confirmation wait timed out: {0}")]
    ConfirmationTimeout(String),

    /// An operation requiring a connected account was invoked without one.
    #[error("no active wallet session")]
    NoActiveSession,

    /// Another submission for this session has not reached a terminal phase.
    #[error("a submission is already in flight")]
    SubmissionInProgress,

    /// An amount string could not be parsed into an unscaled integer.
    #[error("invalid numeric amount: {0:?}")]
    InvalidNumericFormat(String),

    /// A recipient address string is not a valid address.
    #[error("invalid address: {0:?}")]
    InvalidAddress(String),
}

pub type Result<T> = std::result::Result<T, Error>;
