//! Error taxonomy for the console client.
//!
//! Every failure a component can produce falls into one of these kinds, and every
//! kind is caught at the boundary of the operation that produced it and turned into
//! an operator-visible notification. Nothing is retried automatically.
//!
//! The `Display` text of each variant is the message shown to the operator, so
//! callers can hand `err.to_string()` straight to a notifier.

use thiserror::Error;

/// Failures surfaced to the operator.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No wallet provider was found in the injection slot.
    #[error("Please install MetaMask or another Web3 wallet")]
    ProviderAbsent,

    /// Every candidate ABI location was unreachable, malformed, or empty.
    #[error("Could not load the contract ABI: {0}")]
    AbiUnavailable(String),

    /// The provider declined account access or failed during connect.
    #[error("Error connecting wallet: {0}")]
    WalletConnectionFailed(String),

    /// The contract address was malformed or handle construction failed.
    #[error("Error loading contract: {0}")]
    ContractBindFailed(String),

    /// An operation was attempted before its required session state, or with
    /// invalid operator input. Never reaches the network.
    #[error("{0}")]
    PreconditionFailed(String),

    /// Submission or confirmation failed at the provider/network boundary,
    /// including reverted execution. The underlying message is kept verbatim.
    #[error("Error: {0}")]
    RemoteCallFailed(String),
}

impl ClientError {
    /// The underlying message without the taxonomy prefix, for re-tagging a
    /// boundary failure at a transition (e.g. a provider error during connect
    /// becomes `WalletConnectionFailed` carrying the same detail).
    pub fn detail(&self) -> &str {
        match self {
            ClientError::ProviderAbsent => "no wallet provider detected",
            ClientError::AbiUnavailable(msg)
            | ClientError::WalletConnectionFailed(msg)
            | ClientError::ContractBindFailed(msg)
            | ClientError::PreconditionFailed(msg)
            | ClientError::RemoteCallFailed(msg) => msg,
        }
    }

    /// True for failures produced before any network traffic.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ClientError::ProviderAbsent | ClientError::PreconditionFailed(_)
        )
    }
}

/// Result type for console client operations.
pub type ClientResult<T> = Result<T, ClientError>;
