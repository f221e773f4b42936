//! Capability traits for the injected wallet provider.
//!
//! These mirror the surface a page gets from an injected wallet: account
//! authorization, network identity, native balance reads, and a signing path
//! that can bind a contract and submit calls through it. Everything async may
//! reject; implementations report failures as [`ClientError::RemoteCallFailed`]
//! with the underlying message intact so callers can surface it verbatim.

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use std::sync::Arc;

use crate::abi::AbiDescriptor;
use crate::error::{ClientError, ClientResult};

/// Network identity reported by a wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInfo {
    /// EIP-155 chain ID.
    pub chain_id: u64,
    /// Human-readable network name for the session display.
    pub name: String,
}

impl NetworkInfo {
    /// Build from a chain ID, naming the well-known networks.
    pub fn from_chain_id(chain_id: u64) -> Self {
        let name = match chain_id {
            1 => "mainnet".to_string(),
            11155111 => "sepolia".to_string(),
            17000 => "holesky".to_string(),
            31337 => "anvil".to_string(),
            id => format!("chain-{id}"),
        };
        Self { chain_id, name }
    }
}

impl std::fmt::Display for NetworkInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (chain {})", self.name, self.chain_id)
    }
}

/// Confirmation receipt for a submitted state-changing call.
#[derive(Debug, Clone)]
pub struct CallReceipt {
    /// Hash of the confirmed transaction.
    pub tx_hash: TxHash,
    /// Block the transaction was included in, when the network reports one.
    pub block_number: Option<u64>,
}

/// The injected wallet capability.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Request account authorization. The first returned account is the
    /// identity subsequent operations run under. Rejection (the operator
    /// declining) is a normal failure mode.
    async fn request_accounts(&self) -> ClientResult<Vec<Address>>;

    /// Current network identity.
    async fn network(&self) -> ClientResult<NetworkInfo>;

    /// Native-currency balance of an arbitrary address, in wei.
    async fn native_balance(&self, address: Address) -> ClientResult<U256>;

    /// Derive a signing handle bound to one authorized account.
    fn signing_handle(&self, account: Address) -> ClientResult<Arc<dyn SigningHandle>>;
}

/// A signing identity able to construct contract handles.
pub trait SigningHandle: Send + Sync {
    /// Account this handle signs for.
    fn address(&self) -> Address;

    /// Construct a contract handle scoped to (address, descriptor, this signer).
    /// Fails on construction problems; address validity is the caller's concern.
    fn bind_contract(
        &self,
        address: Address,
        descriptor: &AbiDescriptor,
    ) -> ClientResult<Arc<dyn ContractHandle>>;
}

/// A contract bound to an address, an interface description, and a signer.
#[async_trait]
pub trait ContractHandle: Send + Sync {
    /// Address the handle is bound to.
    fn address(&self) -> Address;

    /// Read-only call. Returns the decoded values in declaration order.
    async fn call(&self, function: &str, args: &[DynSolValue]) -> ClientResult<Vec<DynSolValue>>;

    /// Submit a state-changing call. `value` attaches native currency in wei.
    /// Returns once the network has accepted the submission; confirmation is a
    /// separate wait on the returned handle.
    async fn send(
        &self,
        function: &str,
        args: &[DynSolValue],
        value: Option<U256>,
    ) -> ClientResult<Box<dyn PendingCall>>;
}

/// A submitted transaction awaiting network confirmation.
#[async_trait]
pub trait PendingCall: Send + Sync {
    /// Hash assigned at submission.
    fn tx_hash(&self) -> TxHash;

    /// Block until the network reports inclusion. Reverted execution is a
    /// failure, not a receipt.
    async fn confirmed(self: Box<Self>) -> ClientResult<CallReceipt>;
}

/// Shorthand for tagging a boundary failure with the remote-call kind.
pub fn remote_failure(message: impl Into<String>) -> ClientError {
    ClientError::RemoteCallFailed(message.into())
}
