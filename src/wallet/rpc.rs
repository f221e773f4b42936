//! Wallet backed by a plain JSON-RPC endpoint.
//!
//! Stands in for an injected browser wallet when the console talks to a dev
//! chain directly. Implements the same provider traits the rest of the client
//! is written against, so nothing above this module knows the difference.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized

use std::sync::Arc;
use std::time::Duration;

use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::Function;
use alloy::network::{Ethereum, EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use tokio::time::timeout;
use url::Url;

use crate::abi::AbiDescriptor;
use crate::error::{ClientError, ClientResult};
use crate::wallet::provider::{
    remote_failure, CallReceipt, ContractHandle, NetworkInfo, PendingCall, SigningHandle,
    WalletProvider,
};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "PROFILE_CONSOLE_PRIVATE_KEY";

/// A signing wallet over one JSON-RPC endpoint and one key.
pub struct RpcWallet {
    provider: DynProvider,
    signer: PrivateKeySigner,
    rpc_url: Url,
    timeout_duration: Duration,
}

impl RpcWallet {
    /// Create a wallet from a hex-encoded private key string, with or without
    /// the 0x prefix. The key is parsed once and never printed.
    pub fn connect(
        rpc_url: Url,
        private_key_hex: &str,
        timeout_duration: Duration,
    ) -> ClientResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);
        let signer: PrivateKeySigner = key_hex.parse().map_err(|e| {
            ClientError::WalletConnectionFailed(format!("Invalid private key format: {e}"))
        })?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer.clone()))
            .connect_http(rpc_url.clone())
            .erased();

        tracing::info!(
            address = %signer.address(),
            rpc_url = %rpc_url,
            "Wallet initialized"
        );

        Ok(Self {
            provider,
            signer,
            rpc_url,
            timeout_duration,
        })
    }

    /// Load the wallet key from `PROFILE_CONSOLE_PRIVATE_KEY`.
    pub fn from_env(rpc_url: Url, timeout_duration: Duration) -> ClientResult<Self> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            ClientError::WalletConnectionFailed(format!(
                "Environment variable {PRIVATE_KEY_ENV_VAR} not set"
            ))
        })?;
        Self::connect(rpc_url, &private_key, timeout_duration)
    }

    async fn bounded<T, E, F>(&self, what: &str, fut: F) -> ClientResult<T>
    where
        F: std::future::IntoFuture<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        bounded(self.timeout_duration, what, fut).await
    }
}

/// Runs one RPC call under the wallet's timeout. The endpoint hanging and the
/// endpoint erroring both come back as the same remote failure.
async fn bounded<T, E, F>(timeout_duration: Duration, what: &str, fut: F) -> ClientResult<T>
where
    F: std::future::IntoFuture<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    match timeout(timeout_duration, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(remote_failure(format!("{what}: {e}"))),
        Err(_) => Err(remote_failure(format!(
            "{what}: no response within {}s",
            timeout_duration.as_secs()
        ))),
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    /// The approval popup of a browser wallet collapses to a reachability
    /// probe here: if the endpoint answers, the single managed account is
    /// exposed.
    async fn request_accounts(&self) -> ClientResult<Vec<Address>> {
        self.bounded("eth_chainId", self.provider.get_chain_id())
            .await?;
        Ok(vec![self.signer.address()])
    }

    async fn network(&self) -> ClientResult<NetworkInfo> {
        let chain_id = self
            .bounded("eth_chainId", self.provider.get_chain_id())
            .await?;
        Ok(NetworkInfo::from_chain_id(chain_id))
    }

    async fn native_balance(&self, address: Address) -> ClientResult<U256> {
        self.bounded("eth_getBalance", self.provider.get_balance(address))
            .await
    }

    fn signing_handle(&self, account: Address) -> ClientResult<Arc<dyn SigningHandle>> {
        if account != self.signer.address() {
            return Err(ClientError::WalletConnectionFailed(format!(
                "account {account} is not managed by this wallet"
            )));
        }
        Ok(Arc::new(RpcSigningHandle {
            provider: self.provider.clone(),
            address: account,
            timeout_duration: self.timeout_duration,
        }))
    }
}

impl std::fmt::Debug for RpcWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcWallet")
            .field("address", &self.signer.address())
            .field("rpc_url", &self.rpc_url.as_str())
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}

struct RpcSigningHandle {
    provider: DynProvider,
    address: Address,
    timeout_duration: Duration,
}

impl SigningHandle for RpcSigningHandle {
    fn address(&self) -> Address {
        self.address
    }

    fn bind_contract(
        &self,
        address: Address,
        descriptor: &AbiDescriptor,
    ) -> ClientResult<Arc<dyn ContractHandle>> {
        Ok(Arc::new(RpcContractHandle {
            provider: self.provider.clone(),
            descriptor: descriptor.clone(),
            address,
            from: self.address,
            timeout_duration: self.timeout_duration,
        }))
    }
}

/// One bound contract: an address plus the interface to encode against.
struct RpcContractHandle {
    provider: DynProvider,
    descriptor: AbiDescriptor,
    address: Address,
    from: Address,
    timeout_duration: Duration,
}

impl RpcContractHandle {
    fn function(&self, name: &str, input_count: usize) -> ClientResult<&Function> {
        self.descriptor.function(name, input_count).ok_or_else(|| {
            remote_failure(format!(
                "function {name} taking {input_count} argument(s) is not in the loaded ABI"
            ))
        })
    }

    fn request(
        &self,
        function: &Function,
        args: &[DynSolValue],
        value: Option<U256>,
    ) -> ClientResult<TransactionRequest> {
        let input = function.abi_encode_input(args).map_err(|e| {
            remote_failure(format!("cannot encode arguments for {}: {e}", function.name))
        })?;
        let mut tx = TransactionRequest::default()
            .with_to(self.address)
            .with_from(self.from)
            .with_input(Bytes::from(input));
        if let Some(value) = value {
            tx = tx.with_value(value);
        }
        Ok(tx)
    }
}

#[async_trait]
impl ContractHandle for RpcContractHandle {
    fn address(&self) -> Address {
        self.address
    }

    async fn call(&self, function: &str, args: &[DynSolValue]) -> ClientResult<Vec<DynSolValue>> {
        let decl = self.function(function, args.len())?;
        let tx = self.request(decl, args, None)?;
        let raw = bounded(self.timeout_duration, function, self.provider.call(tx)).await?;
        decl.abi_decode_output(&raw)
            .map_err(|e| remote_failure(format!("cannot decode {function} return data: {e}")))
    }

    async fn send(
        &self,
        function: &str,
        args: &[DynSolValue],
        value: Option<U256>,
    ) -> ClientResult<Box<dyn PendingCall>> {
        let decl = self.function(function, args.len())?;
        let tx = self.request(decl, args, value)?;
        let pending = bounded(
            self.timeout_duration,
            function,
            self.provider.send_transaction(tx),
        )
        .await?;
        let tx_hash = *pending.tx_hash();
        tracing::debug!(function = function, tx_hash = %tx_hash, "Transaction submitted");
        Ok(Box::new(RpcPendingCall { pending, tx_hash }))
    }
}

struct RpcPendingCall {
    pending: PendingTransactionBuilder<Ethereum>,
    tx_hash: TxHash,
}

#[async_trait]
impl PendingCall for RpcPendingCall {
    fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    /// Blocks until the transaction is mined. Deliberately not under the RPC
    /// timeout; inclusion can take as long as the chain needs, and the
    /// operator sees the pending notice in the meantime.
    async fn confirmed(self: Box<Self>) -> ClientResult<CallReceipt> {
        let tx_hash = self.tx_hash;
        let receipt = self
            .pending
            .get_receipt()
            .await
            .map_err(|e| remote_failure(format!("confirmation failed for {tx_hash}: {e}")))?;
        if !receipt.status() {
            return Err(remote_failure(format!("transaction {tx_hash} reverted")));
        }
        Ok(CallReceipt {
            tx_hash,
            block_number: receipt.block_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn test_url() -> Url {
        "http://localhost:8545".parse().expect("static URL")
    }

    #[test]
    fn test_wallet_from_private_key() {
        let wallet =
            RpcWallet::connect(test_url(), TEST_PRIVATE_KEY, Duration::from_secs(5)).unwrap();
        assert_eq!(
            wallet.signer.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_wallet_accepts_0x_prefix() {
        let wallet = RpcWallet::connect(
            test_url(),
            &format!("0x{TEST_PRIVATE_KEY}"),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            wallet.signer.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_invalid_private_key_is_a_connection_failure() {
        let result = RpcWallet::connect(test_url(), "invalid_key", Duration::from_secs(5));
        let err = result.unwrap_err();
        assert!(matches!(err, ClientError::WalletConnectionFailed(_)));
        assert!(err.to_string().contains("Invalid private key"));
    }

    #[test]
    fn test_signing_handle_rejects_foreign_account() {
        let wallet =
            RpcWallet::connect(test_url(), TEST_PRIVATE_KEY, Duration::from_secs(5)).unwrap();
        let foreign: Address = "0x0000000000000000000000000000000000000001"
            .parse()
            .unwrap();
        assert!(wallet.signing_handle(foreign).is_err());
        assert!(wallet.signing_handle(wallet.signer.address()).is_ok());
    }

    #[test]
    fn test_debug_output_never_contains_key_material() {
        let wallet =
            RpcWallet::connect(test_url(), TEST_PRIVATE_KEY, Duration::from_secs(5)).unwrap();
        let rendered = format!("{wallet:?}");
        assert!(!rendered.contains(TEST_PRIVATE_KEY));
        assert!(rendered.contains("RpcWallet"));
    }
}
