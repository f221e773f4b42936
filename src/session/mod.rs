//! Session state machine.
//!
//! # Responsibilities
//! - Track the one mutable session: detected provider, wallet identity,
//!   bound contract
//! - Gate transitions on their preconditions in a fixed order
//! - Dispatch a notification for every transition outcome
//! - Hand executors an immutable snapshot to operate on
//!
//! Transitions re-check the injection slot instead of trusting the recorded
//! discovery outcome; a provider that appeared after the window closed is
//! still usable, and one that vanished is not.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use alloy::primitives::Address;

use crate::abi::AbiDescriptor;
use crate::error::{ClientError, ClientResult};
use crate::notify::{Notifier, Severity};
use crate::wallet::discovery;
use crate::wallet::{ContractHandle, NetworkInfo, ProviderSlot, SigningHandle, WalletProvider};

/// How far the session has progressed. Derived from content, never stored;
/// a failed transition therefore cannot move it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStage {
    Unconnected,
    ProviderKnown,
    WalletConnected,
    ContractBound,
}

impl std::fmt::Display for SessionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SessionStage::Unconnected => "unconnected",
            SessionStage::ProviderKnown => "provider detected",
            SessionStage::WalletConnected => "wallet connected",
            SessionStage::ContractBound => "contract bound",
        };
        f.write_str(label)
    }
}

/// The connected wallet: account, network, and the handle that signs for it.
#[derive(Clone)]
pub struct WalletIdentity {
    pub account: Address,
    pub network: NetworkInfo,
    pub signing: Arc<dyn SigningHandle>,
}

impl std::fmt::Debug for WalletIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletIdentity")
            .field("account", &self.account)
            .field("network", &self.network)
            .finish()
    }
}

/// Immutable view of the session at one instant. Operations run against the
/// snapshot taken when they start; a transition happening mid-operation does
/// not affect them.
#[derive(Clone)]
pub struct SessionSnapshot {
    /// Live read of the injection slot at snapshot time.
    pub provider_present: bool,
    /// Outcome of the last discovery window, if one was run.
    pub discovery_outcome: Option<bool>,
    pub provider: Option<Arc<dyn WalletProvider>>,
    pub identity: Option<WalletIdentity>,
    pub contract: Option<Arc<dyn ContractHandle>>,
}

impl SessionSnapshot {
    pub fn stage(&self) -> SessionStage {
        if self.contract.is_some() {
            SessionStage::ContractBound
        } else if self.identity.is_some() {
            SessionStage::WalletConnected
        } else if self.provider_present {
            SessionStage::ProviderKnown
        } else {
            SessionStage::Unconnected
        }
    }

    pub fn account(&self) -> Option<Address> {
        self.identity.as_ref().map(|identity| identity.account)
    }

    pub fn network(&self) -> Option<&NetworkInfo> {
        self.identity.as_ref().map(|identity| &identity.network)
    }

    pub fn bound_address(&self) -> Option<Address> {
        self.contract.as_ref().map(|contract| contract.address())
    }
}

impl std::fmt::Debug for SessionSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSnapshot")
            .field("stage", &self.stage())
            .field("provider_present", &self.provider_present)
            .field("account", &self.account())
            .field("bound_address", &self.bound_address())
            .finish()
    }
}

#[derive(Default)]
struct SessionState {
    discovered: Option<bool>,
    provider: Option<Arc<dyn WalletProvider>>,
    identity: Option<WalletIdentity>,
    contract: Option<Arc<dyn ContractHandle>>,
}

/// Owns the session state and the transitions over it.
pub struct Session {
    slot: Arc<ProviderSlot>,
    notifier: Arc<dyn Notifier>,
    state: RwLock<SessionState>,
}

impl Session {
    pub fn new(slot: Arc<ProviderSlot>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            slot,
            notifier,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Runs one bounded discovery window against the injection slot and
    /// records the outcome. Absence is a valid outcome, not an error, and is
    /// not notified; the operator hears about it when they try to connect.
    pub async fn discover_provider(&self, window: Duration) -> bool {
        let found = discovery::wait_for_provider(&self.slot, window).await;
        self.state
            .write()
            .expect("session state lock poisoned")
            .discovered = Some(found);
        found
    }

    /// Connects the wallet: requests accounts, adopts the first as the
    /// session identity, and derives a signing handle for it. The slot is
    /// re-checked here; on any failure the session is left exactly as it was.
    /// An existing contract binding survives, still scoped to the previous
    /// identity until it is re-bound.
    pub async fn connect_wallet(&self) -> ClientResult<SessionSnapshot> {
        let provider = match self.slot.get() {
            Some(provider) => provider,
            None => {
                let err = ClientError::ProviderAbsent;
                self.notifier.notify(&err.to_string(), Severity::Error);
                return Err(err);
            }
        };

        match self.try_connect(provider).await {
            Ok(snapshot) => {
                self.notifier
                    .notify("Wallet connected successfully!", Severity::Success);
                Ok(snapshot)
            }
            Err(e) => {
                let err = ClientError::WalletConnectionFailed(e.detail().to_owned());
                self.notifier.notify(&err.to_string(), Severity::Error);
                Err(err)
            }
        }
    }

    async fn try_connect(&self, provider: Arc<dyn WalletProvider>) -> ClientResult<SessionSnapshot> {
        let accounts = provider.request_accounts().await?;
        let account = accounts.first().copied().ok_or_else(|| {
            ClientError::WalletConnectionFailed("wallet returned no accounts".to_owned())
        })?;
        let network = provider.network().await?;
        let signing = provider.signing_handle(account)?;

        tracing::info!(account = %account, network = %network, "Wallet connected");

        {
            let mut state = self.state.write().expect("session state lock poisoned");
            state.provider = Some(provider);
            state.identity = Some(WalletIdentity {
                account,
                network,
                signing,
            });
        }
        Ok(self.snapshot())
    }

    /// Binds a contract at `address_input` using the loaded interface.
    /// Precondition order matters and is observable: empty address, then
    /// missing wallet, then missing interface. Success replaces any previous
    /// binding; failure leaves it untouched.
    pub fn bind_contract(
        &self,
        address_input: &str,
        descriptor: Option<&AbiDescriptor>,
    ) -> ClientResult<SessionSnapshot> {
        let result = self.try_bind(address_input, descriptor);
        match &result {
            Ok(_) => self
                .notifier
                .notify("Contract loaded successfully!", Severity::Success),
            Err(e) => self.notifier.notify(&e.to_string(), Severity::Error),
        }
        result
    }

    fn try_bind(
        &self,
        address_input: &str,
        descriptor: Option<&AbiDescriptor>,
    ) -> ClientResult<SessionSnapshot> {
        let trimmed = address_input.trim();
        if trimmed.is_empty() {
            return Err(ClientError::PreconditionFailed(
                "Please enter a contract address".to_owned(),
            ));
        }

        let signing = self
            .state
            .read()
            .expect("session state lock poisoned")
            .identity
            .as_ref()
            .map(|identity| identity.signing.clone())
            .ok_or_else(|| {
                ClientError::PreconditionFailed("Please connect your wallet first".to_owned())
            })?;

        let descriptor = descriptor.ok_or_else(|| {
            ClientError::PreconditionFailed("Please wait for contract ABI to load".to_owned())
        })?;

        let address: Address = trimmed
            .parse()
            .map_err(|e| ClientError::ContractBindFailed(format!("invalid contract address: {e}")))?;

        let contract = signing
            .bind_contract(address, descriptor)
            .map_err(|e| ClientError::ContractBindFailed(e.detail().to_owned()))?;

        tracing::info!(
            address = %address,
            source = descriptor.source(),
            "Contract bound"
        );

        self.state
            .write()
            .expect("session state lock poisoned")
            .contract = Some(contract);
        Ok(self.snapshot())
    }

    /// Cheap clone of the state; the handles inside are shared, not copied.
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().expect("session state lock poisoned");
        SessionSnapshot {
            provider_present: self.slot.is_present(),
            discovery_outcome: state.discovered,
            provider: state.provider.clone(),
            identity: state.identity.clone(),
            contract: state.contract.clone(),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("Session")
            .field("stage", &snapshot.stage())
            .field("account", &snapshot.account())
            .field("bound_address", &snapshot.bound_address())
            .finish()
    }
}
