//! Shared test doubles for session and executor integration tests.
//!
//! The mocks are programmable in-memory stand-ins for the wallet boundary:
//! scripted failures, seeded balances and profiles, and call recording so
//! tests can assert that rejected operations never touch the boundary.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;

use profile_console::abi::resolver::FetchError;
use profile_console::abi::{AbiDescriptor, AbiTransport};
use profile_console::error::{ClientError, ClientResult};
use profile_console::notify::{Notifier, Severity};
use profile_console::ops::Executor;
use profile_console::session::Session;
use profile_console::wallet::{
    CallReceipt, ContractHandle, NetworkInfo, PendingCall, ProviderSlot, SigningHandle,
    WalletProvider,
};

pub fn test_account() -> Address {
    "0x00000000000000000000000000000000000000aa"
        .parse()
        .unwrap()
}

pub fn other_account() -> Address {
    "0x00000000000000000000000000000000000000bb"
        .parse()
        .unwrap()
}

pub fn contract_address() -> Address {
    "0x00000000000000000000000000000000000000cc"
        .parse()
        .unwrap()
}

/// Artifact with the UserProfile interface, as a compiler would emit it.
pub const USER_PROFILE_ARTIFACT: &str = r#"{
    "contractName": "UserProfile",
    "abi": [
        {"type":"function","name":"setUserProfile","inputs":[{"name":"_name","type":"string"},{"name":"_age","type":"uint256"}],"outputs":[],"stateMutability":"nonpayable"},
        {"type":"function","name":"getUserProfile","inputs":[{"name":"_user","type":"address"}],"outputs":[{"name":"","type":"string"},{"name":"","type":"uint256"}],"stateMutability":"view"},
        {"type":"function","name":"depositBalance","inputs":[],"outputs":[],"stateMutability":"payable"},
        {"type":"function","name":"getBalance","inputs":[{"name":"_user","type":"address"}],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"},
        {"type":"function","name":"withdrawBalance","inputs":[{"name":"_amount","type":"uint256"}],"outputs":[],"stateMutability":"nonpayable"},
        {"type":"function","name":"withdrawContractBalance","inputs":[],"outputs":[],"stateMutability":"nonpayable"},
        {"type":"event","name":"ProfileUpdated","inputs":[{"name":"user","type":"address","indexed":true}],"anonymous":false}
    ]
}"#;

pub fn sample_descriptor() -> AbiDescriptor {
    AbiDescriptor::from_artifact_json("test://UserProfile.json", USER_PROFILE_ARTIFACT)
        .expect("sample artifact parses")
}

/// Notifier that records every (message, severity) pair in order.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(String, Severity)>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<(String, Severity)> {
        self.events.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(message, _)| message.clone())
            .collect()
    }

    pub fn last(&self) -> Option<(String, Severity)> {
        self.events.lock().unwrap().last().cloned()
    }

    pub fn contains(&self, message: &str) -> bool {
        self.events.lock().unwrap().iter().any(|(m, _)| m == message)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.events
            .lock()
            .unwrap()
            .push((message.to_owned(), severity));
    }
}

/// One recorded state-changing submission.
#[derive(Debug, Clone)]
pub struct SentCall {
    pub function: String,
    pub arg_count: usize,
    pub value: Option<U256>,
}

/// Programmable contract handle with an in-memory ledger.
#[derive(Default)]
pub struct MockContract {
    address: Mutex<Option<Address>>,
    caller: Mutex<Option<Address>>,
    profiles: Mutex<HashMap<Address, (String, U256)>>,
    balances: Mutex<HashMap<Address, U256>>,
    read_calls: Mutex<Vec<String>>,
    send_calls: Mutex<Vec<SentCall>>,
    fail_next_send: Mutex<Option<String>>,
    revert_next_confirm: Mutex<Option<String>>,
    tx_counter: AtomicUsize,
}

impl MockContract {
    pub fn seed_balance(&self, account: Address, wei: U256) {
        self.balances.lock().unwrap().insert(account, wei);
    }

    pub fn seed_profile(&self, account: Address, name: &str, age: u64) {
        self.profiles
            .lock()
            .unwrap()
            .insert(account, (name.to_owned(), U256::from(age)));
    }

    /// The next send is rejected at submission with this message.
    pub fn fail_next_send(&self, message: &str) {
        *self.fail_next_send.lock().unwrap() = Some(message.to_owned());
    }

    /// The next send is accepted but reverts at confirmation.
    pub fn revert_next_confirm(&self, message: &str) {
        *self.revert_next_confirm.lock().unwrap() = Some(message.to_owned());
    }

    pub fn read_calls(&self) -> Vec<String> {
        self.read_calls.lock().unwrap().clone()
    }

    pub fn send_calls(&self) -> Vec<SentCall> {
        self.send_calls.lock().unwrap().clone()
    }

    fn caller(&self) -> Address {
        self.caller.lock().unwrap().unwrap_or(Address::ZERO)
    }

    fn apply(&self, function: &str, args: &[DynSolValue], value: Option<U256>) {
        let caller = self.caller();
        match (function, args) {
            ("setUserProfile", [DynSolValue::String(name), DynSolValue::Uint(age, _)]) => {
                self.profiles
                    .lock()
                    .unwrap()
                    .insert(caller, (name.clone(), *age));
            }
            ("depositBalance", []) => {
                if let Some(value) = value {
                    let mut balances = self.balances.lock().unwrap();
                    let entry = balances.entry(caller).or_insert(U256::ZERO);
                    *entry += value;
                }
            }
            ("withdrawBalance", [DynSolValue::Uint(amount, _)]) => {
                let mut balances = self.balances.lock().unwrap();
                let entry = balances.entry(caller).or_insert(U256::ZERO);
                *entry = entry.saturating_sub(*amount);
            }
            _ => {}
        }
    }
}

#[async_trait]
impl ContractHandle for MockContract {
    fn address(&self) -> Address {
        self.address.lock().unwrap().unwrap_or(Address::ZERO)
    }

    async fn call(&self, function: &str, args: &[DynSolValue]) -> ClientResult<Vec<DynSolValue>> {
        self.read_calls.lock().unwrap().push(function.to_owned());
        match (function, args) {
            ("getUserProfile", [DynSolValue::Address(user)]) => {
                let profiles = self.profiles.lock().unwrap();
                let (name, age) = profiles
                    .get(user)
                    .cloned()
                    .unwrap_or_else(|| (String::new(), U256::ZERO));
                Ok(vec![DynSolValue::String(name), DynSolValue::Uint(age, 256)])
            }
            ("getBalance", [DynSolValue::Address(user)]) => {
                let balances = self.balances.lock().unwrap();
                let wei = balances.get(user).copied().unwrap_or(U256::ZERO);
                Ok(vec![DynSolValue::Uint(wei, 256)])
            }
            _ => Err(ClientError::RemoteCallFailed(format!(
                "unknown read {function}"
            ))),
        }
    }

    async fn send(
        &self,
        function: &str,
        args: &[DynSolValue],
        value: Option<U256>,
    ) -> ClientResult<Box<dyn PendingCall>> {
        self.send_calls.lock().unwrap().push(SentCall {
            function: function.to_owned(),
            arg_count: args.len(),
            value,
        });

        if let Some(message) = self.fail_next_send.lock().unwrap().take() {
            return Err(ClientError::RemoteCallFailed(message));
        }

        let revert = self.revert_next_confirm.lock().unwrap().take();
        if revert.is_none() {
            self.apply(function, args, value);
        }

        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst) as u8;
        Ok(Box::new(MockPending {
            tx_hash: TxHash::with_last_byte(n.wrapping_add(1)),
            revert,
        }))
    }
}

struct MockPending {
    tx_hash: TxHash,
    revert: Option<String>,
}

#[async_trait]
impl PendingCall for MockPending {
    fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    async fn confirmed(self: Box<Self>) -> ClientResult<CallReceipt> {
        match self.revert {
            Some(message) => Err(ClientError::RemoteCallFailed(message)),
            None => Ok(CallReceipt {
                tx_hash: self.tx_hash,
                block_number: Some(42),
            }),
        }
    }
}

struct MockSigner {
    account: Address,
    contract: Arc<MockContract>,
}

impl SigningHandle for MockSigner {
    fn address(&self) -> Address {
        self.account
    }

    fn bind_contract(
        &self,
        address: Address,
        _descriptor: &AbiDescriptor,
    ) -> ClientResult<Arc<dyn ContractHandle>> {
        *self.contract.address.lock().unwrap() = Some(address);
        *self.contract.caller.lock().unwrap() = Some(self.account);
        Ok(self.contract.clone())
    }
}

/// Programmable wallet provider for a single account.
pub struct MockWallet {
    account: Address,
    chain_id: u64,
    reject_accounts: Mutex<Option<String>>,
    native_balances: Mutex<HashMap<Address, U256>>,
    pub account_requests: AtomicUsize,
    pub native_queries: AtomicUsize,
    pub contract: Arc<MockContract>,
}

impl MockWallet {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            account: test_account(),
            chain_id: 31337,
            reject_accounts: Mutex::new(None),
            native_balances: Mutex::new(HashMap::new()),
            account_requests: AtomicUsize::new(0),
            native_queries: AtomicUsize::new(0),
            contract: Arc::new(MockContract::default()),
        })
    }

    /// The next `request_accounts` fails with this message.
    pub fn reject_next_connect(&self, message: &str) {
        *self.reject_accounts.lock().unwrap() = Some(message.to_owned());
    }

    pub fn set_native_balance(&self, address: Address, wei: U256) {
        self.native_balances.lock().unwrap().insert(address, wei);
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> ClientResult<Vec<Address>> {
        self.account_requests.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.reject_accounts.lock().unwrap().take() {
            return Err(ClientError::WalletConnectionFailed(message));
        }
        Ok(vec![self.account])
    }

    async fn network(&self) -> ClientResult<NetworkInfo> {
        Ok(NetworkInfo::from_chain_id(self.chain_id))
    }

    async fn native_balance(&self, address: Address) -> ClientResult<U256> {
        self.native_queries.fetch_add(1, Ordering::SeqCst);
        let balances = self.native_balances.lock().unwrap();
        Ok(balances.get(&address).copied().unwrap_or(U256::ZERO))
    }

    fn signing_handle(&self, account: Address) -> ClientResult<Arc<dyn SigningHandle>> {
        Ok(Arc::new(MockSigner {
            account,
            contract: self.contract.clone(),
        }))
    }
}

/// ABI transport scripted with one response per location, recording fetches.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<String, Result<String, String>>>,
    fetches: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn serve(&self, location: &str, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(location.to_owned(), Ok(body.to_owned()));
    }

    pub fn fail(&self, location: &str, reason: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(location.to_owned(), Err(reason.to_owned()));
    }

    pub fn fetch_order(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn fetch_count(&self, location: &str) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.as_str() == location)
            .count()
    }
}

#[async_trait]
impl AbiTransport for ScriptedTransport {
    async fn fetch(&self, location: &str) -> Result<String, FetchError> {
        self.fetches.lock().unwrap().push(location.to_owned());
        match self.responses.lock().unwrap().get(location) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(reason)) => Err(FetchError(reason.clone())),
            None => Err(FetchError("unreachable".to_owned())),
        }
    }
}

/// Session, executor, and doubles wired together.
pub struct Fixture {
    pub slot: Arc<ProviderSlot>,
    pub wallet: Arc<MockWallet>,
    pub session: Arc<Session>,
    pub executor: Executor,
    pub notifier: Arc<RecordingNotifier>,
    pub descriptor: AbiDescriptor,
}

impl Fixture {
    /// Provider injected, nothing connected.
    pub fn new() -> Self {
        let slot = Arc::new(ProviderSlot::new());
        let wallet = MockWallet::new();
        slot.inject(wallet.clone());
        let notifier = RecordingNotifier::new();
        let session = Arc::new(Session::new(slot.clone(), notifier.clone()));
        let executor = Executor::new(session.clone(), notifier.clone());
        Self {
            slot,
            wallet,
            session,
            executor,
            notifier,
            descriptor: sample_descriptor(),
        }
    }

    /// Provider injected and wallet connected.
    pub async fn connected() -> Self {
        let fixture = Self::new();
        fixture
            .session
            .connect_wallet()
            .await
            .expect("mock connect succeeds");
        fixture
    }

    /// Wallet connected and contract bound at `contract_address()`.
    pub async fn bound() -> Self {
        let fixture = Self::connected().await;
        fixture
            .session
            .bind_contract(&contract_address().to_string(), Some(&fixture.descriptor))
            .expect("mock bind succeeds");
        fixture
    }

    pub fn contract(&self) -> &MockContract {
        &self.wallet.contract
    }
}
