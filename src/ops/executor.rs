//! Operation execution engine.
//!
//! # Responsibilities
//! - Run every operation through the same sequence: preconditions, input
//!   validation, boundary call, outcome notification
//! - Keep validation local; a rejected operation never reaches the network
//! - For writes, notify pending before submission and success only after
//!   confirmation
//!
//! Each execution works on the session snapshot taken when it starts, so a
//! transition happening mid-flight cannot change what the operation sees. A
//! UUID tags every execution in the logs.

use std::sync::Arc;

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, U256};
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};
use crate::notify::{Notifier, Severity};
use crate::ops::request::{Operation, OperationOutcome, Report};
use crate::ops::units;
use crate::session::{Session, SessionSnapshot};
use crate::wallet::provider::remote_failure;
use crate::wallet::{CallReceipt, ContractHandle};

/// Executes operator requests against the current session.
pub struct Executor {
    session: Arc<Session>,
    notifier: Arc<dyn Notifier>,
}

impl Executor {
    pub fn new(session: Arc<Session>, notifier: Arc<dyn Notifier>) -> Self {
        Self { session, notifier }
    }

    /// Runs one operation to completion. Never panics and never retries; the
    /// outcome says whether it was rejected locally or failed remotely, and
    /// the matching notification has already been dispatched.
    pub async fn execute(&self, operation: Operation) -> OperationOutcome {
        let op_id = Uuid::new_v4();
        let snapshot = self.session.snapshot();
        tracing::debug!(
            op_id = %op_id,
            operation = %operation,
            kind = %operation.kind(),
            stage = %snapshot.stage(),
            "Operation started"
        );

        let result = match &operation {
            Operation::SetProfile { name, age } => self.set_profile(&snapshot, name, age).await,
            Operation::GetProfile { address } => {
                self.get_profile(&snapshot, address.as_deref()).await
            }
            Operation::Deposit { amount } => self.deposit(&snapshot, amount).await,
            Operation::CheckBalance { address } => {
                self.check_balance(&snapshot, address.as_deref()).await
            }
            Operation::Withdraw { amount } => self.withdraw(&snapshot, amount).await,
            Operation::ContractBalance => self.contract_balance(&snapshot).await,
            Operation::WithdrawContractBalance => self.withdraw_contract_balance(&snapshot).await,
        };

        match result {
            Ok((report, success_message)) => {
                self.notifier.notify(success_message, Severity::Success);
                tracing::info!(op_id = %op_id, operation = %operation, "Operation succeeded");
                OperationOutcome::Success(report)
            }
            Err(err) if err.is_precondition() => {
                self.notifier.notify(&err.to_string(), Severity::Error);
                tracing::warn!(op_id = %op_id, operation = %operation, error = %err, "Operation rejected");
                OperationOutcome::Rejected(err)
            }
            Err(err) => {
                self.notifier.notify(&err.to_string(), Severity::Error);
                tracing::warn!(op_id = %op_id, operation = %operation, error = %err, "Operation failed");
                OperationOutcome::Failed(err)
            }
        }
    }

    async fn set_profile(
        &self,
        snapshot: &SessionSnapshot,
        name: &str,
        age: &str,
    ) -> ClientResult<(Report, &'static str)> {
        let contract = bound_contract(snapshot)?;
        let name = name.trim();
        let age = age.trim();
        if name.is_empty() || age.is_empty() {
            return Err(ClientError::PreconditionFailed(
                "Please enter both name and age".to_owned(),
            ));
        }
        let age: U256 = age.parse().map_err(|_| {
            ClientError::PreconditionFailed("Please enter a valid age".to_owned())
        })?;

        let args = vec![
            DynSolValue::String(name.to_owned()),
            DynSolValue::Uint(age, 256),
        ];
        let receipt = self.submit(contract, "setUserProfile", args, None).await?;
        Ok((write_report(&receipt), "Profile updated successfully!"))
    }

    async fn get_profile(
        &self,
        snapshot: &SessionSnapshot,
        address: Option<&str>,
    ) -> ClientResult<(Report, &'static str)> {
        let contract = bound_contract(snapshot)?;
        let address = effective_address(snapshot, address)?;

        let outputs = contract
            .call("getUserProfile", &[DynSolValue::Address(address)])
            .await?;
        let (name, age) = match outputs.as_slice() {
            [DynSolValue::String(name), DynSolValue::Uint(age, _)] => (name.clone(), *age),
            other => {
                return Err(remote_failure(format!(
                    "unexpected getUserProfile return shape: {} value(s)",
                    other.len()
                )))
            }
        };

        let mut report = Report::default();
        if name.is_empty() {
            report.push("Name", "Not set");
        } else {
            report.push("Name", name);
        }
        report.push("Age", age.to_string());
        report.push("Address", address.to_string());
        Ok((report, "Profile retrieved successfully!"))
    }

    async fn deposit(
        &self,
        snapshot: &SessionSnapshot,
        amount: &str,
    ) -> ClientResult<(Report, &'static str)> {
        let contract = bound_contract(snapshot)?;
        let value = positive_amount(amount)?;

        let receipt = self
            .submit(contract, "depositBalance", Vec::new(), Some(value))
            .await?;
        Ok((write_report(&receipt), "Balance deposited successfully!"))
    }

    async fn check_balance(
        &self,
        snapshot: &SessionSnapshot,
        address: Option<&str>,
    ) -> ClientResult<(Report, &'static str)> {
        let contract = bound_contract(snapshot)?;
        let address = effective_address(snapshot, address)?;

        let outputs = contract
            .call("getBalance", &[DynSolValue::Address(address)])
            .await?;
        let wei = single_uint(&outputs, "getBalance")?;

        Ok((
            balance_report("Address", address, wei),
            "Balance retrieved successfully!",
        ))
    }

    async fn withdraw(
        &self,
        snapshot: &SessionSnapshot,
        amount: &str,
    ) -> ClientResult<(Report, &'static str)> {
        let contract = bound_contract(snapshot)?;
        let wei = positive_amount(amount)?;

        let args = vec![DynSolValue::Uint(wei, 256)];
        let receipt = self.submit(contract, "withdrawBalance", args, None).await?;
        Ok((write_report(&receipt), "Balance withdrawn successfully!"))
    }

    /// Native balance held by the contract itself, read through the provider
    /// rather than the contract interface.
    async fn contract_balance(
        &self,
        snapshot: &SessionSnapshot,
    ) -> ClientResult<(Report, &'static str)> {
        if snapshot.identity.is_none() {
            return Err(ClientError::PreconditionFailed(
                "Please connect your wallet first".to_owned(),
            ));
        }
        let provider = snapshot.provider.as_ref().ok_or_else(|| {
            ClientError::PreconditionFailed("Please connect your wallet first".to_owned())
        })?;
        let address = snapshot.bound_address().ok_or_else(|| {
            ClientError::PreconditionFailed("Please load the contract first".to_owned())
        })?;

        let wei = provider.native_balance(address).await?;
        Ok((
            balance_report("Contract Address", address, wei),
            "Contract balance retrieved successfully!",
        ))
    }

    /// Owner gating happens on chain; a non-owner caller sees the revert as a
    /// remote failure.
    async fn withdraw_contract_balance(
        &self,
        snapshot: &SessionSnapshot,
    ) -> ClientResult<(Report, &'static str)> {
        let contract = bound_contract(snapshot)?;
        let receipt = self
            .submit(contract, "withdrawContractBalance", Vec::new(), None)
            .await?;
        Ok((
            write_report(&receipt),
            "Contract balance withdrawn successfully!",
        ))
    }

    /// Uniform write path: pending notice, submit, block until confirmed.
    async fn submit(
        &self,
        contract: &Arc<dyn ContractHandle>,
        function: &'static str,
        args: Vec<DynSolValue>,
        value: Option<U256>,
    ) -> ClientResult<CallReceipt> {
        self.notifier.notify("Transaction pending...", Severity::Info);
        let pending = contract.send(function, &args, value).await?;
        tracing::debug!(function, tx_hash = %pending.tx_hash(), "Awaiting confirmation");
        pending.confirmed().await
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor").finish_non_exhaustive()
    }
}

fn bound_contract(snapshot: &SessionSnapshot) -> ClientResult<&Arc<dyn ContractHandle>> {
    snapshot.contract.as_ref().ok_or_else(|| {
        ClientError::PreconditionFailed("Please load the contract first".to_owned())
    })
}

/// Explicit input wins; the connected account is the fallback. No input and
/// no identity is an operator error, not a remote one.
fn effective_address(snapshot: &SessionSnapshot, input: Option<&str>) -> ClientResult<Address> {
    match input.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => raw.parse().map_err(|_| {
            ClientError::PreconditionFailed("Please enter a valid address".to_owned())
        }),
        None => snapshot
            .account()
            .ok_or_else(|| ClientError::PreconditionFailed("Please enter an address".to_owned())),
    }
}

fn positive_amount(input: &str) -> ClientResult<U256> {
    let wei = units::to_wei(input).map_err(|_| {
        ClientError::PreconditionFailed("Please enter a valid amount".to_owned())
    })?;
    if wei.is_zero() {
        return Err(ClientError::PreconditionFailed(
            "Please enter a valid amount".to_owned(),
        ));
    }
    Ok(wei)
}

fn single_uint(outputs: &[DynSolValue], function: &str) -> ClientResult<U256> {
    match outputs {
        [DynSolValue::Uint(value, _)] => Ok(*value),
        other => Err(remote_failure(format!(
            "unexpected {function} return shape: {} value(s)",
            other.len()
        ))),
    }
}

fn balance_report(address_label: &str, address: Address, wei: U256) -> Report {
    let mut report = Report::default();
    report.push(address_label, address.to_string());
    report.push("Balance", format!("{} ETH", units::from_wei(wei)));
    report.push("Balance (Wei)", wei.to_string());
    report
}

fn write_report(receipt: &CallReceipt) -> Report {
    let mut report = Report::default();
    report.push("Transaction Hash", receipt.tx_hash.to_string());
    if let Some(block) = receipt.block_number {
        report.push("Block", block.to_string());
    }
    report
}
