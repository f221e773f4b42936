//! Operation types and outcomes.

use crate::error::ClientError;

/// Whether an operation only reads chain state or submits a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Read,
    Write,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OperationKind::Read => "read",
            OperationKind::Write => "write",
        })
    }
}

/// One operator request, carrying raw inputs exactly as entered. Validation
/// happens at execution time so a rejected request never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Store a display name and age under the caller's account.
    SetProfile { name: String, age: String },
    /// Read the profile of `address`, or of the connected account when empty.
    GetProfile { address: Option<String> },
    /// Deposit a decimal ETH amount into the caller's ledger balance.
    Deposit { amount: String },
    /// Read the ledger balance of `address`, or of the connected account.
    CheckBalance { address: Option<String> },
    /// Withdraw a decimal ETH amount from the caller's ledger balance.
    Withdraw { amount: String },
    /// Native balance held by the bound contract itself.
    ContractBalance,
    /// Drain the contract's native balance to the owner.
    WithdrawContractBalance,
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::SetProfile { .. }
            | Operation::Deposit { .. }
            | Operation::Withdraw { .. }
            | Operation::WithdrawContractBalance => OperationKind::Write,
            Operation::GetProfile { .. }
            | Operation::CheckBalance { .. }
            | Operation::ContractBalance => OperationKind::Read,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Operation::SetProfile { .. } => "set-profile",
            Operation::GetProfile { .. } => "get-profile",
            Operation::Deposit { .. } => "deposit",
            Operation::CheckBalance { .. } => "check-balance",
            Operation::Withdraw { .. } => "withdraw",
            Operation::ContractBalance => "contract-balance",
            Operation::WithdrawContractBalance => "withdraw-contract-balance",
        })
    }
}

/// Key/value lines a result sink renders, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    lines: Vec<(String, String)>,
}

impl Report {
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.lines.push((key.into(), value.into()));
    }

    pub fn lines(&self) -> &[(String, String)] {
        &self.lines
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// What one execution produced. The matching notification has already been
/// dispatched by the time a caller sees this.
#[derive(Debug)]
pub enum OperationOutcome {
    /// Completed; report lines for the result sink.
    Success(Report),
    /// A session precondition or input validation failed. Nothing reached
    /// the network.
    Rejected(ClientError),
    /// The boundary rejected or failed the call after execution started.
    Failed(ClientError),
}

impl OperationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, OperationOutcome::Success(_))
    }

    pub fn report(&self) -> Option<&Report> {
        match self {
            OperationOutcome::Success(report) => Some(report),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            OperationOutcome::Success(_) => None,
            OperationOutcome::Rejected(err) | OperationOutcome::Failed(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let write = Operation::Deposit {
            amount: "1".to_owned(),
        };
        let read = Operation::CheckBalance { address: None };
        assert_eq!(write.kind(), OperationKind::Write);
        assert_eq!(read.kind(), OperationKind::Read);
        assert_eq!(Operation::ContractBalance.kind(), OperationKind::Read);
        assert_eq!(
            Operation::WithdrawContractBalance.kind(),
            OperationKind::Write
        );
    }

    #[test]
    fn test_report_preserves_order() {
        let mut report = Report::default();
        report.push("Address", "0xabc");
        report.push("Balance", "1.5 ETH");
        assert_eq!(report.lines().len(), 2);
        assert_eq!(report.lines()[0].0, "Address");
        assert_eq!(report.get("Balance"), Some("1.5 ETH"));
        assert_eq!(report.get("Missing"), None);
    }
}
