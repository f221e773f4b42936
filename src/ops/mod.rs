//! Operator operations over the bound contract.
//!
//! # Data Flow
//! ```text
//! Operation (raw operator input)
//!     → executor.rs (preconditions → validation → boundary call → outcome)
//!     → units.rs (exact decimal ETH ↔ wei conversion for amounts)
//!     → OperationOutcome (report lines + already-dispatched notification)
//! ```

pub mod executor;
pub mod request;
pub mod units;

pub use executor::Executor;
pub use request::{Operation, OperationKind, OperationOutcome, Report};
