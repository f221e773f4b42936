//! Wallet session and transaction lifecycle library for a UserProfile contract.

// Core lifecycle
pub mod error;
pub mod ops;
pub mod session;
pub mod wallet;

// Collaborator boundaries
pub mod abi;
pub mod notify;

// Surface glue
pub mod config;
pub mod console;

pub use config::ConsoleConfig;
pub use error::{ClientError, ClientResult};
pub use ops::{Executor, Operation, OperationOutcome};
pub use session::{Session, SessionSnapshot, SessionStage};
