//! Wallet provider boundary.
//!
//! # Data Flow
//! ```text
//! Host environment
//!     → slot.rs (injection point, may be populated at any time)
//!     → discovery.rs (bounded presence poll)
//!     → provider.rs (capability traits: accounts, network, signing, contract calls)
//!     → rpc.rs (JSON-RPC + local-signer implementation)
//! ```
//!
//! # Design Decisions
//! - The capability is "anything exposing the request/account methods", so the
//!   session and executor only ever see trait objects
//! - Absence of a provider is a normal state; transitions re-check the slot
//!   instead of trusting an earlier discovery result
//! - Rejection messages from the provider are passed through verbatim

pub mod discovery;
pub mod provider;
pub mod rpc;
pub mod slot;

pub use provider::{CallReceipt, ContractHandle, NetworkInfo, PendingCall, SigningHandle, WalletProvider};
pub use rpc::RpcWallet;
pub use slot::ProviderSlot;
