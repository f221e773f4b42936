//! Contract interface resolution.
//!
//! # Data Flow
//! ```text
//! candidate locations (ordered)
//!     → resolver.rs (scan in order, first acceptance wins, no caching)
//!     → descriptor.rs (artifact parsing + non-empty validation)
//!     → AbiDescriptor (immutable for the process lifetime)
//! ```
//!
//! # Design Decisions
//! - A candidate is accepted iff it is reachable, parses as an artifact, and
//!   carries a non-empty `abi` array; anything else moves on to the next one
//! - Transports must bypass caches so a recompiled artifact is picked up on the
//!   next fresh load attempt

pub mod descriptor;
pub mod resolver;

pub use descriptor::AbiDescriptor;
pub use resolver::{AbiResolver, AbiTransport, FileTransport, HttpTransport};
