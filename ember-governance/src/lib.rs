//! Ember Governance Engine
//!
//! Multisig administration for the Ember token protocol: a fixed signer
//! roster queues typed transactions, gathers approvals, waits out a
//! cooldown timelock, and executes each transaction exactly once against
//! the token ledger, the presale consumer, or the engine itself. A
//! single-signer fast path exists for the emergency pause only.

pub mod engine;
pub mod error;

pub use engine::{GovernanceEngine, MAX_COOLDOWN_SECS, MAX_SIGNERS, MIN_COOLDOWN_SECS};
pub use error::GovernanceError;

// Re-export the shared transaction types alongside the engine.
pub use ember_shared_types::governance::*;
