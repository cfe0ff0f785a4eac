//! Ember Shared Types
//!
//! Common data types shared across the Ember token protocol crates:
//! addresses, the administrative authority hand-off, and the queued
//! governance transaction types.

pub mod governance;

pub use governance::{DispatchTarget, QueuedTransaction, TransactionPayload, TransactionStatus};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte account identity. Wallets, liquidity pools, payment token
/// mints, and protocol components are all addressed this way.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// The all-zeroes sentinel. Never a valid participant; setters that
    /// take an address reject it.
    pub const ZERO: Address = Address([0u8; 32]);

    pub fn is_zero(&self) -> bool {
        *self == Address::ZERO
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}..)", hex::encode(&self.0[..4]))
    }
}

/// Who may call the administrative surface of a component.
///
/// Every governable component starts under its deploy admin and can be
/// handed over to the governance engine exactly once. There is no path
/// back from `Governed` to `DirectAdmin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Authority {
    /// Pre-hand-off: the deploy admin acts directly.
    DirectAdmin(Address),
    /// Post-hand-off: only the governance engine acts.
    Governed(Address),
}

impl Authority {
    /// Whether `caller` currently holds administrative control.
    pub fn permits(&self, caller: &Address) -> bool {
        match self {
            Authority::DirectAdmin(admin) => admin == caller,
            Authority::Governed(engine) => engine == caller,
        }
    }

    /// The address currently in control.
    pub fn holder(&self) -> Address {
        match self {
            Authority::DirectAdmin(admin) => *admin,
            Authority::Governed(engine) => *engine,
        }
    }

    pub fn is_governed(&self) -> bool {
        matches!(self, Authority::Governed(_))
    }

    /// One-way hand-off to the governance engine. Returns `false` if the
    /// ratchet has already fired.
    pub fn hand_over(&mut self, engine: Address) -> bool {
        match self {
            Authority::DirectAdmin(_) => {
                *self = Authority::Governed(engine);
                true
            }
            Authority::Governed(_) => false,
        }
    }
}
