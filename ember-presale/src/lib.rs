//! Ember Presale
//!
//! Presale consumer for the Ember token: lifecycle state machine,
//! payment-token allow-list, price-based purchase flow with cap and
//! per-user enforcement, vault bookkeeping, and the one-way governance
//! hand-off.

pub mod error;
pub mod state;

pub use error::PresaleError;
pub use state::{PresaleState, PresaleStatus, UNITS_PER_TOKEN};
