//! Ember Token Ledger
//!
//! This crate implements the token side of the Ember protocol: account
//! balances and supply accounting, per-subject policy records (blacklist,
//! restriction, whitelist, sell-limit exemption, liquidity-pool marking),
//! and the fixed-order enforcement pipeline that every mint, burn, and
//! transfer passes through.

pub mod error;
pub mod ledger;
pub mod policy;

pub use error::TokenError;
pub use ledger::{TokenLedger, DEFAULT_SELL_LIMIT_BPS, DEFAULT_SELL_WINDOW_SECS};
pub use policy::{PolicyStore, SellTracker};
