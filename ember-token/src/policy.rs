//! Per-subject policy records consulted by the enforcement pipeline.
//!
//! Records are created lazily on first write. An absent record reads as
//! `false`; clearing a flag writes `false` back rather than deleting the
//! record, so a cleared record stays distinguishable from a never-set one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use ember_shared_types::Address;

/// Rolling sell-window tracker for one selling account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellTracker {
    /// Unix timestamp at which the current window opened.
    pub window_start: i64,
    /// Amount sold into liquidity pools since `window_start`.
    pub sold_in_window: u64,
}

/// Lazy maps of per-account policy flags plus sell trackers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyStore {
    blacklist: HashMap<Address, bool>,
    restricted: HashMap<Address, bool>,
    whitelist: HashMap<Address, bool>,
    no_sell_limit: HashMap<Address, bool>,
    liquidity_pools: HashMap<Address, bool>,
    sell_trackers: HashMap<Address, SellTracker>,
}

impl PolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_blacklisted(&mut self, account: Address, value: bool) {
        self.blacklist.insert(account, value);
    }

    pub fn is_blacklisted(&self, account: &Address) -> bool {
        self.blacklist.get(account).copied().unwrap_or(false)
    }

    pub fn set_restricted(&mut self, account: Address, value: bool) {
        self.restricted.insert(account, value);
    }

    pub fn is_restricted(&self, account: &Address) -> bool {
        self.restricted.get(account).copied().unwrap_or(false)
    }

    pub fn set_whitelisted(&mut self, account: Address, value: bool) {
        self.whitelist.insert(account, value);
    }

    pub fn is_whitelisted(&self, account: &Address) -> bool {
        self.whitelist.get(account).copied().unwrap_or(false)
    }

    pub fn set_no_sell_limit(&mut self, account: Address, value: bool) {
        self.no_sell_limit.insert(account, value);
    }

    pub fn is_sell_limit_exempt(&self, account: &Address) -> bool {
        self.no_sell_limit.get(account).copied().unwrap_or(false)
    }

    pub fn set_liquidity_pool(&mut self, pool: Address, value: bool) {
        self.liquidity_pools.insert(pool, value);
    }

    pub fn is_liquidity_pool(&self, account: &Address) -> bool {
        self.liquidity_pools.get(account).copied().unwrap_or(false)
    }

    pub fn sell_tracker(&self, account: &Address) -> Option<&SellTracker> {
        self.sell_trackers.get(account)
    }

    pub(crate) fn put_sell_tracker(&mut self, account: Address, tracker: SellTracker) {
        self.sell_trackers.insert(account, tracker);
    }
}
