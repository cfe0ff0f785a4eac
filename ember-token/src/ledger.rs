//! Token ledger state and the mint/burn/transfer enforcement pipeline.
//!
//! Every balance movement passes through the same fixed gate order:
//! emergency pause, blacklist, whitelist mode, restriction, sell limit,
//! supply cap. A failed gate returns before anything is written, so a
//! rejected operation leaves balances, supply, and sell trackers exactly
//! as they were.

use std::collections::HashMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use ember_shared_types::{Address, Authority};

use crate::error::TokenError;
use crate::policy::{PolicyStore, SellTracker};

/// Default sell limit: 10% of the seller's pre-transfer balance.
pub const DEFAULT_SELL_LIMIT_BPS: u16 = 1_000;
/// Default sell window: 24 hours.
pub const DEFAULT_SELL_WINDOW_SECS: i64 = 86_400;

const BPS_DENOMINATOR: u128 = 10_000;

/// Balances, supply accounting, protocol flags, and the policy store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLedger {
    authority: Authority,
    emergency_paused: bool,
    whitelist_mode: bool,
    current_supply: u64,
    /// `None` means uncapped.
    max_supply: Option<u64>,
    bridge_address: Option<Address>,
    bond_address: Option<Address>,
    treasury_address: Option<Address>,
    sell_limit_bps: u16,
    sell_window_secs: i64,
    balances: HashMap<Address, u64>,
    policy: PolicyStore,
}

impl TokenLedger {
    /// Create a ledger under direct admin control with default sell-limit
    /// parameters and no supply cap.
    pub fn new(admin: Address) -> Self {
        Self {
            authority: Authority::DirectAdmin(admin),
            emergency_paused: false,
            whitelist_mode: false,
            current_supply: 0,
            max_supply: None,
            bridge_address: None,
            bond_address: None,
            treasury_address: None,
            sell_limit_bps: DEFAULT_SELL_LIMIT_BPS,
            sell_window_secs: DEFAULT_SELL_WINDOW_SECS,
            balances: HashMap::new(),
            policy: PolicyStore::new(),
        }
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    pub fn is_paused(&self) -> bool {
        self.emergency_paused
    }

    pub fn whitelist_mode(&self) -> bool {
        self.whitelist_mode
    }

    pub fn current_supply(&self) -> u64 {
        self.current_supply
    }

    pub fn max_supply(&self) -> Option<u64> {
        self.max_supply
    }

    pub fn bridge_address(&self) -> Option<Address> {
        self.bridge_address
    }

    pub fn bond_address(&self) -> Option<Address> {
        self.bond_address
    }

    pub fn treasury_address(&self) -> Option<Address> {
        self.treasury_address
    }

    pub fn sell_limit_bps(&self) -> u16 {
        self.sell_limit_bps
    }

    pub fn sell_window_secs(&self) -> i64 {
        self.sell_window_secs
    }

    pub fn balance_of(&self, account: &Address) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn policy(&self) -> &PolicyStore {
        &self.policy
    }

    fn require_authority(&self, caller: &Address) -> Result<(), TokenError> {
        if self.authority.permits(caller) {
            Ok(())
        } else {
            Err(TokenError::Unauthorized)
        }
    }

    /// Hand administrative control to the governance engine. One-way.
    pub fn hand_over_authority(
        &mut self,
        caller: &Address,
        engine: Address,
    ) -> Result<(), TokenError> {
        self.require_authority(caller)?;
        if engine.is_zero() {
            return Err(TokenError::InvalidAddress);
        }
        if !self.authority.hand_over(engine) {
            return Err(TokenError::Unauthorized);
        }
        info!("ledger authority handed over to governance engine {}", engine);
        Ok(())
    }

    pub fn set_emergency_pause(&mut self, caller: &Address, value: bool) -> Result<(), TokenError> {
        self.require_authority(caller)?;
        self.emergency_paused = value;
        if value {
            warn!("emergency pause engaged");
        } else {
            info!("emergency pause lifted");
        }
        Ok(())
    }

    pub fn set_whitelist_mode(&mut self, caller: &Address, value: bool) -> Result<(), TokenError> {
        self.require_authority(caller)?;
        self.whitelist_mode = value;
        info!("whitelist mode set to {}", value);
        Ok(())
    }

    pub fn set_blacklisted(
        &mut self,
        caller: &Address,
        account: Address,
        value: bool,
    ) -> Result<(), TokenError> {
        self.require_authority(caller)?;
        if account.is_zero() {
            return Err(TokenError::InvalidAddress);
        }
        self.policy.set_blacklisted(account, value);
        info!("blacklist[{}] = {}", account, value);
        Ok(())
    }

    pub fn set_restricted(
        &mut self,
        caller: &Address,
        account: Address,
        value: bool,
    ) -> Result<(), TokenError> {
        self.require_authority(caller)?;
        if account.is_zero() {
            return Err(TokenError::InvalidAddress);
        }
        self.policy.set_restricted(account, value);
        info!("restricted[{}] = {}", account, value);
        Ok(())
    }

    pub fn set_whitelisted(
        &mut self,
        caller: &Address,
        account: Address,
        value: bool,
    ) -> Result<(), TokenError> {
        self.require_authority(caller)?;
        if account.is_zero() {
            return Err(TokenError::InvalidAddress);
        }
        self.policy.set_whitelisted(account, value);
        info!("whitelist[{}] = {}", account, value);
        Ok(())
    }

    pub fn set_no_sell_limit(
        &mut self,
        caller: &Address,
        account: Address,
        value: bool,
    ) -> Result<(), TokenError> {
        self.require_authority(caller)?;
        if account.is_zero() {
            return Err(TokenError::InvalidAddress);
        }
        self.policy.set_no_sell_limit(account, value);
        info!("no_sell_limit[{}] = {}", account, value);
        Ok(())
    }

    pub fn set_liquidity_pool(
        &mut self,
        caller: &Address,
        pool: Address,
        value: bool,
    ) -> Result<(), TokenError> {
        self.require_authority(caller)?;
        if pool.is_zero() {
            return Err(TokenError::InvalidAddress);
        }
        self.policy.set_liquidity_pool(pool, value);
        info!("liquidity_pool[{}] = {}", pool, value);
        Ok(())
    }

    pub fn set_bridge_address(
        &mut self,
        caller: &Address,
        address: Address,
    ) -> Result<(), TokenError> {
        self.require_authority(caller)?;
        if address.is_zero() {
            return Err(TokenError::InvalidAddress);
        }
        self.bridge_address = Some(address);
        info!("bridge address set to {}", address);
        Ok(())
    }

    pub fn set_bond_address(
        &mut self,
        caller: &Address,
        address: Address,
    ) -> Result<(), TokenError> {
        self.require_authority(caller)?;
        if address.is_zero() {
            return Err(TokenError::InvalidAddress);
        }
        self.bond_address = Some(address);
        info!("bond address set to {}", address);
        Ok(())
    }

    pub fn set_treasury_address(
        &mut self,
        caller: &Address,
        address: Address,
    ) -> Result<(), TokenError> {
        self.require_authority(caller)?;
        if address.is_zero() {
            return Err(TokenError::InvalidAddress);
        }
        self.treasury_address = Some(address);
        info!("treasury address set to {}", address);
        Ok(())
    }

    /// Set or clear the supply cap. A cap below the supply already issued
    /// is rejected.
    pub fn set_max_supply(
        &mut self,
        caller: &Address,
        cap: Option<u64>,
    ) -> Result<(), TokenError> {
        self.require_authority(caller)?;
        if let Some(cap) = cap {
            if cap < self.current_supply {
                return Err(TokenError::InvalidAmount);
            }
        }
        self.max_supply = cap;
        info!("max supply set to {:?}", cap);
        Ok(())
    }

    /// Issue new tokens to `to`. Authority-gated; passes the pause,
    /// blacklist, whitelist-mode, and supply-cap gates.
    pub fn mint(&mut self, caller: &Address, to: Address, amount: u64) -> Result<(), TokenError> {
        if self.emergency_paused {
            return Err(TokenError::EmergencyPaused);
        }
        self.require_authority(caller)?;
        if amount == 0 {
            return Err(TokenError::InvalidAmount);
        }
        if self.policy.is_blacklisted(&to) {
            return Err(TokenError::Blacklisted);
        }
        if self.whitelist_mode && !self.policy.is_whitelisted(&to) {
            return Err(TokenError::NotWhitelisted);
        }
        let new_supply = self
            .current_supply
            .checked_add(amount)
            .ok_or(TokenError::MathOverflow)?;
        if let Some(cap) = self.max_supply {
            if new_supply > cap {
                return Err(TokenError::SupplyCapExceeded);
            }
        }
        let new_balance = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(TokenError::MathOverflow)?;

        self.balances.insert(to, new_balance);
        self.current_supply = new_supply;
        debug!("minted {} to {}, supply now {}", amount, to, new_supply);
        Ok(())
    }

    /// Destroy tokens held by `from`. Authority-gated; passes the pause,
    /// blacklist, and whitelist-mode gates.
    pub fn burn(&mut self, caller: &Address, from: Address, amount: u64) -> Result<(), TokenError> {
        if self.emergency_paused {
            return Err(TokenError::EmergencyPaused);
        }
        self.require_authority(caller)?;
        if amount == 0 {
            return Err(TokenError::InvalidAmount);
        }
        if self.policy.is_blacklisted(&from) {
            return Err(TokenError::Blacklisted);
        }
        if self.whitelist_mode && !self.policy.is_whitelisted(&from) {
            return Err(TokenError::NotWhitelisted);
        }
        let balance = self.balance_of(&from);
        if balance < amount {
            return Err(TokenError::InvalidAmount);
        }
        let new_supply = self
            .current_supply
            .checked_sub(amount)
            .ok_or(TokenError::MathOverflow)?;

        self.balances.insert(from, balance - amount);
        self.current_supply = new_supply;
        debug!("burned {} from {}, supply now {}", amount, from, new_supply);
        Ok(())
    }

    /// Move tokens between accounts through the full enforcement pipeline.
    ///
    /// `now` is the caller-supplied unix timestamp used for the sell
    /// window. The sell-tracker update is staged during the checks and
    /// committed together with the balance move.
    pub fn transfer(
        &mut self,
        now: i64,
        from: Address,
        to: Address,
        amount: u64,
    ) -> Result<(), TokenError> {
        if self.emergency_paused {
            return Err(TokenError::EmergencyPaused);
        }
        if amount == 0 {
            return Err(TokenError::InvalidAmount);
        }
        if self.policy.is_blacklisted(&from) || self.policy.is_blacklisted(&to) {
            return Err(TokenError::Blacklisted);
        }
        if self.whitelist_mode
            && (!self.policy.is_whitelisted(&from) || !self.policy.is_whitelisted(&to))
        {
            return Err(TokenError::NotWhitelisted);
        }
        if self.policy.is_restricted(&from) {
            return Err(TokenError::Restricted);
        }

        let from_balance = self.balance_of(&from);
        if from_balance < amount {
            return Err(TokenError::InvalidAmount);
        }

        let staged_tracker = if self.policy.is_liquidity_pool(&to)
            && !self.policy.is_sell_limit_exempt(&from)
        {
            Some((from, self.check_sell_limit(now, &from, from_balance, amount)?))
        } else {
            None
        };
        // Transfers to self leave the balance unchanged.
        let to_balance = if to == from {
            from_balance - amount
        } else {
            self.balance_of(&to)
        };
        let new_to_balance = to_balance
            .checked_add(amount)
            .ok_or(TokenError::MathOverflow)?;

        self.balances.insert(from, from_balance - amount);
        self.balances.insert(to, new_to_balance);
        if let Some((seller, tracker)) = staged_tracker {
            self.policy.put_sell_tracker(seller, tracker);
        }
        debug!("transferred {} from {} to {}", amount, from, to);
        Ok(())
    }

    /// Validate a pool sell against the rolling window and return the
    /// tracker state to commit if the whole transfer goes through.
    fn check_sell_limit(
        &self,
        now: i64,
        seller: &Address,
        balance: u64,
        amount: u64,
    ) -> Result<SellTracker, TokenError> {
        let mut tracker = match self.policy.sell_tracker(seller) {
            Some(t) if now <= t.window_start + self.sell_window_secs => *t,
            _ => SellTracker {
                window_start: now,
                sold_in_window: 0,
            },
        };
        let new_total = tracker
            .sold_in_window
            .checked_add(amount)
            .ok_or(TokenError::MathOverflow)?;
        // Limit is a share of the pre-transfer balance.
        let limit = (balance as u128 * self.sell_limit_bps as u128 / BPS_DENOMINATOR) as u64;
        if new_total > limit {
            return Err(TokenError::SellLimitExceeded);
        }
        tracker.sold_in_window = new_total;
        Ok(tracker)
    }
}
