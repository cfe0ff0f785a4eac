//! Presale lifecycle, purchase flow, and vault bookkeeping.

use std::collections::HashMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use ember_shared_types::{Address, Authority};
use ember_token::PolicyStore;

use crate::error::PresaleError;

/// Base units per whole token (6 decimal places). Prices are quoted in
/// micro-USD per whole token, payments arrive in micro-USD.
pub const UNITS_PER_TOKEN: u64 = 1_000_000;

/// Presale lifecycle. `Stopped` is terminal; cap and limit updates are
/// refused once there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresaleStatus {
    NotStarted,
    Active,
    Paused,
    Stopped,
}

/// Presale state: caps, totals, allow-list, per-buyer purchase records,
/// and the vault of collected payments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresaleState {
    authority: Authority,
    status: PresaleStatus,
    /// Cap on total tokens owed across all buyers. 0 means unlimited.
    max_presale_cap: u64,
    /// Cap on tokens owed to a single buyer. 0 means unlimited.
    max_per_user: u64,
    total_raised: u64,
    total_tokens_sold: u64,
    /// Micro-USD per whole token. Always non-zero.
    token_price_usd_micro: u64,
    treasury_address: Option<Address>,
    /// Collected payments not yet withdrawn to the treasury.
    vault_balance: u64,
    allowed_payment_tokens: HashMap<Address, bool>,
    /// Tokens owed per buyer, accumulated across purchases.
    purchases: HashMap<Address, u64>,
}

impl PresaleState {
    pub fn new(
        admin: Address,
        token_price_usd_micro: u64,
        max_presale_cap: u64,
        max_per_user: u64,
    ) -> Result<Self, PresaleError> {
        if token_price_usd_micro == 0 {
            return Err(PresaleError::InvalidAmount);
        }
        Ok(Self {
            authority: Authority::DirectAdmin(admin),
            status: PresaleStatus::NotStarted,
            max_presale_cap,
            max_per_user,
            total_raised: 0,
            total_tokens_sold: 0,
            token_price_usd_micro,
            treasury_address: None,
            vault_balance: 0,
            allowed_payment_tokens: HashMap::new(),
            purchases: HashMap::new(),
        })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    pub fn status(&self) -> PresaleStatus {
        self.status
    }

    pub fn max_presale_cap(&self) -> u64 {
        self.max_presale_cap
    }

    pub fn max_per_user(&self) -> u64 {
        self.max_per_user
    }

    pub fn total_raised(&self) -> u64 {
        self.total_raised
    }

    pub fn total_tokens_sold(&self) -> u64 {
        self.total_tokens_sold
    }

    pub fn vault_balance(&self) -> u64 {
        self.vault_balance
    }

    pub fn treasury_address(&self) -> Option<Address> {
        self.treasury_address
    }

    pub fn purchased_by(&self, buyer: &Address) -> u64 {
        self.purchases.get(buyer).copied().unwrap_or(0)
    }

    pub fn is_payment_token_allowed(&self, mint: &Address) -> bool {
        self.allowed_payment_tokens.get(mint).copied().unwrap_or(false)
    }

    fn require_authority(&self, caller: &Address) -> Result<(), PresaleError> {
        if self.authority.permits(caller) {
            Ok(())
        } else {
            Err(PresaleError::Unauthorized)
        }
    }

    /// Hand administrative control to the governance engine. One-way: a
    /// second hand-off fails `Unauthorized`.
    pub fn set_governance(
        &mut self,
        caller: &Address,
        engine: Address,
    ) -> Result<(), PresaleError> {
        self.require_authority(caller)?;
        if engine.is_zero() {
            return Err(PresaleError::InvalidAddress);
        }
        if !self.authority.hand_over(engine) {
            return Err(PresaleError::Unauthorized);
        }
        info!("presale authority handed over to governance engine {}", engine);
        Ok(())
    }

    pub fn start(&mut self, caller: &Address) -> Result<(), PresaleError> {
        self.require_authority(caller)?;
        match self.status {
            PresaleStatus::NotStarted | PresaleStatus::Paused => {
                self.status = PresaleStatus::Active;
                info!("presale started");
                Ok(())
            }
            _ => Err(PresaleError::InvalidStatus),
        }
    }

    pub fn pause(&mut self, caller: &Address) -> Result<(), PresaleError> {
        self.require_authority(caller)?;
        match self.status {
            PresaleStatus::Active => {
                self.status = PresaleStatus::Paused;
                info!("presale paused");
                Ok(())
            }
            _ => Err(PresaleError::InvalidStatus),
        }
    }

    pub fn stop(&mut self, caller: &Address) -> Result<(), PresaleError> {
        self.require_authority(caller)?;
        match self.status {
            PresaleStatus::Active | PresaleStatus::Paused => {
                self.status = PresaleStatus::Stopped;
                info!("presale stopped");
                Ok(())
            }
            _ => Err(PresaleError::InvalidStatus),
        }
    }

    pub fn allow_payment_token(
        &mut self,
        caller: &Address,
        mint: Address,
    ) -> Result<(), PresaleError> {
        self.require_authority(caller)?;
        if mint.is_zero() {
            return Err(PresaleError::InvalidAddress);
        }
        self.allowed_payment_tokens.insert(mint, true);
        info!("payment token {} allowed", mint);
        Ok(())
    }

    pub fn disallow_payment_token(
        &mut self,
        caller: &Address,
        mint: Address,
    ) -> Result<(), PresaleError> {
        self.require_authority(caller)?;
        self.allowed_payment_tokens.insert(mint, false);
        info!("payment token {} disallowed", mint);
        Ok(())
    }

    /// Tokens owed for a payment, from the configured price.
    fn tokens_owed(&self, payment_amount: u64) -> Result<u64, PresaleError> {
        let owed = (payment_amount as u128)
            .checked_mul(UNITS_PER_TOKEN as u128)
            .ok_or(PresaleError::MathOverflow)?
            / self.token_price_usd_micro as u128;
        u64::try_from(owed).map_err(|_| PresaleError::MathOverflow)
    }

    /// Purchase tokens with an allowed payment token.
    ///
    /// The ledger's pause flag and blacklist are consulted through the
    /// caller-supplied policy view; all totals update atomically or not
    /// at all. Returns the tokens owed to the buyer.
    pub fn buy(
        &mut self,
        buyer: Address,
        payment_token: Address,
        payment_amount: u64,
        policy: &PolicyStore,
        token_paused: bool,
    ) -> Result<u64, PresaleError> {
        if self.status != PresaleStatus::Active {
            return Err(PresaleError::InvalidStatus);
        }
        if token_paused {
            return Err(PresaleError::EmergencyPaused);
        }
        if policy.is_blacklisted(&buyer) {
            return Err(PresaleError::Blacklisted);
        }
        if !self.is_payment_token_allowed(&payment_token) {
            return Err(PresaleError::PaymentTokenNotAllowed);
        }
        if payment_amount == 0 {
            return Err(PresaleError::InvalidAmount);
        }
        let owed = self.tokens_owed(payment_amount)?;
        if owed == 0 {
            return Err(PresaleError::InvalidAmount);
        }

        let new_raised = self
            .total_raised
            .checked_add(owed)
            .ok_or(PresaleError::MathOverflow)?;
        if self.max_presale_cap > 0 && new_raised > self.max_presale_cap {
            return Err(PresaleError::PresaleCapExceeded);
        }
        let buyer_total = self
            .purchased_by(&buyer)
            .checked_add(owed)
            .ok_or(PresaleError::MathOverflow)?;
        if self.max_per_user > 0 && buyer_total > self.max_per_user {
            return Err(PresaleError::PerUserLimitExceeded);
        }
        let new_sold = self
            .total_tokens_sold
            .checked_add(owed)
            .ok_or(PresaleError::MathOverflow)?;
        let new_vault = self
            .vault_balance
            .checked_add(payment_amount)
            .ok_or(PresaleError::MathOverflow)?;

        self.total_raised = new_raised;
        self.total_tokens_sold = new_sold;
        self.purchases.insert(buyer, buyer_total);
        self.vault_balance = new_vault;
        debug!(
            "buyer {} paid {} of {} for {} units",
            buyer, payment_amount, payment_token, owed
        );
        Ok(owed)
    }

    /// Raise or lower the presale cap. A non-zero cap below what has
    /// already been raised is rejected; no updates once Stopped.
    pub fn update_presale_cap(
        &mut self,
        caller: &Address,
        new_cap: u64,
    ) -> Result<(), PresaleError> {
        self.require_authority(caller)?;
        if self.status == PresaleStatus::Stopped {
            return Err(PresaleError::InvalidStatus);
        }
        if new_cap > 0 && new_cap < self.total_raised {
            return Err(PresaleError::InvalidAmount);
        }
        self.max_presale_cap = new_cap;
        info!("presale cap set to {}", new_cap);
        Ok(())
    }

    /// Update the per-user limit. A non-zero limit above a non-zero cap
    /// is rejected; no updates once Stopped.
    pub fn update_max_per_user(
        &mut self,
        caller: &Address,
        new_max: u64,
    ) -> Result<(), PresaleError> {
        self.require_authority(caller)?;
        if self.status == PresaleStatus::Stopped {
            return Err(PresaleError::InvalidStatus);
        }
        if new_max > 0 && self.max_presale_cap > 0 && new_max > self.max_presale_cap {
            return Err(PresaleError::InvalidAmount);
        }
        self.max_per_user = new_max;
        info!("per-user limit set to {}", new_max);
        Ok(())
    }

    pub fn set_treasury_address(
        &mut self,
        caller: &Address,
        address: Address,
    ) -> Result<(), PresaleError> {
        self.require_authority(caller)?;
        if address.is_zero() {
            return Err(PresaleError::InvalidAddress);
        }
        self.treasury_address = Some(address);
        info!("treasury address set to {}", address);
        Ok(())
    }

    /// Release collected payments from the vault toward the treasury.
    /// The actual asset movement belongs to the surrounding environment;
    /// this records the bookkeeping.
    pub fn withdraw_to_treasury(
        &mut self,
        caller: &Address,
        amount: u64,
    ) -> Result<(), PresaleError> {
        self.require_authority(caller)?;
        let treasury = self.treasury_address.ok_or(PresaleError::TreasuryNotSet)?;
        if amount == 0 || amount > self.vault_balance {
            return Err(PresaleError::InvalidAmount);
        }
        self.vault_balance -= amount;
        info!("withdrew {} from vault to treasury {}", amount, treasury);
        Ok(())
    }
}
