//! The multisig transaction engine: roster, queue, approvals, timelock,
//! and payload dispatch.

use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use ember_presale::PresaleState;
use ember_shared_types::{
    Address, DispatchTarget, QueuedTransaction, TransactionPayload, TransactionStatus,
};
use ember_token::TokenLedger;

use crate::error::GovernanceError;

/// Upper bound on the signer roster.
pub const MAX_SIGNERS: usize = 10;
/// Shortest permitted cooldown: 30 minutes.
pub const MIN_COOLDOWN_SECS: i64 = 1_800;
/// Longest permitted cooldown: 30 days.
pub const MAX_COOLDOWN_SECS: i64 = 2_592_000;

/// Multisig engine state. The roster is fixed at construction; the
/// threshold and cooldown can only be changed through the queue itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceEngine {
    /// The engine's own identity, used as the caller in dispatched calls.
    address: Address,
    /// Who may run the one-time target wiring.
    authority: Address,
    signers: Vec<Address>,
    required_approvals: u8,
    cooldown_period: i64,
    /// Strictly increasing, never reused. Starts at 1.
    next_transaction_id: u64,
    token_target_configured: bool,
    presale_target_configured: bool,
    transactions: HashMap<u64, QueuedTransaction>,
}

impl GovernanceEngine {
    pub fn new(
        address: Address,
        authority: Address,
        signers: Vec<Address>,
        required_approvals: u8,
        cooldown_period: i64,
    ) -> Result<Self, GovernanceError> {
        if signers.len() > MAX_SIGNERS {
            return Err(GovernanceError::TooManySigners);
        }
        let unique: HashSet<&Address> = signers.iter().collect();
        if unique.len() != signers.len() {
            return Err(GovernanceError::DuplicateSigners);
        }
        if signers.iter().any(Address::is_zero) {
            return Err(GovernanceError::InvalidAddress);
        }
        if required_approvals == 0 || required_approvals as usize > signers.len() {
            return Err(GovernanceError::InvalidRequiredApprovals);
        }
        if !(MIN_COOLDOWN_SECS..=MAX_COOLDOWN_SECS).contains(&cooldown_period) {
            return Err(GovernanceError::InvalidCooldownPeriod);
        }
        info!(
            "governance engine initialized: {} signers, threshold {}, cooldown {}s",
            signers.len(),
            required_approvals,
            cooldown_period
        );
        Ok(Self {
            address,
            authority,
            signers,
            required_approvals,
            cooldown_period,
            next_transaction_id: 1,
            token_target_configured: false,
            presale_target_configured: false,
            transactions: HashMap::new(),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn signers(&self) -> &[Address] {
        &self.signers
    }

    pub fn required_approvals(&self) -> u8 {
        self.required_approvals
    }

    pub fn cooldown_period(&self) -> i64 {
        self.cooldown_period
    }

    pub fn is_signer(&self, account: &Address) -> bool {
        self.signers.contains(account)
    }

    pub fn transaction(&self, id: u64) -> Option<&QueuedTransaction> {
        self.transactions.get(&id)
    }

    /// Wire the token ledger as a dispatch target. One-shot.
    pub fn configure_token_target(&mut self, caller: &Address) -> Result<(), GovernanceError> {
        if *caller != self.authority {
            return Err(GovernanceError::Unauthorized);
        }
        if self.token_target_configured {
            return Err(GovernanceError::TargetAlreadyConfigured);
        }
        self.token_target_configured = true;
        info!("token target configured");
        Ok(())
    }

    /// Wire the presale consumer as a dispatch target. One-shot.
    pub fn configure_presale_target(&mut self, caller: &Address) -> Result<(), GovernanceError> {
        if *caller != self.authority {
            return Err(GovernanceError::Unauthorized);
        }
        if self.presale_target_configured {
            return Err(GovernanceError::TargetAlreadyConfigured);
        }
        self.presale_target_configured = true;
        info!("presale target configured");
        Ok(())
    }

    fn target_configured(&self, target: DispatchTarget) -> bool {
        match target {
            DispatchTarget::Token => self.token_target_configured,
            DispatchTarget::Presale => self.presale_target_configured,
            DispatchTarget::Engine => true,
        }
    }

    /// Queue a transaction. Payload contents are validated at execution
    /// time; queuing only requires a signer and a configured target.
    pub fn queue(
        &mut self,
        now: i64,
        initiator: Address,
        payload: TransactionPayload,
    ) -> Result<u64, GovernanceError> {
        if !self.is_signer(&initiator) {
            return Err(GovernanceError::Unauthorized);
        }
        if !self.target_configured(payload.target()) {
            return Err(GovernanceError::TargetNotConfigured);
        }
        let id = self.next_transaction_id;
        self.next_transaction_id += 1;
        let tx = QueuedTransaction {
            id,
            payload,
            initiator,
            approvals: Vec::new(),
            queued_at: now,
            execute_after: now + self.cooldown_period,
            status: TransactionStatus::Pending,
        };
        info!(
            "queued tx {} ({}) by {}, executable after {}",
            id,
            tx.payload.kind(),
            initiator,
            tx.execute_after
        );
        self.transactions.insert(id, tx);
        Ok(id)
    }

    /// Record one signer's approval. Each signer approves at most once;
    /// the initiator gets no implicit approval.
    pub fn approve(&mut self, approver: Address, id: u64) -> Result<(), GovernanceError> {
        if !self.is_signer(&approver) {
            return Err(GovernanceError::Unauthorized);
        }
        let tx = self
            .transactions
            .get_mut(&id)
            .ok_or(GovernanceError::TransactionNotFound)?;
        if tx.has_approved(&approver) {
            return Err(GovernanceError::AlreadyApproved);
        }
        if !tx.is_pending() {
            return Err(GovernanceError::TransactionNotPending);
        }
        tx.approvals.push(approver);
        debug!(
            "tx {} approved by {} ({}/{})",
            id,
            approver,
            tx.approval_count(),
            self.required_approvals
        );
        Ok(())
    }

    /// Execute a ripe transaction against the wired targets. Anyone may
    /// call this; the approvals and the timelock are the gate.
    ///
    /// The status flips to Executed only after the dispatch succeeds, so
    /// a failed dispatch leaves the transaction Pending and retryable.
    pub fn execute(
        &mut self,
        now: i64,
        id: u64,
        token: &mut TokenLedger,
        presale: &mut PresaleState,
    ) -> Result<(), GovernanceError> {
        let tx = self
            .transactions
            .get(&id)
            .ok_or(GovernanceError::TransactionNotFound)?;
        if !tx.is_pending() {
            return Err(GovernanceError::TransactionNotPending);
        }
        if tx.approval_count() < self.required_approvals as usize {
            return Err(GovernanceError::InsufficientApprovals);
        }
        if now < tx.execute_after {
            return Err(GovernanceError::CooldownNotElapsed);
        }
        let payload = tx.payload.clone();

        if let Err(e) = self.dispatch(&payload, token, presale) {
            warn!("tx {} dispatch failed, left pending: {}", id, e);
            return Err(e);
        }

        if let Some(tx) = self.transactions.get_mut(&id) {
            tx.status = TransactionStatus::Executed;
        }
        info!("executed tx {} ({})", id, payload.kind());
        Ok(())
    }

    fn dispatch(
        &mut self,
        payload: &TransactionPayload,
        token: &mut TokenLedger,
        presale: &mut PresaleState,
    ) -> Result<(), GovernanceError> {
        let engine = self.address;
        match payload {
            TransactionPayload::Unpause => {
                token.set_emergency_pause(&engine, false)?;
            }
            TransactionPayload::SetBlacklist { account, value } => {
                token.set_blacklisted(&engine, *account, *value)?;
            }
            TransactionPayload::SetRestricted { account, value } => {
                token.set_restricted(&engine, *account, *value)?;
            }
            TransactionPayload::SetWhitelist { account, value } => {
                token.set_whitelisted(&engine, *account, *value)?;
            }
            TransactionPayload::SetNoSellLimit { account, value } => {
                token.set_no_sell_limit(&engine, *account, *value)?;
            }
            TransactionPayload::SetLiquidityPool { pool, value } => {
                token.set_liquidity_pool(&engine, *pool, *value)?;
            }
            TransactionPayload::SetBridgeAddress { address } => {
                token.set_bridge_address(&engine, *address)?;
            }
            TransactionPayload::SetBondAddress { address } => {
                token.set_bond_address(&engine, *address)?;
            }
            TransactionPayload::SetTreasuryAddress { address } => {
                token.set_treasury_address(&engine, *address)?;
            }
            TransactionPayload::WithdrawToTreasury { amount } => {
                if *amount == 0 {
                    return Err(GovernanceError::InvalidAmount);
                }
                presale.withdraw_to_treasury(&engine, *amount)?;
            }
            // Self-targeted payloads re-validate against the state at
            // execution time, not at queue time.
            TransactionPayload::SetRequiredApprovals { required } => {
                if *required == 0 || *required as usize > self.signers.len() {
                    return Err(GovernanceError::InvalidRequiredApprovals);
                }
                self.required_approvals = *required;
                info!("required approvals set to {}", required);
            }
            TransactionPayload::SetCooldownPeriod { seconds } => {
                if !(MIN_COOLDOWN_SECS..=MAX_COOLDOWN_SECS).contains(seconds) {
                    return Err(GovernanceError::InvalidCooldownPeriod);
                }
                self.cooldown_period = *seconds;
                info!("cooldown period set to {}s", seconds);
            }
        }
        Ok(())
    }

    /// Single-signer fast path: engage the token emergency pause with no
    /// queue and no cooldown. Lifting the pause goes through the queue.
    pub fn emergency_pause(
        &self,
        caller: &Address,
        token: &mut TokenLedger,
    ) -> Result<(), GovernanceError> {
        if !self.is_signer(caller) {
            return Err(GovernanceError::Unauthorized);
        }
        if !self.token_target_configured {
            return Err(GovernanceError::TargetNotConfigured);
        }
        token.set_emergency_pause(&self.address, true)?;
        warn!("emergency pause engaged by signer {}", caller);
        Ok(())
    }
}
