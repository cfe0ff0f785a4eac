//! Queued governance transaction types.
//!
//! These types are shared between the governance engine and the components
//! it administers, so they live in the shared-types crate rather than in
//! the engine itself.

use serde::{Deserialize, Serialize};

use crate::Address;

/// The administrative action carried by a queued transaction.
///
/// One variant per action the engine can perform; the executor matches
/// exhaustively, so adding a variant forces a handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionPayload {
    /// Clear the emergency pause on the token ledger.
    Unpause,
    /// Set or clear the blacklist flag for an account.
    SetBlacklist { account: Address, value: bool },
    /// Set or clear the restricted flag for an account.
    SetRestricted { account: Address, value: bool },
    /// Set or clear the whitelist flag for an account.
    SetWhitelist { account: Address, value: bool },
    /// Set or clear the sell-limit exemption for an account.
    SetNoSellLimit { account: Address, value: bool },
    /// Mark or unmark an address as a liquidity pool.
    SetLiquidityPool { pool: Address, value: bool },
    /// Update the bridge address on the token ledger.
    SetBridgeAddress { address: Address },
    /// Update the bond contract address on the token ledger.
    SetBondAddress { address: Address },
    /// Update the treasury address on the token ledger.
    SetTreasuryAddress { address: Address },
    /// Move funds from the presale vault to the treasury.
    WithdrawToTreasury { amount: u64 },
    /// Change the engine's own approval threshold.
    SetRequiredApprovals { required: u8 },
    /// Change the engine's own cooldown period.
    SetCooldownPeriod { seconds: i64 },
}

/// The component a payload is applied to at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchTarget {
    Token,
    Presale,
    Engine,
}

impl TransactionPayload {
    /// The component this payload is dispatched to.
    pub fn target(&self) -> DispatchTarget {
        match self {
            TransactionPayload::Unpause
            | TransactionPayload::SetBlacklist { .. }
            | TransactionPayload::SetRestricted { .. }
            | TransactionPayload::SetWhitelist { .. }
            | TransactionPayload::SetNoSellLimit { .. }
            | TransactionPayload::SetLiquidityPool { .. }
            | TransactionPayload::SetBridgeAddress { .. }
            | TransactionPayload::SetBondAddress { .. }
            | TransactionPayload::SetTreasuryAddress { .. } => DispatchTarget::Token,
            TransactionPayload::WithdrawToTreasury { .. } => DispatchTarget::Presale,
            TransactionPayload::SetRequiredApprovals { .. }
            | TransactionPayload::SetCooldownPeriod { .. } => DispatchTarget::Engine,
        }
    }

    /// Short action name for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            TransactionPayload::Unpause => "unpause",
            TransactionPayload::SetBlacklist { .. } => "set_blacklist",
            TransactionPayload::SetRestricted { .. } => "set_restricted",
            TransactionPayload::SetWhitelist { .. } => "set_whitelist",
            TransactionPayload::SetNoSellLimit { .. } => "set_no_sell_limit",
            TransactionPayload::SetLiquidityPool { .. } => "set_liquidity_pool",
            TransactionPayload::SetBridgeAddress { .. } => "set_bridge_address",
            TransactionPayload::SetBondAddress { .. } => "set_bond_address",
            TransactionPayload::SetTreasuryAddress { .. } => "set_treasury_address",
            TransactionPayload::WithdrawToTreasury { .. } => "withdraw_to_treasury",
            TransactionPayload::SetRequiredApprovals { .. } => "set_required_approvals",
            TransactionPayload::SetCooldownPeriod { .. } => "set_cooldown_period",
        }
    }
}

/// Lifecycle of a queued transaction. There is no expiry: a pending
/// transaction with enough approvals stays executable indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Pending,
    Executed,
}

/// A queued administrative action awaiting approvals and its timelock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedTransaction {
    /// Monotonically assigned id, starting at 1.
    pub id: u64,
    pub payload: TransactionPayload,
    /// The signer that queued the transaction.
    pub initiator: Address,
    /// Distinct signers that have approved. The initiator does not
    /// approve implicitly.
    pub approvals: Vec<Address>,
    /// Unix timestamp when the transaction was queued.
    pub queued_at: i64,
    /// Earliest unix timestamp at which execution may succeed.
    pub execute_after: i64,
    pub status: TransactionStatus,
}

impl QueuedTransaction {
    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    pub fn has_approved(&self, signer: &Address) -> bool {
        self.approvals.contains(signer)
    }

    pub fn approval_count(&self) -> usize {
        self.approvals.len()
    }
}
