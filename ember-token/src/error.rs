use thiserror::Error;

/// Errors surfaced by the token ledger and its enforcement pipeline.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("caller does not hold the ledger authority")]
    Unauthorized,
    #[error("emergency pause is active")]
    EmergencyPaused,
    #[error("account is blacklisted")]
    Blacklisted,
    #[error("account is not whitelisted")]
    NotWhitelisted,
    #[error("sender is restricted from transferring")]
    Restricted,
    #[error("sell limit exceeded for the current window")]
    SellLimitExceeded,
    #[error("mint would exceed the supply cap")]
    SupplyCapExceeded,
    #[error("invalid amount")]
    InvalidAmount,
    #[error("address must not be the zero address")]
    InvalidAddress,
    #[error("arithmetic overflow")]
    MathOverflow,
}
