use thiserror::Error;

/// Errors surfaced by the presale consumer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PresaleError {
    #[error("caller does not hold the presale authority")]
    Unauthorized,
    #[error("operation is not valid in the current presale status")]
    InvalidStatus,
    #[error("token ledger is emergency paused")]
    EmergencyPaused,
    #[error("buyer is blacklisted")]
    Blacklisted,
    #[error("payment token is not on the allow-list")]
    PaymentTokenNotAllowed,
    #[error("purchase would exceed the presale cap")]
    PresaleCapExceeded,
    #[error("purchase would exceed the per-user limit")]
    PerUserLimitExceeded,
    #[error("invalid amount")]
    InvalidAmount,
    #[error("address must not be the zero address")]
    InvalidAddress,
    #[error("treasury address has not been set")]
    TreasuryNotSet,
    #[error("arithmetic overflow")]
    MathOverflow,
}
