use thiserror::Error;

use ember_presale::PresaleError;
use ember_token::TokenError;

/// Errors surfaced by the governance engine, including failures
/// propagated out of dispatched calls into the token and presale crates.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("caller is not an authorized signer")]
    Unauthorized,
    #[error("signer has already approved this transaction")]
    AlreadyApproved,
    #[error("transaction not found")]
    TransactionNotFound,
    #[error("transaction is not pending")]
    TransactionNotPending,
    #[error("transaction lacks the required approvals")]
    InsufficientApprovals,
    #[error("cooldown has not elapsed")]
    CooldownNotElapsed,
    #[error("target component has not been configured")]
    TargetNotConfigured,
    #[error("target component is already configured")]
    TargetAlreadyConfigured,
    #[error("signer roster exceeds the maximum size")]
    TooManySigners,
    #[error("signer roster contains duplicates")]
    DuplicateSigners,
    #[error("required approvals must be between 1 and the roster size")]
    InvalidRequiredApprovals,
    #[error("cooldown period is outside the permitted range")]
    InvalidCooldownPeriod,
    #[error("address must not be the zero address")]
    InvalidAddress,
    #[error("invalid amount")]
    InvalidAmount,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Presale(#[from] PresaleError),
}
