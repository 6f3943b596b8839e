use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Caller-visible failures of the settlement engine.
///
/// Every variant is synchronous and final: a mutating call that returns an
/// error has left all state exactly as it was before the call. Retry policy,
/// if any, belongs to the caller.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("engine is paused")]
    Paused,
    #[error("caller is not authorized")]
    NotAuthorized,
    #[error("invalid alias: {0}")]
    InvalidAlias(String),
    #[error("alias is already bound to another account")]
    AliasTaken,
    #[error("recipient alias does not resolve to any account")]
    RecipientNotFound,
    #[error("remittance code is already in use")]
    CodeTaken,
    #[error("not found")]
    NotFound,
    #[error("remittance is not eligible for this operation")]
    NotEligible,
    #[error("remittance has already been claimed")]
    AlreadyClaimed,
    #[error("remittance can no longer be cancelled")]
    NotCancellable,
    #[error("balance is zero, nothing to withdraw")]
    NothingToWithdraw,
    #[error("exchange rate must be non-zero")]
    InvalidRate,
    #[error("fee percentage exceeds 10000 basis points")]
    InvalidFee,
    #[error("amount must be positive")]
    InvalidAmount,
    #[error("insufficient available balance")]
    InsufficientBalance,
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
