use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::Amount;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance: balance {balance}, required {required}")]
    InsufficientBalance { balance: Amount, required: Amount },

    #[error("Beneficiary not found: {0}")]
    BeneficiaryNotFound(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Quote expired at {expired_at}")]
    QuoteExpired { expired_at: DateTime<Utc> },

    #[error("Currency mismatch: account holds {expected}, quote converts to {actual}")]
    CurrencyMismatch { expected: String, actual: String },
}
