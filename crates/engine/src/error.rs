//! The module contains the errors the engine can return.
//!
//! The interesting one is [`InsufficientBalance`]: it carries enough context
//! for the caller to build a useful rejection (who tried, when, how much, and
//! how much was actually available).
//!
//! [`InsufficientBalance`]: EngineError::InsufficientBalance
use chrono::NaiveDate;
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A debit would exceed the balance available on the attempted date.
    /// Nothing is written when this is returned.
    #[error(
        "insufficient balance: attempted debit of {attempted_amount_minor} with {available_balance_minor} available"
    )]
    InsufficientBalance {
        user_id: String,
        attempted_on: NaiveDate,
        attempted_amount_minor: i64,
        available_balance_minor: i64,
    },
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    /// A report window reached outside the representable calendar range.
    #[error("invalid date: {0}")]
    InvalidDate(String),
    /// A report was asked to divide by a zero day count. Reported explicitly
    /// instead of letting the average degrade to NaN.
    #[error("division by zero: {0} is 0")]
    DivisionByZero(&'static str),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::InsufficientBalance {
                    user_id: a_user,
                    attempted_on: a_on,
                    attempted_amount_minor: a_amount,
                    available_balance_minor: a_available,
                },
                Self::InsufficientBalance {
                    user_id: b_user,
                    attempted_on: b_on,
                    attempted_amount_minor: b_amount,
                    available_balance_minor: b_available,
                },
            ) => {
                a_user == b_user && a_on == b_on && a_amount == b_amount && a_available == b_available
            }
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidDate(a), Self::InvalidDate(b)) => a == b,
            (Self::DivisionByZero(a), Self::DivisionByZero(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
