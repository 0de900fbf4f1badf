//! The `User` value the engine trusts.
//!
//! The engine never authenticates: callers resolve the identity (the server
//! does it against the `users` table) and hand in a [`User`] carrying the
//! starting balance the ledger folds onto.

/// An authenticated user as seen by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: String,
    /// Balance immediately before any recorded transaction; every
    /// reconstruction starts from it.
    pub initial_balance_minor: i64,
}
