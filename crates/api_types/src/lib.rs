use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Credit,
        Debit,
    }

    /// Request body for recording a transaction. The accounting date is
    /// always the server's "today"; clients cannot backdate.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        /// Amount in minor units. Must be > 0.
        pub amount_minor: i64,
        pub kind: TransactionKind,
        pub category_id: Option<i64>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        /// Accounting date (calendar day, no time component).
        pub occurred_on: NaiveDate,
        pub amount_minor: i64,
        pub kind: TransactionKind,
        pub category_id: Option<i64>,
        pub description: Option<String>,
        /// RFC3339 insertion timestamp, audit only.
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub transaction: TransactionView,
        /// Balance in minor units after the transaction applied.
        pub balance_after_minor: i64,
    }
}

pub mod stats {
    use super::*;

    /// Request body for the daily closing series.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DailyClosingBalance {
        /// Defaults to 90.
        pub requested_days: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DailyBalanceView {
        pub date: NaiveDate,
        pub balance_minor: i64,
    }

    /// Today first, one entry per calendar day.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DailyClosingBalanceResponse {
        pub requested_days: i64,
        pub closing_balances: Vec<DailyBalanceView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AverageBalance {
        /// Defaults to 90. Zero is rejected.
        pub requested_days: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AverageBalanceResponse {
        pub requested_days: i64,
        /// Fractional minor units.
        pub average_balance_minor: f64,
    }

    /// How segment sums pair with their divisors; see the engine's
    /// `SegmentDivisors`. Omitted means `crossed` (the shipped behaviour).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SegmentDivisors {
        Crossed,
        Matched,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AverageSegmentBalance {
        /// Defaults to 90.
        pub total_days: Option<i64>,
        /// Defaults to 30.
        pub first_days: Option<i64>,
        /// Defaults to 30.
        pub last_days: Option<i64>,
        pub divisors: Option<SegmentDivisors>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AverageSegmentBalanceResponse {
        /// Fractional minor units; oldest segment of the window.
        pub first_segment_minor: f64,
        /// Fractional minor units; most recent segment.
        pub last_segment_minor: f64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct LastDaysIncome {
        /// Defaults to 30.
        pub last_days: Option<i64>,
        /// Category excluded from the sum. Defaults to the transfer
        /// sentinel (18020004).
        pub except_category_id: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeSumResponse {
        pub income_minor: i64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DebitCount {
        /// Defaults to 30.
        pub last_days: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DebitCountResponse {
        pub debit_count: u64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct IncomeOverThreshold {
        /// Strict lower bound in minor units. Defaults to 1500 (15.00).
        pub amount_over_minor: Option<i64>,
    }
}
