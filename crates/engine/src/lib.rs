//! Balance engine for a per-user, append-only ledger.
//!
//! There is no stored running balance: every balance is reconstructed on
//! demand by folding the user's transactions over their initial balance
//! ([`Engine::balance_as_of`]). The report operations are all defined in
//! terms of that fold or an equivalent SQL aggregate, so they cannot drift
//! from each other.

use chrono::{Days, NaiveDate};
use sea_orm::DatabaseConnection;

pub use error::EngineError;
pub use ledger::{Ledger, LedgerFilter};
pub use params::{
    ClosingSeriesParams, DEFAULT_CLOSING_DAYS, DEFAULT_EXCLUDED_CATEGORY,
    DEFAULT_INCOME_THRESHOLD_MINOR, DEFAULT_WINDOW_DAYS, IncomeThresholdParams,
    IncomeWindowParams, RecentWindowParams, SegmentDivisors, SegmentParams,
};
pub use transactions::{NewTransaction, Transaction, TransactionKind};
pub use users::User;

mod error;
mod ledger;
mod params;
mod transactions;
mod users;

type ResultEngine<T> = Result<T, EngineError>;

/// One day of the closing-balance series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DailyBalance {
    pub date: NaiveDate,
    pub balance_minor: i64,
}

/// Result of [`Engine::average_segment_balance`]. Values are fractional
/// minor units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentAverages {
    pub first_segment_minor: f64,
    pub last_segment_minor: f64,
}

/// Input for [`Engine::record_transaction`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordTransaction {
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    /// Accounting date of the transaction, normally today.
    pub occurred_on: NaiveDate,
}

#[derive(Debug)]
pub struct Engine {
    ledger: Ledger,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The underlying ledger store.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Canonical balance reconstruction: the user's initial balance plus the
    /// signed amounts of every transaction with `occurred_on <= as_of`.
    ///
    /// This is the single source of truth for "balance as of a date". Pure
    /// read aggregation, safe under unlimited concurrent readers.
    pub async fn balance_as_of(&self, user: &User, as_of: NaiveDate) -> ResultEngine<i64> {
        let transactions = self.ledger.up_to(&user.id, as_of).await?;
        Ok(transactions
            .iter()
            .fold(user.initial_balance_minor, |balance, tx| {
                balance + tx.signed_amount_minor()
            }))
    }

    /// Validates and appends a transaction, returning it together with the
    /// balance after it applied.
    ///
    /// A debit larger than the reconstructed balance fails with
    /// [`EngineError::InsufficientBalance`] and writes nothing.
    ///
    /// `balance_after` is computed arithmetically from the pre-insert
    /// reconstruction, not re-read. Two concurrent debits for the same user
    /// can both pass the sufficiency check and jointly overdraw the account;
    /// this check-then-act window is a known limitation and callers needing
    /// a hard guarantee must serialize writes per user.
    pub async fn record_transaction(
        &self,
        user: &User,
        record: RecordTransaction,
    ) -> ResultEngine<(Transaction, i64)> {
        let new = NewTransaction::new(
            user.id.clone(),
            record.occurred_on,
            record.amount_minor,
            record.kind,
            record.category_id,
            record.description,
        )?;

        let balance_before = self.balance_as_of(user, record.occurred_on).await?;
        if record.kind == TransactionKind::Debit && record.amount_minor > balance_before {
            return Err(EngineError::InsufficientBalance {
                user_id: user.id.clone(),
                attempted_on: record.occurred_on,
                attempted_amount_minor: record.amount_minor,
                available_balance_minor: balance_before,
            });
        }

        let tx = self.ledger.insert(new).await?;
        let balance_after = balance_before + tx.signed_amount_minor();
        Ok((tx, balance_after))
    }

    /// Closing balance for each of the `requested_days` calendar days ending
    /// `today`, today first. A non-positive day count yields an empty series.
    pub async fn daily_closing_series(
        &self,
        user: &User,
        today: NaiveDate,
        params: &ClosingSeriesParams,
    ) -> ResultEngine<Vec<DailyBalance>> {
        let mut series = Vec::new();
        if params.requested_days <= 0 {
            return Ok(series);
        }

        series.reserve(params.requested_days as usize);
        for i in 0..params.requested_days {
            let date = date_back(today, i)?;
            let balance_minor = self.balance_as_of(user, date).await?;
            series.push(DailyBalance {
                date,
                balance_minor,
            });
        }
        Ok(series)
    }

    /// Mean closing balance over the series window, in fractional minor
    /// units. The divisor is the *requested* day count, so a zero count is
    /// reported as [`EngineError::DivisionByZero`] rather than NaN.
    pub async fn average_balance(
        &self,
        user: &User,
        today: NaiveDate,
        params: &ClosingSeriesParams,
    ) -> ResultEngine<f64> {
        if params.requested_days == 0 {
            return Err(EngineError::DivisionByZero("requested_days"));
        }

        let series = self.daily_closing_series(user, today, params).await?;
        let total: i64 = series.iter().map(|day| day.balance_minor).sum();
        Ok(total as f64 / params.requested_days as f64)
    }

    /// Average closing balance of two segments of the lookback window: the
    /// oldest days of the window ("first") and the most recent days
    /// ("last").
    ///
    /// How sums pair with divisors depends on
    /// [`params.divisors`](SegmentDivisors); the crossed pairing is the
    /// shipped default.
    pub async fn average_segment_balance(
        &self,
        user: &User,
        today: NaiveDate,
        params: &SegmentParams,
    ) -> ResultEngine<SegmentAverages> {
        if params.first_days == 0 {
            return Err(EngineError::DivisionByZero("first_days"));
        }
        if params.last_days == 0 {
            return Err(EngineError::DivisionByZero("last_days"));
        }

        let (recent_len, old_len) = match params.divisors {
            SegmentDivisors::Crossed => (params.first_days, params.last_days),
            SegmentDivisors::Matched => (params.last_days, params.first_days),
        };

        let recent_sum = self.window_sum(user, today, 0, recent_len).await?;
        let old_sum = self
            .window_sum(user, today, params.total_days - old_len, params.total_days)
            .await?;

        Ok(SegmentAverages {
            first_segment_minor: old_sum as f64 / params.first_days as f64,
            last_segment_minor: recent_sum as f64 / params.last_days as f64,
        })
    }

    /// Credit sum over the last `last_days` days, excluding one category.
    ///
    /// Uses the ledger's SQL aggregate; windowed filters never touch the
    /// initial balance.
    pub async fn income_sum(
        &self,
        user: &User,
        today: NaiveDate,
        params: &IncomeWindowParams,
    ) -> ResultEngine<i64> {
        let filter = LedgerFilter {
            occurred_on_or_after: Some(date_back(today, params.last_days)?),
            exclude_category: Some(params.except_category),
            ..Default::default()
        };
        self.ledger
            .sum_amount(&user.id, TransactionKind::Credit, &filter)
            .await
    }

    /// Number of debit transactions over the last `last_days` days.
    pub async fn debit_count(
        &self,
        user: &User,
        today: NaiveDate,
        params: &RecentWindowParams,
    ) -> ResultEngine<u64> {
        let filter = LedgerFilter {
            occurred_on_or_after: Some(date_back(today, params.last_days)?),
            ..Default::default()
        };
        self.ledger
            .count_matching(&user.id, TransactionKind::Debit, &filter)
            .await
    }

    /// Sum of credits strictly above the threshold, unbounded in time.
    pub async fn income_over_threshold(
        &self,
        user: &User,
        params: &IncomeThresholdParams,
    ) -> ResultEngine<i64> {
        let filter = LedgerFilter {
            amount_over_minor: Some(params.amount_over_minor),
            ..Default::default()
        };
        self.ledger
            .sum_amount(&user.id, TransactionKind::Credit, &filter)
            .await
    }

    /// Sum of closing balances for offsets `from_offset..to_offset` days
    /// back from today.
    async fn window_sum(
        &self,
        user: &User,
        today: NaiveDate,
        from_offset: i64,
        to_offset: i64,
    ) -> ResultEngine<i64> {
        let mut sum = 0i64;
        for i in from_offset..to_offset {
            let date = date_back(today, i)?;
            sum += self.balance_as_of(user, date).await?;
        }
        Ok(sum)
    }
}

/// `today` minus `days_back` days. Negative offsets reach forward, matching
/// the loop arithmetic reports inherit when a window underflows.
fn date_back(today: NaiveDate, days_back: i64) -> ResultEngine<NaiveDate> {
    let date = if days_back >= 0 {
        today.checked_sub_days(Days::new(days_back as u64))
    } else {
        today.checked_add_days(Days::new(days_back.unsigned_abs()))
    };
    date.ok_or_else(|| EngineError::InvalidDate(format!("{days_back} days back from {today}")))
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        Engine {
            ledger: Ledger::new(self.database),
        }
    }
}
