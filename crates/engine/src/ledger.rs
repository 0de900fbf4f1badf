//! The Ledger Store: durable, append-only storage for transactions.
//!
//! Two read shapes exist. [`Ledger::up_to`] fetches rows for a full
//! client-side fold, and [`Ledger::sum_amount`]/[`Ledger::count_matching`]
//! push the aggregate into SQL. The pushdowns must stay numerically
//! equivalent to filtering and folding the rows the slow way.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Statement, Value,
};
use uuid::Uuid;

use crate::{
    ResultEngine,
    transactions::{self, NewTransaction, Transaction, TransactionKind},
};

/// Filter predicates for the aggregate queries.
///
/// `exclude_category` compiles to SQL `category_id != ?`, which also drops
/// rows with a NULL category. That is the behaviour this API has always
/// shipped, and the income tests pin it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerFilter {
    pub occurred_on_or_after: Option<NaiveDate>,
    pub exclude_category: Option<i64>,
    pub amount_over_minor: Option<i64>,
}

impl LedgerFilter {
    fn push_conditions(&self, sql: &mut String, values: &mut Vec<Value>) {
        if let Some(date) = self.occurred_on_or_after {
            sql.push_str(" AND occurred_on >= ?");
            values.push(date.into());
        }
        if let Some(category) = self.exclude_category {
            sql.push_str(" AND category_id != ?");
            values.push(category.into());
        }
        if let Some(amount) = self.amount_over_minor {
            sql.push_str(" AND amount_minor > ?");
            values.push(amount.into());
        }
    }
}

/// Append-only transaction storage for all users.
#[derive(Clone, Debug)]
pub struct Ledger {
    database: DatabaseConnection,
}

impl Ledger {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    /// Persists a new transaction, assigning its `id` and `created_at`.
    pub async fn insert(&self, new: NewTransaction) -> ResultEngine<Transaction> {
        let tx = Transaction {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            occurred_on: new.occurred_on,
            amount_minor: new.amount_minor,
            kind: new.kind,
            category_id: new.category_id,
            description: new.description,
            created_at: Utc::now(),
        };
        transactions::ActiveModel::from(&tx)
            .insert(&self.database)
            .await?;
        Ok(tx)
    }

    /// All of the user's transactions with `occurred_on <= as_of`, ascending
    /// by accounting date (insertion-stable within a date).
    pub async fn up_to(&self, user_id: &str, as_of: NaiveDate) -> ResultEngine<Vec<Transaction>> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::OccurredOn.lte(as_of))
            .order_by_asc(transactions::Column::OccurredOn)
            .all(&self.database)
            .await?;

        models.into_iter().map(Transaction::try_from).collect()
    }

    /// `SUM(amount_minor)` over the user's transactions of `kind` matching
    /// `filter`. Missing rows sum to 0.
    pub async fn sum_amount(
        &self,
        user_id: &str,
        kind: TransactionKind,
        filter: &LedgerFilter,
    ) -> ResultEngine<i64> {
        let mut sql = String::from(
            "SELECT COALESCE(SUM(amount_minor), 0) AS total \
             FROM transactions \
             WHERE user_id = ? AND kind = ?",
        );
        let mut values: Vec<Value> = vec![user_id.into(), kind.as_str().into()];
        filter.push_conditions(&mut sql, &mut values);

        let stmt = Statement::from_sql_and_values(self.database.get_database_backend(), sql, values);
        let row = self.database.query_one(stmt).await?;
        Ok(row.and_then(|r| r.try_get("", "total").ok()).unwrap_or(0))
    }

    /// `COUNT(*)` over the user's transactions of `kind` matching `filter`.
    pub async fn count_matching(
        &self,
        user_id: &str,
        kind: TransactionKind,
        filter: &LedgerFilter,
    ) -> ResultEngine<u64> {
        let mut sql = String::from(
            "SELECT COUNT(*) AS total FROM transactions WHERE user_id = ? AND kind = ?",
        );
        let mut values: Vec<Value> = vec![user_id.into(), kind.as_str().into()];
        filter.push_conditions(&mut sql, &mut values);

        let stmt = Statement::from_sql_and_values(self.database.get_database_backend(), sql, values);
        let row = self.database.query_one(stmt).await?;
        let count: i64 = row.and_then(|r| r.try_get("", "total").ok()).unwrap_or(0);
        Ok(count.max(0) as u64)
    }
}
