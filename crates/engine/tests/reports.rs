use chrono::{Days, NaiveDate};
use sea_orm::{ConnectionTrait, Database, Statement};

use engine::{
    ClosingSeriesParams, Engine, EngineError, IncomeThresholdParams, IncomeWindowParams,
    LedgerFilter, NewTransaction, RecentWindowParams, RecordTransaction, SegmentDivisors,
    SegmentParams, TransactionKind, User,
};
use migration::MigratorTrait;

async fn engine_with_user(initial_balance_minor: i64) -> (Engine, User) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password, initial_balance_minor) VALUES (?, ?, ?)",
        vec![
            "alice".into(),
            "password".into(),
            initial_balance_minor.into(),
        ],
    ))
    .await
    .unwrap();

    let engine = Engine::builder().database(db).build();
    let user = User {
        id: "alice".to_string(),
        initial_balance_minor,
    };
    (engine, user)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
}

fn days_back(back: u64) -> NaiveDate {
    today().checked_sub_days(Days::new(back)).unwrap()
}

async fn record(
    engine: &Engine,
    user: &User,
    kind: TransactionKind,
    amount_minor: i64,
    occurred_on: NaiveDate,
) -> i64 {
    let (_, balance_after) = engine
        .record_transaction(
            user,
            RecordTransaction {
                kind,
                amount_minor,
                category_id: None,
                description: None,
                occurred_on,
            },
        )
        .await
        .unwrap();
    balance_after
}

async fn record_credit_with_category(
    engine: &Engine,
    user: &User,
    amount_minor: i64,
    category_id: Option<i64>,
    occurred_on: NaiveDate,
) {
    engine
        .record_transaction(
            user,
            RecordTransaction {
                kind: TransactionKind::Credit,
                amount_minor,
                category_id,
                description: None,
                occurred_on,
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn credit_then_debit_produce_expected_closing_series() {
    let (engine, user) = engine_with_user(0).await;

    let after_credit = record(&engine, &user, TransactionKind::Credit, 50, days_back(1)).await;
    assert_eq!(after_credit, 50);

    let after_debit = record(&engine, &user, TransactionKind::Debit, 20, today()).await;
    assert_eq!(after_debit, 30);

    let series = engine
        .daily_closing_series(&user, today(), &ClosingSeriesParams { requested_days: 2 })
        .await
        .unwrap();

    assert_eq!(series.len(), 2);
    assert_eq!((series[0].date, series[0].balance_minor), (today(), 30));
    assert_eq!(
        (series[1].date, series[1].balance_minor),
        (days_back(1), 50)
    );
}

#[tokio::test]
async fn balance_after_matches_reconstruction() {
    let (engine, user) = engine_with_user(1_000).await;

    let after = record(&engine, &user, TransactionKind::Credit, 250, today()).await;
    assert_eq!(after, 1_250);
    assert_eq!(engine.balance_as_of(&user, today()).await.unwrap(), 1_250);

    let after = record(&engine, &user, TransactionKind::Debit, 750, today()).await;
    assert_eq!(after, 500);
    assert_eq!(engine.balance_as_of(&user, today()).await.unwrap(), 500);
}

#[tokio::test]
async fn insufficient_balance_rejects_and_writes_nothing() {
    let (engine, user) = engine_with_user(100).await;

    let err = engine
        .record_transaction(
            &user,
            RecordTransaction {
                kind: TransactionKind::Debit,
                amount_minor: 150,
                category_id: None,
                description: None,
                occurred_on: today(),
            },
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::InsufficientBalance {
            user_id: "alice".to_string(),
            attempted_on: today(),
            attempted_amount_minor: 150,
            available_balance_minor: 100,
        }
    );

    assert_eq!(engine.balance_as_of(&user, today()).await.unwrap(), 100);
    let debits = engine
        .ledger()
        .count_matching(&user.id, TransactionKind::Debit, &LedgerFilter::default())
        .await
        .unwrap();
    assert_eq!(debits, 0);
}

#[tokio::test]
async fn rejects_non_positive_amounts() {
    let (engine, user) = engine_with_user(100).await;

    for amount in [0, -50] {
        let res = engine
            .record_transaction(
                &user,
                RecordTransaction {
                    kind: TransactionKind::Credit,
                    amount_minor: amount,
                    category_id: None,
                    description: None,
                    occurred_on: today(),
                },
            )
            .await;
        assert!(matches!(res, Err(EngineError::InvalidAmount(_))));
    }
}

#[tokio::test]
async fn reconstruction_is_incremental_between_dates() {
    let (engine, user) = engine_with_user(500).await;

    record(&engine, &user, TransactionKind::Credit, 100, days_back(5)).await;
    record(&engine, &user, TransactionKind::Debit, 40, days_back(3)).await;
    record(&engine, &user, TransactionKind::Credit, 70, days_back(2)).await;
    record(&engine, &user, TransactionKind::Debit, 10, today()).await;

    // balance(d2) = balance(d1) + signed amounts with d1 < occurred_on <= d2.
    let at_d4 = engine.balance_as_of(&user, days_back(4)).await.unwrap();
    let at_d1 = engine.balance_as_of(&user, days_back(1)).await.unwrap();
    assert_eq!(at_d4, 600);
    assert_eq!(at_d1, at_d4 - 40 + 70);

    let at_today = engine.balance_as_of(&user, today()).await.unwrap();
    assert_eq!(at_today, at_d1 - 10);
}

#[tokio::test]
async fn reports_are_idempotent_without_writes() {
    let (engine, user) = engine_with_user(200).await;
    record(&engine, &user, TransactionKind::Credit, 80, days_back(2)).await;

    let params = ClosingSeriesParams { requested_days: 5 };
    let first = engine
        .daily_closing_series(&user, today(), &params)
        .await
        .unwrap();
    let second = engine
        .daily_closing_series(&user, today(), &params)
        .await
        .unwrap();
    assert_eq!(first, second);

    let avg_a = engine.average_balance(&user, today(), &params).await.unwrap();
    let avg_b = engine.average_balance(&user, today(), &params).await.unwrap();
    assert_eq!(avg_a, avg_b);
}

#[tokio::test]
async fn default_series_covers_90_days_ending_today() {
    let (engine, user) = engine_with_user(0).await;

    let series = engine
        .daily_closing_series(&user, today(), &ClosingSeriesParams::default())
        .await
        .unwrap();

    assert_eq!(series.len(), 90);
    for (i, day) in series.iter().enumerate() {
        assert_eq!(day.date, days_back(i as u64));
    }
}

#[tokio::test]
async fn non_positive_day_count_yields_empty_series() {
    let (engine, user) = engine_with_user(100).await;

    for days in [0, -3] {
        let series = engine
            .daily_closing_series(
                &user,
                today(),
                &ClosingSeriesParams {
                    requested_days: days,
                },
            )
            .await
            .unwrap();
        assert!(series.is_empty());
    }
}

#[tokio::test]
async fn average_balance_divides_by_requested_days() {
    let (engine, user) = engine_with_user(100).await;
    record(&engine, &user, TransactionKind::Credit, 60, today()).await;

    // Closing balances over 4 days: 160, 100, 100, 100.
    let avg = engine
        .average_balance(&user, today(), &ClosingSeriesParams { requested_days: 4 })
        .await
        .unwrap();
    assert_eq!(avg, 115.0);
}

#[tokio::test]
async fn average_balance_reports_zero_day_count() {
    let (engine, user) = engine_with_user(100).await;

    let err = engine
        .average_balance(&user, today(), &ClosingSeriesParams { requested_days: 0 })
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::DivisionByZero("requested_days"));
}

#[tokio::test]
async fn segment_averages_crossed_and_matched_divisors() {
    let (engine, user) = engine_with_user(0).await;

    // Closing balances i days back: b(0)=400, b(1)=300, b(2)=300, b(3)=100.
    record(&engine, &user, TransactionKind::Credit, 100, days_back(3)).await;
    record(&engine, &user, TransactionKind::Credit, 200, days_back(2)).await;
    record(&engine, &user, TransactionKind::Credit, 100, today()).await;

    let crossed = engine
        .average_segment_balance(
            &user,
            today(),
            &SegmentParams {
                total_days: 4,
                first_days: 2,
                last_days: 1,
                divisors: SegmentDivisors::Crossed,
            },
        )
        .await
        .unwrap();
    // Recent window spans first_days (b(0)+b(1)=700) but divides by
    // last_days; the old window is b(3)=100 divided by first_days.
    assert_eq!(crossed.first_segment_minor, 50.0);
    assert_eq!(crossed.last_segment_minor, 700.0);

    let matched = engine
        .average_segment_balance(
            &user,
            today(),
            &SegmentParams {
                total_days: 4,
                first_days: 2,
                last_days: 1,
                divisors: SegmentDivisors::Matched,
            },
        )
        .await
        .unwrap();
    // first = (b(2)+b(3))/2, last = b(0)/1.
    assert_eq!(matched.first_segment_minor, 200.0);
    assert_eq!(matched.last_segment_minor, 400.0);
}

#[tokio::test]
async fn segment_averages_reject_zero_divisors() {
    let (engine, user) = engine_with_user(0).await;

    let err = engine
        .average_segment_balance(
            &user,
            today(),
            &SegmentParams {
                total_days: 90,
                first_days: 0,
                last_days: 30,
                divisors: SegmentDivisors::Crossed,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::DivisionByZero("first_days"));

    let err = engine
        .average_segment_balance(
            &user,
            today(),
            &SegmentParams {
                total_days: 90,
                first_days: 30,
                last_days: 0,
                divisors: SegmentDivisors::Crossed,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::DivisionByZero("last_days"));
}

#[tokio::test]
async fn income_sum_excludes_sentinel_category_and_null_categories() {
    let (engine, user) = engine_with_user(0).await;

    record_credit_with_category(&engine, &user, 10, Some(5), days_back(2)).await;
    record_credit_with_category(&engine, &user, 20, Some(18_020_004), days_back(2)).await;
    // NULL category: excluded by the `category_id != ?` clause, on purpose.
    record_credit_with_category(&engine, &user, 7, None, days_back(2)).await;
    // Outside the window.
    record_credit_with_category(&engine, &user, 500, Some(5), days_back(40)).await;
    // Debits never count as income.
    record(&engine, &user, TransactionKind::Debit, 3, today()).await;

    let income = engine
        .income_sum(&user, today(), &IncomeWindowParams::default())
        .await
        .unwrap();
    assert_eq!(income, 10);
}

#[tokio::test]
async fn income_sum_matches_client_side_fold() {
    let (engine, user) = engine_with_user(0).await;

    record_credit_with_category(&engine, &user, 125, Some(1), days_back(1)).await;
    record_credit_with_category(&engine, &user, 75, Some(2), days_back(10)).await;
    record_credit_with_category(&engine, &user, 50, Some(18_020_004), days_back(10)).await;

    let params = IncomeWindowParams::default();
    let pushed_down = engine.income_sum(&user, today(), &params).await.unwrap();

    let folded: i64 = engine
        .ledger()
        .up_to(&user.id, today())
        .await
        .unwrap()
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Credit)
        .filter(|tx| tx.occurred_on >= days_back(params.last_days as u64))
        .filter(|tx| tx.category_id.is_some_and(|c| c != params.except_category))
        .map(|tx| tx.amount_minor)
        .sum();

    assert_eq!(pushed_down, folded);
    assert_eq!(pushed_down, 200);
}

#[tokio::test]
async fn debit_count_respects_window() {
    let (engine, user) = engine_with_user(10_000).await;

    record(&engine, &user, TransactionKind::Debit, 10, today()).await;
    record(&engine, &user, TransactionKind::Debit, 10, days_back(10)).await;
    record(&engine, &user, TransactionKind::Debit, 10, days_back(30)).await;
    record(&engine, &user, TransactionKind::Debit, 10, days_back(31)).await;
    record(&engine, &user, TransactionKind::Credit, 10, today()).await;

    let count = engine
        .debit_count(&user, today(), &RecentWindowParams::default())
        .await
        .unwrap();
    // The 31-days-back debit falls outside `occurred_on >= today - 30`.
    assert_eq!(count, 3);
}

#[tokio::test]
async fn income_over_threshold_is_strictly_greater() {
    let (engine, user) = engine_with_user(0).await;

    record(&engine, &user, TransactionKind::Credit, 500, days_back(400)).await;
    record(&engine, &user, TransactionKind::Credit, 2_000, days_back(2)).await;
    record(&engine, &user, TransactionKind::Credit, 1_600, today()).await;
    // Exactly at the bound: excluded.
    record(&engine, &user, TransactionKind::Credit, 1_500, today()).await;

    let income = engine
        .income_over_threshold(&user, &IncomeThresholdParams::default())
        .await
        .unwrap();
    assert_eq!(income, 3_600);
}

// record_transaction validates against a balance read before the insert, so
// two writers can interleave and jointly overdraw. The ledger itself accepts
// such a state and reconstruction stays well-defined; this is the documented
// contract, not a bug in the fold.
#[tokio::test]
async fn reconstruction_tolerates_overdrawn_ledger() {
    let (engine, user) = engine_with_user(100).await;

    engine
        .ledger()
        .insert(
            NewTransaction::new(
                user.id.clone(),
                today(),
                80,
                TransactionKind::Debit,
                None,
                None,
            )
            .unwrap(),
        )
        .await
        .unwrap();
    engine
        .ledger()
        .insert(
            NewTransaction::new(
                user.id.clone(),
                today(),
                80,
                TransactionKind::Debit,
                None,
                None,
            )
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(engine.balance_as_of(&user, today()).await.unwrap(), -60);

    // Further debits are rejected against the negative balance.
    let res = engine
        .record_transaction(
            &user,
            RecordTransaction {
                kind: TransactionKind::Debit,
                amount_minor: 1,
                category_id: None,
                description: None,
                occurred_on: today(),
            },
        )
        .await;
    assert!(matches!(
        res,
        Err(EngineError::InsufficientBalance { .. })
    ));
}
