//! Statistics API endpoints
//!
//! Every tunable is optional in the request body; the engine's params types
//! carry the documented defaults.

use api_types::stats::{
    AverageBalance, AverageBalanceResponse, AverageSegmentBalance, AverageSegmentBalanceResponse,
    DailyBalanceView, DailyClosingBalance, DailyClosingBalanceResponse, DebitCount,
    DebitCountResponse, IncomeOverThreshold, IncomeSumResponse, LastDaysIncome,
    SegmentDivisors as ApiDivisors,
};
use axum::{Extension, Json, extract::State};
use chrono::Utc;

use crate::{ServerError, server::ServerState, user};

pub async fn daily_closing_balance(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<DailyClosingBalance>,
) -> Result<Json<DailyClosingBalanceResponse>, ServerError> {
    let mut params = engine::ClosingSeriesParams::default();
    if let Some(days) = payload.requested_days {
        params.requested_days = days;
    }

    let series = state
        .engine
        .daily_closing_series(&user::engine_user(&user), Utc::now().date_naive(), &params)
        .await?;

    Ok(Json(DailyClosingBalanceResponse {
        requested_days: params.requested_days,
        closing_balances: series
            .into_iter()
            .map(|day| DailyBalanceView {
                date: day.date,
                balance_minor: day.balance_minor,
            })
            .collect(),
    }))
}

pub async fn average_balance(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<AverageBalance>,
) -> Result<Json<AverageBalanceResponse>, ServerError> {
    let mut params = engine::ClosingSeriesParams::default();
    if let Some(days) = payload.requested_days {
        params.requested_days = days;
    }

    let average_balance_minor = state
        .engine
        .average_balance(&user::engine_user(&user), Utc::now().date_naive(), &params)
        .await?;

    Ok(Json(AverageBalanceResponse {
        requested_days: params.requested_days,
        average_balance_minor,
    }))
}

pub async fn average_segment_balance(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<AverageSegmentBalance>,
) -> Result<Json<AverageSegmentBalanceResponse>, ServerError> {
    let mut params = engine::SegmentParams::default();
    if let Some(days) = payload.total_days {
        params.total_days = days;
    }
    if let Some(days) = payload.first_days {
        params.first_days = days;
    }
    if let Some(days) = payload.last_days {
        params.last_days = days;
    }
    if let Some(divisors) = payload.divisors {
        params.divisors = match divisors {
            ApiDivisors::Crossed => engine::SegmentDivisors::Crossed,
            ApiDivisors::Matched => engine::SegmentDivisors::Matched,
        };
    }

    let averages = state
        .engine
        .average_segment_balance(&user::engine_user(&user), Utc::now().date_naive(), &params)
        .await?;

    Ok(Json(AverageSegmentBalanceResponse {
        first_segment_minor: averages.first_segment_minor,
        last_segment_minor: averages.last_segment_minor,
    }))
}

pub async fn last_n_days_income(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<LastDaysIncome>,
) -> Result<Json<IncomeSumResponse>, ServerError> {
    let mut params = engine::IncomeWindowParams::default();
    if let Some(days) = payload.last_days {
        params.last_days = days;
    }
    if let Some(category) = payload.except_category_id {
        params.except_category = category;
    }

    let income_minor = state
        .engine
        .income_sum(&user::engine_user(&user), Utc::now().date_naive(), &params)
        .await?;

    Ok(Json(IncomeSumResponse { income_minor }))
}

pub async fn debit_count(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<DebitCount>,
) -> Result<Json<DebitCountResponse>, ServerError> {
    let mut params = engine::RecentWindowParams::default();
    if let Some(days) = payload.last_days {
        params.last_days = days;
    }

    let debit_count = state
        .engine
        .debit_count(&user::engine_user(&user), Utc::now().date_naive(), &params)
        .await?;

    Ok(Json(DebitCountResponse { debit_count }))
}

pub async fn income_over_threshold(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<IncomeOverThreshold>,
) -> Result<Json<IncomeSumResponse>, ServerError> {
    let mut params = engine::IncomeThresholdParams::default();
    if let Some(amount) = payload.amount_over_minor {
        params.amount_over_minor = amount;
    }

    let income_minor = state
        .engine
        .income_over_threshold(&user::engine_user(&user), &params)
        .await?;

    Ok(Json(IncomeSumResponse { income_minor }))
}
