//! Transactions API endpoint

use api_types::transaction::{
    TransactionCreated, TransactionKind as ApiKind, TransactionNew, TransactionView,
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;

use crate::{ServerError, server::ServerState, user};

fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Credit => ApiKind::Credit,
        engine::TransactionKind::Debit => ApiKind::Debit,
    }
}

fn view(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        occurred_on: tx.occurred_on,
        amount_minor: tx.amount_minor,
        kind: map_kind(tx.kind),
        category_id: tx.category_id,
        description: tx.description,
        created_at: tx.created_at.fixed_offset(),
    }
}

pub async fn record(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let kind = match payload.kind {
        ApiKind::Credit => engine::TransactionKind::Credit,
        ApiKind::Debit => engine::TransactionKind::Debit,
    };

    let (tx, balance_after_minor) = state
        .engine
        .record_transaction(
            &user::engine_user(&user),
            engine::RecordTransaction {
                kind,
                amount_minor: payload.amount_minor,
                category_id: payload.category_id,
                description: payload.description,
                occurred_on: Utc::now().date_naive(),
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionCreated {
            transaction: view(tx),
            balance_after_minor,
        }),
    ))
}
