// src/handlers/salary.rs

use crate::{
    auth::AuthUser,
    errors::AppResult,
    extract::{AppJson, AppPath, AppQuery},
    models::{
        CreateTransactionRequest, CreatedResponse, LedgerSummary, ReportQuery, ReportRow,
        TransactionView, UpdateStatusRequest,
    },
    services::{
        ledger::{self, NewTransaction},
        report,
    },
    state::AppState,
};
use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use tracing::info;

/// Record a salary payment for an employee. Starts out `pending`.
#[utoipa::path(
    post,
    path = "/api/v1/salary/transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Salary transaction recorded", body = CreatedResponse),
        (status = 400, description = "Invalid amounts or date"),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn create_transaction(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateTransactionRequest>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let new = NewTransaction::from_request(body)?;
    let created = ledger::create_transaction(&state.db, &new).await?;

    info!("{} recorded salary transaction {}", auth.username, created.id);

    Ok((StatusCode::CREATED, Json(CreatedResponse { id: created.id })))
}

/// List every salary transaction, newest transaction date first
#[utoipa::path(
    get,
    path = "/api/v1/salary/transactions",
    responses(
        (status = 200, description = "Salary transactions", body = Vec<TransactionView>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn list_transactions(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<TransactionView>>> {
    Ok(Json(ledger::list_transactions(&state.db).await?))
}

/// Mark a pending transaction as paid or cancelled
#[utoipa::path(
    put,
    path = "/api/v1/salary/transactions/{transaction_id}/status",
    request_body = UpdateStatusRequest,
    params(("transaction_id" = i64, Path, description = "Salary transaction ID")),
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Status must be paid or cancelled"),
        (status = 404, description = "Salary transaction not found"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn update_transaction_status(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(transaction_id): AppPath<i64>,
    AppJson(body): AppJson<UpdateStatusRequest>,
) -> AppResult<Json<Value>> {
    let updated = ledger::transition_status(&state.db, transaction_id, body.status).await?;

    info!(
        "{} set salary transaction {} to {}",
        auth.username, updated.id, updated.payment_status
    );

    Ok(Json(json!({})))
}

/// Per-department salary totals over a date range
#[utoipa::path(
    get,
    path = "/api/v1/salary/report",
    params(ReportQuery),
    responses(
        (status = 200, description = "One row per department with transactions", body = Vec<ReportRow>),
        (status = 400, description = "Malformed date"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn salary_report(
    _auth: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ReportQuery>,
) -> AppResult<Json<Vec<ReportRow>>> {
    Ok(Json(report::generate_report(&state.db, &query).await?))
}

/// Ledger-wide counts and amounts by payment status
#[utoipa::path(
    get,
    path = "/api/v1/salary/summary",
    responses(
        (status = 200, description = "Ledger summary", body = LedgerSummary),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn ledger_summary(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<LedgerSummary>> {
    Ok(Json(ledger::summarize_ledger(&state.db).await?))
}
