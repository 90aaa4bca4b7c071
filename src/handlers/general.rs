use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use serde_json::json;
use tracing::warn;

/// Root handler: a short landing page pointing at the docs and the API
pub async fn root_handler() -> impl IntoResponse {
    Html(r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <title>Salary Ledger API</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 720px; margin: 40px auto; padding: 0 16px; color: #1f2937; }
    code { background: #f3f4f6; padding: 1px 6px; border-radius: 4px; }
    li { margin: 4px 0; }
  </style>
</head>
<body>
  <h1>Salary Ledger API</h1>
  <p>Departments, employees, salary transactions and department salary reports.</p>
  <p><a href="/docs">Swagger UI</a> · <a href="/health">Health</a></p>
  <h2>Routes</h2>
  <ul>
    <li><code>POST /api/v1/auth/register</code>, <code>POST /api/v1/auth/login</code>, <code>GET /api/v1/auth/me</code></li>
    <li><code>/api/v1/departments</code> and <code>/api/v1/departments/{code}</code></li>
    <li><code>/api/v1/employees</code> and <code>/api/v1/employees/{id}</code></li>
    <li><code>GET|POST /api/v1/salary/transactions</code></li>
    <li><code>PUT /api/v1/salary/transactions/{id}/status</code></li>
    <li><code>GET /api/v1/salary/report?start_date=&amp;end_date=&amp;department_code=</code></li>
    <li><code>GET /api/v1/salary/summary</code></li>
  </ul>
</body>
</html>"#)
}

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected",
                "service": "salary-ledger",
                "version": env!("CARGO_PKG_VERSION"),
            })),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "database": "disconnected",
                })),
            )
        }
    }
}
