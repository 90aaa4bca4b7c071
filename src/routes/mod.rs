// src/routes/mod.rs

use crate::{
    handlers::{
        department::{
            create_department, delete_department, get_department, list_departments,
            update_department,
        },
        employee::{create_employee, delete_employee, get_employee, list_employees, update_employee},
        general::{health_handler, root_handler},
        salary::{
            create_transaction, ledger_summary, list_transactions, salary_report,
            update_transaction_status,
        },
        user::{get_current_user, login_user, register_user},
    },
    openapi::ApiDoc,
    state::AppState,
};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // ─── Auth ─────────────────────────────────────────────
        .route("/auth/register", post(register_user))
        .route("/auth/login", post(login_user))
        .route("/auth/me", get(get_current_user))
        // ─── Departments ──────────────────────────────────────
        .route("/departments", get(list_departments).post(create_department))
        .route(
            "/departments/{code}",
            get(get_department)
                .put(update_department)
                .delete(delete_department),
        )
        // ─── Employees ────────────────────────────────────────
        .route("/employees", get(list_employees).post(create_employee))
        .route(
            "/employees/{employee_id}",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
        // ─── Salary ledger ────────────────────────────────────
        .route(
            "/salary/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route(
            "/salary/transactions/{transaction_id}/status",
            put(update_transaction_status),
        )
        .route("/salary/report", get(salary_report))
        .route("/salary/summary", get(ledger_summary))
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    match origin.and_then(|o| o.parse::<HeaderValue>().ok()) {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true),
        None => CorsLayer::permissive(),
    }
}

/// The complete application: API, docs, health and middleware.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_origin.as_deref());

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/api/v1", api_routes())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
