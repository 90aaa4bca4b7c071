// src/handlers/department.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult, Violations},
    extract::{AppJson, AppPath},
    models::{CreateDepartmentRequest, Department, UpdateDepartmentRequest},
    services::ledger::MAX_AMOUNT,
    state::AppState,
};
use axum::{Json, extract::State, http::StatusCode};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tracing::info;

fn check_baseline(violations: &mut Violations, gross_salary: Decimal, total_deduction: Decimal) {
    violations
        .check(gross_salary >= Decimal::ZERO, "gross_salary", "must not be negative")
        .check(gross_salary <= MAX_AMOUNT, "gross_salary", "exceeds the maximum amount")
        .check(total_deduction >= Decimal::ZERO, "total_deduction", "must not be negative")
        .check(total_deduction <= MAX_AMOUNT, "total_deduction", "exceeds the maximum amount");
}

/// List all departments
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses(
        (status = 200, description = "List of departments", body = Vec<Department>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Departments"
)]
pub async fn list_departments(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Department>>> {
    let departments = sqlx::query_as::<_, Department>(
        "SELECT * FROM departments ORDER BY department_name, department_code",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(departments))
}

/// Get a single department
#[utoipa::path(
    get,
    path = "/api/v1/departments/{code}",
    params(("code" = String, Path, description = "Department code")),
    responses(
        (status = 200, description = "Department detail", body = Department),
        (status = 404, description = "Department not found"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Departments"
)]
pub async fn get_department(
    _auth: AuthUser,
    State(state): State<AppState>,
    AppPath(code): AppPath<String>,
) -> AppResult<Json<Department>> {
    let department = sqlx::query_as::<_, Department>(
        "SELECT * FROM departments WHERE department_code = $1",
    )
    .bind(&code)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Department {} not found", code)))?;

    Ok(Json(department))
}

/// Create a department with its salary baseline
#[utoipa::path(
    post,
    path = "/api/v1/departments",
    request_body = CreateDepartmentRequest,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 400, description = "Invalid department"),
        (status = 409, description = "Department code already exists"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Departments"
)]
pub async fn create_department(
    _auth: AuthUser,
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateDepartmentRequest>,
) -> AppResult<(StatusCode, Json<Department>)> {
    let mut violations = Violations::new();
    violations
        .require_text(&body.department_code, "department_code")
        .require_text(&body.department_name, "department_name");
    check_baseline(&mut violations, body.gross_salary, body.total_deduction);
    violations.finish()?;

    let department = sqlx::query_as::<_, Department>(
        r#"INSERT INTO departments (department_code, department_name, gross_salary, total_deduction)
           VALUES ($1, $2, $3, $4)
           RETURNING *"#,
    )
    .bind(body.department_code.trim())
    .bind(body.department_name.trim())
    .bind(body.gross_salary)
    .bind(body.total_deduction)
    .fetch_one(&state.db)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => AppError::Conflict(format!(
            "Department {} already exists",
            body.department_code.trim()
        )),
        other => other,
    })?;

    info!("Department {} created", department.department_code);

    Ok((StatusCode::CREATED, Json(department)))
}

/// Update a department's name and salary baseline.
/// Existing employees keep the net salary they were saved with.
#[utoipa::path(
    put,
    path = "/api/v1/departments/{code}",
    request_body = UpdateDepartmentRequest,
    params(("code" = String, Path, description = "Department code")),
    responses(
        (status = 200, description = "Department updated", body = Department),
        (status = 400, description = "Invalid department"),
        (status = 404, description = "Department not found"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Departments"
)]
pub async fn update_department(
    _auth: AuthUser,
    State(state): State<AppState>,
    AppPath(code): AppPath<String>,
    AppJson(body): AppJson<UpdateDepartmentRequest>,
) -> AppResult<Json<Department>> {
    let mut violations = Violations::new();
    violations.require_text(&body.department_name, "department_name");
    check_baseline(&mut violations, body.gross_salary, body.total_deduction);
    violations.finish()?;

    let department = sqlx::query_as::<_, Department>(
        r#"UPDATE departments
           SET department_name = $1, gross_salary = $2, total_deduction = $3
           WHERE department_code = $4
           RETURNING *"#,
    )
    .bind(body.department_name.trim())
    .bind(body.gross_salary)
    .bind(body.total_deduction)
    .bind(&code)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Department {} not found", code)))?;

    info!("Department {} updated", department.department_code);

    Ok(Json(department))
}

/// Delete a department that no employee belongs to
#[utoipa::path(
    delete,
    path = "/api/v1/departments/{code}",
    params(("code" = String, Path, description = "Department code")),
    responses(
        (status = 200, description = "Department deleted"),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Department still has employees"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Departments"
)]
pub async fn delete_department(
    _auth: AuthUser,
    State(state): State<AppState>,
    AppPath(code): AppPath<String>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("DELETE FROM departments WHERE department_code = $1")
        .bind(&code)
        .execute(&state.db)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => {
                AppError::Conflict(format!("Department {} still has employees", code))
            }
            other => other,
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Department {} not found", code)));
    }

    info!("Department {} deleted", code);

    Ok(Json(json!({ "message": "Department deleted successfully" })))
}
