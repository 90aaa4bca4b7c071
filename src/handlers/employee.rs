// src/handlers/employee.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    extract::{AppJson, AppPath},
    models::{CreatedResponse, Employee, EmployeeRequest},
    services::employee::{self, EmployeeFields},
    state::AppState,
};
use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use tracing::info;

const EMPLOYEE_COLUMNS: &str = r#"
    SELECT e.id, e.first_name, e.last_name, e.department_code, d.department_name,
           e.position, e.net_salary, e.created_at
    FROM employees e
    JOIN departments d ON e.department_code = d.department_code"#;

/// Onboard a new employee. Net salary is taken from the department baseline.
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = EmployeeRequest,
    responses(
        (status = 201, description = "Employee created", body = CreatedResponse),
        (status = 400, description = "Invalid employee"),
        (status = 404, description = "Department not found"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn create_employee(
    _auth: AuthUser,
    State(state): State<AppState>,
    AppJson(body): AppJson<EmployeeRequest>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let fields = EmployeeFields::from_request(body)?;
    let id = employee::create_employee(&state.db, &fields).await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// List all employees
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    responses(
        (status = 200, description = "List of employees", body = Vec<Employee>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn list_employees(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Employee>>> {
    let employees = sqlx::query_as::<_, Employee>(&format!("{EMPLOYEE_COLUMNS} ORDER BY e.id"))
        .fetch_all(&state.db)
        .await?;

    Ok(Json(employees))
}

/// Get a single employee
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = i64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee detail", body = Employee),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn get_employee(
    _auth: AuthUser,
    State(state): State<AppState>,
    AppPath(employee_id): AppPath<i64>,
) -> AppResult<Json<Employee>> {
    let employee = sqlx::query_as::<_, Employee>(&format!("{EMPLOYEE_COLUMNS} WHERE e.id = $1"))
        .bind(employee_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))?;

    Ok(Json(employee))
}

/// Update an employee. Net salary is re-taken from the (possibly new) department.
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    request_body = EmployeeRequest,
    params(("employee_id" = i64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee updated"),
        (status = 400, description = "Invalid employee"),
        (status = 404, description = "Employee or department not found"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn update_employee(
    _auth: AuthUser,
    State(state): State<AppState>,
    AppPath(employee_id): AppPath<i64>,
    AppJson(body): AppJson<EmployeeRequest>,
) -> AppResult<Json<Value>> {
    let fields = EmployeeFields::from_request(body)?;
    employee::update_employee(&state.db, employee_id, &fields).await?;

    Ok(Json(json!({ "message": "Employee updated successfully" })))
}

/// Delete an employee without salary transactions
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = i64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee deleted"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Employee has salary transactions"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn delete_employee(
    _auth: AuthUser,
    State(state): State<AppState>,
    AppPath(employee_id): AppPath<i64>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("DELETE FROM employees WHERE id = $1")
        .bind(employee_id)
        .execute(&state.db)
        .await
        .map_err(|e| match AppError::from(e) {
            // The ledger is never deleted from, so neither are its employees.
            AppError::Conflict(_) => AppError::Conflict(format!(
                "Employee {} has salary transactions",
                employee_id
            )),
            other => other,
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Employee {} not found", employee_id)));
    }

    info!("Employee {} deleted", employee_id);

    Ok(Json(json!({ "message": "Employee deleted successfully" })))
}
