// src/openapi.rs

use crate::models::{
    AuthResponse, CreateDepartmentRequest, CreateTransactionRequest, CreatedResponse, Department,
    Employee, EmployeeRequest, LedgerSummary, LoginRequest, PaymentStatus, RegisterRequest,
    ReportRow, TransactionView, UpdateDepartmentRequest, UpdateStatusRequest, UserPublic,
    UserRole,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Salary Ledger API",
        version = "1.0.0",
        description = "Departments, employees and a salary transaction ledger with \
            payment-status tracking and per-department salary reports.",
        license(name = "MIT")
    ),
    paths(
        // Auth
        crate::handlers::user::register_user,
        crate::handlers::user::login_user,
        crate::handlers::user::get_current_user,
        // Departments
        crate::handlers::department::list_departments,
        crate::handlers::department::get_department,
        crate::handlers::department::create_department,
        crate::handlers::department::update_department,
        crate::handlers::department::delete_department,
        // Employees
        crate::handlers::employee::create_employee,
        crate::handlers::employee::list_employees,
        crate::handlers::employee::get_employee,
        crate::handlers::employee::update_employee,
        crate::handlers::employee::delete_employee,
        // Salary
        crate::handlers::salary::create_transaction,
        crate::handlers::salary::list_transactions,
        crate::handlers::salary::update_transaction_status,
        crate::handlers::salary::salary_report,
        crate::handlers::salary::ledger_summary,
    ),
    components(
        schemas(
            RegisterRequest, LoginRequest, AuthResponse, UserPublic, UserRole,
            Department, CreateDepartmentRequest, UpdateDepartmentRequest,
            Employee, EmployeeRequest, CreatedResponse,
            CreateTransactionRequest, UpdateStatusRequest, PaymentStatus,
            TransactionView, ReportRow, LedgerSummary,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Register, log in and inspect the current user"),
        (name = "Departments", description = "Departments and their salary baselines"),
        (name = "Employees", description = "Employees and their net salary snapshot"),
        (name = "Salary", description = "Salary transactions, status changes and reports"),
    )
)]
pub struct ApiDoc;
