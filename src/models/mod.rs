// src/models/mod.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::{IntoParams, ToSchema};

// ─── User ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserPublic {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        UserPublic {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserPublic,
}

// ─── Department ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Department {
    pub department_code: String,
    pub department_name: String,
    pub gross_salary: Decimal,
    pub total_deduction: Decimal,
    pub created_at: DateTime<Utc>,
}

/// The part of a department an employee write needs.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct SalaryBaseline {
    pub gross_salary: Decimal,
    pub total_deduction: Decimal,
}

impl SalaryBaseline {
    /// Net pay implied by the baseline. Stored on employees as a snapshot.
    pub fn net_salary(&self) -> Decimal {
        self.gross_salary - self.total_deduction
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDepartmentRequest {
    pub department_code: String,
    pub department_name: String,
    pub gross_salary: Decimal,
    pub total_deduction: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDepartmentRequest {
    pub department_name: String,
    pub gross_salary: Decimal,
    pub total_deduction: Decimal,
}

// ─── Employee ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Employee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub department_code: String,
    pub department_name: String,
    pub position: String,
    /// Department `gross_salary - total_deduction` as of the last employee write.
    pub net_salary: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Body shared by employee create and update.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EmployeeRequest {
    pub first_name: String,
    pub last_name: String,
    pub department_code: String,
    pub position: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    pub id: i64,
}

// ─── Salary Transactions ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq, Hash)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SalaryTransaction {
    pub id: i64,
    pub employee_id: i64,
    pub transaction_date: NaiveDate,
    pub basic_salary: Decimal,
    pub allowances: Decimal,
    pub deductions: Decimal,
    pub net_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_date: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Ledger row joined with the owning employee and department.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TransactionView {
    pub id: i64,
    pub employee_id: i64,
    pub employee_name: String,
    pub department_code: String,
    pub department_name: String,
    pub transaction_date: NaiveDate,
    pub basic_salary: Decimal,
    pub allowances: Decimal,
    pub deductions: Decimal,
    pub net_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_date: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTransactionRequest {
    pub employee_id: i64,
    /// Format: "YYYY-MM-DD"
    pub transaction_date: NaiveDate,
    pub basic_salary: Decimal,
    #[serde(default)]
    pub allowances: Option<Decimal>,
    #[serde(default)]
    pub deductions: Option<Decimal>,
    #[serde(default)]
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: PaymentStatus,
}

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LedgerSummary {
    pub transaction_count: i64,
    pub pending_count: i64,
    pub paid_count: i64,
    pub cancelled_count: i64,
    pub total_paid_amount: Decimal,
    pub total_pending_amount: Decimal,
}

// ─── Report ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// Inclusive lower bound, "YYYY-MM-DD"
    #[serde(default, deserialize_with = "empty_as_none")]
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound, "YYYY-MM-DD"
    #[serde(default, deserialize_with = "empty_as_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub department_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, PartialEq)]
pub struct ReportRow {
    pub department_name: String,
    pub employee_count: i64,
    pub total_basic_salary: Decimal,
    pub total_allowances: Decimal,
    pub total_deductions: Decimal,
    pub total_net_amount: Decimal,
}

// Browsers submit untouched form fields as `?start_date=`.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

// ─── JWT Claims ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub role: UserRole,
    pub exp: usize,
    pub iat: usize,
}
