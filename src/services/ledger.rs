// src/services/ledger.rs

use crate::{
    errors::{AppError, AppResult, Violations},
    models::{
        CreateTransactionRequest, LedgerSummary, PaymentStatus, SalaryTransaction,
        TransactionView,
    },
};
use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use sqlx::PgPool;
use tracing::info;

/// Largest amount a `NUMERIC(12,2)` component column holds.
pub const MAX_AMOUNT: Decimal = dec!(9999999999.99);

/// A validated ledger entry, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub employee_id: i64,
    pub transaction_date: NaiveDate,
    pub basic_salary: Decimal,
    pub allowances: Decimal,
    pub deductions: Decimal,
    pub net_amount: Decimal,
    pub remarks: Option<String>,
}

impl NewTransaction {
    /// Validates the request and derives `net_amount`.
    ///
    /// Amounts are rounded to cents first so the stored components always add
    /// up to the stored net amount.
    pub fn from_request(req: CreateTransactionRequest) -> AppResult<Self> {
        let allowances = req.allowances.unwrap_or(Decimal::ZERO);
        let deductions = req.deductions.unwrap_or(Decimal::ZERO);

        let mut violations = Violations::new();
        check_amount(&mut violations, "basic_salary", req.basic_salary);
        check_amount(&mut violations, "allowances", allowances);
        check_amount(&mut violations, "deductions", deductions);
        violations.check(
            (1..=9999).contains(&req.transaction_date.year()),
            "transaction_date",
            "must be a calendar date between 0001-01-01 and 9999-12-31",
        );
        violations.finish()?;

        let basic_salary = to_cents(req.basic_salary);
        let allowances = to_cents(allowances);
        let deductions = to_cents(deductions);

        Ok(Self {
            employee_id: req.employee_id,
            transaction_date: req.transaction_date,
            basic_salary,
            allowances,
            deductions,
            net_amount: net_amount(basic_salary, allowances, deductions),
            remarks: req
                .remarks
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
        })
    }
}

/// `basic + allowances - deductions`. May be negative when deductions dominate.
pub fn net_amount(basic_salary: Decimal, allowances: Decimal, deductions: Decimal) -> Decimal {
    basic_salary + allowances - deductions
}

fn to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn check_amount(violations: &mut Violations, field: &str, amount: Decimal) {
    violations
        .check(!amount.is_sign_negative() || amount.is_zero(), field, "must not be negative")
        .check(amount <= MAX_AMOUNT, field, "exceeds the maximum amount of 9999999999.99");
}

// ─── Status machine ───────────────────────────────────────────────────────────

/// What a requested status change does to a stored transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Move from `pending` to the given terminal status.
    Apply(PaymentStatus),
    /// The transaction is already in the requested terminal status.
    Unchanged,
}

/// Only terminal statuses can be requested.
pub fn check_target(target: PaymentStatus) -> AppResult<()> {
    if target.is_terminal() {
        Ok(())
    } else {
        Err(AppError::invalid("status", "must be \"paid\" or \"cancelled\""))
    }
}

/// Any stored status may move to a terminal one. Re-entering the current
/// terminal status is a no-op so the original `payment_date` survives.
pub fn plan_transition(current: PaymentStatus, target: PaymentStatus) -> AppResult<Transition> {
    check_target(target)?;
    if current == target {
        Ok(Transition::Unchanged)
    } else {
        Ok(Transition::Apply(target))
    }
}

// ─── Storage ──────────────────────────────────────────────────────────────────

pub async fn create_transaction(db: &PgPool, new: &NewTransaction) -> AppResult<SalaryTransaction> {
    let mut tx = db.begin().await?;

    // Share-lock the employee so it cannot vanish before the insert lands.
    let employee = sqlx::query_scalar::<_, i64>("SELECT id FROM employees WHERE id = $1 FOR SHARE")
        .bind(new.employee_id)
        .fetch_optional(&mut *tx)
        .await?;

    if employee.is_none() {
        return Err(AppError::NotFound(format!(
            "Employee {} not found",
            new.employee_id
        )));
    }

    let created = sqlx::query_as::<_, SalaryTransaction>(
        r#"INSERT INTO salary_transactions (
            employee_id, transaction_date, basic_salary, allowances, deductions,
            net_amount, payment_status, remarks
        ) VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7)
        RETURNING *"#,
    )
    .bind(new.employee_id)
    .bind(new.transaction_date)
    .bind(new.basic_salary)
    .bind(new.allowances)
    .bind(new.deductions)
    .bind(new.net_amount)
    .bind(new.remarks.as_deref())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        "Salary transaction {} recorded for employee {} (net {})",
        created.id, created.employee_id, created.net_amount
    );

    Ok(created)
}

pub async fn transition_status(
    db: &PgPool,
    transaction_id: i64,
    target: PaymentStatus,
) -> AppResult<SalaryTransaction> {
    check_target(target)?;

    let mut tx = db.begin().await?;

    let current = sqlx::query_as::<_, SalaryTransaction>(
        "SELECT * FROM salary_transactions WHERE id = $1 FOR UPDATE",
    )
    .bind(transaction_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Salary transaction {} not found", transaction_id)))?;

    let updated = match plan_transition(current.payment_status, target)? {
        Transition::Unchanged => current,
        Transition::Apply(status) => {
            sqlx::query_as::<_, SalaryTransaction>(
                r#"UPDATE salary_transactions
                   SET payment_status = $1,
                       payment_date = CASE WHEN $2 THEN NOW() ELSE NULL END
                   WHERE id = $3
                   RETURNING *"#,
            )
            .bind(status)
            .bind(status == PaymentStatus::Paid)
            .bind(transaction_id)
            .fetch_one(&mut *tx)
            .await?
        }
    };

    tx.commit().await?;

    info!(
        "Salary transaction {} is {}",
        updated.id, updated.payment_status
    );

    Ok(updated)
}

/// Every ledger entry with its employee and department, newest date first.
pub async fn list_transactions(db: &PgPool) -> AppResult<Vec<TransactionView>> {
    let rows = sqlx::query_as::<_, TransactionView>(
        r#"SELECT
            st.id,
            st.employee_id,
            e.first_name || ' ' || e.last_name AS employee_name,
            e.department_code,
            d.department_name,
            st.transaction_date,
            st.basic_salary,
            st.allowances,
            st.deductions,
            st.net_amount,
            st.payment_status,
            st.payment_date,
            st.remarks
           FROM salary_transactions st
           JOIN employees e ON st.employee_id = e.id
           JOIN departments d ON e.department_code = d.department_code
           ORDER BY st.transaction_date DESC, st.id DESC"#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn summarize_ledger(db: &PgPool) -> AppResult<LedgerSummary> {
    let summary = sqlx::query_as::<_, LedgerSummary>(
        r#"SELECT
            COUNT(*) AS transaction_count,
            COUNT(*) FILTER (WHERE payment_status = 'pending') AS pending_count,
            COUNT(*) FILTER (WHERE payment_status = 'paid') AS paid_count,
            COUNT(*) FILTER (WHERE payment_status = 'cancelled') AS cancelled_count,
            COALESCE(SUM(net_amount) FILTER (WHERE payment_status = 'paid'), 0) AS total_paid_amount,
            COALESCE(SUM(net_amount) FILTER (WHERE payment_status = 'pending'), 0) AS total_pending_amount
           FROM salary_transactions"#,
    )
    .fetch_one(db)
    .await?;

    Ok(summary)
}
