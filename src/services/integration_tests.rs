//! Storage-backed tests for the ledger, the report and the employee snapshot.
//!
//! These run against a real Postgres: set `DATABASE_URL` to a server the test
//! user may create databases on, then `cargo test -- --ignored`.

use super::{
    employee::{self, EmployeeFields},
    ledger::{self, NewTransaction},
    report, user,
};
use crate::{
    errors::AppError,
    models::{CreateTransactionRequest, PaymentStatus, ReportQuery},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::PgPool;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn department(pool: &PgPool, code: &str, name: &str, gross: Decimal, deduction: Decimal) {
    sqlx::query(
        "INSERT INTO departments (department_code, department_name, gross_salary, total_deduction) VALUES ($1, $2, $3, $4)",
    )
    .bind(code)
    .bind(name)
    .bind(gross)
    .bind(deduction)
    .execute(pool)
    .await
    .unwrap();
}

fn fields(first_name: &str, department_code: &str) -> EmployeeFields {
    EmployeeFields {
        first_name: first_name.to_string(),
        last_name: "Tester".to_string(),
        department_code: department_code.to_string(),
        position: "Analyst".to_string(),
    }
}

async fn hire(pool: &PgPool, first_name: &str, department_code: &str) -> i64 {
    employee::create_employee(pool, &fields(first_name, department_code))
        .await
        .unwrap()
}

async fn net_salary_of(pool: &PgPool, employee_id: i64) -> Decimal {
    sqlx::query_scalar("SELECT net_salary FROM employees WHERE id = $1")
        .bind(employee_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn pay(pool: &PgPool, employee_id: i64, on: NaiveDate, basic: Decimal, allowances: Decimal, deductions: Decimal) -> i64 {
    let new = NewTransaction::from_request(CreateTransactionRequest {
        employee_id,
        transaction_date: on,
        basic_salary: basic,
        allowances: Some(allowances),
        deductions: Some(deductions),
        remarks: None,
    })
    .unwrap();
    ledger::create_transaction(pool, &new).await.unwrap().id
}

fn window(start: Option<NaiveDate>, end: Option<NaiveDate>, department_code: Option<&str>) -> ReportQuery {
    ReportQuery {
        start_date: start,
        end_date: end,
        department_code: department_code.map(str::to_string),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn worked_example_reports_one_employee_and_8200(pool: PgPool) {
    department(&pool, "D", "Delivery", dec!(5000), dec!(1000)).await;
    let e = hire(&pool, "Eve", "D").await;
    assert_eq!(net_salary_of(&pool, e).await, dec!(4000));

    pay(&pool, e, date(2026, 1, 31), dec!(4000), dec!(200), dec!(100)).await;
    pay(&pool, e, date(2026, 2, 28), dec!(4000), dec!(200), dec!(100)).await;

    let listed = ledger::list_transactions(&pool).await.unwrap();
    assert!(listed.iter().all(|t| t.net_amount == dec!(4100)));

    let rows = report::generate_report(&pool, &window(Some(date(2026, 1, 1)), Some(date(2026, 2, 28)), None))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].department_name, "Delivery");
    assert_eq!(rows[0].employee_count, 1);
    assert_eq!(rows[0].total_net_amount, dec!(8200));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn department_changes_do_not_reach_existing_employees(pool: PgPool) {
    department(&pool, "D", "Delivery", dec!(5000), dec!(1000)).await;
    let e = hire(&pool, "Eve", "D").await;

    sqlx::query("UPDATE departments SET gross_salary = 9000 WHERE department_code = 'D'")
        .execute(&pool)
        .await
        .unwrap();
    assert_eq!(net_salary_of(&pool, e).await, dec!(4000));

    // Only an employee write re-takes the snapshot.
    employee::update_employee(&pool, e, &fields("Eve", "D")).await.unwrap();
    assert_eq!(net_salary_of(&pool, e).await, dec!(8000));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn employees_need_an_existing_department(pool: PgPool) {
    let err = employee::create_employee(&pool, &fields("Eve", "NOPE")).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn new_transactions_are_pending_and_unpaid(pool: PgPool) {
    department(&pool, "D", "Delivery", dec!(5000), dec!(1000)).await;
    let e = hire(&pool, "Eve", "D").await;

    let new = NewTransaction::from_request(CreateTransactionRequest {
        employee_id: e,
        transaction_date: date(2026, 3, 31),
        basic_salary: dec!(3000),
        allowances: None,
        deductions: Some(dec!(250.75)),
        remarks: Some("March".into()),
    })
    .unwrap();
    let created = ledger::create_transaction(&pool, &new).await.unwrap();

    assert_eq!(created.net_amount, dec!(2749.25));
    assert_eq!(created.allowances, Decimal::ZERO);
    assert_eq!(created.payment_status, PaymentStatus::Pending);
    assert_eq!(created.payment_date, None);
    assert_eq!(created.remarks.as_deref(), Some("March"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn unknown_employee_writes_nothing(pool: PgPool) {
    let new = NewTransaction::from_request(CreateTransactionRequest {
        employee_id: 999,
        transaction_date: date(2026, 3, 31),
        basic_salary: dec!(1),
        allowances: None,
        deductions: None,
        remarks: None,
    })
    .unwrap();

    let err = ledger::create_transaction(&pool, &new).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM salary_transactions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn paying_stamps_the_payment_date_and_cancelling_clears_it(pool: PgPool) {
    department(&pool, "D", "Delivery", dec!(5000), dec!(1000)).await;
    let e = hire(&pool, "Eve", "D").await;
    let t = pay(&pool, e, date(2026, 1, 31), dec!(100), dec!(0), dec!(0)).await;

    let paid = ledger::transition_status(&pool, t, PaymentStatus::Paid).await.unwrap();
    assert_eq!(paid.payment_status, PaymentStatus::Paid);
    let stamped = paid.payment_date.expect("paid transactions carry a payment date");
    assert!(stamped >= paid.created_at);
    assert_eq!(paid.net_amount, dec!(100));

    let again = ledger::transition_status(&pool, t, PaymentStatus::Paid).await.unwrap();
    assert_eq!(again.payment_date, Some(stamped));

    let cancelled = ledger::transition_status(&pool, t, PaymentStatus::Cancelled).await.unwrap();
    assert_eq!(cancelled.payment_status, PaymentStatus::Cancelled);
    assert_eq!(cancelled.payment_date, None);
    assert_eq!(cancelled.net_amount, dec!(100));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn cancelled_transactions_can_still_be_paid(pool: PgPool) {
    department(&pool, "D", "Delivery", dec!(5000), dec!(1000)).await;
    let e = hire(&pool, "Eve", "D").await;
    let t = pay(&pool, e, date(2026, 1, 31), dec!(100), dec!(0), dec!(0)).await;

    let cancelled = ledger::transition_status(&pool, t, PaymentStatus::Cancelled).await.unwrap();
    assert_eq!(cancelled.payment_status, PaymentStatus::Cancelled);
    assert_eq!(cancelled.payment_date, None);

    let again = ledger::transition_status(&pool, t, PaymentStatus::Cancelled).await.unwrap();
    assert_eq!(again.payment_date, None);

    let paid = ledger::transition_status(&pool, t, PaymentStatus::Paid).await.unwrap();
    assert_eq!(paid.payment_status, PaymentStatus::Paid);
    assert!(paid.payment_date.is_some());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn missing_transactions_are_not_found(pool: PgPool) {
    let err = ledger::transition_status(&pool, 404, PaymentStatus::Paid).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn report_filters_by_date_and_department(pool: PgPool) {
    department(&pool, "ENG", "Engineering", dec!(5000), dec!(500)).await;
    department(&pool, "SAL", "Sales", dec!(3000), dec!(300)).await;
    department(&pool, "HR", "People", dec!(2000), dec!(0)).await;
    let ada = hire(&pool, "Ada", "ENG").await;
    let bob = hire(&pool, "Bob", "ENG").await;
    let cy = hire(&pool, "Cy", "SAL").await;

    pay(&pool, ada, date(2026, 1, 15), dec!(5000), dec!(100), dec!(500)).await;
    pay(&pool, bob, date(2026, 1, 31), dec!(5000), dec!(0), dec!(500)).await;
    pay(&pool, cy, date(2026, 2, 1), dec!(3000), dec!(50), dec!(300)).await;
    pay(&pool, ada, date(2025, 12, 31), dec!(5000), dec!(0), dec!(0)).await;

    // Unfiltered: every department with entries, totals preserved, People omitted.
    let all = report::generate_report(&pool, &ReportQuery::default()).await.unwrap();
    let names: Vec<_> = all.iter().map(|r| r.department_name.as_str()).collect();
    assert_eq!(names, ["Engineering", "Sales"]);
    let ledger_net: Decimal = ledger::list_transactions(&pool)
        .await
        .unwrap()
        .iter()
        .map(|t| t.net_amount)
        .sum();
    assert_eq!(all.iter().map(|r| r.total_net_amount).sum::<Decimal>(), ledger_net);

    // Inclusive bounds: both January entries, neither December nor February.
    let january = report::generate_report(&pool, &window(Some(date(2026, 1, 15)), Some(date(2026, 1, 31)), None))
        .await
        .unwrap();
    assert_eq!(january.len(), 1);
    assert_eq!(january[0].employee_count, 2);
    assert_eq!(january[0].total_net_amount, dec!(9100));

    // Department filter yields at most that department.
    let sales = report::generate_report(&pool, &window(None, None, Some("SAL"))).await.unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].department_name, "Sales");

    let none = report::generate_report(&pool, &window(None, None, Some("HR"))).await.unwrap();
    assert!(none.is_empty());

    // Open lower bound.
    let until_2025 = report::generate_report(&pool, &window(None, Some(date(2025, 12, 31)), None))
        .await
        .unwrap();
    assert_eq!(until_2025.len(), 1);
    assert_eq!(until_2025[0].total_net_amount, dec!(5000));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn report_orders_by_name_and_keeps_namesakes_apart(pool: PgPool) {
    department(&pool, "OPS-2", "Operations", dec!(1000), dec!(0)).await;
    department(&pool, "OPS-1", "Operations", dec!(1000), dec!(0)).await;
    department(&pool, "ACC", "Accounting", dec!(1000), dec!(0)).await;
    let ann = hire(&pool, "Ann", "OPS-1").await;
    let ben = hire(&pool, "Ben", "OPS-1").await;
    let cat = hire(&pool, "Cat", "OPS-2").await;
    let dan = hire(&pool, "Dan", "ACC").await;

    pay(&pool, ann, date(2026, 1, 31), dec!(100), dec!(0), dec!(0)).await;
    pay(&pool, ann, date(2026, 2, 28), dec!(100), dec!(0), dec!(0)).await;
    pay(&pool, ben, date(2026, 2, 28), dec!(50), dec!(5), dec!(10)).await;
    pay(&pool, cat, date(2026, 2, 28), dec!(300), dec!(0), dec!(0)).await;
    pay(&pool, dan, date(2026, 2, 28), dec!(400), dec!(0), dec!(0)).await;

    let rows = report::generate_report(&pool, &ReportQuery::default()).await.unwrap();

    let names: Vec<_> = rows.iter().map(|r| r.department_name.as_str()).collect();
    assert_eq!(names, ["Accounting", "Operations", "Operations"]);

    // OPS-1 sorts before OPS-2: three payments, two distinct employees.
    assert_eq!(rows[1].employee_count, 2);
    assert_eq!(rows[1].total_basic_salary, dec!(250));
    assert_eq!(rows[1].total_allowances, dec!(5));
    assert_eq!(rows[1].total_deductions, dec!(10));
    assert_eq!(rows[1].total_net_amount, dec!(245));

    assert_eq!(rows[2].employee_count, 1);
    assert_eq!(rows[2].total_net_amount, dec!(300));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn inverted_date_ranges_report_nothing(pool: PgPool) {
    department(&pool, "D", "Delivery", dec!(5000), dec!(1000)).await;
    let e = hire(&pool, "Eve", "D").await;
    pay(&pool, e, date(2026, 1, 31), dec!(100), dec!(0), dec!(0)).await;

    let rows = report::generate_report(&pool, &window(Some(date(2026, 2, 1)), Some(date(2026, 1, 1)), None))
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn list_is_newest_date_first_with_names(pool: PgPool) {
    department(&pool, "D", "Delivery", dec!(5000), dec!(1000)).await;
    let e = hire(&pool, "Eve", "D").await;
    let older = pay(&pool, e, date(2026, 1, 31), dec!(1), dec!(0), dec!(0)).await;
    let newer = pay(&pool, e, date(2026, 2, 28), dec!(1), dec!(0), dec!(0)).await;

    let listed = ledger::list_transactions(&pool).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|t| t.id).collect();
    assert_eq!(ids, [newer, older]);
    assert_eq!(listed[0].employee_name, "Eve Tester");
    assert_eq!(listed[0].department_code, "D");
    assert_eq!(listed[0].department_name, "Delivery");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn summary_splits_amounts_by_status(pool: PgPool) {
    department(&pool, "D", "Delivery", dec!(5000), dec!(1000)).await;
    let e = hire(&pool, "Eve", "D").await;
    let a = pay(&pool, e, date(2026, 1, 31), dec!(100), dec!(0), dec!(0)).await;
    let b = pay(&pool, e, date(2026, 2, 28), dec!(200), dec!(0), dec!(0)).await;
    pay(&pool, e, date(2026, 3, 31), dec!(400), dec!(0), dec!(0)).await;

    ledger::transition_status(&pool, a, PaymentStatus::Paid).await.unwrap();
    ledger::transition_status(&pool, b, PaymentStatus::Cancelled).await.unwrap();

    let summary = ledger::summarize_ledger(&pool).await.unwrap();
    assert_eq!(summary.transaction_count, 3);
    assert_eq!(summary.paid_count, 1);
    assert_eq!(summary.cancelled_count, 1);
    assert_eq!(summary.pending_count, 1);
    assert_eq!(summary.total_paid_amount, dec!(100));
    assert_eq!(summary.total_pending_amount, dec!(400));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn admin_bootstrap_reports_a_taken_email_and_honours_admin_email(pool: PgPool) {
    sqlx::query(
        "INSERT INTO users (username, password_hash, full_name, email) VALUES ('someone', 'x', 'Some One', 'admin@localhost')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let err = user::ensure_admin(&pool, "admin", "secret!", None).await.unwrap_err();
    match err {
        AppError::Conflict(message) => assert!(message.contains("ADMIN_EMAIL"), "{message}"),
        other => panic!("expected a conflict, got {other:?}"),
    }

    user::ensure_admin(&pool, "admin", "secret!", Some("root@example.com")).await.unwrap();
    // A second boot resets the password and keeps the row.
    user::ensure_admin(&pool, "admin", "changed!", Some("root@example.com")).await.unwrap();

    let admins: Vec<(String, String)> =
        sqlx::query_as("SELECT username, email FROM users WHERE role = 'admin'")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(admins, [("admin".to_string(), "root@example.com".to_string())]);
}
