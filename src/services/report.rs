// src/services/report.rs

use crate::{
    errors::AppResult,
    models::{ReportQuery, ReportRow},
};
use sqlx::PgPool;
use tracing::debug;

/// Per-department salary totals over the ledger entries selected by `query`.
///
/// One row per department that has matching entries, ordered by department
/// name, then department code, so two departments sharing a name stay
/// separate and the order is stable. `employee_count` counts distinct
/// employees, not transactions.
pub async fn generate_report(db: &PgPool, query: &ReportQuery) -> AppResult<Vec<ReportRow>> {
    let rows = sqlx::query_as::<_, ReportRow>(
        r#"SELECT
            d.department_name,
            COUNT(DISTINCT st.employee_id) AS employee_count,
            SUM(st.basic_salary) AS total_basic_salary,
            SUM(st.allowances) AS total_allowances,
            SUM(st.deductions) AS total_deductions,
            SUM(st.net_amount) AS total_net_amount
           FROM salary_transactions st
           JOIN employees e ON st.employee_id = e.id
           JOIN departments d ON e.department_code = d.department_code
           WHERE ($1::date IS NULL OR st.transaction_date >= $1)
             AND ($2::date IS NULL OR st.transaction_date <= $2)
             AND ($3::text IS NULL OR e.department_code = $3)
           GROUP BY d.department_code, d.department_name
           ORDER BY d.department_name, d.department_code"#,
    )
    .bind(query.start_date)
    .bind(query.end_date)
    .bind(query.department_code.as_deref())
    .fetch_all(db)
    .await?;

    debug!("Report produced {} department rows for {:?}", rows.len(), query);

    Ok(rows)
}
