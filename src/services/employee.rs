// src/services/employee.rs
//
// Employee writes snapshot the department's net salary. The snapshot is taken
// inside the same transaction as the write and is never refreshed when the
// department's baseline changes later.

use crate::{
    errors::{AppError, AppResult, Violations},
    models::{EmployeeRequest, SalaryBaseline},
};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

/// Trimmed, validated employee fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeFields {
    pub first_name: String,
    pub last_name: String,
    pub department_code: String,
    pub position: String,
}

impl EmployeeFields {
    pub fn from_request(req: EmployeeRequest) -> AppResult<Self> {
        Violations::new()
            .require_text(&req.first_name, "first_name")
            .require_text(&req.last_name, "last_name")
            .require_text(&req.department_code, "department_code")
            .require_text(&req.position, "position")
            .finish()?;

        Ok(Self {
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            department_code: req.department_code.trim().to_string(),
            position: req.position.trim().to_string(),
        })
    }
}

/// Reads the department baseline and share-locks the row until `tx` ends, so
/// the department cannot be deleted or re-priced under the employee write.
async fn baseline_for(
    tx: &mut Transaction<'_, Postgres>,
    department_code: &str,
) -> AppResult<SalaryBaseline> {
    sqlx::query_as::<_, SalaryBaseline>(
        "SELECT gross_salary, total_deduction FROM departments WHERE department_code = $1 FOR SHARE",
    )
    .bind(department_code)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Department {} not found", department_code)))
}

pub async fn create_employee(db: &PgPool, fields: &EmployeeFields) -> AppResult<i64> {
    let mut tx = db.begin().await?;

    let baseline = baseline_for(&mut tx, &fields.department_code).await?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"INSERT INTO employees (first_name, last_name, department_code, position, net_salary)
           VALUES ($1, $2, $3, $4, $5)
           RETURNING id"#,
    )
    .bind(&fields.first_name)
    .bind(&fields.last_name)
    .bind(&fields.department_code)
    .bind(&fields.position)
    .bind(baseline.net_salary())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        "Employee {} created in {} with net salary {}",
        id,
        fields.department_code,
        baseline.net_salary()
    );

    Ok(id)
}

/// Rewrites the employee and re-takes the net salary snapshot.
pub async fn update_employee(db: &PgPool, employee_id: i64, fields: &EmployeeFields) -> AppResult<()> {
    let mut tx = db.begin().await?;

    let baseline = baseline_for(&mut tx, &fields.department_code).await?;

    let result = sqlx::query(
        r#"UPDATE employees
           SET first_name = $1, last_name = $2, department_code = $3, position = $4, net_salary = $5
           WHERE id = $6"#,
    )
    .bind(&fields.first_name)
    .bind(&fields.last_name)
    .bind(&fields.department_code)
    .bind(&fields.position)
    .bind(baseline.net_salary())
    .bind(employee_id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Employee {} not found", employee_id)));
    }

    tx.commit().await?;

    info!("Employee {} updated", employee_id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn net_salary_is_gross_minus_deduction() {
        let baseline = SalaryBaseline {
            gross_salary: dec!(5000),
            total_deduction: dec!(1000),
        };
        assert_eq!(baseline.net_salary(), dec!(4000));
    }

    #[test]
    fn fields_are_trimmed() {
        let fields = EmployeeFields::from_request(EmployeeRequest {
            first_name: " Ada ".into(),
            last_name: "Lovelace".into(),
            department_code: " ENG".into(),
            position: "Engineer ".into(),
        })
        .unwrap();
        assert_eq!(fields.first_name, "Ada");
        assert_eq!(fields.department_code, "ENG");
        assert_eq!(fields.position, "Engineer");
    }

    #[test]
    fn blank_fields_are_all_reported() {
        let err = EmployeeFields::from_request(EmployeeRequest {
            first_name: "".into(),
            last_name: "Lovelace".into(),
            department_code: "  ".into(),
            position: "".into(),
        })
        .unwrap_err();

        match err {
            AppError::Validation(details) => {
                let fields: Vec<_> = details.iter().map(|d| d.field.as_str()).collect();
                assert_eq!(fields, ["first_name", "department_code", "position"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
