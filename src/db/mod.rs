// src/db/mod.rs

use std::collections::{hash_map::Entry, HashMap};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sqlx::{
    query_as, query_scalar,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    FromRow, SqlitePool,
};
use tracing::{debug, info, warn};

use crate::error::{KpiError, Result};
use crate::models::{Dataset, Employee, JoinedRow, KpiRecord};

const EMPLOYEES: &str = "employees";
const KPI: &str = "kpi";

/// Opens the SQLite file read-only. The file is never created.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let conn_err = |source: sqlx::Error| KpiError::Connection {
        url: database_url.to_string(),
        source,
    };

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(conn_err)?
        .read_only(true)
        .create_if_missing(false);

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
        .map_err(conn_err)?;

    info!(database_url, "connected to SQLite");
    Ok(pool)
}

// Raw `employees` row; NULL columns decode as `None`, never as 0 or "".
#[derive(Debug, FromRow)]
struct EmployeeRow {
    emp_id: Option<i64>,
    name: Option<String>,
    department: Option<String>,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = KpiError;

    fn try_from(row: EmployeeRow) -> Result<Self> {
        let emp_id = row.emp_id;
        let missing = |field| KpiError::MissingField { relation: EMPLOYEES, emp_id, field };

        Ok(Employee {
            emp_id: emp_id.ok_or_else(|| missing("emp_id"))?,
            name: row.name.ok_or_else(|| missing("name"))?,
            department: row.department.ok_or_else(|| missing("department"))?,
        })
    }
}

// Raw `kpi` row; converted to `KpiRecord` only when every field is usable.
#[derive(Debug, FromRow)]
struct KpiRow {
    emp_id: Option<i64>,
    review_date: Option<String>,
    sales: Option<f64>,
    customer_satisfaction: Option<f64>,
    tasks_completed: Option<i64>,
    hours_worked: Option<f64>,
}

impl TryFrom<KpiRow> for KpiRecord {
    type Error = KpiError;

    fn try_from(row: KpiRow) -> Result<Self> {
        let missing = |field| KpiError::MissingField { relation: KPI, emp_id: row.emp_id, field };

        // a NULL key joins nothing
        let emp_id = row.emp_id.ok_or_else(|| missing("emp_id"))?;
        let raw_date = row.review_date.as_deref().ok_or_else(|| missing("review_date"))?;
        Ok(KpiRecord {
            emp_id,
            review_date: parse_review_date(raw_date)?,
            sales: row.sales.ok_or_else(|| missing("sales"))?,
            customer_satisfaction: row
                .customer_satisfaction
                .ok_or_else(|| missing("customer_satisfaction"))?,
            tasks_completed: row.tasks_completed.ok_or_else(|| missing("tasks_completed"))?,
            hours_worked: row.hours_worked.ok_or_else(|| missing("hours_worked"))?,
        })
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, naive timestamps and RFC 3339
/// timestamps; only the date as written is kept.
pub fn parse_review_date(raw: &str) -> Result<NaiveDate> {
    let s = raw.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.date_naive()))
        .map_err(|_| KpiError::InvalidDate(raw.to_string()))
}

async fn relation_exists(pool: &SqlitePool, relation: &'static str) -> Result<bool> {
    let count: i64 = query_scalar(
        r#"SELECT COUNT(*) FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1"#,
    )
    .bind(relation)
    .fetch_one(pool)
    .await
    .map_err(|source| KpiError::Query { relation, source })?;
    Ok(count > 0)
}

// Keeps the rows that convert, warning about and counting the rest.
fn keep_usable<R, T>(relation: &'static str, rows: Vec<R>) -> (Vec<T>, usize)
where
    T: TryFrom<R, Error = KpiError>,
{
    let mut kept = Vec::with_capacity(rows.len());
    let mut skipped = 0;
    for row in rows {
        match T::try_from(row) {
            Ok(value) => kept.push(value),
            Err(e) => {
                warn!(relation, error = %e, "dropping row");
                skipped += 1;
            }
        }
    }
    (kept, skipped)
}

/// Loads `employees`, returning the usable rows and the number dropped.
/// A row with a NULL emp_id, name or department is dropped.
pub async fn load_employees(pool: &SqlitePool) -> Result<(Vec<Employee>, usize)> {
    if !relation_exists(pool, EMPLOYEES).await? {
        warn!(relation = EMPLOYEES, "relation not found, treating as empty");
        return Ok((Vec::new(), 0));
    }

    let rows = query_as::<_, EmployeeRow>(
        r#"SELECT CAST(emp_id AS INTEGER) AS emp_id,
                  CAST(name AS TEXT) AS name,
                  CAST(department AS TEXT) AS department
           FROM employees"#,
    )
    .fetch_all(pool)
    .await
    .map_err(|source| KpiError::Query { relation: EMPLOYEES, source })?;

    Ok(keep_usable(EMPLOYEES, rows))
}

/// Loads `kpi`, returning the usable records and the number of dropped rows.
/// A row with a NULL emp_id or metric, or whose review_date does not parse,
/// is dropped.
pub async fn load_kpi(pool: &SqlitePool) -> Result<(Vec<KpiRecord>, usize)> {
    if !relation_exists(pool, KPI).await? {
        warn!(relation = KPI, "relation not found, treating as empty");
        return Ok((Vec::new(), 0));
    }

    let rows = query_as::<_, KpiRow>(
        r#"SELECT CAST(emp_id AS INTEGER) AS emp_id,
                  CAST(review_date AS TEXT) AS review_date,
                  CAST(sales AS REAL) AS sales,
                  CAST(customer_satisfaction AS REAL) AS customer_satisfaction,
                  CAST(tasks_completed AS INTEGER) AS tasks_completed,
                  CAST(hours_worked AS REAL) AS hours_worked
           FROM kpi"#,
    )
    .fetch_all(pool)
    .await
    .map_err(|source| KpiError::Query { relation: KPI, source })?;

    Ok(keep_usable(KPI, rows))
}

/// Inner join on emp_id, in kpi order. KPI rows without an employee are
/// dropped; for a repeated emp_id the first employee wins.
pub fn join(employees: &[Employee], kpi: &[KpiRecord]) -> Vec<JoinedRow> {
    let mut by_id: HashMap<i64, &Employee> = HashMap::with_capacity(employees.len());
    for employee in employees {
        match by_id.entry(employee.emp_id) {
            Entry::Vacant(slot) => {
                slot.insert(employee);
            }
            Entry::Occupied(_) => {
                warn!(emp_id = employee.emp_id, "duplicate employee id, keeping first");
            }
        }
    }

    kpi.iter()
        .filter_map(|record| by_id.get(&record.emp_id).map(|e| JoinedRow::new(e, record)))
        .collect()
}

pub async fn load_dataset(pool: &SqlitePool) -> Result<Dataset> {
    let (employees, skipped_employee_rows) = load_employees(pool).await?;
    let (kpi, skipped_kpi_rows) = load_kpi(pool).await?;
    let rows = join(&employees, &kpi);

    debug!(
        employees = employees.len(),
        kpi = kpi.len(),
        joined = rows.len(),
        skipped_employees = skipped_employee_rows,
        skipped_kpi = skipped_kpi_rows,
        "dataset loaded"
    );
    Ok(Dataset { employees, kpi, rows, skipped_employee_rows, skipped_kpi_rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(emp_id: i64, name: &str, department: &str) -> Employee {
        Employee { emp_id, name: name.into(), department: department.into() }
    }

    fn record(emp_id: i64, sales: f64) -> KpiRecord {
        KpiRecord {
            emp_id,
            review_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            sales,
            customer_satisfaction: 4.0,
            tasks_completed: 10,
            hours_worked: 8.0,
        }
    }

    #[test]
    fn parses_supported_date_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        for raw in [
            "2024-01-15",
            "2024/01/15",
            " 2024-01-15 ",
            "2024-01-15 00:00:00",
            "2024-01-15 13:45:10.250",
            "2024-01-15T08:00:00",
            "2024-01-15T08:00:00Z",
            "2024-01-15T23:30:00-05:00",
            "2024-01-15T00:15:00.5+02:00",
        ] {
            assert_eq!(parse_review_date(raw).unwrap(), expected, "input {raw:?}");
        }
    }

    #[test]
    fn rejects_unparseable_dates() {
        for raw in ["", "yesterday", "2024-13-01", "15/01/2024"] {
            match parse_review_date(raw) {
                Err(KpiError::InvalidDate(s)) => assert_eq!(s, raw),
                other => panic!("expected InvalidDate for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn kpi_row_with_null_metric_is_rejected() {
        let row = KpiRow {
            emp_id: Some(7),
            review_date: Some("2024-02-01".into()),
            sales: Some(1.0),
            customer_satisfaction: None,
            tasks_completed: Some(1),
            hours_worked: Some(1.0),
        };
        match KpiRecord::try_from(row) {
            Err(KpiError::MissingField { relation: "kpi", emp_id: Some(7), field }) => {
                assert_eq!(field, "customer_satisfaction")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn kpi_row_with_null_emp_id_is_rejected() {
        let row = KpiRow {
            emp_id: None,
            review_date: Some("2024-02-01".into()),
            sales: Some(1.0),
            customer_satisfaction: Some(4.0),
            tasks_completed: Some(1),
            hours_worked: Some(1.0),
        };
        match KpiRecord::try_from(row) {
            Err(KpiError::MissingField { emp_id: None, field: "emp_id", .. }) => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn employee_rows_need_every_column() {
        let row = |emp_id, name: Option<&str>, department: Option<&str>| EmployeeRow {
            emp_id,
            name: name.map(Into::into),
            department: department.map(Into::into),
        };
        let (kept, skipped): (Vec<Employee>, usize) = keep_usable(
            EMPLOYEES,
            vec![
                row(Some(1), Some("Alice"), Some("Sales")),
                row(None, Some("Ghost"), Some("Ops")),
                row(Some(2), None, Some("Ops")),
                row(Some(3), Some("Cara"), None),
            ],
        );
        assert_eq!(kept, vec![employee(1, "Alice", "Sales")]);
        assert_eq!(skipped, 3);
    }

    #[test]
    fn join_drops_unmatched_rows_and_keeps_kpi_order() {
        let employees = vec![employee(1, "Alice", "Sales"), employee(2, "Bob", "Ops")];
        let kpi = vec![record(2, 20.0), record(9, 99.0), record(1, 10.0)];

        let rows = join(&employees, &kpi);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Bob");
        assert_eq!(rows[0].department, "Ops");
        assert_eq!(rows[1].name, "Alice");
        assert_eq!(rows[1].sales, 10.0);
    }

    #[test]
    fn join_keeps_first_employee_for_duplicate_ids() {
        let employees = vec![employee(1, "Alice", "Sales"), employee(1, "Impostor", "Ops")];
        let rows = join(&employees, &[record(1, 5.0)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Alice");
    }

    #[test]
    fn join_of_empty_inputs_is_empty() {
        assert!(join(&[], &[record(1, 1.0)]).is_empty());
        assert!(join(&[employee(1, "A", "B")], &[]).is_empty());
    }
}
