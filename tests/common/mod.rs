#![allow(dead_code)]

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub type KpiSeed<'a> = (i64, &'a str, f64, f64, i64, f64);

pub const SAMPLE_EMPLOYEES: &[(i64, &str, &str)] = &[
    (1, "Alice", "Sales"),
    (2, "Bob", "Sales"),
    (3, "Cara", "Support"),
    (4, "Dan", "Engineering"),
    (5, "Eve", "Ops"),
];

// emp_id, review_date, sales, csat, tasks, hours
pub const SAMPLE_KPI: &[KpiSeed<'static>] = &[
    (1, "2024-01-31", 100.0, 4.0, 10, 5.0),
    (2, "2024-01-31", 200.0, 5.0, 20, 10.0),
    (3, "2024-01-31", 50.0, 3.0, 9, 3.0),
    (3, "2024/02/29", 70.0, 5.0, 3, 3.0),
    (4, "2024-01-31 09:00:00", 0.0, 4.2, 30, 12.0),
    (5, "2024-01-31", 10.0, 2.0, 0, 0.0),
    (99, "2024-01-31", 1.0, 1.0, 1, 1.0),
    (1, "not a date", 999.0, 1.0, 1, 1.0),
];

pub fn database_url(path: &Path) -> String {
    format!("sqlite://{}", path.display())
}

/// Creates an SQLite file at `path` with `employees` and `kpi` tables.
pub async fn seed_database(
    path: &Path,
    employees: &[(i64, &str, &str)],
    kpi: &[KpiSeed<'_>],
) -> String {
    let options = SqliteConnectOptions::new().filename(path).create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("create sqlite file");

    sqlx::query(
        "CREATE TABLE employees (emp_id INTEGER PRIMARY KEY, name TEXT NOT NULL, department TEXT NOT NULL)",
    )
    .execute(&pool)
    .await
    .expect("create employees");
    sqlx::query(
        "CREATE TABLE kpi (id INTEGER PRIMARY KEY AUTOINCREMENT, emp_id INTEGER NOT NULL, review_date TEXT,
                           sales REAL, customer_satisfaction REAL, tasks_completed INTEGER, hours_worked REAL)",
    )
    .execute(&pool)
    .await
    .expect("create kpi");

    for (emp_id, name, department) in employees {
        sqlx::query("INSERT INTO employees (emp_id, name, department) VALUES (?1, ?2, ?3)")
            .bind(*emp_id)
            .bind(*name)
            .bind(*department)
            .execute(&pool)
            .await
            .expect("insert employee");
    }
    for (emp_id, review_date, sales, csat, tasks, hours) in kpi {
        sqlx::query(
            "INSERT INTO kpi (emp_id, review_date, sales, customer_satisfaction, tasks_completed, hours_worked)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(*emp_id)
        .bind(*review_date)
        .bind(*sales)
        .bind(*csat)
        .bind(*tasks)
        .bind(*hours)
        .execute(&pool)
        .await
        .expect("insert kpi");
    }

    pool.close().await;
    database_url(path)
}

pub async fn seed_sample(dir: &Path) -> String {
    seed_database(&dir.join("employee_kpi.db"), SAMPLE_EMPLOYEES, SAMPLE_KPI).await
}

/// Creates an SQLite file at `path` by running `statements` in order.
pub async fn seed_with_sql(path: &Path, statements: &[&str]) -> String {
    let options = SqliteConnectOptions::new().filename(path).create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("create sqlite file");
    for statement in statements {
        sqlx::query(statement).execute(&pool).await.expect(statement);
    }
    pool.close().await;
    database_url(path)
}

/// An SQLite file with no tables at all.
pub async fn empty_database(path: &Path) -> String {
    let options = SqliteConnectOptions::new().filename(path).create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("create sqlite file");
    // sqlite only writes the file header once something is stored
    sqlx::query("PRAGMA user_version = 1")
        .execute(&pool)
        .await
        .expect("touch sqlite file");
    pool.close().await;
    database_url(path)
}
