// src/models/mod.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ───────────────────────────────────────
// Source relations
// ───────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub emp_id: i64,
    pub name: String,
    pub department: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiRecord {
    pub emp_id: i64,              // FK → employees
    pub review_date: NaiveDate,
    pub sales: f64,
    pub customer_satisfaction: f64,
    pub tasks_completed: i64,
    pub hours_worked: f64,
}

/// One KPI record enriched with its employee's name and department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedRow {
    pub emp_id: i64,
    pub name: String,
    pub department: String,
    pub review_date: NaiveDate,
    pub sales: f64,
    pub customer_satisfaction: f64,
    pub tasks_completed: i64,
    pub hours_worked: f64,
}

impl JoinedRow {
    pub fn new(employee: &Employee, kpi: &KpiRecord) -> Self {
        Self {
            emp_id: kpi.emp_id,
            name: employee.name.clone(),
            department: employee.department.clone(),
            review_date: kpi.review_date,
            sales: kpi.sales,
            customer_satisfaction: kpi.customer_satisfaction,
            tasks_completed: kpi.tasks_completed,
            hours_worked: kpi.hours_worked,
        }
    }
}

/// Everything read from the data source in one run.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub employees: Vec<Employee>,
    pub kpi: Vec<KpiRecord>,
    pub rows: Vec<JoinedRow>,
    pub skipped_employee_rows: usize, // NULL emp_id, name or department
    pub skipped_kpi_rows: usize,      // NULL emp_id, unparseable date or NULL metric
}

// ───────────────────────────────────────
// Derived views (CSV rows + JSON payloads)
// ───────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentAverage {
    pub department: String,
    pub sales: f64,
    pub customer_satisfaction: f64,
    pub tasks_completed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatisfactionScore {
    pub name: String,
    pub customer_satisfaction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductivityScore {
    pub name: String,
    pub tasks_completed: i64,
    pub hours_worked: f64,
    pub productivity: Option<f64>, // None when hours_worked sums to zero
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiViews {
    pub department_averages: Vec<DepartmentAverage>,
    pub top_satisfaction: Vec<SatisfactionScore>,
    pub productivity: Vec<ProductivityScore>,
}
