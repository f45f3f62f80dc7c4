// src/aggregate/mod.rs
//
// Pure views over the joined table; no I/O.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{
    DepartmentAverage, JoinedRow, KpiViews, ProductivityScore, SatisfactionScore,
};

pub const TOP_SATISFACTION_LIMIT: usize = 10;
pub const ALL_DEPARTMENTS: &str = "All";

/// Rounds half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

// ─────────────────────────────────────────────────────────────────────────────
// Department filter
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DepartmentFilter {
    #[default]
    All,
    Department(String),
}

impl DepartmentFilter {
    /// `None`, blank and `"All"` all mean no filter.
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            None | Some("") => Self::All,
            Some(s) if s == ALL_DEPARTMENTS => Self::All,
            Some(s) => Self::Department(s.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => ALL_DEPARTMENTS,
            Self::Department(d) => d,
        }
    }

    pub fn matches(&self, row: &JoinedRow) -> bool {
        match self {
            Self::All => true,
            Self::Department(d) => row.department == *d,
        }
    }
}

pub fn filter_rows(rows: &[JoinedRow], filter: &DepartmentFilter) -> Vec<JoinedRow> {
    rows.iter().filter(|r| filter.matches(r)).cloned().collect()
}

/// Dropdown options: "All" followed by the distinct departments, sorted.
pub fn department_options(rows: &[JoinedRow]) -> Vec<String> {
    let distinct: BTreeSet<&str> = rows.iter().map(|r| r.department.as_str()).collect();
    std::iter::once(ALL_DEPARTMENTS.to_string())
        .chain(distinct.into_iter().map(str::to_string))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Views
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct DepartmentTotals {
    rows: usize,
    sales: f64,
    customer_satisfaction: f64,
    tasks_completed: f64,
}

/// Mean sales, satisfaction and tasks per department, 2 decimals, ordered by
/// department name.
pub fn department_averages(rows: &[JoinedRow]) -> Vec<DepartmentAverage> {
    let mut groups: BTreeMap<&str, DepartmentTotals> = BTreeMap::new();
    for row in rows {
        let t = groups.entry(row.department.as_str()).or_default();
        t.rows += 1;
        t.sales += row.sales;
        t.customer_satisfaction += row.customer_satisfaction;
        t.tasks_completed += row.tasks_completed as f64;
    }

    groups
        .into_iter()
        .map(|(department, t)| {
            let n = t.rows as f64;
            DepartmentAverage {
                department: department.to_string(),
                sales: round_to(t.sales / n, 2),
                customer_satisfaction: round_to(t.customer_satisfaction / n, 2),
                tasks_completed: round_to(t.tasks_completed / n, 2),
            }
        })
        .collect()
}

/// Mean satisfaction per employee name, best first, at most `limit` entries.
/// Equal means keep ascending name order.
pub fn top_satisfaction(rows: &[JoinedRow], limit: usize) -> Vec<SatisfactionScore> {
    let mut groups: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for row in rows {
        let (n, sum) = groups.entry(row.name.as_str()).or_default();
        *n += 1;
        *sum += row.customer_satisfaction;
    }

    let mut scores: Vec<SatisfactionScore> = groups
        .into_iter()
        .map(|(name, (n, sum))| SatisfactionScore {
            name: name.to_string(),
            customer_satisfaction: sum / n as f64,
        })
        .collect();
    // stable: ties stay in name order
    scores.sort_by(|a, b| b.customer_satisfaction.total_cmp(&a.customer_satisfaction));
    scores.truncate(limit);
    scores
}

/// Total tasks over total hours per employee name, 3 decimals, best first.
/// Employees with zero total hours get `None` and are listed last.
pub fn productivity_ranking(rows: &[JoinedRow]) -> Vec<ProductivityScore> {
    let mut groups: BTreeMap<&str, (i64, f64)> = BTreeMap::new();
    for row in rows {
        let (tasks, hours) = groups.entry(row.name.as_str()).or_default();
        *tasks = tasks.saturating_add(row.tasks_completed);
        *hours += row.hours_worked;
    }

    let mut scores: Vec<ProductivityScore> = groups
        .into_iter()
        .map(|(name, (tasks, hours))| ProductivityScore {
            name: name.to_string(),
            tasks_completed: tasks,
            hours_worked: hours,
            productivity: (hours != 0.0).then(|| round_to(tasks as f64 / hours, 3)),
        })
        .collect();
    scores.sort_by(|a, b| match (a.productivity, b.productivity) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    scores
}

pub fn compute_views(rows: &[JoinedRow]) -> KpiViews {
    KpiViews {
        department_averages: department_averages(rows),
        top_satisfaction: top_satisfaction(rows, TOP_SATISFACTION_LIMIT),
        productivity: productivity_ranking(rows),
    }
}
