// src/report/mod.rs

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::charts;
use crate::error::{KpiError, Result};
use crate::models::{Dataset, KpiViews};

pub const DEPARTMENT_CSV: &str = "avg_kpi_by_department.csv";
pub const SATISFACTION_CSV: &str = "top_csat.csv";
pub const PRODUCTIVITY_CSV: &str = "productivity.csv";
pub const PRODUCTIVITY_PNG: &str = "productivity.png";
pub const DEPARTMENT_PNG: &str = "avg_kpi_by_department.png";

const DEPARTMENT_COLUMNS: &[&str] =
    &["department", "sales", "customer_satisfaction", "tasks_completed"];
const SATISFACTION_COLUMNS: &[&str] = &["name", "customer_satisfaction"];
const PRODUCTIVITY_COLUMNS: &[&str] =
    &["name", "tasks_completed", "hours_worked", "productivity"];

const SUMMARY_PRODUCTIVITY_ROWS: usize = 10;

/// Writes the CSV files and chart images for one run into `output_dir`.
#[derive(Debug, Clone)]
pub struct ReportEmitter {
    output_dir: PathBuf,
}

impl ReportEmitter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into() }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Creates the output directory if needed and (over)writes every file.
    /// Returns the written paths in a fixed order.
    pub fn emit(&self, views: &KpiViews) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir).map_err(|source| KpiError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let mut written = Vec::with_capacity(5);

        written.push(self.write_csv(
            DEPARTMENT_CSV,
            DEPARTMENT_COLUMNS,
            &views.department_averages,
        )?);
        written.push(self.write_csv(
            SATISFACTION_CSV,
            SATISFACTION_COLUMNS,
            &views.top_satisfaction,
        )?);
        written.push(self.write_csv(PRODUCTIVITY_CSV, PRODUCTIVITY_COLUMNS, &views.productivity)?);

        let path = self.output_dir.join(PRODUCTIVITY_PNG);
        charts::render_png(&path, |root| charts::draw_productivity(root, &views.productivity))?;
        written.push(path);

        let path = self.output_dir.join(DEPARTMENT_PNG);
        charts::render_png(&path, |root| {
            charts::draw_department_averages(root, &views.department_averages)
        })?;
        written.push(path);

        info!(dir = %self.output_dir.display(), files = written.len(), "report written");
        Ok(written)
    }

    /// The header is written explicitly so an empty view still yields one.
    fn write_csv<T: Serialize>(
        &self,
        file_name: &str,
        columns: &[&str],
        records: &[T],
    ) -> Result<PathBuf> {
        let path = self.output_dir.join(file_name);
        let csv_err = |source| KpiError::Csv { path: path.clone(), source };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .map_err(csv_err)?;
        writer.write_record(columns).map_err(csv_err)?;
        for record in records {
            writer.serialize(record).map_err(csv_err)?;
        }
        writer.flush().map_err(|source| KpiError::Io { path: path.clone(), source })?;
        Ok(path)
    }
}

/// Console summary printed by the batch run.
pub fn render_summary(dataset: &Dataset, views: &KpiViews) -> String {
    Summary { dataset, views }.to_string()
}

struct Summary<'a> {
    dataset: &'a Dataset,
    views: &'a KpiViews,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Summary { dataset, views } = self;
        writeln!(f, "Employees: {}", dataset.employees.len())?;
        writeln!(f, "KPI rows: {}", dataset.kpi.len())?;
        if dataset.skipped_employee_rows > 0 {
            writeln!(f, "Skipped employee rows: {}", dataset.skipped_employee_rows)?;
        }
        if dataset.skipped_kpi_rows > 0 {
            writeln!(f, "Skipped KPI rows: {}", dataset.skipped_kpi_rows)?;
        }

        writeln!(f, "\nAverage KPI by department:")?;
        writeln!(
            f,
            "{:<20} {:>12} {:>22} {:>16}",
            "department", "sales", "customer_satisfaction", "tasks_completed"
        )?;
        for a in &views.department_averages {
            writeln!(
                f,
                "{:<20} {:>12.2} {:>22.2} {:>16.2}",
                a.department, a.sales, a.customer_satisfaction, a.tasks_completed
            )?;
        }

        writeln!(f, "\nTop {} by csat:", views.top_satisfaction.len())?;
        for s in &views.top_satisfaction {
            writeln!(f, "{:<20} {:>8.3}", s.name, s.customer_satisfaction)?;
        }

        writeln!(f, "\nTop {} by productivity:", SUMMARY_PRODUCTIVITY_ROWS)?;
        for p in views.productivity.iter().take(SUMMARY_PRODUCTIVITY_ROWS) {
            let productivity = p
                .productivity
                .map(|v| format!("{v:.3}"))
                .unwrap_or_else(|| "n/a".into());
            writeln!(
                f,
                "{:<20} {:>8} {:>10.1} {:>8}",
                p.name, p.tasks_completed, p.hours_worked, productivity
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DepartmentAverage, ProductivityScore, SatisfactionScore};

    fn views() -> KpiViews {
        KpiViews {
            department_averages: vec![DepartmentAverage {
                department: "Sales".into(),
                sales: 150.0,
                customer_satisfaction: 4.5,
                tasks_completed: 15.0,
            }],
            top_satisfaction: vec![SatisfactionScore {
                name: "Bob".into(),
                customer_satisfaction: 5.0,
            }],
            productivity: vec![
                ProductivityScore {
                    name: "Alice".into(),
                    tasks_completed: 10,
                    hours_worked: 5.0,
                    productivity: Some(2.0),
                },
                ProductivityScore {
                    name: "Idle".into(),
                    tasks_completed: 0,
                    hours_worked: 0.0,
                    productivity: None,
                },
            ],
        }
    }

    #[test]
    fn csv_files_have_headers_and_blank_undefined_productivity() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = ReportEmitter::new(dir.path());
        emitter
            .write_csv(DEPARTMENT_CSV, DEPARTMENT_COLUMNS, &views().department_averages)
            .unwrap();
        emitter
            .write_csv(PRODUCTIVITY_CSV, PRODUCTIVITY_COLUMNS, &views().productivity)
            .unwrap();

        let departments = fs::read_to_string(dir.path().join(DEPARTMENT_CSV)).unwrap();
        assert_eq!(
            departments,
            "department,sales,customer_satisfaction,tasks_completed\nSales,150.0,4.5,15.0\n"
        );

        let productivity = fs::read_to_string(dir.path().join(PRODUCTIVITY_CSV)).unwrap();
        assert_eq!(
            productivity,
            "name,tasks_completed,hours_worked,productivity\nAlice,10,5.0,2.0\nIdle,0,0.0,\n"
        );
    }

    #[test]
    fn empty_view_still_gets_a_header() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = ReportEmitter::new(dir.path());
        let none: Vec<SatisfactionScore> = Vec::new();
        emitter.write_csv(SATISFACTION_CSV, SATISFACTION_COLUMNS, &none).unwrap();

        let raw = fs::read_to_string(dir.path().join(SATISFACTION_CSV)).unwrap();
        assert_eq!(raw, "name,customer_satisfaction\n");
    }

    #[test]
    fn summary_lists_counts_and_views() {
        let dataset = Dataset { skipped_kpi_rows: 2, ..Dataset::default() };
        let text = render_summary(&dataset, &views());
        assert!(text.starts_with("Employees: 0\nKPI rows: 0\nSkipped KPI rows: 2\n\n"));
        assert!(text.contains("Sales"));
        assert!(text.contains("150.00"));
        assert!(text.contains("Idle"));
        assert!(text.contains("n/a"));
    }

    #[test]
    fn summary_reports_dropped_employee_rows() {
        let dataset = Dataset { skipped_employee_rows: 1, ..Dataset::default() };
        let text = render_summary(&dataset, &KpiViews::default());
        assert!(text.contains("Skipped employee rows: 1\n"));
        assert!(!text.contains("Skipped KPI rows"));
        assert!(text.contains("Top 0 by csat:\n"));
    }
}
