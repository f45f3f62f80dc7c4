// src/routes/dashboard.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use crate::aggregate::DepartmentFilter;
use crate::{charts, error::KpiError, models::KpiViews, AppState};
use super::kpi::{load_views, KpiQ};

const PAGE_TITLE: &str = "Employee KPI Dashboard";

/// GET /?department=
/// Every request reloads the data and re-renders all three panels.
pub async fn index(State(state): State<AppState>, Query(q): Query<KpiQ>) -> Response {
    let filter = q.filter();
    match render(&state, &filter).await {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            error!(error = %e, department = filter.label(), "dashboard render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(error_page(&e))).into_response()
        }
    }
}

async fn render(state: &AppState, filter: &DepartmentFilter) -> Result<String, KpiError> {
    let (options, views) = load_views(&state.pool, filter).await?;
    let satisfaction_svg = charts::render_svg("top_satisfaction", |root| {
        charts::draw_satisfaction(root, &views.top_satisfaction)
    })?;
    let productivity_svg = charts::render_svg("productivity", |root| {
        charts::draw_productivity(root, &views.productivity)
    })?;
    Ok(render_page(filter, &options, &views, &satisfaction_svg, &productivity_svg))
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn department_select(filter: &DepartmentFilter, options: &[String]) -> String {
    let mut html = String::from(
        "<form method=\"get\" action=\"/\"><label for=\"department\">Department</label> \
         <select id=\"department\" name=\"department\" onchange=\"this.form.submit()\">",
    );
    for option in options {
        let selected = if option == filter.label() { " selected" } else { "" };
        let option = escape_html(option);
        html.push_str(&format!("<option value=\"{option}\"{selected}>{option}</option>"));
    }
    html.push_str("</select> <noscript><button type=\"submit\">Apply</button></noscript></form>");
    html
}

fn department_table(views: &KpiViews) -> String {
    if views.department_averages.is_empty() {
        return "<p class=\"empty\">No data for this selection.</p>".to_string();
    }
    let mut html = String::from(
        "<table><thead><tr><th>department</th><th>sales</th>\
         <th>customer_satisfaction</th><th>tasks_completed</th></tr></thead><tbody>",
    );
    for a in &views.department_averages {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td></tr>",
            escape_html(&a.department),
            a.sales,
            a.customer_satisfaction,
            a.tasks_completed
        ));
    }
    html.push_str("</tbody></table>");
    html
}

pub fn render_page(
    filter: &DepartmentFilter,
    options: &[String],
    views: &KpiViews,
    satisfaction_svg: &str,
    productivity_svg: &str,
) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{PAGE_TITLE}</title>\
<style>body{{font-family:sans-serif;margin:2rem}}table{{border-collapse:collapse}}\
td,th{{border:1px solid #ccc;padding:4px 10px;text-align:right}}td:first-child{{text-align:left}}\
section{{margin-top:2rem}}svg{{max-width:100%;height:auto}}</style></head><body>\
<h1>{PAGE_TITLE}</h1>\
{select}\
<section id=\"department-averages\"><h2>Average KPI by Department</h2>{table}</section>\
<section id=\"top-satisfaction\"><h2>Top Employees by Customer Satisfaction</h2>{satisfaction_svg}</section>\
<section id=\"productivity\"><h2>Productivity (tasks / hour)</h2>{productivity_svg}</section>\
</body></html>",
        select = department_select(filter, options),
        table = department_table(views),
    )
}

fn error_page(e: &KpiError) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{PAGE_TITLE}</title></head><body>\
<h1>{PAGE_TITLE}</h1><p class=\"error\">Could not load KPI data: {}</p></body></html>",
        escape_html(&e.to_string())
    )
}
