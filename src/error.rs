// src/error.rs

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KpiError {
    #[error("cannot open data source `{url}`: {source}")]
    Connection {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("query on `{relation}` failed: {source}")]
    Query {
        relation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("invalid review_date '{0}'")]
    InvalidDate(String),

    #[error("{relation} row has no `{field}`")]
    MissingField {
        relation: &'static str,
        emp_id: Option<i64>,
        field: &'static str,
    },

    #[error("cannot write `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write `{}`: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("cannot render chart `{chart}`: {message}")]
    Chart { chart: String, message: String },
}

pub type Result<T> = std::result::Result<T, KpiError>;
