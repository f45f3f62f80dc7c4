// src/config.rs

use std::{env, path::PathBuf};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://employee_kpi.db";
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";
pub const DEFAULT_PORT: u16 = 8501;

/// Runtime settings. The defaults are the fixed locations the tools have
/// always used; the environment (or a `.env` file) may override them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub output_dir: PathBuf,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.into(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Reads `DATABASE_URL`, `KPI_OUTPUT_DIR` and `PORT`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            database_url: lookup("DATABASE_URL")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.database_url),
            output_dir: lookup("KPI_OUTPUT_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            // unparseable PORT falls back to the default
            port: lookup("PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
        }
    }
}
