//! Error type for the bsv-cli front end.

use std::path::PathBuf;

/// Wraps the library errors plus the CLI's own file and session problems.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid session: {0}")]
    Session(String),

    #[error("Table error: {0}")]
    Table(#[from] bsv_table::TableError),

    #[error("Observable error: {0}")]
    Observe(#[from] bsv_observe::ObserveError),

    #[error("Dashboard error: {0}")]
    Dash(#[from] bsv_dash::DashError),

    #[error("Selection error: {0}")]
    Core(#[from] bsv_core::CoreError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;

pub fn read_file(path: &std::path::Path) -> AppResult<String> {
    std::fs::read_to_string(path).map_err(|source| AppError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}
