//! bsv-dash: the selection-driven dashboard core.
//!
//! Contains:
//! - config (dashboard configuration, YAML loading)
//! - cache (insert-only per-series render cache)
//! - assembler (selection handling and layout assembly)
//! - render (renderer interface and a serializable scene renderer)

pub mod assembler;
pub mod cache;
pub mod config;
pub mod render;

pub use assembler::{LayoutAssembler, SessionStats};
pub use cache::{CacheStats, RenderCache};
pub use config::DashboardConfig;
pub use render::{Mark, Renderer, Scene, ScenePanel, SceneRenderer, SceneSeries};

use std::path::PathBuf;

use bsv_core::SampleId;
use bsv_observe::ObserveError;

pub type DashResult<T> = Result<T, DashError>;

#[derive(thiserror::Error, Debug)]
pub enum DashError {
    #[error("Series '{name}' is declared by more than one observable")]
    DuplicateSeries { name: String },

    #[error("Sample {index} out of range (sample table has {len} rows)")]
    IndexOutOfRange { index: SampleId, len: usize },

    #[error("{} sample(s) failed to compute: {}", .failures.len(), describe_failures(.failures))]
    Computation {
        failures: Vec<(SampleId, DashError)>,
    },

    #[error("Invalid dashboard config: {what}")]
    InvalidConfig { what: String },

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Observe(#[from] ObserveError),
}

impl DashError {
    /// Sample ids of a `Computation` error, empty for every other variant.
    pub fn failed_samples(&self) -> Vec<SampleId> {
        match self {
            DashError::Computation { failures } => failures.iter().map(|(id, _)| *id).collect(),
            _ => Vec::new(),
        }
    }
}

fn describe_failures(failures: &[(SampleId, DashError)]) -> String {
    failures
        .iter()
        .map(|(id, err)| format!("[{id}] {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}
