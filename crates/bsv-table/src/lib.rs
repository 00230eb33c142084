//! bsv-table: the sample table and the loaders that fill it.
//!
//! A `SampleTable` is immutable once built; its row order defines the
//! `SampleId` used by selections and caches everywhere else.

pub mod chain;
pub mod table;

pub use chain::{
    ParamNames, expand_chain_paths, load_chains, load_paramnames, parse_chain, parse_paramnames,
};
pub use table::{ColumnSummary, SampleRow, SampleTable, SelectedRows};

use std::path::PathBuf;

pub type TableResult<T> = Result<T, TableError>;

#[derive(thiserror::Error, Debug)]
pub enum TableError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {source_name} line {line}: {what}")]
    Parse {
        source_name: String,
        line: usize,
        what: String,
    },

    #[error("Row {row} has {actual} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("Chain pattern {pattern}: {what}")]
    Pattern { pattern: String, what: String },

    #[error("No chain data found")]
    Empty,

    #[error(transparent)]
    Core(#[from] bsv_core::CoreError),
}
