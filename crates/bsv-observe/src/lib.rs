//! bsv-observe: observables and the per-sample series they produce.
//!
//! An observable is a named group of series. For each selected sample it
//! yields one rendered series per name, either by unpacking pre-tabulated
//! data (`Observable`) or by calling a user function (`LiveObservable`).
//!
//! # Example
//!
//! ```
//! use bsv_core::SampleId;
//! use bsv_observe::{KeyedArrays, Observable, ObservableSource, SeriesConfig};
//!
//! let data = KeyedArrays::from_columns(vec![("x", vec![0.0, 1.0]), ("y", vec![5.0, 6.0])])
//!     .unwrap();
//! let obs = Observable::new(SeriesConfig::new("S"), data).unwrap();
//!
//! let batch = obs.generate(&[SampleId::from_index(1)], &Default::default()).unwrap();
//! let series = &batch["S"][&SampleId::from_index(1)];
//! assert_eq!(series.data.y, vec![6.0]);
//! ```

pub mod dataset;
pub mod layout;
pub mod live;
pub mod observable;
pub mod series;
pub mod style;

pub use dataset::{Cell, KeyedArrays, RowTable, SeriesDataset, SeriesFrame, WideTable};
pub use layout::{Layout, LegendEntry, LegendPosition, Overlay};
pub use live::{ComputeError, LiveObservable};
pub use observable::{
    Observable, ObservableData, ObservableSource, OneOrMany, SeriesBatch, SeriesConfig,
};
pub use series::{RenderedSeries, SeriesData, SeriesHandle, SeriesSpec};
pub use style::{DefaultStyle, PlotOptions, SeriesKind};

use bsv_core::SampleId;

pub type ObserveResult<T> = Result<T, ObserveError>;

#[derive(thiserror::Error, Debug)]
pub enum ObserveError {
    #[error("Observable needs at least one series name")]
    NoSeries,

    #[error("Duplicate series name: {0}")]
    DuplicateSeries(String),

    #[error("{what}: got {actual} entries for {expected} series names")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Series '{series}' must resolve to exactly 2 fields, found {}: {fields:?}", fields.len())]
    SeriesShape { series: String, fields: Vec<String> },

    #[error("Dataset field '{field}' has {actual} entries, expected {expected}")]
    RaggedDataset {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unsupported dataset shape: {found}")]
    UnsupportedDatasetShape { found: String },

    #[error("Sample {index} out of range for '{what}' (len={len})")]
    IndexOutOfRange {
        what: String,
        index: usize,
        len: usize,
    },

    #[error("Series '{series}' has {x_len} x values but {y_len} y values")]
    DataLengthMismatch {
        series: String,
        x_len: usize,
        y_len: usize,
    },

    #[error("'{observable}' returned {actual} series for sample {index}, expected {expected}")]
    OutputCountMismatch {
        observable: String,
        index: SampleId,
        expected: usize,
        actual: usize,
    },

    #[error("Computation '{observable}' failed for sample {index}: {source}")]
    Compute {
        observable: String,
        index: SampleId,
        #[source]
        source: ComputeError,
    },
}
