//! bsv-core: shared foundation for bsavi.
//!
//! Contains:
//! - ids (stable sample indices used as selection and cache keys)
//! - selection (ordered, repeat-free selection sets)
//! - labels (field name -> display label resolution)
//! - numeric (Real + float helpers)
//! - timing (tracing-backed timers and call counters)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod labels;
pub mod numeric;
pub mod selection;
pub mod timing;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use ids::SampleId;
pub use labels::{LabelMap, resolve_label};
pub use numeric::*;
pub use selection::Selection;
