//! Observables computed on demand by a user function.

use std::fmt;
use std::sync::Arc;

use bsv_core::timing::AccumulatingTimer;
use bsv_core::{LabelMap, SampleId};

use crate::dataset::SeriesFrame;
use crate::observable::{ObservableSource, SeriesConfig};
use crate::series::{RenderedSeries, SeriesSpec};
use crate::style::DefaultStyle;
use crate::{ObserveError, ObserveResult};

/// Error type user computations may fail with.
pub type ComputeError = Box<dyn std::error::Error + Send + Sync>;

type ComputeFn = dyn Fn(SampleId) -> Result<Vec<SeriesFrame>, ComputeError> + Send + Sync;

/// Observable whose per-sample data comes from a function.
///
/// The function is called once per sample (not once per series) and must
/// return one two-field frame per declared series, in declared order.
pub struct LiveObservable {
    specs: Vec<SeriesSpec>,
    labels: Option<LabelMap>,
    name: String,
    compute: Arc<ComputeFn>,
    calls: AccumulatingTimer,
}

impl fmt::Debug for LiveObservable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveObservable")
            .field("specs", &self.specs)
            .field("name", &self.name)
            .field("calls", &self.calls.count())
            .finish_non_exhaustive()
    }
}

impl LiveObservable {
    pub fn new<F>(config: SeriesConfig, compute: F) -> ObserveResult<Self>
    where
        F: Fn(SampleId) -> Result<Vec<SeriesFrame>, ComputeError> + Send + Sync + 'static,
    {
        let (specs, labels) = config.resolve()?;
        let name = specs
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Ok(Self {
            specs,
            labels,
            name,
            compute: Arc::new(compute),
            calls: AccumulatingTimer::new(),
        })
    }

    /// Like `new`, with static arguments handed to every call.
    pub fn with_args<A, F>(config: SeriesConfig, args: A, compute: F) -> ObserveResult<Self>
    where
        A: Send + Sync + 'static,
        F: Fn(SampleId, &A) -> Result<Vec<SeriesFrame>, ComputeError> + Send + Sync + 'static,
    {
        Self::new(config, move |id| compute(id, &args))
    }

    /// Name of the computation, shown by `describe` and in errors.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of times the function has been called.
    pub fn call_count(&self) -> u64 {
        self.calls.count()
    }

    /// Total seconds spent inside the function.
    pub fn compute_seconds(&self) -> f64 {
        self.calls.total_seconds()
    }

    fn call(&self, id: SampleId) -> ObserveResult<Vec<SeriesFrame>> {
        let frames = self
            .calls
            .time(|| (self.compute)(id))
            .map_err(|source| ObserveError::Compute {
                observable: self.name.clone(),
                index: id,
                source,
            })?;
        if frames.len() != self.specs.len() {
            return Err(ObserveError::OutputCountMismatch {
                observable: self.name.clone(),
                index: id,
                expected: self.specs.len(),
                actual: frames.len(),
            });
        }
        Ok(frames)
    }
}

impl ObservableSource for LiveObservable {
    fn series(&self) -> &[SeriesSpec] {
        &self.specs
    }

    fn labels(&self) -> Option<&LabelMap> {
        self.labels.as_ref()
    }

    fn realize(&self, id: SampleId, style: &DefaultStyle) -> ObserveResult<Vec<RenderedSeries>> {
        let frames = self.call(id)?;
        self.specs
            .iter()
            .zip(&frames)
            .map(|(spec, frame)| RenderedSeries::build(spec, id, frame, self.labels.as_ref(), style))
            .collect()
    }

    fn describe(&self) -> String {
        let names = self.names();
        let mut out = if names.len() > 1 {
            let mut out = String::from("Grouped Live Observables");
            for (i, name) in names.iter().enumerate() {
                out.push_str(&format!("\n\t- Observable {}: {}", i + 1, name));
            }
            out
        } else {
            format!("Live Observable\nName: {}", names.join(""))
        };
        out.push_str(&format!("\nCalculated by {}", self.name));
        out
    }
}
